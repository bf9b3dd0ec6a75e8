//! mytasks - task ownership matching library
//!
//! This library decides which tasks on the marketing-support task board
//! belong to a given user, using one canonical ownership rule table, and
//! backs the `mytasks` CLI.
//!
//! # Core Concepts
//!
//! - **Person references**: task fields naming a person as a string, a
//!   `{name}` object or an `{id}` object, normalized once on read
//! - **Ownership matching**: AM > Support > Assignee > Author, first field
//!   and first rule wins, with a reason code for every match
//! - **Unsafe rules**: fuzzy substring rules that misfire, individually
//!   switchable and auditable
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.mytasks.toml`
//! - `error`: Error types and result aliases
//! - `person`: Person references and normalization
//! - `identity`: Acting-user identity resolution
//! - `task`: Task documents
//! - `matcher`: Ownership rule table
//! - `filter`: My-task lists, counts and dashboard views
//! - `audit`: Unsafe-match audits and the audit event sink
//! - `store`: Document store trait and implementations
//! - `lock`: File locking and atomic writes

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod identity;
pub mod lock;
pub mod matcher;
pub mod output;
pub mod person;
pub mod store;
pub mod task;

pub use error::{Error, Result};
pub use filter::{count_my_tasks, filter_my_tasks};
pub use identity::Identity;
pub use matcher::{matches, MatchField, MatchMode, MatchResult, Matcher, RuleKind, RuleSet};
pub use person::{normalize, PersonRef};
pub use task::TaskRecord;
