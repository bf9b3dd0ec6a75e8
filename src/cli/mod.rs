//! Command-line interface for mytasks
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command group is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::audit::JsonlAuditLog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::{self, Identity, IdentityOverrides};
use crate::matcher::Matcher;
use crate::output::OutputOptions;
use crate::store::{self, DocumentStore, JsonStore};
use crate::task::{tasks_from_documents, TaskRecord};

mod audit;
mod identity_cmd;
mod init;
mod mine;
mod task;

/// mytasks - "my tasks" for the marketing-support task board
///
/// Decides which tasks belong to a user with one canonical ownership rule
/// table, and audits the fuzzy rules that misfire.
#[derive(Parser, Debug)]
#[command(name = "mytasks")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace root holding .mytasks.toml (defaults to current directory)
    #[arg(long, global = true, env = "MYTASKS_ROOT")]
    pub root: Option<PathBuf>,

    /// Read tasks from an exported JSON dump instead of the store
    #[arg(long, global = true)]
    pub tasks_file: Option<PathBuf>,

    /// Acting user id
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Acting user display name
    #[arg(long, global = true)]
    pub user_name: Option<String>,

    /// Acting user email
    #[arg(long, global = true)]
    pub user_email: Option<String>,

    /// Enable an unsafe rule: name_contains_value, value_in_email_prefix, nancy_exception
    #[arg(long, global = true)]
    pub enable_rule: Vec<String>,

    /// Disable an unsafe rule
    #[arg(long, global = true)]
    pub disable_rule: Vec<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .mytasks.toml and the local store
    Init,

    /// List tasks that belong to the acting user
    Mine {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },

    /// Count the acting user's active tasks
    Count,

    /// Explain whether one task belongs to the acting user
    Check {
        /// Task id
        task_id: String,
    },

    /// Mine/team/overdue/completed counters
    Summary {
        /// Day to evaluate deadlines against (YYYY-MM-DD, default today)
        #[arg(long)]
        today: Option<String>,
    },

    /// Report tasks matched through unsafe rules
    Audit {
        /// Append each finding to the audit log
        #[arg(long)]
        record: bool,
    },

    /// Set or show the acting identity
    #[command(subcommand)]
    Identity(IdentityCommands),

    /// Task document maintenance
    #[command(subcommand)]
    Task(TaskCommands),
}

/// Identity subcommands
#[derive(Subcommand, Debug)]
pub enum IdentityCommands {
    /// Persist the acting identity in .mytasks/identity.toml
    Set {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Show the resolved identity
    Show,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Print a stored task document
    Show {
        /// Task id
        id: String,
    },

    /// Mark a task as pending deletion
    FlagDelete {
        /// Task id
        id: String,
    },

    /// Permanently remove tasks pending deletion
    Purge {
        /// List what would be removed without deleting
        #[arg(long)]
        dry_run: bool,
    },
}

/// Resolved global state shared by every command.
pub(crate) struct Context {
    pub root: PathBuf,
    pub config: Config,
    pub matcher: Matcher,
    pub tasks_file: Option<PathBuf>,
    pub output: OutputOptions,
    user_id: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl Context {
    fn load(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(path) => path.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load_from_root(&root)?;

        let mut rules = config.rules.rule_set();
        for name in &cli.enable_rule {
            rules.set_toggle(name, true)?;
        }
        for name in &cli.disable_rule {
            rules.set_toggle(name, false)?;
        }
        let matcher = Matcher::new(rules).with_completed_status(&config.tasks.completed_status);
        tracing::debug!(root = %root.display(), ?rules, "context loaded");

        Ok(Self {
            root,
            config,
            matcher,
            tasks_file: cli.tasks_file.clone(),
            output: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
            user_id: cli.user_id.clone(),
            user_name: cli.user_name.clone(),
            user_email: cli.user_email.clone(),
        })
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::new(self.config.store.dir_in(&self.root))
    }

    pub fn audit_log(&self) -> JsonlAuditLog {
        JsonlAuditLog::new(self.config.store.audit_log_in(&self.root))
    }

    pub fn collection(&self) -> &str {
        &self.config.tasks.collection
    }

    /// Identity as resolved, possibly empty.
    pub fn resolve_identity(&self) -> Result<Identity> {
        identity::resolve_identity(
            &self.root,
            &self.config,
            IdentityOverrides {
                id: self.user_id.as_deref(),
                name: self.user_name.as_deref(),
                email: self.user_email.as_deref(),
            },
        )
    }

    /// Identity for ownership checks; an empty one is a caller error.
    pub fn identity(&self) -> Result<Identity> {
        self.resolve_identity()?.require()
    }

    /// Actor recorded on audit events.
    pub fn actor(&self) -> Option<String> {
        self.resolve_identity()
            .ok()
            .filter(|identity| !identity.is_empty())
            .map(|identity| identity.label())
    }

    pub fn load_tasks(&self) -> Result<Vec<TaskRecord>> {
        let docs = match &self.tasks_file {
            Some(path) => store::load_documents_file(path)?,
            None => self.store().list(self.collection(), None)?,
        };
        let tasks = tasks_from_documents(&docs);
        tracing::debug!(documents = docs.len(), tasks = tasks.len(), "tasks loaded");
        Ok(tasks)
    }

    pub fn find_task(&self, id: &str) -> Result<TaskRecord> {
        self.load_tasks()?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let ctx = Context::load(&self)?;
        match self.command {
            Commands::Init => init::run(&ctx),
            Commands::Mine { all } => mine::run_mine(&ctx, all),
            Commands::Count => mine::run_count(&ctx),
            Commands::Check { task_id } => mine::run_check(&ctx, &task_id),
            Commands::Summary { today } => mine::run_summary(&ctx, today.as_deref()),
            Commands::Audit { record } => audit::run(&ctx, record),
            Commands::Identity(cmd) => match cmd {
                IdentityCommands::Set { id, name, email } => {
                    identity_cmd::run_set(&ctx, Identity {
                        id: id.unwrap_or_default(),
                        name: name.unwrap_or_default(),
                        email: email.unwrap_or_default(),
                    })
                }
                IdentityCommands::Show => identity_cmd::run_show(&ctx),
            },
            Commands::Task(cmd) => match cmd {
                TaskCommands::Show { id } => task::run_show(&ctx, &id),
                TaskCommands::FlagDelete { id } => task::run_flag_delete(&ctx, &id),
                TaskCommands::Purge { dry_run } => task::run_purge(&ctx, dry_run),
            },
        }
    }
}
