//! Task ownership matching.
//!
//! Decides whether a task belongs to a user by comparing the task's AM,
//! Support and Assignee references (in that priority order) against the
//! user's id, name and email, falling back to the task author. The first
//! field that matches wins, and within a field the first rule that fires
//! wins; the winning pair is reported as a [`MatchResult`] so callers can log
//! why a task was considered theirs.
//!
//! Rule table, evaluated per field value `v`:
//!
//! | order | rule                   | fires when                                   |
//! |-------|------------------------|----------------------------------------------|
//! | 1     | `IdMatch`              | `v == id`                                    |
//! | 2a    | `ValueContainsName`    | `v` contains the user name                   |
//! | 2b    | `NameContainsValue`    | the user name contains `v` (unsafe, opt-in)  |
//! | 2c    | `NameTokenInValue`     | a name token longer than 2 chars is in `v`   |
//! | 2d    | `ValueTokenInName`     | a `v` token longer than 2 chars is in name   |
//! | 3     | `EmailExact`           | `v == email`                                 |
//! | 4     | `EmailPrefixInValue`   | `v` contains the email local part            |
//! | 4     | `ValueInEmailPrefix`   | the email local part contains `v` (unsafe)   |
//! | 5     | `NancyException`       | `v == "nancy"` and user email/name has it    |
//!
//! Rules marked unsafe match short values against unrelated users; they are
//! individually switchable through [`RuleSet`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::person::{normalize, PersonRef};
use crate::task::{TaskRecord, COMPLETED_STATUS};

/// Literal value of the one person whose name collides with a common
/// substring. Only ever matched as a whole value.
pub const NANCY_EXCEPTION: &str = "nancy";

/// Tokens of this many characters or fewer never take part in token rules.
const MIN_TOKEN_CHARS: usize = 2;

/// Task field that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    Am,
    Support,
    Assignee,
    Author,
}

impl MatchField {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchField::Am => "am",
            MatchField::Support => "support",
            MatchField::Assignee => "assignee",
            MatchField::Author => "author",
        }
    }
}

impl fmt::Display for MatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    IdMatch,
    ValueContainsName,
    NameContainsValue,
    NameTokenInValue,
    ValueTokenInName,
    EmailExact,
    EmailPrefixInValue,
    ValueInEmailPrefix,
    NancyException,
}

impl RuleKind {
    /// Every rule in evaluation order.
    pub const ALL: [RuleKind; 9] = [
        RuleKind::IdMatch,
        RuleKind::ValueContainsName,
        RuleKind::NameContainsValue,
        RuleKind::NameTokenInValue,
        RuleKind::ValueTokenInName,
        RuleKind::EmailExact,
        RuleKind::EmailPrefixInValue,
        RuleKind::ValueInEmailPrefix,
        RuleKind::NancyException,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::IdMatch => "id_match",
            RuleKind::ValueContainsName => "value_contains_name",
            RuleKind::NameContainsValue => "name_contains_value",
            RuleKind::NameTokenInValue => "name_token_in_value",
            RuleKind::ValueTokenInName => "value_token_in_name",
            RuleKind::EmailExact => "email_exact",
            RuleKind::EmailPrefixInValue => "email_prefix_in_value",
            RuleKind::ValueInEmailPrefix => "value_in_email_prefix",
            RuleKind::NancyException => "nancy_exception",
        }
    }

    /// Rules known to match unrelated users.
    pub fn is_unsafe(self) -> bool {
        matches!(
            self,
            RuleKind::NameContainsValue | RuleKind::ValueInEmailPrefix | RuleKind::NancyException
        )
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchResult {
    NoMatch,
    Match { field: MatchField, rule: RuleKind },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }

    pub fn field(&self) -> Option<MatchField> {
        match self {
            MatchResult::Match { field, .. } => Some(*field),
            MatchResult::NoMatch => None,
        }
    }

    pub fn rule(&self) -> Option<RuleKind> {
        match self {
            MatchResult::Match { rule, .. } => Some(*rule),
            MatchResult::NoMatch => None,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchResult::NoMatch => f.write_str("no match"),
            MatchResult::Match { field, rule } => write!(f, "{field} via {rule}"),
        }
    }
}

/// Whether completed tasks take part in the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Completed tasks never match ("my active tasks").
    Active,
    /// Any non-deleted task may match.
    #[default]
    Any,
}

/// Switches for the unsafe rules. Every other rule is always on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule 2b: user name contains the field value.
    pub name_contains_value: bool,
    /// Rule 4, reverse direction: email local part contains the field value.
    pub value_in_email_prefix: bool,
    /// Rule 5: literal "nancy" exception.
    pub nancy_exception: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            name_contains_value: false,
            value_in_email_prefix: true,
            nancy_exception: true,
        }
    }
}

impl RuleSet {
    /// Every unsafe rule off.
    pub fn strict() -> Self {
        Self {
            name_contains_value: false,
            value_in_email_prefix: false,
            nancy_exception: false,
        }
    }

    /// Every unsafe rule on.
    pub fn permissive() -> Self {
        Self {
            name_contains_value: true,
            value_in_email_prefix: true,
            nancy_exception: true,
        }
    }

    pub fn allows(&self, rule: RuleKind) -> bool {
        match rule {
            RuleKind::NameContainsValue => self.name_contains_value,
            RuleKind::ValueInEmailPrefix => self.value_in_email_prefix,
            RuleKind::NancyException => self.nancy_exception,
            _ => true,
        }
    }

    /// Flip a toggle by rule name (`name_contains_value`, `value-in-email-prefix`, ...).
    pub fn set_toggle(&mut self, name: &str, enabled: bool) -> Result<()> {
        match name.trim().replace('-', "_").as_str() {
            "name_contains_value" => self.name_contains_value = enabled,
            "value_in_email_prefix" => self.value_in_email_prefix = enabled,
            "nancy_exception" => self.nancy_exception = enabled,
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unknown rule '{other}' (expected name_contains_value|value_in_email_prefix|nancy_exception)"
                )))
            }
        }
        Ok(())
    }

    /// Names of the unsafe rules currently enabled.
    pub fn enabled_unsafe(&self) -> Vec<RuleKind> {
        RuleKind::ALL
            .into_iter()
            .filter(|rule| rule.is_unsafe() && self.allows(*rule))
            .collect()
    }
}

/// The identity, lowered once for repeated comparisons.
#[derive(Debug)]
struct Probe {
    id: String,
    name: String,
    name_tokens: Vec<String>,
    email: String,
    email_prefix: String,
}

impl Probe {
    fn new(identity: &Identity) -> Self {
        let name = identity.name.trim().to_lowercase();
        let email = identity.email.trim().to_lowercase();
        let email_prefix = email.split('@').next().unwrap_or_default().to_string();
        Self {
            id: identity.id.trim().to_lowercase(),
            name_tokens: long_tokens(&name).map(str::to_string).collect(),
            name,
            email,
            email_prefix,
        }
    }

    fn rule_for(&self, value: &str, rules: &RuleSet) -> Option<RuleKind> {
        if value.is_empty() {
            return None;
        }

        if !self.id.is_empty() && value == self.id {
            return Some(RuleKind::IdMatch);
        }

        if !self.name.is_empty() {
            if value.contains(self.name.as_str()) {
                return Some(RuleKind::ValueContainsName);
            }
            if rules.name_contains_value && self.name.contains(value) {
                return Some(RuleKind::NameContainsValue);
            }
            if self
                .name_tokens
                .iter()
                .any(|token| value.contains(token.as_str()))
            {
                return Some(RuleKind::NameTokenInValue);
            }
            if long_tokens(value).any(|token| self.name.contains(token)) {
                return Some(RuleKind::ValueTokenInName);
            }
        }

        if !self.email.is_empty() && value == self.email {
            return Some(RuleKind::EmailExact);
        }

        if !self.email_prefix.is_empty() {
            if value.contains(self.email_prefix.as_str()) {
                return Some(RuleKind::EmailPrefixInValue);
            }
            if rules.value_in_email_prefix && self.email_prefix.contains(value) {
                return Some(RuleKind::ValueInEmailPrefix);
            }
        }

        if rules.nancy_exception
            && value == NANCY_EXCEPTION
            && (self.email.contains(NANCY_EXCEPTION) || self.name.contains(NANCY_EXCEPTION))
        {
            return Some(RuleKind::NancyException);
        }

        None
    }

    fn is_author(&self, author: &PersonRef) -> bool {
        !self.email.is_empty() && normalize(author) == self.email
    }
}

fn long_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
}

/// Ownership matcher with a fixed rule set and completed-status label.
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: RuleSet,
    completed_status: String,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl Matcher {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            completed_status: COMPLETED_STATUS.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rules.rule_set()).with_completed_status(&config.tasks.completed_status)
    }

    pub fn with_completed_status(mut self, status: impl Into<String>) -> Self {
        self.completed_status = status.into();
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn completed_status(&self) -> &str {
        &self.completed_status
    }

    /// Check one task against one identity.
    pub fn matches(&self, task: &TaskRecord, identity: &Identity, mode: MatchMode) -> MatchResult {
        self.evaluate(task, &Probe::new(identity), mode)
    }

    /// Tasks that belong to the identity under `mode`, in input order.
    pub fn select<'a>(
        &self,
        tasks: &'a [TaskRecord],
        identity: &Identity,
        mode: MatchMode,
    ) -> Vec<(&'a TaskRecord, MatchResult)> {
        let probe = Probe::new(identity);
        tasks
            .iter()
            .map(|task| (task, self.evaluate(task, &probe, mode)))
            .filter(|(_, result)| result.is_match())
            .collect()
    }

    fn evaluate(&self, task: &TaskRecord, probe: &Probe, mode: MatchMode) -> MatchResult {
        if task.delete_pending {
            return MatchResult::NoMatch;
        }
        if mode == MatchMode::Active && task.is_completed(&self.completed_status) {
            return MatchResult::NoMatch;
        }

        let fields = [
            (MatchField::Am, &task.am),
            (MatchField::Support, &task.support),
            (MatchField::Assignee, &task.assignee),
        ];
        for (field, person) in fields {
            let value = normalize(person);
            if let Some(rule) = probe.rule_for(&value, &self.rules) {
                tracing::debug!(
                    task = %task.id,
                    field = field.as_str(),
                    rule = rule.as_str(),
                    value = %value,
                    "task matched"
                );
                return MatchResult::Match { field, rule };
            }
        }

        if probe.is_author(task.author_ref()) {
            tracing::debug!(task = %task.id, field = "author", rule = "email_exact", "task matched");
            return MatchResult::Match {
                field: MatchField::Author,
                rule: RuleKind::EmailExact,
            };
        }

        MatchResult::NoMatch
    }
}

/// Ownership check with the default rule set, regardless of status.
pub fn matches(task: &TaskRecord, identity: &Identity) -> MatchResult {
    Matcher::default().matches(task, identity, MatchMode::Any)
}
