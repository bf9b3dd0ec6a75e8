//! Ownership audits and the audit event sink.
//!
//! [`AuditReport`] answers the question the old diagnostic scripts kept
//! asking: which of a user's tasks were matched through an unsafe rule, and
//! which would vanish from their list if the unsafe rules were switched off
//! (`hidden_if_strict`). Findings and store maintenance are recorded as
//! [`AuditEvent`]s through an [`AuditSink`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::Result;
use crate::identity::Identity;
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::matcher::{MatchField, MatchMode, Matcher, RuleKind, RuleSet};
use crate::person::{normalize, PersonRef};
use crate::task::TaskRecord;

pub const AUDIT_SCHEMA_VERSION: &str = "mytasks.audit.v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    UnsafeMatch,
    TaskFlaggedForDeletion,
    TaskPurged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub schema_version: String,
    pub event_id: String,
    pub kind: AuditKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AuditEvent {
    pub fn new(kind: AuditKind, actor: Option<String>) -> Self {
        Self {
            schema_version: AUDIT_SCHEMA_VERSION.to_string(),
            event_id: Ulid::new().to_string(),
            kind,
            timestamp: Utc::now(),
            actor,
            task_id: None,
            data: None,
        }
    }

    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_data<T: Serialize>(mut self, data: T) -> Result<Self> {
        self.data = Some(serde_json::to_value(data)?);
        Ok(self)
    }
}

/// Destination for audit events.
pub trait AuditSink {
    fn record(&mut self, event: &AuditEvent) -> Result<()>;
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<AuditEvent>,
}

impl AuditSink for MemorySink {
    fn record(&mut self, event: &AuditEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Append-only JSON-lines audit log.
#[derive(Debug, Clone)]
pub struct JsonlAuditLog {
    path: PathBuf,
}

impl JsonlAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> Result<Vec<AuditEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let mut events = Vec::new();
        for line in contents.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            events.push(serde_json::from_str(trimmed)?);
        }
        Ok(events)
    }
}

impl AuditSink for JsonlAuditLog {
    fn record(&mut self, event: &AuditEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        lock::append_line_locked(&self.path, &line, DEFAULT_LOCK_TIMEOUT_MS)
    }
}

/// A task whose winning match came from an unsafe rule. It may still match
/// safely through a lower-priority field; see `hidden_if_strict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlaggedMatch {
    pub task_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub field: MatchField,
    pub rule: RuleKind,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleTally {
    pub rule: RuleKind,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub identity: String,
    pub evaluated: usize,
    pub my_tasks: usize,
    pub strict_tasks: usize,
    pub enabled_unsafe: Vec<RuleKind>,
    pub rule_tally: Vec<RuleTally>,
    pub unsafe_matches: Vec<FlaggedMatch>,
    /// Ids of tasks that drop out of the list under [`RuleSet::strict`].
    pub hidden_if_strict: Vec<String>,
}

impl AuditReport {
    pub fn build(matcher: &Matcher, tasks: &[TaskRecord], identity: &Identity) -> Self {
        let strict =
            Matcher::new(RuleSet::strict()).with_completed_status(matcher.completed_status());
        let mine = matcher.explain_my_tasks(tasks, identity, MatchMode::Active);

        let mut tally: BTreeMap<RuleKind, usize> = BTreeMap::new();
        let mut unsafe_matches = Vec::new();
        let mut hidden_if_strict = Vec::new();

        for (task, result) in &mine {
            let (Some(field), Some(rule)) = (result.field(), result.rule()) else {
                continue;
            };
            *tally.entry(rule).or_default() += 1;

            if rule.is_unsafe() {
                unsafe_matches.push(FlaggedMatch {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                    field,
                    rule,
                    value: normalize(field_ref(task, field)),
                });
            }
            if !strict.matches(task, identity, MatchMode::Active).is_match() {
                hidden_if_strict.push(task.id.clone());
            }
        }

        Self {
            identity: identity.label(),
            evaluated: tasks.len(),
            my_tasks: mine.len(),
            strict_tasks: mine.len() - hidden_if_strict.len(),
            enabled_unsafe: matcher.rules().enabled_unsafe(),
            rule_tally: RuleKind::ALL
                .into_iter()
                .filter_map(|rule| {
                    tally
                        .get(&rule)
                        .map(|count| RuleTally { rule, count: *count })
                })
                .collect(),
            unsafe_matches,
            hidden_if_strict,
        }
    }

    /// One `UnsafeMatch` event per flagged task.
    pub fn events(&self, actor: Option<&str>) -> Result<Vec<AuditEvent>> {
        self.unsafe_matches
            .iter()
            .map(|flagged| {
                AuditEvent::new(AuditKind::UnsafeMatch, actor.map(str::to_string))
                    .with_task(flagged.task_id.clone())
                    .with_data(flagged)
            })
            .collect()
    }
}

fn field_ref(task: &TaskRecord, field: MatchField) -> &PersonRef {
    match field {
        MatchField::Am => &task.am,
        MatchField::Support => &task.support,
        MatchField::Assignee => &task.assignee,
        MatchField::Author => task.author_ref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, am: &str) -> TaskRecord {
        let mut task = TaskRecord::new(id);
        task.am = PersonRef::text(am);
        task
    }

    #[test]
    fn flags_prefix_only_matches() {
        let identity = Identity::new("", "Chris Duong", "chris.duong@x.com");
        let tasks = vec![
            task("safe", "Chris Duong"),
            // "ch" only matches because "chris.duong" contains it.
            task("risky", "ch"),
            task("other", "Lan"),
        ];

        let report = AuditReport::build(&Matcher::default(), &tasks, &identity);

        assert_eq!(report.evaluated, 3);
        assert_eq!(report.my_tasks, 2);
        assert_eq!(report.strict_tasks, 1);
        assert_eq!(report.hidden_if_strict, vec!["risky".to_string()]);
        assert_eq!(
            report.unsafe_matches,
            vec![FlaggedMatch {
                task_id: "risky".to_string(),
                title: String::new(),
                field: MatchField::Am,
                rule: RuleKind::ValueInEmailPrefix,
                value: "ch".to_string(),
            }]
        );
        assert_eq!(
            report.rule_tally,
            vec![
                RuleTally {
                    rule: RuleKind::ValueContainsName,
                    count: 1
                },
                RuleTally {
                    rule: RuleKind::ValueInEmailPrefix,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn unsafe_match_backed_by_safe_field_is_not_hidden() {
        let identity = Identity::new("U-1", "", "an@x.com");
        let mut task = task("both", "a");
        task.assignee = PersonRef::id("U-1");

        let report = AuditReport::build(&Matcher::default(), &[task], &identity);
        assert_eq!(report.unsafe_matches.len(), 1);
        assert!(report.hidden_if_strict.is_empty());
    }

    #[test]
    fn jsonl_log_appends_events() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut log = JsonlAuditLog::new(dir.path().join("audit.jsonl"));

        log.record(&AuditEvent::new(AuditKind::TaskPurged, Some("lan".to_string())).with_task("t1"))
            .expect("record");
        log.record(&AuditEvent::new(AuditKind::TaskPurged, None).with_task("t2"))
            .expect("record");

        let events = log.read_all().expect("read");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].task_id.as_deref(), Some("t1"));
        assert_eq!(events[1].kind, AuditKind::TaskPurged);
        assert_ne!(events[0].event_id, events[1].event_id);
    }
}
