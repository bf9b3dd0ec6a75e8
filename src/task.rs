//! Task documents as read from the `tasks` collection.
//!
//! Documents are written by the web app and by years of one-off scripts, so
//! decoding is lenient: unknown fields are ignored and fields with an
//! unexpected type fall back to their empty value instead of failing.

use chrono::{DateTime, NaiveDate};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::person::PersonRef;
use crate::store::Document;

/// Status the web app writes when a task is finished ("Completed").
pub const COMPLETED_STATUS: &str = "Hoàn thành";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub title: String,
    /// Older documents carry the title under `name`; folded into `title`.
    #[serde(default, deserialize_with = "lenient_string", skip_serializing)]
    name: String,
    #[serde(default, skip_serializing_if = "PersonRef::is_empty")]
    pub am: PersonRef,
    #[serde(default, skip_serializing_if = "PersonRef::is_empty")]
    pub support: PersonRef,
    #[serde(default, skip_serializing_if = "PersonRef::is_empty")]
    pub assignee: PersonRef,
    #[serde(default, skip_serializing_if = "PersonRef::is_empty")]
    pub created_by: PersonRef,
    /// Legacy alias of `createdBy` kept by older documents.
    #[serde(default, skip_serializing_if = "PersonRef::is_empty")]
    pub author: PersonRef,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub delete_pending: bool,
    #[serde(
        default,
        deserialize_with = "lenient_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<String>,
}

impl TaskRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Decode a stored document, taking the document key as the id when the
    /// body does not carry one.
    pub fn from_document(doc: &Document) -> Result<Self> {
        if !doc.data.is_object() {
            return Err(Error::InvalidArgument(format!(
                "task document '{}' is not an object",
                doc.id
            )));
        }
        let mut task: TaskRecord = serde_json::from_value(doc.data.clone())?;
        if task.id.trim().is_empty() {
            task.id = doc.id.clone();
        }
        let legacy_name = std::mem::take(&mut task.name);
        if task.title.trim().is_empty() {
            task.title = legacy_name;
        }
        Ok(task)
    }

    pub fn is_completed(&self, completed_status: &str) -> bool {
        self.status.trim() == completed_status.trim()
    }

    /// The author reference: `createdBy`, or the legacy `author` when unset.
    pub fn author_ref(&self) -> &PersonRef {
        if self.created_by.is_empty() {
            &self.author
        } else {
            &self.created_by
        }
    }

    /// Deadline as a calendar date. Accepts `YYYY-MM-DD` and RFC 3339.
    pub fn deadline_date(&self) -> Option<NaiveDate> {
        let raw = self.deadline.as_deref()?.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date);
        }
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(stamp.date_naive());
        }
        raw.get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    }
}

/// Decode every task document, skipping (and logging) the unreadable ones.
pub fn tasks_from_documents(docs: &[Document]) -> Vec<TaskRecord> {
    docs.iter()
        .filter_map(|doc| match TaskRecord::from_document(doc) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(id = %doc.id, error = %err, "skipping malformed task document");
                None
            }
        })
        .collect()
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(deserializer)?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

// Only a literal `true` marks a task for deletion.
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, data: Value) -> Document {
        Document {
            id: id.to_string(),
            data,
        }
    }

    #[test]
    fn decodes_web_app_document() {
        let task = TaskRecord::from_document(&doc(
            "t1",
            json!({
                "title": "Banner for store 12",
                "am": "Chris Duong",
                "support": {"name": "Lan"},
                "assignee": {"id": "U-7", "email": "u7@x.com"},
                "createdBy": "boss@x.com",
                "status": "Đang làm",
                "deletePending": false,
                "deadline": "2026-10-01",
                "unrelated": [1, 2, 3]
            }),
        ))
        .unwrap();

        assert_eq!(task.id, "t1");
        assert_eq!(task.am, PersonRef::text("Chris Duong"));
        assert_eq!(task.support, PersonRef::named("Lan"));
        assert_eq!(task.assignee, PersonRef::id("U-7"));
        assert_eq!(task.created_by, PersonRef::text("boss@x.com"));
        assert!(!task.delete_pending);
        assert_eq!(
            task.deadline_date(),
            NaiveDate::from_ymd_opt(2026, 10, 1)
        );
    }

    #[test]
    fn malformed_fields_degrade_instead_of_failing() {
        let task = TaskRecord::from_document(&doc(
            "t2",
            json!({
                "status": null,
                "deletePending": "yes",
                "deadline": 12,
                "am": 5
            }),
        ))
        .unwrap();

        assert_eq!(task.status, "");
        assert!(!task.delete_pending);
        assert_eq!(task.am, PersonRef::Empty);
        assert_eq!(task.deadline_date(), None);
    }

    #[test]
    fn title_falls_back_to_name() {
        let legacy = TaskRecord::from_document(&doc("t7", json!({"name": "Banner"}))).unwrap();
        assert_eq!(legacy.title, "Banner");

        let both = TaskRecord::from_document(&doc(
            "t8",
            json!({
                "title": "Banner",
                "name": "Banner v2",
                "assignee": {"id": "U-1"}
            }),
        ))
        .unwrap();
        assert_eq!(both.title, "Banner");
        assert_eq!(both.assignee, PersonRef::id("U-1"));

        let decoded = tasks_from_documents(&[doc("t8", json!({"title": "a", "name": "b"}))]);
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn non_object_document_is_rejected() {
        let err = TaskRecord::from_document(&doc("t3", json!("nope"))).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn author_ref_prefers_created_by() {
        let mut task = TaskRecord::new("t4");
        task.author = PersonRef::text("old@x.com");
        assert_eq!(task.author_ref(), &PersonRef::text("old@x.com"));

        task.created_by = PersonRef::text("new@x.com");
        assert_eq!(task.author_ref(), &PersonRef::text("new@x.com"));
    }

    #[test]
    fn deadline_accepts_timestamps() {
        let mut task = TaskRecord::new("t5");
        task.deadline = Some("2026-03-04T17:00:00+07:00".to_string());
        assert_eq!(task.deadline_date(), NaiveDate::from_ymd_opt(2026, 3, 4));

        task.deadline = Some("2026-03-04 09:00".to_string());
        assert_eq!(task.deadline_date(), NaiveDate::from_ymd_opt(2026, 3, 4));
    }

    #[test]
    fn completed_status_is_trimmed() {
        let mut task = TaskRecord::new("t6");
        task.status = " Hoàn thành ".to_string();
        assert!(task.is_completed(COMPLETED_STATUS));
    }
}
