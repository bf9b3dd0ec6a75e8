//! Person references stored on task documents.
//!
//! Task documents name people in three shapes: a bare string, an object
//! with a `name`, or an object carrying only an `id`. [`PersonRef`] decodes
//! all of them once at ingestion and [`normalize`] reduces any of them to
//! the lowercase string the matcher compares against.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A task's reference to a person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PersonRef {
    /// `null`, missing, empty string, or any shape we cannot read.
    #[default]
    Empty,
    /// A plain string, treated as a display name.
    Text(String),
    /// An object with a `name`, optionally carrying an `id`.
    Named { name: String, id: Option<String> },
    /// An object that only identifies the person by `id`.
    Id(String),
}

impl PersonRef {
    /// Decode a JSON value without ever failing.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) if !text.trim().is_empty() => PersonRef::Text(text.clone()),
            Value::Object(map) => {
                let id = map.get("id").and_then(scalar_text);
                match map.get("name").and_then(scalar_text) {
                    Some(name) => PersonRef::Named { name, id },
                    None => id.map(PersonRef::Id).unwrap_or_default(),
                }
            }
            _ => PersonRef::Empty,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        PersonRef::Text(value.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        PersonRef::Named {
            name: name.into(),
            id: None,
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        PersonRef::Id(id.into())
    }

    pub fn is_empty(&self) -> bool {
        normalize(self).is_empty()
    }

    /// Human-readable label, preserving the stored casing.
    pub fn display(&self) -> Option<&str> {
        match self {
            PersonRef::Empty => None,
            PersonRef::Text(text) => Some(text.trim()),
            PersonRef::Named { name, .. } => Some(name.trim()),
            PersonRef::Id(id) => Some(id.trim()),
        }
    }
}

/// Canonical comparison form of a person reference.
///
/// Strings and names are trimmed and lowercased; an object without a usable
/// name falls back to its lowercased id; anything else is `""`.
pub fn normalize(person: &PersonRef) -> String {
    match person {
        PersonRef::Empty => String::new(),
        PersonRef::Text(text) => text.trim().to_lowercase(),
        PersonRef::Named { name, id } => {
            let name = name.trim();
            if !name.is_empty() {
                name.to_lowercase()
            } else {
                id.as_deref()
                    .map(|id| id.trim().to_lowercase())
                    .unwrap_or_default()
            }
        }
        PersonRef::Id(id) => id.trim().to_lowercase(),
    }
}

// Firestore exports carry numeric ids now and then.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl<'de> Deserialize<'de> for PersonRef {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(PersonRef::from_value(&value))
    }
}

impl Serialize for PersonRef {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PersonRef::Empty => serializer.serialize_none(),
            PersonRef::Text(text) => serializer.serialize_str(text),
            PersonRef::Named { name, id } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("name", name)?;
                if let Some(id) = id {
                    map.serialize_entry("id", id)?;
                }
                map.end()
            }
            PersonRef::Id(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("id", id)?;
                map.end()
            }
        }
    }
}
