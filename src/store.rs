//! Document store abstraction.
//!
//! The web app keeps its data in a document database; this crate only needs
//! `get`/`list`/`set`/`delete` over JSON documents. [`MemoryStore`] backs
//! tests, [`JsonStore`] keeps one `<collection>.json` file per collection on
//! disk.
//!
//! Collection files and exported dumps are accepted in three layouts:
//! - an object keyed by document id: `{"t1": {...}, "t2": {...}}`
//! - an array of documents carrying an `id`: `[{"id": "t1", ...}]`
//! - an object wrapping such an array: `{"tasks": [...]}`
//!
//! [`JsonStore`] always writes the keyed-object layout.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// A stored document and its key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Field-equals filter for [`DocumentStore::list`]. A missing field compares
/// as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct DocFilter {
    pub field: String,
    pub value: Value,
}

impl DocFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn accepts(&self, data: &Value) -> bool {
        data.get(&self.field).unwrap_or(&Value::Null) == &self.value
    }
}

/// Minimal document database interface.
pub trait DocumentStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    fn list(&self, collection: &str, filter: Option<&DocFilter>) -> Result<Vec<Document>>;

    fn set(&mut self, collection: &str, id: &str, data: Value) -> Result<()>;

    /// Returns whether a document was removed.
    fn delete(&mut self, collection: &str, id: &str) -> Result<bool>;
}

type Collection = BTreeMap<String, Value>;

fn filtered(collection: &Collection, filter: Option<&DocFilter>) -> Vec<Document> {
    collection
        .iter()
        .filter(|(_, data)| filter.map_or(true, |filter| filter.accepts(data)))
        .map(|(id, data)| Document {
            id: id.clone(),
            data: data.clone(),
        })
        .collect()
}

fn validate_id(kind: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{kind} cannot be empty")));
    }
    Ok(())
}

/// In-process store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection from already-loaded documents.
    pub fn with_documents(mut self, collection: &str, docs: Vec<Document>) -> Self {
        let entry = self.collections.entry(collection.to_string()).or_default();
        for doc in docs {
            entry.insert(doc.id, doc.data);
        }
        self
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    fn list(&self, collection: &str, filter: Option<&DocFilter>) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| filtered(docs, filter))
            .unwrap_or_default())
    }

    fn set(&mut self, collection: &str, id: &str, data: Value) -> Result<()> {
        validate_id("collection", collection)?;
        validate_id("document id", id)?;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }
}

/// File-backed store: `<dir>/<collection>.json`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let name = collection.trim();
        validate_id("collection", name)?;
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(Error::InvalidArgument(format!(
                "invalid collection name '{collection}'"
            )));
        }
        Ok(self.dir.join(format!("{name}.json")))
    }

    fn read_collection(&self, path: &Path) -> Result<Collection> {
        if !path.exists() {
            return Ok(Collection::new());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(parse_documents(&raw, path)?
            .into_iter()
            .map(|doc| (doc.id, doc.data))
            .collect())
    }

    fn write_collection(&self, path: &Path, docs: &Collection) -> Result<()> {
        let json = serde_json::to_string_pretty(docs)?;
        lock::write_atomic(path, json.as_bytes())
    }

    fn modify<T>(&self, collection: &str, op: impl FnOnce(&mut Collection) -> T) -> Result<T> {
        let path = self.collection_path(collection)?;
        lock::with_lock(&path, self.lock_timeout_ms, || {
            let mut docs = self.read_collection(&path)?;
            let outcome = op(&mut docs);
            self.write_collection(&path, &docs)?;
            Ok(outcome)
        })
    }
}

impl DocumentStore for JsonStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let path = self.collection_path(collection)?;
        let mut docs = self.read_collection(&path)?;
        Ok(docs.remove(id).map(|data| Document {
            id: id.to_string(),
            data,
        }))
    }

    fn list(&self, collection: &str, filter: Option<&DocFilter>) -> Result<Vec<Document>> {
        let path = self.collection_path(collection)?;
        let docs = self.read_collection(&path)?;
        Ok(filtered(&docs, filter))
    }

    fn set(&mut self, collection: &str, id: &str, data: Value) -> Result<()> {
        validate_id("document id", id)?;
        self.modify(collection, |docs| {
            docs.insert(id.to_string(), data);
        })?;
        tracing::info!(collection, id, "document written");
        Ok(())
    }

    fn delete(&mut self, collection: &str, id: &str) -> Result<bool> {
        let removed = self.modify(collection, |docs| docs.remove(id).is_some())?;
        if removed {
            tracing::info!(collection, id, "document deleted");
        }
        Ok(removed)
    }
}

/// Read documents from an exported dump in any supported layout.
pub fn load_documents_file(path: &Path) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)?;
    parse_documents(&raw, path)
}

/// Parse documents from JSON text. `path` is only used in error messages.
pub fn parse_documents(raw: &str, path: &Path) -> Result<Vec<Document>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(raw).map_err(|err| Error::InvalidDocument {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(documents_from_array(items, path)),
        Value::Object(mut map) => match map.remove("tasks") {
            Some(Value::Array(items)) => Ok(documents_from_array(items, path)),
            Some(other) => {
                map.insert("tasks".to_string(), other);
                Ok(documents_from_map(map))
            }
            None => Ok(documents_from_map(map)),
        },
        _ => Err(Error::InvalidDocument {
            path: path.to_path_buf(),
            reason: "expected a JSON object or array".to_string(),
        }),
    }
}

fn documents_from_map(map: Map<String, Value>) -> Vec<Document> {
    map.into_iter()
        .map(|(id, data)| Document { id, data })
        .collect()
}

fn documents_from_array(items: Vec<Value>, path: &Path) -> Vec<Document> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, data)| {
            let id = match data.get("id") {
                Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
                Some(Value::Number(number)) => number.to_string(),
                _ => {
                    tracing::warn!(path = %path.display(), index, "skipping document without id");
                    return None;
                }
            };
            Some(Document { id, data })
        })
        .collect()
}
