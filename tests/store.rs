use std::fs;

use mytasks::error::Error;
use mytasks::store::{load_documents_file, DocFilter, DocumentStore, JsonStore};
use serde_json::{json, Value};

#[test]
fn json_store_crud_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = JsonStore::new(dir.path().join("store"));

    assert!(store.get("tasks", "t1")?.is_none());
    assert!(store.list("tasks", None)?.is_empty());

    store.set("tasks", "t1", json!({"title": "Banner", "status": "Mới"}))?;
    store.set("tasks", "t2", json!({"title": "Flyer", "deletePending": true}))?;

    let doc = store.get("tasks", "t1")?.expect("t1");
    assert_eq!(doc.data["title"], Value::String("Banner".to_string()));

    let pending = store.list("tasks", Some(&DocFilter::eq("deletePending", true)))?;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "t2");

    assert!(store.delete("tasks", "t2")?);
    assert!(!store.delete("tasks", "t2")?);
    assert_eq!(store.list("tasks", None)?.len(), 1);

    Ok(())
}

#[test]
fn json_store_writes_keyed_layout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = JsonStore::new(dir.path());

    store.set("staff", "s1", json!({"name": "Lan"}))?;

    let raw = fs::read_to_string(dir.path().join("staff.json"))?;
    let on_disk: Value = serde_json::from_str(&raw)?;
    assert_eq!(on_disk, json!({"s1": {"name": "Lan"}}));

    Ok(())
}

#[test]
fn json_store_reads_array_layout() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(
        dir.path().join("tasks.json"),
        r#"[{"id": "a", "status": "Mới"}, {"id": "b"}]"#,
    )?;
    let store = JsonStore::new(dir.path());

    let ids: Vec<String> = store
        .list("tasks", None)?
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    assert_eq!(ids, vec!["a", "b"]);

    Ok(())
}

#[test]
fn set_rejects_blank_id() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut store = JsonStore::new(dir.path());

    let err = store.set("tasks", "  ", json!({})).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    Ok(())
}

#[test]
fn legacy_dump_with_tasks_key() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("export.json");
    fs::write(
        &path,
        r#"{"tasks": [{"id": "x1", "am": "Lan"}, {"id": "x2", "am": {"id": "U-1"}}]}"#,
    )?;

    let docs = load_documents_file(&path)?;
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1].data["am"]["id"], Value::String("U-1".to_string()));

    Ok(())
}

#[test]
fn corrupt_collection_reports_path() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("tasks.json"), "{not json")?;
    let store = JsonStore::new(dir.path());

    match store.list("tasks", None) {
        Err(Error::InvalidDocument { path, .. }) => assert!(path.ends_with("tasks.json")),
        other => panic!("expected InvalidDocument, got {other:?}"),
    }

    Ok(())
}
