#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

pub struct TestRoot {
    dir: TempDir,
}

impl TestRoot {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file(".mytasks.toml", contents)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.dir.path().join(".mytasks").join("store")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.dir.path().join(".mytasks").join("audit.jsonl")
    }

    /// Write the `tasks` collection in the keyed-object layout.
    pub fn write_tasks(&self, tasks: &Value) -> std::io::Result<PathBuf> {
        self.write_file(
            ".mytasks/store/tasks.json",
            &serde_json::to_string_pretty(tasks).expect("serialize tasks"),
        )
    }

    pub fn read_tasks(&self) -> Result<Value, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(self.store_dir().join("tasks.json"))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("mytasks").expect("mytasks binary");
        cmd.current_dir(self.path())
            .env_remove("MYTASKS_ROOT")
            .env_remove("MYTASKS_USER_ID")
            .env_remove("MYTASKS_USER_NAME")
            .env_remove("MYTASKS_USER_EMAIL")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// A small board mixing every person-reference shape.
pub fn sample_board() -> Value {
    serde_json::json!({
        "t-assignee": {
            "title": "Store 12 banner",
            "assignee": {"id": "U-7", "email": "chris.duong@x.com"},
            "status": "Đang làm"
        },
        "t-am": {
            "title": "Monthly report",
            "am": "Chris Duong",
            "status": "Mới"
        },
        "t-done": {
            "title": "Old flyer",
            "support": {"name": "Chris"},
            "status": "Hoàn thành"
        },
        "t-deleted": {
            "title": "Duplicate",
            "assignee": {"id": "U-7"},
            "status": "Mới",
            "deletePending": true
        },
        "t-prefix": {
            "title": "Shared inbox",
            "support": "chris",
            "status": "Mới"
        },
        "t-author": {
            "title": "Author only",
            "createdBy": "chris.duong@x.com",
            "status": "Mới",
            "deadline": "2026-01-02"
        },
        "t-other": {
            "title": "Someone else",
            "am": "Lan Nguyen",
            "support": {"name": "Hòa"},
            "status": "Mới",
            "deadline": "2026-01-02"
        }
    })
}
