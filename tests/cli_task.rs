mod support;

use mytasks::audit::{AuditKind, JsonlAuditLog};
use predicates::str::contains;
use serde_json::Value;

use support::{sample_board, TestRoot};

#[test]
fn init_creates_config_and_store() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::new()?;

    root.cmd()
        .args(["init"])
        .assert()
        .success()
        .stdout(contains("config: created"));

    assert!(root.path().join(".mytasks.toml").exists());
    assert!(root.store_dir().is_dir());

    root.cmd()
        .args(["init"])
        .assert()
        .success()
        .stdout(contains("config: exists"));

    Ok(())
}

#[test]
fn task_show_prints_document() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::new()?;
    root.write_tasks(&sample_board())?;

    root.cmd()
        .args(["task", "show", "t-am"])
        .assert()
        .success()
        .stdout(contains("Monthly report"));

    root.cmd()
        .args(["task", "show", "missing"])
        .assert()
        .code(2)
        .stderr(contains("Task not found: missing"));

    Ok(())
}

#[test]
fn flag_delete_hides_task_from_mine() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::new()?;
    root.write_tasks(&sample_board())?;

    root.cmd()
        .args(["--user-id", "U-7", "task", "flag-delete", "t-assignee"])
        .assert()
        .success();

    let tasks = root.read_tasks()?;
    assert_eq!(tasks["t-assignee"]["deletePending"], Value::Bool(true));
    assert_eq!(tasks["t-assignee"]["title"], "Store 12 banner");

    root.cmd()
        .args(["--user-id", "U-7", "count"])
        .assert()
        .success()
        .stdout(contains("mytasks count: 0"));

    let events = JsonlAuditLog::new(root.audit_log()).read_all()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuditKind::TaskFlaggedForDeletion);
    assert_eq!(events[0].actor.as_deref(), Some("U-7"));

    Ok(())
}

#[test]
fn purge_removes_pending_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::new()?;
    root.write_tasks(&sample_board())?;

    root.cmd()
        .args(["task", "purge", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("would remove 1 task(s)"))
        .stdout(contains("t-deleted"));
    assert!(root.read_tasks()?.get("t-deleted").is_some());

    root.cmd()
        .args(["task", "purge"])
        .assert()
        .success()
        .stdout(contains("removed 1 task(s)"));

    let tasks = root.read_tasks()?;
    assert!(tasks.get("t-deleted").is_none());
    assert_eq!(tasks.as_object().map(|docs| docs.len()), Some(6));

    let events = JsonlAuditLog::new(root.audit_log()).read_all()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuditKind::TaskPurged);
    assert_eq!(events[0].actor, None);

    Ok(())
}

#[test]
fn purge_keeps_tasks_when_audit_log_is_unwritable() -> Result<(), Box<dyn std::error::Error>> {
    let root = TestRoot::new()?;
    root.write_tasks(&sample_board())?;
    root.write_file("blocked", "not a directory")?;
    root.write_config("[store]\naudit_log = \"blocked/audit.jsonl\"\n")?;

    root.cmd().args(["task", "purge"]).assert().code(4);

    assert!(root.read_tasks()?.get("t-deleted").is_some());

    Ok(())
}
