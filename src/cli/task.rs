//! mytasks task command implementations.
//!
//! Maintenance of the soft-delete lifecycle: a task is first flagged with
//! `deletePending`, which hides it from every ownership view, and is later
//! purged from the store.

use serde::Serialize;
use serde_json::Value;

use super::Context;
use crate::audit::{AuditEvent, AuditKind, AuditSink};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::store::{DocFilter, Document, DocumentStore};

#[derive(Serialize)]
struct PurgeReport {
    dry_run: bool,
    removed: Vec<String>,
}

pub fn run_show(ctx: &Context, id: &str) -> Result<()> {
    let doc = ctx
        .store()
        .get(ctx.collection(), id)?
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

    let mut human = HumanOutput::new(format!("mytasks task {id}"));
    human.push_detail(serde_json::to_string_pretty(&doc.data)?);

    emit_success(ctx.output, "task show", &doc, Some(&human))
}

pub fn run_flag_delete(ctx: &Context, id: &str) -> Result<()> {
    let mut store = ctx.store();
    let collection = ctx.collection();
    let mut doc = store
        .get(collection, id)?
        .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

    let Value::Object(fields) = &mut doc.data else {
        return Err(Error::InvalidArgument(format!(
            "task document '{id}' is not an object"
        )));
    };
    fields.insert("deletePending".to_string(), Value::Bool(true));

    // Audit first: a failed record leaves the store untouched.
    ctx.audit_log()
        .record(&AuditEvent::new(AuditKind::TaskFlaggedForDeletion, ctx.actor()).with_task(id))?;
    store.set(collection, id, doc.data.clone())?;

    let mut human = HumanOutput::new(format!("mytasks task flag-delete: {id}"));
    human.push_summary("deletePending", "true");
    human.push_next_step("mytasks task purge");

    emit_success(
        ctx.output,
        "task flag-delete",
        &Document {
            id: id.to_string(),
            data: doc.data,
        },
        Some(&human),
    )
}

pub fn run_purge(ctx: &Context, dry_run: bool) -> Result<()> {
    let mut store = ctx.store();
    let collection = ctx.collection();
    let pending = store.list(collection, Some(&DocFilter::eq("deletePending", true)))?;

    let mut removed = Vec::with_capacity(pending.len());
    let mut log = ctx.audit_log();
    let actor = ctx.actor();
    for doc in pending {
        if !dry_run {
            log.record(&AuditEvent::new(AuditKind::TaskPurged, actor.clone()).with_task(&doc.id))?;
            if !store.delete(collection, &doc.id)? {
                continue;
            }
        }
        removed.push(doc.id);
    }

    let verb = if dry_run { "would remove" } else { "removed" };
    let mut human = HumanOutput::new(format!(
        "mytasks task purge: {verb} {} task(s)",
        removed.len()
    ));
    for id in &removed {
        human.push_detail(id.clone());
    }

    emit_success(
        ctx.output,
        "task purge",
        &PurgeReport { dry_run, removed },
        Some(&human),
    )
}
