//! mytasks identity command implementation
//!
//! Provides identity helpers (set/show).

use std::path::PathBuf;

use super::Context;
use crate::error::Result;
use crate::identity::{self, Identity};
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct IdentitySetReport {
    identity: Identity,
    path: PathBuf,
}

#[derive(serde::Serialize)]
struct IdentityShowReport {
    identity: Identity,
}

pub fn run_set(ctx: &Context, requested: Identity) -> Result<()> {
    let path = identity::persist_identity(&ctx.root, &requested)?;
    let resolved = identity::load_persisted_identity(&ctx.root)?.unwrap_or(requested);

    let mut human = HumanOutput::new(format!("mytasks identity set: {}", resolved.label()));
    push_fields(&mut human, &resolved);
    human.push_summary("path", path.display().to_string());
    human.push_next_step("mytasks mine");

    emit_success(
        ctx.output,
        "identity set",
        &IdentitySetReport {
            identity: resolved,
            path,
        },
        Some(&human),
    )
}

pub fn run_show(ctx: &Context) -> Result<()> {
    let resolved = ctx.resolve_identity()?;

    let header = if resolved.is_empty() {
        "mytasks identity: not set".to_string()
    } else {
        format!("mytasks identity: {}", resolved.label())
    };
    let mut human = HumanOutput::new(header);
    push_fields(&mut human, &resolved);
    if resolved.is_empty() {
        human.push_warning("identity not set; ownership commands will fail");
        human.push_next_step("mytasks identity set --email <you@company.com>");
    }

    emit_success(
        ctx.output,
        "identity show",
        &IdentityShowReport { identity: resolved },
        Some(&human),
    )
}

fn push_fields(human: &mut HumanOutput, identity: &Identity) {
    human.push_summary("id", identity.id.clone());
    human.push_summary("name", identity.name.clone());
    human.push_summary("email", identity.email.clone());
}
