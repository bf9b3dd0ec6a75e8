//! mytasks init command implementation
//!
//! Creates the default config and the local document store directory.

use std::path::{Path, PathBuf};

use super::Context;
use crate::config::{Config, CONFIG_FILENAME};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

#[derive(serde::Serialize)]
struct InitReport {
    root: PathBuf,
    created: InitCreated,
}

#[derive(serde::Serialize)]
struct InitCreated {
    config: bool,
    store_dir: bool,
}

pub fn run(ctx: &Context) -> Result<()> {
    let created_config = ensure_config(&ctx.root)?;
    let created_store = ensure_dir(&ctx.config.store.dir_in(&ctx.root))?;

    let report = InitReport {
        root: ctx.root.clone(),
        created: InitCreated {
            config: created_config,
            store_dir: created_store,
        },
    };

    let mut human = HumanOutput::new(format!("mytasks init: {}", ctx.root.display()));
    human.push_summary("config", created_label(created_config));
    human.push_summary("store", created_label(created_store));
    human.push_next_step("mytasks identity set --email <you@company.com>");

    emit_success(ctx.output, "init", &report, Some(&human))
}

fn ensure_config(root: &Path) -> Result<bool> {
    let path = root.join(CONFIG_FILENAME);
    if path.exists() {
        return Ok(false);
    }
    Config::default().save(&path)?;
    Ok(true)
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}

fn created_label(created: bool) -> &'static str {
    if created {
        "created"
    } else {
        "exists"
    }
}
