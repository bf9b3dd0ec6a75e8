//! mytasks mine/count/check/summary command implementations.

use chrono::NaiveDate;
use serde::Serialize;

use super::Context;
use crate::error::{Error, Result};
use crate::filter::TaskSummary;
use crate::identity::Identity;
use crate::matcher::{MatchMode, MatchResult};
use crate::output::{emit_success, HumanOutput};
use crate::task::TaskRecord;

#[derive(Serialize)]
struct OwnedTask<'a> {
    task: &'a TaskRecord,
    reason: MatchResult,
}

#[derive(Serialize)]
struct MineReport<'a> {
    identity: &'a Identity,
    mode: &'static str,
    count: usize,
    tasks: Vec<OwnedTask<'a>>,
}

#[derive(Serialize)]
struct CountReport<'a> {
    identity: &'a Identity,
    count: usize,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    task_id: &'a str,
    /// Ignoring status: does this task belong to the user at all.
    any: MatchResult,
    /// Whether it counts toward the user's active tasks.
    active: MatchResult,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    identity: &'a Identity,
    today: NaiveDate,
    #[serde(flatten)]
    summary: TaskSummary,
}

pub fn run_mine(ctx: &Context, all: bool) -> Result<()> {
    let identity = ctx.identity()?;
    let tasks = ctx.load_tasks()?;
    let mode = if all { MatchMode::Any } else { MatchMode::Active };
    let owned = ctx.matcher.explain_my_tasks(&tasks, &identity, mode);

    let mut human = HumanOutput::new(format!(
        "mytasks mine: {} task(s) for {}",
        owned.len(),
        identity.label()
    ));
    let mut unsafe_count = 0;
    for (task, reason) in &owned {
        if reason.rule().is_some_and(|rule| rule.is_unsafe()) {
            unsafe_count += 1;
        }
        human.push_detail(describe(task, reason));
    }
    if unsafe_count > 0 {
        human.push_warning(format!(
            "{unsafe_count} task(s) matched through an unsafe rule"
        ));
        human.push_next_step("mytasks audit");
    }

    let report = MineReport {
        identity: &identity,
        mode: if all { "any" } else { "active" },
        count: owned.len(),
        tasks: owned
            .iter()
            .map(|(task, reason)| OwnedTask {
                task,
                reason: *reason,
            })
            .collect(),
    };

    emit_success(ctx.output, "mine", &report, Some(&human))
}

pub fn run_count(ctx: &Context) -> Result<()> {
    let identity = ctx.identity()?;
    let tasks = ctx.load_tasks()?;
    let count = ctx.matcher.count_my_tasks(&tasks, &identity);

    let mut human = HumanOutput::new(format!("mytasks count: {count}"));
    human.push_summary("identity", identity.label());

    emit_success(
        ctx.output,
        "count",
        &CountReport {
            identity: &identity,
            count,
        },
        Some(&human),
    )
}

pub fn run_check(ctx: &Context, task_id: &str) -> Result<()> {
    let identity = ctx.identity()?;
    let task = ctx.find_task(task_id)?;

    let any = ctx.matcher.matches(&task, &identity, MatchMode::Any);
    let active = ctx.matcher.matches(&task, &identity, MatchMode::Active);

    let mut human = HumanOutput::new(format!("mytasks check {task_id}: {any}"));
    human.push_summary("identity", identity.label());
    human.push_summary("counts as active", if active.is_match() { "yes" } else { "no" });
    if task.delete_pending {
        human.push_detail("task is pending deletion");
    }
    if let Some(rule) = any.rule().filter(|rule| rule.is_unsafe()) {
        human.push_warning(format!("matched through unsafe rule {rule}"));
    }

    emit_success(
        ctx.output,
        "check",
        &CheckReport {
            task_id,
            any,
            active,
        },
        Some(&human),
    )
}

pub fn run_summary(ctx: &Context, today: Option<&str>) -> Result<()> {
    let identity = ctx.identity()?;
    let today = match today {
        Some(raw) => parse_day(raw)?,
        None => chrono::Local::now().date_naive(),
    };
    let tasks = ctx.load_tasks()?;
    let summary = TaskSummary::compute(&ctx.matcher, &tasks, &identity, today);

    let mut human = HumanOutput::new(format!("mytasks summary for {}", identity.label()));
    human.push_summary("mine", summary.mine.to_string());
    human.push_summary("team", summary.team.to_string());
    human.push_summary("overdue", summary.overdue.to_string());
    human.push_summary("completed", summary.completed.to_string());

    emit_success(
        ctx.output,
        "summary",
        &SummaryReport {
            identity: &identity,
            today,
            summary,
        },
        Some(&human),
    )
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidArgument(format!("invalid date '{raw}' (expected YYYY-MM-DD)")))
}

fn describe(task: &TaskRecord, reason: &MatchResult) -> String {
    let mut line = task.id.clone();
    if !task.title.is_empty() {
        line.push_str(&format!(" {}", task.title));
    }
    if !task.status.is_empty() {
        line.push_str(&format!(" [{}]", task.status.trim()));
    }
    line.push_str(&format!(" ({reason})"));
    line
}
