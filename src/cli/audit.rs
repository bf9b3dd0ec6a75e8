//! mytasks audit command implementation

use super::Context;
use crate::audit::{AuditReport, AuditSink};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

pub fn run(ctx: &Context, record: bool) -> Result<()> {
    let identity = ctx.identity()?;
    let tasks = ctx.load_tasks()?;
    let report = AuditReport::build(&ctx.matcher, &tasks, &identity);

    let mut human = HumanOutput::new(format!(
        "mytasks audit: {} of {} task(s) flagged for {}",
        report.unsafe_matches.len(),
        report.my_tasks,
        report.identity
    ));
    human.push_summary("evaluated", report.evaluated.to_string());
    human.push_summary("mine", report.my_tasks.to_string());
    human.push_summary("mine with strict rules", report.strict_tasks.to_string());
    for tally in &report.rule_tally {
        human.push_summary(format!("rule {}", tally.rule), tally.count.to_string());
    }
    for flagged in &report.unsafe_matches {
        human.push_detail(format!(
            "{} {}={:?} via {}",
            flagged.task_id, flagged.field, flagged.value, flagged.rule
        ));
    }
    if !report.hidden_if_strict.is_empty() {
        human.push_warning(format!(
            "disabling unsafe rules would hide: {}",
            report.hidden_if_strict.join(", ")
        ));
    }

    if record && !report.unsafe_matches.is_empty() {
        let mut log = ctx.audit_log();
        for event in report.events(ctx.actor().as_deref())? {
            log.record(&event)?;
        }
        human.push_summary("recorded to", log.path().display().to_string());
        tracing::info!(
            findings = report.unsafe_matches.len(),
            path = %log.path().display(),
            "audit findings recorded"
        );
    }

    emit_success(ctx.output, "audit", &report, Some(&human))
}
