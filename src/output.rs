//! Human and JSON rendering for mytasks commands.
//!
//! JSON output is a single envelope per invocation: `schema_version`,
//! `command`, `status`, then either `data` (plus any warnings) or `error`.

use serde::Serialize;
use serde_json::Value;

use crate::error::{exit_codes, Error, Result};

pub const SCHEMA_VERSION: &str = "mytasks.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Summary,
    Details,
    Warnings,
    NextSteps,
}

impl Section {
    const ORDER: [Section; 4] = [
        Section::Summary,
        Section::Details,
        Section::Warnings,
        Section::NextSteps,
    ];

    fn title(self) -> &'static str {
        match self {
            Section::Summary => "Summary",
            Section::Details => "Details",
            Section::Warnings => "Warnings",
            Section::NextSteps => "Next steps",
        }
    }
}

/// Text report for a command: a header line followed by bulleted sections.
#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    lines: Vec<(Section, String)>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        let line = if value.is_empty() {
            key
        } else {
            format!("{key}: {value}")
        };
        self.lines.push((Section::Summary, line));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.lines.push((Section::Details, value.into()));
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.lines.push((Section::Warnings, value.into()));
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.lines.push((Section::NextSteps, value.into()));
    }

    fn section(&self, section: Section) -> impl Iterator<Item = &str> + '_ {
        self.lines
            .iter()
            .filter(move |(kind, _)| *kind == section)
            .map(|(_, line)| line.as_str())
    }

    fn warnings(&self) -> Vec<String> {
        self.section(Section::Warnings).map(str::to_string).collect()
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'static str>,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: i32,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

pub fn success_envelope<T: Serialize>(
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<Value> {
    let envelope = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "success",
        data: Some(data),
        warnings: human.map(HumanOutput::warnings).unwrap_or_default(),
        error: None,
        hint: None,
    };
    Ok(serde_json::to_value(envelope)?)
}

pub fn error_envelope(command: &str, err: &Error) -> Result<Value> {
    let envelope: Envelope<'_, ()> = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "error",
        data: None,
        warnings: Vec::new(),
        error: Some(ErrorBody {
            message: err.to_string(),
            code: err.exit_code(),
            kind: error_kind(err),
            details: err.details(),
        }),
        hint: error_hint(err),
    };
    Ok(serde_json::to_value(envelope)?)
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let payload = success_envelope(command, data, human)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if let (false, Some(human)) = (options.quiet, human) {
        println!("{}", format_human(human));
    }
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    if json {
        let payload = error_envelope(command, err)?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = error_hint(err) {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut text = output.header.clone();
    for section in Section::ORDER {
        let mut lines = output.section(section).peekable();
        if lines.peek().is_none() {
            continue;
        }
        text.push_str(&format!("\n\n{}:", section.title()));
        for line in lines {
            text.push_str(&format!("\n- {line}"));
        }
    }
    text
}

/// Command name for error envelopes, taken from raw args since clap may
/// have failed to parse them.
pub fn infer_command_name_from_args() -> String {
    let mut positional = std::env::args().skip(1).filter(|arg| !arg.starts_with('-'));

    let Some(command) = positional.next() else {
        return "mytasks".to_string();
    };
    match (command.as_str(), positional.next()) {
        ("identity" | "task", Some(sub)) => format!("{command} {sub}"),
        _ => command,
    }
}

fn error_kind(err: &Error) -> &'static str {
    if err.exit_code() == exit_codes::USER_ERROR {
        "user_error"
    } else {
        "operation_failed"
    }
}

fn error_hint(err: &Error) -> Option<&'static str> {
    match err {
        Error::IdentityMissing => Some("mytasks identity set --email <you@company.com>"),
        Error::InvalidConfig(_) => Some("fix .mytasks.toml then retry"),
        Error::TaskNotFound(_) => Some("mytasks mine --all"),
        Error::LockFailed(_) => Some("another mytasks process holds the store; retry"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_render_in_fixed_order_and_skip_empty_ones() {
        let mut human = HumanOutput::new("mytasks count: 3");
        human.push_warning("unsafe rules enabled: value_in_email_prefix");
        human.push_summary("identity", "Lan");
        human.push_summary("strict", "");

        assert_eq!(
            format_human(&human),
            "mytasks count: 3\n\nSummary:\n- identity: Lan\n- strict\n\nWarnings:\n- unsafe rules enabled: value_in_email_prefix"
        );
    }

    #[test]
    fn success_envelope_carries_warnings() {
        let mut human = HumanOutput::new("mytasks mine");
        human.push_warning("1 task(s) matched through an unsafe rule");

        let payload =
            success_envelope("mine", &serde_json::json!({"count": 1}), Some(&human)).unwrap();
        assert_eq!(payload["status"], "success");
        assert_eq!(payload["data"]["count"], 1);
        assert_eq!(payload["warnings"][0], "1 task(s) matched through an unsafe rule");
        assert!(payload.get("error").is_none());
    }

    #[test]
    fn error_envelope_has_kind_and_hint() {
        let payload = error_envelope("count", &Error::IdentityMissing).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error"]["code"], 2);
        assert_eq!(payload["error"]["kind"], "user_error");
        assert_eq!(payload["hint"], "mytasks identity set --email <you@company.com>");
        assert!(payload.get("data").is_none());
    }
}
