//! Report rendering for the CLI.
//!
//! The text report on stdout is the stable surface; the stderr preview is a
//! compact one-liner for humans watching a terminal.

use crate::core::config::ResolvedPaths;
use crate::core::validate::ValidationReport;
use serde_json::{Value, json};

pub const PASS_MESSAGE: &str = "Coverage validation passed.";
pub const FAIL_HEADER: &str = "Coverage validation failed:";

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Render up to `max_items` messages with compact formatting.
pub fn preview_messages(messages: &[String], max_items: usize, max_chars: usize) -> String {
    if messages.is_empty() {
        return String::new();
    }
    let shown = messages
        .iter()
        .take(max_items)
        .map(|m| compact_line(m, max_chars))
        .collect::<Vec<_>>()
        .join(" | ");
    if messages.len() > max_items {
        format!("{} (+{} more)", shown, messages.len() - max_items)
    } else {
        shown
    }
}

/// Header, blank line, then one `- message` bullet per error.
pub fn render_failure(messages: &[String]) -> String {
    let mut out = format!("{}\n\n", FAIL_HEADER);
    for m in messages {
        out.push_str("- ");
        out.push_str(m);
        out.push('\n');
    }
    out
}

pub fn render_text(report: &ValidationReport) -> String {
    if report.passed() {
        format!("{}\n", PASS_MESSAGE)
    } else {
        render_failure(&report.errors)
    }
}

pub fn render_json(report: &ValidationReport, paths: &ResolvedPaths) -> Value {
    let status = if report.passed() { "passed" } else { "failed" };
    json!({
        "status": status,
        "errors": report.errors,
        "summary": report.summary,
        "paths": {
            "manifest": paths.manifest.display().to_string(),
            "invariants": paths.invariants.display().to_string(),
            "risk_matrix": paths.risk_matrix.display().to_string(),
            "btt_dir": paths.btt_dir.display().to_string(),
            "tests_dir": paths.tests_dir.display().to_string(),
        },
    })
}

pub fn render_config_error_json(messages: &[String]) -> Value {
    json!({
        "status": "config_error",
        "errors": messages,
    })
}
