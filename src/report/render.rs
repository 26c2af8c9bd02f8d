//! Report rendering
//!
//! JSON mode prints the whole report as one document. Human-readable mode
//! prints a summary with counts, captures, errors and messages.

use colored::Colorize;
use serde_json::Value;

use crate::common::Result;

use super::CliReport;

const RULE: &str = "==================================================";

/// Render the report as a pretty-printed JSON document
pub fn json(report: &CliReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render the report as a text summary
pub fn human(report: &CliReport) -> String {
    let mut out = Vec::new();
    let stats = report.stats();

    out.push(RULE.dimmed().to_string());
    if report.passed {
        out.push(format!("✅ {}", "WORKFLOW PASSED".green().bold()));
    } else {
        out.push(format!("❌ {}", "WORKFLOW FAILED".red().bold()));
    }
    out.push(RULE.dimmed().to_string());

    out.push(format!(
        "🧪 Tests: {} passed, {} failed",
        stats.tests_passed.to_string().green(),
        stats.tests_failed.to_string().red()
    ));
    out.push(format!(
        "👣 Steps: {} passed, {} failed",
        stats.steps_passed.to_string().green(),
        stats.steps_failed.to_string().red()
    ));

    if !report.captures.is_empty() {
        out.push(String::new());
        out.push(format!("📦 {}", "Captures:".cyan()));
        for (key, value) in &report.captures {
            out.push(format!("  {}: {}", key.bold(), capture_value(value)));
        }
    }

    if !report.errors.is_empty() {
        out.push(String::new());
        out.push(format!("🚨 {}", "Errors:".red()));
        for error in &report.errors {
            out.push(format!("  - {}", error.message));
            if let Some(line) = error.stack.as_deref().and_then(|s| s.lines().next()) {
                out.push(format!("    {}", line.dimmed()));
            }
        }
    }

    if !report.messages.is_empty() {
        out.push(String::new());
        for message in &report.messages {
            out.push(message.clone());
        }
    }

    out.push(String::new());
    out.push(RULE.dimmed().to_string());
    if report.passed {
        out.push(format!("🏁 {}", "Workflow completed successfully".green()));
    } else {
        out.push(format!("🏁 {}", "Workflow finished with failures".red()));
    }
    out.push(RULE.dimmed().to_string());

    out.join("\n")
}

fn capture_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
