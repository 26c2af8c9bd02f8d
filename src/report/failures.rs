//! Failure details for steps that did not pass

use serde_json::Value;

use crate::engine::{failed_checks, StepResponse, StepResult, TestResult};

/// Describe every failed step, visiting tests and steps in run order
pub fn describe_failures(tests: &[TestResult]) -> Vec<String> {
    let mut lines = vec!["❌ Workflow failed. Details:".to_string()];
    for step in tests.iter().flat_map(|t| &t.steps).filter(|s| !s.passed) {
        describe_step(step, &mut lines);
    }
    lines
}

fn describe_step(step: &StepResult, lines: &mut Vec<String>) {
    lines.push(format!("🔴 Step Failed: {}", step.display_name()));

    if let Some(request) = &step.request {
        lines.push(format!("  🌍 URL: {}", request.url));
        lines.push(format!("  📡 Method: {}", request.method));
    }

    if let Some(checks) = &step.checks {
        let failed = failed_checks(checks);
        if !failed.is_empty() {
            lines.push("  ❌ Failed Checks:".to_string());
            for check in failed {
                lines.push(format!(
                    "    - {}: Expected {} Got {}",
                    check.key,
                    pretty(check.expected),
                    pretty(check.given)
                ));
            }
        }
    }

    if let Some(response) = &step.response {
        describe_response(response, lines);
    }
}

fn describe_response(response: &StepResponse, lines: &mut Vec<String>) {
    lines.push("  📩 Response:".to_string());
    lines.push(format!(
        "    - Status: {} {}",
        response.status, response.status_text
    ));
    lines.push(format!(
        "    - Headers: {}",
        serde_json::to_string_pretty(&response.headers).unwrap_or_default()
    ));

    if let Some(body) = response.body.as_ref().filter(|b| !b.is_empty()) {
        let text = body.text();
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => lines.push(format!("    - Body (JSON):\n{}", pretty(&json))),
            Err(_) => lines.push(format!("    - Body (Raw Text):\n{}", text)),
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
