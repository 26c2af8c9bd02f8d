//! Turn an engine result into a report

use crate::common::{Error, ReportError};
use crate::engine::WorkflowResult;

use super::{describe_failures, CliReport};

/// Build the report for a finished workflow run
///
/// Captures come from the last step of the last test, in run order.
pub fn interpret(result: WorkflowResult) -> CliReport {
    let WorkflowResult { passed, tests } = result;
    let mut report = CliReport {
        passed,
        ..Default::default()
    };

    if !passed {
        report.messages = describe_failures(&tests);
        report.tests = tests;
        return report;
    }

    let last_step = match tests.last() {
        None => {
            report
                .messages
                .push("✅ Workflow passed, but no tests were executed.".to_string());
            return report;
        }
        Some(test) => test.steps.last(),
    };

    match last_step {
        None => {
            tracing::warn!("Engine reported success but the last test has no steps");
            report.passed = false;
            report
                .errors
                .push(ReportError::from(&Error::NoStepsInLastTest));
        }
        Some(step) => match step.captures.as_ref().filter(|c| !c.is_empty()) {
            Some(captures) => {
                report.messages.push(format!(
                    "✅ Workflow passed. Captured {} value(s) from the last step.",
                    captures.len()
                ));
                report.captures = captures.clone();
            }
            None => report.messages.push(
                "✅ Workflow passed. No captures found in the last step of the last test."
                    .to_string(),
            ),
        },
    }

    report.tests = tests;
    report
}
