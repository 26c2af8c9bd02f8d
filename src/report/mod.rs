//! Run reports
//!
//! A [`CliReport`] is built once per invocation from the engine result (or
//! from the error that prevented one) and then rendered as JSON or text.

mod failures;
mod interpret;
pub mod render;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::{Error, ReportError};
use crate::engine::TestResult;

pub use failures::describe_failures;
pub use interpret::interpret;

/// Report envelope printed by the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliReport {
    pub passed: bool,
    #[serde(default)]
    pub messages: Vec<String>,
    #[serde(default)]
    pub captures: Map<String, Value>,
    #[serde(default)]
    pub tests: Vec<TestResult>,
    #[serde(default)]
    pub errors: Vec<ReportError>,
}

/// Aggregate pass/fail counts over a report's tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub steps_passed: usize,
    pub steps_failed: usize,
}

impl CliReport {
    /// A failed report carrying a single error
    pub fn from_error(e: &Error) -> Self {
        Self {
            passed: false,
            errors: vec![ReportError::from(e)],
            ..Default::default()
        }
    }

    /// Process exit code for this report
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }

    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        for test in &self.tests {
            if test.passed {
                stats.tests_passed += 1;
            } else {
                stats.tests_failed += 1;
            }
            for step in &test.steps {
                if step.passed {
                    stats.steps_passed += 1;
                } else {
                    stats.steps_failed += 1;
                }
            }
        }
        stats
    }
}
