//! Workflow engine boundary
//!
//! The CLI never executes workflows itself. It hands the workflow to a
//! [`WorkflowRunner`] and interprets the structured result. The production
//! runner is [`ProcessRunner`], which talks to an external engine executable
//! over the protocol in [`protocol`].

pub mod process;
pub mod protocol;
pub mod types;

use std::path::Path;

use async_trait::async_trait;

use crate::common::Result;

pub use process::ProcessRunner;
pub use types::{
    failed_checks, CheckDetail, CheckNode, Checks, FailedCheck, ResponseBody, StepRequest,
    StepResponse, StepResult, TestResult, WorkflowOptions, WorkflowResult,
};

/// Executes workflows on behalf of the CLI
#[async_trait]
pub trait WorkflowRunner: Send + Sync {
    /// Run the workflow stored at `path`
    async fn run_from_file(&self, path: &Path, options: &WorkflowOptions) -> Result<WorkflowResult>;

    /// Run a workflow given as YAML text
    async fn run_from_yaml(&self, source: &str, options: &WorkflowOptions) -> Result<WorkflowResult>;
}
