//! stepci-cli - Command-line front-end for API test workflows
//!
//! This library resolves workflow input and options, delegates execution to
//! an external workflow engine, and turns the engine's result into a JSON or
//! human-readable report.

pub mod cli;
pub mod commands;
pub mod common;
pub mod engine;
pub mod report;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use engine::{WorkflowResult, WorkflowRunner};
pub use report::CliReport;
