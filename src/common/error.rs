//! Error types for the workflow CLI
//!
//! Errors fall into two tiers. Pre-flight errors (bad secrets/env input,
//! broken configuration) abort the process before the engine runs. Everything
//! that happens once a workflow is being executed is folded into the report
//! as a [`ReportError`] instead.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the workflow CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    #[error("No input provided via file, argument, or stdin. Use --help for options")]
    InputMissing,

    #[error("Invalid --{flag} value '{value}': not a JSON object ({literal}) and not a readable JSON file ({file})")]
    InvalidOptionMap {
        flag: &'static str,
        value: String,
        literal: String,
        file: String,
    },

    #[error("Failed to read standard input: {0}")]
    StdinRead(#[source] io::Error),

    // === Engine Errors ===
    #[error("Workflow engine '{name}' not found. Searched: {searched}")]
    EngineNotFound { name: String, searched: String },

    #[error("Workflow engine failed to start: {0}")]
    EngineStartFailed(String),

    #[error("Workflow engine exited with {}: {stderr}", exit_label(.code))]
    EngineExited { code: Option<i32>, stderr: String },

    #[error("Workflow engine protocol error: {0}")]
    EngineProtocol(String),

    #[error("{message}")]
    Engine {
        message: String,
        stack: Option<String>,
    },

    // === Result Errors ===
    #[error("No steps found in the last test")]
    NoStepsInLastTest,

    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Create an engine not found error with search locations
    pub fn engine_not_found<S: AsRef<str>>(name: &str, searched: &[S]) -> Self {
        Self::EngineNotFound {
            name: name.to_string(),
            searched: searched
                .iter()
                .map(|s| s.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Create an option map error from both resolution attempts
    pub fn invalid_option_map(flag: &'static str, value: &str, literal: &str, file: &str) -> Self {
        Self::InvalidOptionMap {
            flag,
            value: value.to_string(),
            literal: literal.to_string(),
            file: file.to_string(),
        }
    }

    /// Whether this error must abort the process instead of being reported
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::InvalidOptionMap { .. } | Error::ConfigParse(_) | Error::FileRead { .. }
        )
    }

    /// Render the error and its source chain as a stack-like trace
    pub fn trace(&self) -> String {
        let mut trace = format!("Error: {}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            trace.push_str(&format!("\n    caused by: {}", cause));
            source = cause.source();
        }
        trace
    }
}

/// Serializable error entry carried in the report
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReportError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ReportError {
    /// An error entry without a stack
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    /// An error entry for an unexpected failure, keeping its trace
    pub fn with_trace(e: &Error) -> Self {
        let stack = match e {
            Error::Engine { stack, .. } => stack.clone().or_else(|| Some(e.trace())),
            other => Some(other.trace()),
        };
        Self {
            message: e.to_string(),
            stack,
        }
    }
}

impl From<&Error> for ReportError {
    fn from(e: &Error) -> Self {
        match e {
            Error::InputMissing | Error::NoStepsInLastTest => Self::message(e.to_string()),
            other => Self::with_trace(other),
        }
    }
}
