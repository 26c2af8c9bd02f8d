//! Engine wire protocol
//!
//! The engine reads a single JSON request from stdin and writes a single
//! JSON document to stdout:
//! ```text
//! >>> {"kind":"yaml","source":"version: \"1.1\"...","options":{"secrets":{},"env":{}}}
//! <<< {"passed":false,"tests":[...]}
//! ```
//! The response may also be wrapped as `{"result": {...}}`, or report an
//! engine-side exception as `{"error": {"message": ..., "stack": ...}}`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::{Error, Result};

use super::types::{WorkflowOptions, WorkflowResult};

/// Request written to the engine's stdin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineRequest {
    /// Run a workflow file
    File {
        path: PathBuf,
        options: WorkflowOptions,
    },
    /// Run inline workflow text
    Yaml {
        source: String,
        options: WorkflowOptions,
    },
}

/// Exception reported by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineFailure {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
}

/// Any document the engine may answer with
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EngineResponse {
    Failed { error: EngineFailure },
    Wrapped { result: WorkflowResult },
    Bare(WorkflowResult),
}

impl EngineResponse {
    /// Turn the response into a workflow result or an engine error
    pub fn into_result(self) -> Result<WorkflowResult> {
        match self {
            EngineResponse::Failed { error } => Err(Error::Engine {
                message: error.message,
                stack: error.stack,
            }),
            EngineResponse::Wrapped { result } | EngineResponse::Bare(result) => Ok(result),
        }
    }
}

/// Parse the engine's stdout
pub fn parse_response(stdout: &str) -> Result<WorkflowResult> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err(Error::EngineProtocol(
            "engine produced no output".to_string(),
        ));
    }

    let response: EngineResponse = serde_json::from_str(trimmed)
        .map_err(|e| Error::EngineProtocol(format!("invalid engine response: {}", e)))?;
    response.into_result()
}
