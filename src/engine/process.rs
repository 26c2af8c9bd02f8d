//! Subprocess workflow engine
//!
//! Spawns the configured engine executable for each run, writes the request
//! to its stdin and waits for the full response on stdout.

use std::io;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::common::config::EngineConfig;
use crate::common::{Error, Result};

use super::protocol::{self, EngineRequest};
use super::types::{WorkflowOptions, WorkflowResult};
use super::WorkflowRunner;

/// Workflow runner backed by an external engine process
pub struct ProcessRunner {
    config: EngineConfig,
}

impl ProcessRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the engine once with the given request
    async fn exchange(&self, request: &EngineRequest) -> Result<WorkflowResult> {
        let engine = self.config.resolve()?;

        tracing::debug!("Starting engine {}", engine.path.display());

        let mut cmd = Command::new(&engine.path);
        cmd.args(&engine.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            Error::EngineStartFailed(format!(
                "Failed to start {}: {}",
                engine.path.display(),
                e
            ))
        })?;

        let json = serde_json::to_string(request)?;
        tracing::debug!("Engine request: {}", json);

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::EngineStartFailed("Failed to get engine stdin".to_string()))?;
        let write = async move {
            stdin.write_all(json.as_bytes()).await?;
            stdin.shutdown().await
        };

        // Collect output while writing so an engine that exits early still reports
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;
        match written {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Engine closed stdin before reading the request: {}", e);
            }
            Err(e) => return Err(e.into()),
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::debug!("Engine exited with {:?}", output.status.code());
        if !stderr.trim().is_empty() {
            tracing::debug!("Engine stderr: {}", stderr.trim());
        }

        match protocol::parse_response(&stdout) {
            Ok(result) => Ok(result),
            // The engine's own error report wins over its exit status
            Err(e @ Error::Engine { .. }) => Err(e),
            Err(e) if output.status.success() => Err(e),
            Err(_) => Err(Error::EngineExited {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            }),
        }
    }
}

#[async_trait]
impl WorkflowRunner for ProcessRunner {
    async fn run_from_file(&self, path: &Path, options: &WorkflowOptions) -> Result<WorkflowResult> {
        self.exchange(&EngineRequest::File {
            path: path.to_path_buf(),
            options: options.clone(),
        })
        .await
    }

    async fn run_from_yaml(&self, source: &str, options: &WorkflowOptions) -> Result<WorkflowResult> {
        self.exchange(&EngineRequest::Yaml {
            source: source.to_string(),
            options: options.clone(),
        })
        .await
    }
}
