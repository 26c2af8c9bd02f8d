//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};

/// Engine executable looked up on PATH when nothing is configured
pub const DEFAULT_ENGINE: &str = "stepci-runner";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Workflow engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Configuration for the external workflow engine
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Engine executable, either a path or a name resolved through PATH
    #[serde(default = "default_engine_command")]
    pub command: PathBuf,

    /// Additional arguments to pass to the engine
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_engine_command(),
            args: Vec::new(),
        }
    }
}

fn default_engine_command() -> PathBuf {
    PathBuf::from(DEFAULT_ENGINE)
}

/// Output settings
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// Use the human-readable report by default
    #[serde(default)]
    pub human_readable: bool,
}

/// A resolved engine executable
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    pub path: PathBuf,
    pub args: Vec<String>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }
}

impl EngineConfig {
    /// Resolve the engine executable
    ///
    /// Paths with a directory component are used as given; bare names are
    /// searched on PATH.
    pub fn resolve(&self) -> Result<EngineCommand> {
        let command = &self.command;
        let path = if command.components().count() > 1 {
            if !command.exists() {
                return Err(Error::engine_not_found(
                    &command.display().to_string(),
                    &["config file"],
                ));
            }
            command.clone()
        } else {
            which::which(command).map_err(|_| {
                Error::engine_not_found(&command.display().to_string(), &["config file", "PATH"])
            })?
        };

        Ok(EngineCommand {
            path,
            args: self.args.clone(),
        })
    }
}
