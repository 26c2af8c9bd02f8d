//! Common utilities shared across the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, ReportError, Result};

/// Flat string map used for secrets and environment variables
pub type StringMap = std::collections::BTreeMap<String, String>;
