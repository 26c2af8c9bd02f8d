//! Platform configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/stepci-cli/` (honours `XDG_CONFIG_HOME`)
//! - macOS: `~/Library/Application Support/stepci-cli/`
//! - Windows: `%APPDATA%\stepci-cli\`

use std::path::PathBuf;

/// Application name used for configuration directories
const APP_NAME: &str = "stepci-cli";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV: &str = "STEPCI_CLI_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `STEPCI_CLI_CONFIG` takes precedence over the platform location.
pub fn config_path() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => config_dir().map(|dir| dir.join("config.toml")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_is_valid() {
        let dir = config_dir();
        assert!(dir.is_some());
    }

    #[test]
    fn test_config_path_is_set() {
        assert!(config_path().is_some());
    }
}
