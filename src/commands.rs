//! CLI argument definitions
//!
//! `-h` selects the human-readable report, so help is only available as
//! `--help`.

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stepci-cli", about = "Run API test workflows and report the outcome")]
#[command(version, long_about = None, disable_help_flag = true)]
pub struct Cli {
    /// Path to the workflow file
    #[arg(long, short = 'p', value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Secrets as a JSON object or a path to a JSON file
    /// Can be specified multiple times; later keys win
    #[arg(long = "secret", short = 's', value_name = "JSON_OR_PATH")]
    pub secrets: Vec<String>,

    /// Environment variables as a JSON object or a path to a JSON file
    /// Can be specified multiple times; later keys win
    #[arg(long = "env", short = 'e', value_name = "JSON_OR_PATH")]
    pub env: Vec<String>,

    /// Print a human-readable report instead of JSON
    #[arg(long, short = 'h')]
    pub human_readable: bool,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = clap::ArgAction::Help)]
    pub help: Option<bool>,

    /// Raw YAML workflow, used when --path is not given
    #[arg(value_name = "YAML")]
    pub yaml: Option<String>,
}
