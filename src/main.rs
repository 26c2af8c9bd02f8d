//! stepci-cli - Run API test workflows from the command line
//!
//! Reads a YAML workflow from a file, an argument or stdin, runs it through
//! the workflow engine and prints the outcome as JSON or as a text report.

use clap::Parser;
use stepci_cli::commands::Cli;
use stepci_cli::{cli, common::logging};

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    logging::init_cli(args.verbose);

    match cli::run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
