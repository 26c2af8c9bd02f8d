//! CLI command handling
//!
//! Runs one invocation end to end: resolve options, hand the workflow to the
//! runner, build the report and print it.

pub mod input;

use std::path::PathBuf;

use tokio::io::AsyncRead;

use crate::commands::Cli;
use crate::common::config::Config;
use crate::common::{Result, StringMap};
use crate::engine::{ProcessRunner, WorkflowOptions, WorkflowRunner};
use crate::report::{self, render, CliReport};

use input::WorkflowSource;

/// Resolved options for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    pub path: Option<PathBuf>,
    pub secrets: StringMap,
    pub env: StringMap,
    pub human_readable: bool,
}

impl RunOptions {
    /// The subset of options the engine receives
    pub fn workflow_options(&self) -> WorkflowOptions {
        WorkflowOptions {
            secrets: self.secrets.clone(),
            env: self.env.clone(),
        }
    }
}

/// Resolve command-line options
///
/// Errors here are fatal: they abort the process before the engine runs.
pub fn prepare(cli: &Cli, config: &Config) -> Result<RunOptions> {
    Ok(RunOptions {
        path: cli.path.clone(),
        secrets: input::merge_option_maps("secret", &cli.secrets)?,
        env: input::merge_option_maps("env", &cli.env)?,
        human_readable: cli.human_readable || config.output.human_readable,
    })
}

/// Run the workflow and build its report
///
/// Every failure from this point on ends up in the report.
pub async fn execute<R, S>(
    runner: &R,
    options: &RunOptions,
    inline: Option<&str>,
    stdin: S,
) -> CliReport
where
    R: WorkflowRunner + ?Sized,
    S: AsyncRead + Unpin,
{
    let source = match input::resolve_source(options.path.as_deref(), inline, stdin).await {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!("{}", e);
            return CliReport::from_error(&e);
        }
    };

    let workflow_options = options.workflow_options();
    let result = match &source {
        WorkflowSource::File(path) => runner.run_from_file(path, &workflow_options).await,
        WorkflowSource::Inline(text) => runner.run_from_yaml(text, &workflow_options).await,
    };

    match result {
        Ok(result) => {
            tracing::debug!(
                "Engine finished: passed={} tests={}",
                result.passed,
                result.tests.len()
            );
            report::interpret(result)
        }
        Err(e) => {
            tracing::error!("Error running workflow: {}", e);
            CliReport::from_error(&e)
        }
    }
}

/// Run one CLI invocation and return the process exit code
pub async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load()?;
    let options = prepare(&cli, &config)?;
    let runner = ProcessRunner::new(config.engine.clone());

    let report = execute(&runner, &options, cli.yaml.as_deref(), tokio::io::stdin()).await;

    if options.human_readable {
        println!("{}", render::human(&report));
    } else {
        println!("{}", render::json(&report)?);
    }

    Ok(report.exit_code())
}
