//! Command implementations

mod analyze;
mod config;
mod fetch;
mod sample;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Fetch(args) => fetch::execute(args, &output, config_file).await,
        Commands::Analyze(args) => analyze::execute(args, &output, config_file),
        Commands::Sample(args) => sample::execute(args, &output, config_file).await,
        Commands::Config => config::execute(&output, config_file),
    }
}
