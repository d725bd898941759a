//! Logwarden CLI entry point.
//!
//! Parses arguments, initializes logging, and dispatches to the
//! subcommand handlers in [`commands`].

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;

use cli::{Cli, Commands};
use error::CliError;
use output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Logging must come up before the config file is read, so the level
    // comes from the CLI flag (or default) and the format from the
    // environment override if present.
    let log_level = cli.log_level.as_deref().unwrap_or("info");
    let log_format =
        std::env::var("LOGWARDEN_GENERAL_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_owned());
    logging::init_tracing(log_level, &log_format).map_err(|e| CliError::Command(e.to_string()))?;

    tracing::debug!(config = %cli.config.display(), "logwarden-cli starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Rules(args) => commands::rules::execute(args, &cli.config, &writer).await,
        Commands::Filter(args) => {
            commands::filter::execute(args, &cli.config, cli.output, &writer).await
        }
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}
