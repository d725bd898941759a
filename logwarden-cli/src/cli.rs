//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Logwarden -- logcheck-style log filter engine.
///
/// Use `logwarden <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logwarden", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logwarden.toml configuration file.
    #[arg(short, long, default_value = "logwarden.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and validate filter rules.
    Rules(RulesArgs),

    /// Filter log lines from stdin to stdout.
    Filter(FilterArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- rules ----

/// Inspect and validate filter rules.
#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub action: RulesAction,
}

#[derive(Subcommand, Debug)]
pub enum RulesAction {
    /// List rule sets loaded from the configured sources.
    List,
    /// Load a rule file or directory and report what it yields.
    Validate {
        /// Rule file or directory to load.
        path: PathBuf,

        /// Explicit rule kind (ignore, cracking, violations); overrides
        /// path-based autodetection.
        #[arg(long)]
        kind: Option<String>,

        /// Descend into subdirectories.
        #[arg(short, long)]
        recursive: bool,
    },
}

// ---- filter ----

/// Filter log lines from stdin to stdout.
///
/// Ignored lines are dropped, alert and pass lines are forwarded.
/// With `--output json`, each forwarded line becomes a JSON object
/// carrying the decision and matched-rule metadata.
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Print engine statistics after the input is exhausted.
    #[arg(long)]
    pub stats: bool,
}

// ---- config ----

/// Manage configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Restrict output to one section (general, filter).
        #[arg(long)]
        section: Option<String>,
    },
}
