//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Level;
use std::path::PathBuf;

/// faultline - ship errors and messages to an ingestion endpoint
#[derive(Parser, Debug)]
#[command(
    name = "faultline",
    author,
    version,
    about = "Error and message reporting client",
    long_about = "Reports errors and messages to a remote ingestion endpoint.\n\n\
                  Records are queued, delivered by a background worker, and the \n\
                  command waits for delivery before exiting."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FAULTLINE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FAULTLINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report one message (or error) and wait for delivery
    Send(SendArgs),

    /// Validate configuration file without sending anything
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "FAULTLINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the access token
    #[arg(long, env = "FAULTLINE_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Override the ingestion endpoint
    #[arg(long, env = "FAULTLINE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override the environment name
    #[arg(long, env = "FAULTLINE_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Severity level
    #[arg(short, long, default_value = "info")]
    pub level: Level,

    /// Message text (used as the error message with --error)
    #[arg(short, long)]
    pub message: String,

    /// Report as an error occurrence instead of a plain message
    #[arg(long)]
    pub error: bool,

    /// Extra custom field as key=value (repeatable)
    #[arg(short = 'x', long = "extra", value_name = "KEY=VALUE")]
    pub extras: Vec<String>,

    /// Log the payload instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Give up waiting for delivery after this many seconds (0 = wait forever)
    #[arg(long, default_value = "30", env = "FAULTLINE_WAIT_TIMEOUT")]
    pub wait_timeout: u64,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "faultline.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "faultline.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
