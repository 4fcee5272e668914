//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::Side;
use std::path::PathBuf;

/// Doorway Counter - bidirectional occupancy counting from two distance sensors
#[derive(Parser, Debug)]
#[command(
    name = "doorway-counter",
    author,
    version,
    about = "Bidirectional doorway occupancy counter",
    long_about = "Counts room occupancy from two distance sensors flanking a doorway.\n\n\
                  Calibrates per-side baselines, detects threshold crossings, confirms \n\
                  direction against the opposite sensor, and dispatches occupancy \n\
                  updates to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "DOORWAY_COUNTER_VERBOSE")]
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
        env = "DOORWAY_COUNTER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the occupancy counting loop
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "doorway.toml",
        env = "DOORWAY_COUNTER_CONFIG"
    )]
    pub config: PathBuf,

    /// Override the entry-origin side from configuration
    #[arg(long, value_enum, env = "DOORWAY_COUNTER_ENTRY_ORIGIN")]
    pub entry_origin: Option<EntryOrigin>,

    /// Maximum number of confirmed crossings to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "DOORWAY_COUNTER_MAX_CROSSINGS")]
    pub max_crossings: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "DOORWAY_COUNTER_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for the dispatcher queue
    #[arg(long, default_value = "100", env = "DOORWAY_COUNTER_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "DOORWAY_COUNTER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "doorway.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "doorway.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed sensor information
    #[arg(long)]
    pub sensors: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
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

/// Entry-origin side override
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EntryOrigin {
    Left,
    Right,
}

impl From<EntryOrigin> for Side {
    fn from(origin: EntryOrigin) -> Self {
        match origin {
            EntryOrigin::Left => Side::Left,
            EntryOrigin::Right => Side::Right,
        }
    }
}
