//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// zello - Zello channel bot client
#[derive(Debug, Parser)]
#[command(name = "zello")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "ZELLO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log one JSON object per line
    #[arg(long)]
    pub json_logs: bool,

    /// Override the server URL from the configuration
    #[arg(long, env = "ZELLO_SERVER")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Log on and send a text message
    Say {
        /// Message text
        text: String,

        /// Index of the `[[accounts]]` entry to use
        #[arg(long, short, default_value = "0")]
        account: usize,

        /// Send to this user only instead of the whole channel
        #[arg(long)]
        to: Option<String>,
    },

    /// Log on and report channel activity
    Listen {
        /// Stop after this many seconds (runs until the connection drops if
        /// not set)
        #[arg(long)]
        seconds: Option<u64>,

        /// Index of the `[[accounts]]` entry to use
        #[arg(long, short, default_value = "0")]
        account: usize,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
