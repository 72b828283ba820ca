//! CLI parse: clap types for snapshots. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Content-addressed snapshots of filesystem trees
#[derive(Parser)]
#[command(name = "snapshots")]
#[command(about = "Content-addressed Merkle snapshots of filesystem trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot a tree and print its root digest
    Scan {
        /// Root to snapshot (default: workspace root)
        path: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Print every node with its digest
        #[arg(long)]
        tree: bool,
        /// Drop directories without children from the snapshot
        #[arg(long, conflicts_with = "include_empty")]
        exclude_empty: bool,
        /// Keep directories without children (overrides config)
        #[arg(long)]
        include_empty: bool,
        /// Walk in filesystem order and sort children while folding
        #[arg(long)]
        unsorted_walk: bool,
    },
    /// Compare a tree against the execution history of an identity
    Check {
        /// Root to snapshot (default: workspace root)
        path: Option<PathBuf>,
        /// Identity whose history is consulted
        #[arg(long)]
        identity: String,
        /// Record the current snapshot as a successful run
        #[arg(long)]
        record: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Inspect or clear execution history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Manage configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Show the last recorded execution for an identity
    Show {
        #[arg(long)]
        identity: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Forget the execution history of an identity
    Clear {
        #[arg(long)]
        identity: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the default configuration to the global config file (or --config path)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration as TOML
    Show,
}
