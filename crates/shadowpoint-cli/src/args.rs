//! CLI argument definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use shadowpoint_core::config::LogFormat;
use std::path::PathBuf;

/// Task id used when `--task` is not given
pub const DEFAULT_TASK: &str = "default";

#[derive(Parser, Debug)]
#[command(name = "shadowpoint")]
#[command(about = "Workspace checkpoints kept in a hidden shadow git repository")]
#[command(version)]
pub struct Cli {
    /// Workspace to snapshot (defaults to the current directory)
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<PathBuf>,

    /// Directory holding shadow repositories and transaction state
    #[arg(long, global = true, env = "SHADOWPOINT_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Configuration file (JSON or TOML)
    #[arg(long, global = true, env = "SHADOWPOINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Task whose branch the command operates on
    #[arg(long, short = 't', global = true, env = "SHADOWPOINT_TASK", default_value = DEFAULT_TASK)]
    pub task: String,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Snapshot the workspace
    Save {
        /// Checkpoint message
        message: String,
    },

    /// Show files changed between two checkpoints, or since one
    Diff {
        /// Older checkpoint
        from: String,
        /// Newer checkpoint (omit to compare against the work tree)
        to: Option<String>,
        /// Print file contents, not just the summary
        #[arg(long)]
        full: bool,
    },

    /// Move the workspace back to a checkpoint
    Restore {
        /// Checkpoint to restore
        hash: String,
    },

    /// List the task's checkpoints, newest first
    History,

    /// Delete the task's branch
    Cleanup,

    /// Migrate legacy storage layouts
    Migrate,

    /// Delete task branches not in the keep list
    PruneBranches {
        /// Tasks whose branches survive
        #[arg(long = "keep", value_delimiter = ',')]
        keep: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
