//! Shadowpoint CLI
//!
//! Snapshot, diff and restore a workspace from the command line.
//!
//! ```bash
//! shadowpoint --task fix-123 save "before refactor"
//! shadowpoint --task fix-123 history
//! shadowpoint --task fix-123 diff <hash>            # against the work tree
//! shadowpoint --task fix-123 diff <hash1> <hash2>
//! shadowpoint --task fix-123 restore <hash>
//! ```

mod args;
mod commands;
mod console;
mod router;

use anyhow::Context;
use args::Cli;
use clap::Parser;
use shadowpoint_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli) {
    let mut logging = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };
    logging.format = cli.log_format.into();

    // RUST_LOG wins over the flag-derived default
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directive()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    router::route(cli)
        .await
        .context("shadowpoint command failed")
}
