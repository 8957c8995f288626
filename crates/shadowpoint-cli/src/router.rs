//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands::{self, checkpoint, maintenance};
use crate::console::CliConsole;
use shadowpoint_core::CheckpointResult;
use tracing::debug;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> CheckpointResult<()> {
    let console = CliConsole::new(cli.verbose);
    let engine = commands::open_engine(&cli)?;
    debug!(
        "Storage root {} for task {}",
        engine.storage_root().display(),
        cli.task
    );
    let task = cli.task.as_str();
    let json = cli.json;

    match &cli.command {
        Commands::Save { message } => {
            checkpoint::save(&engine, task, message, &console, json).await
        }
        Commands::Diff { from, to, full } => {
            checkpoint::diff(&engine, task, from, to.as_deref(), *full, &console, json).await
        }
        Commands::Restore { hash } => checkpoint::restore(&engine, task, hash, &console, json).await,
        Commands::History => checkpoint::history(&engine, task, &console, json).await,
        Commands::Cleanup => checkpoint::cleanup(&engine, task, &console).await,
        Commands::Migrate => maintenance::migrate(&engine, &console, json).await,
        Commands::PruneBranches { keep } => {
            maintenance::prune_branches(&engine, task, keep, &console, json).await
        }
    }
}
