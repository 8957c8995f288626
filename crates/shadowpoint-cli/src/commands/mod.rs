//! Command implementations

pub mod checkpoint;
pub mod maintenance;

use crate::args::Cli;
use shadowpoint_core::config;
use shadowpoint_core::interfaces::{StaticStorageRoot, StaticWorkspaceResolver};
use shadowpoint_core::{CheckpointEngine, CheckpointResult};
use std::sync::Arc;

/// Build the engine from global CLI flags, config file and environment
pub fn open_engine(cli: &Cli) -> CheckpointResult<CheckpointEngine> {
    let config = config::load(cli.config.as_deref())?;

    let storage = match &cli.storage {
        Some(root) => StaticStorageRoot::new(root),
        None => StaticStorageRoot::default_location()?,
    };
    let workspace = match &cli.workspace {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };

    CheckpointEngine::new(
        config,
        Arc::new(storage),
        Arc::new(StaticWorkspaceResolver::new(workspace)),
    )
}
