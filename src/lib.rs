//! Shadowpoint: workspace checkpoints for coding agents
//!
//! Every step of an automated task can be snapshotted into a hidden shadow
//! git repository, diffed against any other step and rolled back, without
//! touching the user's own repository.
//!
//! This crate re-exports the engine from `shadowpoint-core` and adds
//! [`open`] for the common single-workspace setup.

pub use shadowpoint_core::*;

use std::path::Path;
use std::sync::Arc;

/// Build an engine for one workspace with storage under `storage_root`
///
/// Fails when `config` is invalid. Protected workspace roots are rejected
/// when a service is requested.
pub fn open(
    workspace: impl AsRef<Path>,
    storage_root: impl AsRef<Path>,
    config: CheckpointConfig,
) -> CheckpointResult<CheckpointEngine> {
    tracing::debug!(
        "Opening checkpoint engine for {} with storage at {}",
        workspace.as_ref().display(),
        storage_root.as_ref().display()
    );
    CheckpointEngine::new(
        config,
        Arc::new(StaticStorageRoot::new(storage_root.as_ref())),
        Arc::new(StaticWorkspaceResolver::new(workspace)),
    )
}
