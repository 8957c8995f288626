//! Storage root and workspace root providers

use crate::error::{CheckpointError, CheckpointResult};
use crate::paths;
use std::path::{Path, PathBuf};

/// Directory the engine may populate with shadow repositories and
/// transaction state
pub trait StorageRootProvider: Send + Sync {
    fn storage_root(&self) -> PathBuf;
}

/// Source of the active workspace root
pub trait WorkspaceRootResolver: Send + Sync {
    /// The workspace to snapshot
    ///
    /// Fails when no workspace is open or the root is a protected
    /// directory (home, desktop, documents, downloads).
    fn workspace_root(&self) -> CheckpointResult<PathBuf>;
}

/// Fixed storage root
#[derive(Debug, Clone)]
pub struct StaticStorageRoot {
    root: PathBuf,
}

impl StaticStorageRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<local data dir>/shadowpoint`
    pub fn default_location() -> CheckpointResult<Self> {
        dirs::data_local_dir()
            .map(|dir| Self::new(dir.join("shadowpoint")))
            .ok_or_else(|| CheckpointError::config("Could not determine a local data directory"))
    }
}

impl StorageRootProvider for StaticStorageRoot {
    fn storage_root(&self) -> PathBuf {
        self.root.clone()
    }
}

/// Resolver for a workspace known up front
#[derive(Debug, Clone, Default)]
pub struct StaticWorkspaceResolver {
    root: Option<PathBuf>,
}

impl StaticWorkspaceResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(paths::absolute_path(root.as_ref())),
        }
    }

    /// A resolver with no open workspace
    pub fn none() -> Self {
        Self::default()
    }
}

impl WorkspaceRootResolver for StaticWorkspaceResolver {
    fn workspace_root(&self) -> CheckpointResult<PathBuf> {
        let root = self.root.clone().ok_or_else(|| {
            CheckpointError::invalid_input_field("No workspace folder is open", "workspace")
        })?;
        if paths::is_protected_directory(&root) {
            return Err(CheckpointError::protected_directory(
                root.display().to_string(),
            ));
        }
        Ok(root)
    }
}
