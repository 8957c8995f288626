//! Shadow repository driver
//!
//! [`GitOperations`] owns every interaction with the `git` binary for one
//! shadow repository. The repository's git directory lives under the
//! engine's storage root while its work tree is the user's workspace, so
//! snapshots never appear in the user's own history.
//!
//! ```text
//! <storage-root>/shadow-git/<hashed-workspace-path>/.git/
//! ```
//!
//! Callers must serialize mutating calls per shadow repository; git itself
//! is not safe under concurrent mutation.

mod branch;
mod commit;
mod diff;
mod executor;
mod history;
mod init;
mod nested;
mod stash;
mod types;


pub use types::{ChangedFile, CommitInfo, FileStatus, RestoreMarker, StageResult, StatusEntry};

pub(crate) use diff::decode_text;

use crate::config::CheckpointConfig;
use crate::paths;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory under the storage root holding every shadow repository
pub const SHADOW_GIT_DIR: &str = "shadow-git";

/// Prefix of every task branch
pub const TASK_BRANCH_PREFIX: &str = "task-";

/// Branch name for a task
pub fn task_branch_name(task_id: &str) -> String {
    format!("{}{}", TASK_BRANCH_PREFIX, task_id)
}

/// Task id encoded in a task branch name
pub fn task_id_from_branch(branch: &str) -> Option<&str> {
    branch
        .strip_prefix(TASK_BRANCH_PREFIX)
        .filter(|id| !id.is_empty())
}

/// Driver for one shadow repository
#[derive(Debug, Clone)]
pub struct GitOperations {
    workspace: PathBuf,
    shadow_dir: PathBuf,
    git_dir: PathBuf,
    workspace_hash: String,
    config: Arc<CheckpointConfig>,
}

impl GitOperations {
    /// Driver for `workspace`'s shadow repository under `storage_root`
    pub fn new(workspace: &Path, storage_root: &Path, config: Arc<CheckpointConfig>) -> Self {
        let workspace = paths::absolute_path(workspace);
        let workspace_hash = paths::hash_workspace_path(&workspace);
        let shadow_dir = Self::shadow_dir_for(storage_root, &workspace_hash);
        let git_dir = shadow_dir.join(".git");
        Self {
            workspace,
            shadow_dir,
            git_dir,
            workspace_hash,
            config,
        }
    }

    /// Location of the shadow repository for a hashed workspace path
    pub fn shadow_dir_for(storage_root: &Path, workspace_hash: &str) -> PathBuf {
        storage_root.join(SHADOW_GIT_DIR).join(workspace_hash)
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn shadow_dir(&self) -> &Path {
        &self.shadow_dir
    }

    pub fn workspace_hash(&self) -> &str {
        &self.workspace_hash
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    /// Whether the shadow repository has been created
    pub fn exists(&self) -> bool {
        self.git_dir.join("HEAD").is_file()
    }
}
