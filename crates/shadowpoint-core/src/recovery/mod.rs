//! Crash-safe checkpoint transactions
//!
//! Before a checkpoint touches the shadow repository, the files the
//! repository reports as modified are copied aside and a lock file is
//! written:
//!
//! ```text
//! <storage-root>/
//!   .checkpoint-lock            # {"taskId", "timestamp", "state": "started"}
//!   .checkpoint-backup/
//!     files/<relative path>     # copies of modified files
//!     status.json               # the modified-file list
//! ```
//!
//! A lock file still present when the next transaction begins means the
//! previous one never finished; its backup is restored first.

mod guard;
mod types;


pub use guard::TransactionGuard;
pub use types::{TransactionLock, TransactionState};

use crate::error::CheckpointResult;
use crate::git::GitOperations;
use async_trait::async_trait;

/// File name of the transaction lock under the storage root
pub const LOCK_FILE_NAME: &str = ".checkpoint-lock";

/// Directory name of the transaction backup under the storage root
pub const BACKUP_DIR_NAME: &str = ".checkpoint-backup";

/// Reports which workspace files currently differ from the last snapshot
#[async_trait]
pub trait ChangeReporter: Send + Sync {
    /// Workspace-relative, `/`-separated paths
    async fn modified_files(&self) -> CheckpointResult<Vec<String>>;
}

#[async_trait]
impl ChangeReporter for GitOperations {
    async fn modified_files(&self) -> CheckpointResult<Vec<String>> {
        Ok(self
            .status_entries()
            .await?
            .into_iter()
            .map(|entry| entry.path)
            .collect())
    }
}
