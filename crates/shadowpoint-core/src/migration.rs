//! One-time cleanup of legacy on-disk layouts
//!
//! Older releases kept one repository per workspace under
//! `<storage-root>/checkpoints/<hash>/` and a per-task history tree under
//! `<storage-root>/tasks/`. Migration moves the repositories into
//! `shadow-git/` and drops the task history. Every step is best-effort:
//! failures go to the [`LogSink`] and never abort the caller.

use crate::error::CheckpointResult;
use crate::git::{task_id_from_branch, GitOperations, SHADOW_GIT_DIR};
use crate::interfaces::LogSink;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Legacy per-workspace repository directory
pub const LEGACY_CHECKPOINTS_DIR: &str = "checkpoints";

/// Legacy per-task history directory
pub const LEGACY_TASK_HISTORY_DIR: &str = "tasks";

/// Counts produced by a migration run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub task_history_removed: bool,
    pub repositories_migrated: usize,
    pub repositories_failed: usize,
}

/// Best-effort migrations under one storage root
pub struct MigrationRunner {
    storage_root: PathBuf,
    log: Arc<dyn LogSink>,
}

impl MigrationRunner {
    pub fn new(storage_root: impl Into<PathBuf>, log: Arc<dyn LogSink>) -> Self {
        Self {
            storage_root: storage_root.into(),
            log,
        }
    }

    pub fn legacy_task_history_dir(&self) -> PathBuf {
        self.storage_root.join(LEGACY_TASK_HISTORY_DIR)
    }

    pub fn legacy_checkpoints_dir(&self) -> PathBuf {
        self.storage_root.join(LEGACY_CHECKPOINTS_DIR)
    }

    /// Run both layout migrations
    pub async fn run(&self) -> MigrationReport {
        let task_history_removed = self.remove_legacy_task_history().await;
        let (repositories_migrated, repositories_failed) =
            self.migrate_legacy_checkpoints().await;
        MigrationReport {
            task_history_removed,
            repositories_migrated,
            repositories_failed,
        }
    }

    /// Delete the legacy task history tree; `true` if it was removed
    pub async fn remove_legacy_task_history(&self) -> bool {
        let dir = self.legacy_task_history_dir();
        if !fs::try_exists(&dir).await.unwrap_or(false) {
            return false;
        }
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("Removed legacy task history at {}", dir.display());
                self.log
                    .append_line(&format!("Removed legacy task history {}", dir.display()));
                true
            }
            Err(e) => {
                self.log.append_line(&format!(
                    "Failed to remove legacy task history {}: {}",
                    dir.display(),
                    e
                ));
                false
            }
        }
    }

    /// Move every legacy per-workspace repository to its shadow location,
    /// replacing what is already there. Returns `(migrated, failed)`.
    pub async fn migrate_legacy_checkpoints(&self) -> (usize, usize) {
        let legacy = self.legacy_checkpoints_dir();
        let mut entries = match fs::read_dir(&legacy).await {
            Ok(entries) => entries,
            Err(_) => return (0, 0),
        };

        let mut migrated = 0;
        let mut failed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    self.log
                        .append_line(&format!("Failed to list {}: {}", legacy.display(), e));
                    break;
                }
            };
            let source = entry.path();
            if !fs::try_exists(source.join(".git")).await.unwrap_or(false) {
                debug!("Skipping {}: not a repository", source.display());
                continue;
            }

            let name = entry.file_name().to_string_lossy().to_string();
            let destination = GitOperations::shadow_dir_for(&self.storage_root, &name);
            match self.move_repository(&source, &destination).await {
                Ok(()) => {
                    migrated += 1;
                    self.log.append_line(&format!(
                        "Migrated {} to {}",
                        source.display(),
                        destination.display()
                    ));
                }
                Err(e) => {
                    failed += 1;
                    self.log.append_line(&format!(
                        "Failed to migrate {}: {}",
                        source.display(),
                        e
                    ));
                }
            }
        }

        if migrated > 0 {
            info!("Migrated {} legacy checkpoint repositories", migrated);
            if let Err(e) = fs::remove_dir(&legacy).await {
                debug!("Legacy directory kept: {}", e);
            }
        }
        (migrated, failed)
    }

    async fn move_repository(&self, source: &Path, destination: &Path) -> CheckpointResult<()> {
        if fs::try_exists(destination).await.unwrap_or(false) {
            fs::remove_dir_all(destination).await?;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::rename(source, destination).await?;
        Ok(())
    }

    /// Delete task branches whose task is not in `active_tasks`
    ///
    /// Unlike the layout migrations this propagates failures; each one is
    /// logged before it is returned.
    pub async fn cleanup_orphaned_branches(
        &self,
        git: &GitOperations,
        active_tasks: &[String],
    ) -> CheckpointResult<usize> {
        let branches = git.list_task_branches().await.inspect_err(|e| {
            self.log
                .append_line(&format!("Failed to list task branches: {}", e));
        })?;

        let mut deleted = 0;
        for branch in branches {
            let Some(task_id) = task_id_from_branch(&branch) else {
                continue;
            };
            if active_tasks.iter().any(|active| active == task_id) {
                continue;
            }
            git.delete_task_branch(task_id).await.inspect_err(|e| {
                self.log
                    .append_line(&format!("Failed to delete orphaned branch {}: {}", branch, e));
            })?;
            self.log
                .append_line(&format!("Deleted orphaned branch {}", branch));
            deleted += 1;
        }
        Ok(deleted)
    }
}

/// Whether `storage_root` holds any legacy layout worth migrating
pub async fn needs_migration(storage_root: &Path) -> bool {
    fs::try_exists(storage_root.join(LEGACY_TASK_HISTORY_DIR))
        .await
        .unwrap_or(false)
        || fs::try_exists(storage_root.join(LEGACY_CHECKPOINTS_DIR))
            .await
            .unwrap_or(false)
}
