//! Begin/commit/rollback around a checkpoint

use super::types::BackupStatus;
use super::{ChangeReporter, TransactionLock, BACKUP_DIR_NAME, LOCK_FILE_NAME};
use crate::error::{CheckpointError, CheckpointResult};
use crate::interfaces::{LogSink, TracingLogSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const FILES_DIR: &str = "files";
const STATUS_FILE: &str = "status.json";

/// Crash-safe wrapper for one workspace's checkpoint operations
pub struct TransactionGuard {
    storage_root: PathBuf,
    workspace: PathBuf,
    reporter: Arc<dyn ChangeReporter>,
    log: Arc<dyn LogSink>,
}

impl TransactionGuard {
    pub fn new(
        storage_root: impl Into<PathBuf>,
        workspace: impl Into<PathBuf>,
        reporter: Arc<dyn ChangeReporter>,
    ) -> Self {
        Self {
            storage_root: storage_root.into(),
            workspace: workspace.into(),
            reporter,
            log: Arc::new(TracingLogSink),
        }
    }

    /// Send recovery diagnostics to `log`
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn lock_path(&self) -> PathBuf {
        self.storage_root.join(LOCK_FILE_NAME)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.storage_root.join(BACKUP_DIR_NAME)
    }

    fn files_dir(&self) -> PathBuf {
        self.backup_dir().join(FILES_DIR)
    }

    /// Whether an unfinished transaction left its lock behind
    pub async fn has_pending_transaction(&self) -> bool {
        fs::try_exists(self.lock_path()).await.unwrap_or(false)
    }

    /// The lock of an unfinished transaction, if any
    pub async fn read_lock(&self) -> CheckpointResult<Option<TransactionLock>> {
        let content = match fs::read_to_string(self.lock_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CheckpointError::transaction_with_context(
                    format!("Failed to read lock file: {}", e),
                    self.lock_path().display().to_string(),
                ))
            }
        };
        let lock = serde_json::from_str(&content).map_err(|e| {
            CheckpointError::transaction_with_context(
                format!("Invalid lock file: {}", e),
                self.lock_path().display().to_string(),
            )
        })?;
        Ok(Some(lock))
    }

    /// Start a transaction for `task_id`
    ///
    /// A leftover transaction is rolled back first. Every file the change
    /// reporter lists is copied into the backup before the lock is written.
    pub async fn begin_transaction(&self, task_id: &str) -> CheckpointResult<TransactionLock> {
        if self.has_pending_transaction().await {
            warn!("Found unfinished checkpoint transaction, rolling back");
            self.log
                .append_line("Recovering from unfinished checkpoint transaction");
            let restored = self.rollback_transaction().await?;
            self.log
                .append_line(&format!("Restored {} files from backup", restored));
        } else {
            // A crash before the lock was written can leave a partial backup
            self.remove_path(&self.backup_dir()).await;
        }

        let files_dir = self.files_dir();
        fs::create_dir_all(&files_dir)
            .await
            .map_err(|e| self.backup_error("create backup directory", &files_dir, e))?;

        let modified = self.reporter.modified_files().await?;
        let mut status = BackupStatus {
            modified: modified.clone(),
            backed_up: Vec::new(),
        };
        for relative in modified {
            let source = self.workspace.join(&relative);
            let is_file = fs::symlink_metadata(&source)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let target = files_dir.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.backup_error("create backup directory", parent, e))?;
            }
            fs::copy(&source, &target)
                .await
                .map_err(|e| self.backup_error("back up", &source, e))?;
            status.backed_up.push(relative);
        }

        let status_path = self.backup_dir().join(STATUS_FILE);
        fs::write(&status_path, serde_json::to_vec_pretty(&status)?)
            .await
            .map_err(|e| self.backup_error("write", &status_path, e))?;

        let lock = TransactionLock::started(task_id, &self.workspace);
        fs::write(self.lock_path(), serde_json::to_vec_pretty(&lock)?)
            .await
            .map_err(|e| self.backup_error("write", &self.lock_path(), e))?;

        debug!(
            "Began transaction for task {} with {} backed-up files",
            task_id,
            status.backed_up.len()
        );
        Ok(lock)
    }

    /// Finish the transaction: drop the lock and the backup
    pub async fn commit_transaction(&self) -> CheckpointResult<()> {
        self.clear().await;
        debug!("Committed checkpoint transaction");
        Ok(())
    }

    /// Put every backed-up file back, then drop the lock and the backup
    ///
    /// Returns how many files were restored; `0` when no transaction is
    /// pending.
    pub async fn rollback_transaction(&self) -> CheckpointResult<usize> {
        if !self.has_pending_transaction().await {
            return Ok(0);
        }

        let workspace = match self.read_lock().await {
            Ok(Some(lock)) => lock.workspace.unwrap_or_else(|| self.workspace.clone()),
            Ok(None) => self.workspace.clone(),
            Err(e) => {
                warn!("{}; restoring into the current workspace", e);
                self.log.append_line(&e.to_string());
                self.workspace.clone()
            }
        };

        let backups = self.backed_up_files().await?;
        let mut restored = 0;
        for (backup, relative) in backups {
            let target = workspace.join(&relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.backup_error("recreate directory", parent, e))?;
            }
            fs::copy(&backup, &target)
                .await
                .map_err(|e| self.backup_error("restore", &target, e))?;
            restored += 1;
        }

        self.clear().await;
        info!("Rolled back checkpoint transaction, restored {} files", restored);
        Ok(restored)
    }

    async fn backed_up_files(&self) -> CheckpointResult<Vec<(PathBuf, PathBuf)>> {
        let files_dir = self.files_dir();
        tokio::task::spawn_blocking(move || -> CheckpointResult<Vec<(PathBuf, PathBuf)>> {
            if !files_dir.is_dir() {
                return Ok(Vec::new());
            }
            let mut files = Vec::new();
            for entry in WalkDir::new(&files_dir) {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Ok(relative) = entry.path().strip_prefix(&files_dir) {
                    files.push((entry.path().to_path_buf(), relative.to_path_buf()));
                }
            }
            Ok(files)
        })
        .await?
    }

    async fn clear(&self) {
        self.remove_path(&self.lock_path()).await;
        self.remove_path(&self.backup_dir()).await;
    }

    async fn remove_path(&self, path: &Path) {
        let result = match fs::symlink_metadata(path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).await,
            Ok(_) => fs::remove_file(path).await,
            Err(_) => return,
        };
        if let Err(e) = result {
            warn!("Failed to remove {}: {}", path.display(), e);
            self.log
                .append_line(&format!("Failed to remove {}: {}", path.display(), e));
        }
    }

    fn backup_error(&self, action: &str, path: &Path, error: std::io::Error) -> CheckpointError {
        CheckpointError::transaction_with_context(
            format!("Failed to {}: {}", action, error),
            path.display().to_string(),
        )
    }
}
