//! Save, diff, restore and history for one task

use crate::config::CheckpointConfig;
use crate::diff::DiffEngine;
use crate::error::{CheckpointError, CheckpointResult};
use crate::git::GitOperations;
use crate::interfaces::LogSink;
use crate::recovery::TransactionGuard;
use crate::tracker::CheckpointTracker;
use crate::types::{Checkpoint, CheckpointDiff};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Checkpoint operations for one task in one workspace
///
/// Created by [`super::CheckpointEngine::service_for_task`].
pub struct CheckpointService {
    config: Arc<CheckpointConfig>,
    git: Arc<GitOperations>,
    tracker: CheckpointTracker,
    diff: DiffEngine,
    guard: TransactionGuard,
    repo_lock: Arc<RwLock<()>>,
    transactions: Arc<Mutex<()>>,
    log: Arc<dyn LogSink>,
}

impl CheckpointService {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        config: Arc<CheckpointConfig>,
        git: Arc<GitOperations>,
        tracker: CheckpointTracker,
        diff: DiffEngine,
        guard: TransactionGuard,
        repo_lock: Arc<RwLock<()>>,
        transactions: Arc<Mutex<()>>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            config,
            git,
            tracker,
            diff,
            guard,
            repo_lock,
            transactions,
            log,
        }
    }

    pub fn task_id(&self) -> &str {
        self.tracker.task_id()
    }

    pub fn workspace(&self) -> &Path {
        self.git.workspace()
    }

    pub fn git(&self) -> &Arc<GitOperations> {
        &self.git
    }

    pub fn diff_engine(&self) -> &DiffEngine {
        &self.diff
    }

    pub async fn is_initialized(&self) -> bool {
        self.tracker.is_ready().await
    }

    /// Prepare the shadow repository and the task branch
    pub async fn initialize(&self) -> CheckpointResult<()> {
        let _guard = self.repo_lock.write().await;
        self.tracker.initialize().await
    }

    async fn ensure_ready(&self) -> CheckpointResult<()> {
        if self.tracker.is_ready().await {
            return Ok(());
        }
        Err(CheckpointError::not_initialized(format!(
            "Checkpoints for task {} are not initialized",
            self.task_id()
        )))
    }

    /// Snapshot the workspace and apply retention; returns the checkpoint
    /// hash (the unchanged `HEAD` when nothing changed)
    pub async fn save_checkpoint(&self, message: &str) -> CheckpointResult<String> {
        self.ensure_ready().await?;
        let _guard = self.repo_lock.write().await;

        let hash = {
            let _transaction = self.transactions.lock().await;
            self.guard.begin_transaction(self.task_id()).await?;
            match self.tracker.create_checkpoint(message).await {
                Ok(hash) => {
                    self.guard.commit_transaction().await?;
                    hash
                }
                Err(e) => {
                    if let Err(rollback) = self.guard.rollback_transaction().await {
                        warn!("Rollback after failed checkpoint also failed: {}", rollback);
                    }
                    return Err(e);
                }
            }
        };

        self.apply_retention().await;
        info!("Saved checkpoint {} for task {}", hash, self.task_id());
        Ok(hash)
    }

    async fn apply_retention(&self) {
        match self
            .git
            .prune_history(self.tracker.branch(), self.config.retention_threshold)
            .await
        {
            Ok(0) => {}
            Ok(pruned) => self.log.append_line(&format!(
                "Pruned {} checkpoints from {}",
                pruned,
                self.tracker.branch()
            )),
            Err(e) => {
                warn!("Retention cleanup failed: {}", e);
                self.log
                    .append_line(&format!("Retention cleanup failed: {}", e));
            }
        }
    }

    fn drop_oversized(&self, diffs: Vec<CheckpointDiff>) -> Vec<CheckpointDiff> {
        let limit = self.config.max_diff_size;
        let total = diffs.len();
        let kept: Vec<_> = diffs.into_iter().filter(|d| d.size() <= limit).collect();
        if kept.len() < total {
            debug!(
                "Omitted {} diffs larger than {} bytes",
                total - kept.len(),
                limit
            );
        }
        kept
    }

    /// Diff `hash1` against `hash2`, or against the work tree when `hash2`
    /// is `None`. Entries over the diff size ceiling are left out.
    pub async fn get_diff(
        &self,
        hash1: &str,
        hash2: Option<&str>,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        self.ensure_ready().await?;
        let diffs = match hash2 {
            Some(hash2) => {
                let _guard = self.repo_lock.read().await;
                self.diff.compute_diff(hash1, hash2).await?
            }
            None => {
                let _guard = self.repo_lock.write().await;
                self.tracker.get_diff(hash1, None).await?
            }
        };
        Ok(self.drop_oversized(diffs))
    }

    /// Number of changed files between two checkpoints, or between a
    /// checkpoint and the work tree
    pub async fn get_diff_count(&self, hash1: &str, hash2: Option<&str>) -> CheckpointResult<usize> {
        self.ensure_ready().await?;
        match hash2 {
            Some(hash2) => {
                let _guard = self.repo_lock.read().await;
                Ok(self.git.changed_files(hash1, hash2).await?.len())
            }
            None => {
                let _guard = self.repo_lock.write().await;
                Ok(self.tracker.get_diff(hash1, None).await?.len())
            }
        }
    }

    /// Restore the workspace to `hash`; returns the restore marker commit
    pub async fn restore_checkpoint(&self, hash: &str) -> CheckpointResult<String> {
        self.ensure_ready().await?;
        let _guard = self.repo_lock.write().await;
        self.tracker.restore_checkpoint(hash).await
    }

    /// This task's checkpoints, newest first
    pub async fn get_history(&self) -> CheckpointResult<Vec<Checkpoint>> {
        self.ensure_ready().await?;
        let _guard = self.repo_lock.read().await;
        self.tracker.history().await
    }

    /// Diff a checkpoint of one task against a checkpoint of another
    pub async fn get_diff_across_tasks(
        &self,
        from_task: &str,
        from_hash: &str,
        to_task: &str,
        to_hash: &str,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        self.ensure_ready().await?;
        let _guard = self.repo_lock.write().await;
        let diffs = self
            .git
            .get_diff_across_tasks(from_task, from_hash, to_task, to_hash)
            .await?;
        Ok(self.drop_oversized(diffs))
    }

    /// Precompute diffs between every pair of `hashes`
    pub async fn warmup_diffs(&self, hashes: &[String]) -> CheckpointResult<usize> {
        self.ensure_ready().await?;
        let _guard = self.repo_lock.read().await;
        Ok(self.diff.warmup_cache(hashes).await)
    }

    /// Delete this task's branch and return to the uninitialized state
    ///
    /// Branch deletion is best-effort.
    pub async fn cleanup(&self) -> CheckpointResult<()> {
        let _guard = self.repo_lock.write().await;
        if self.git.exists() {
            if let Err(e) = self.git.delete_task_branch(self.task_id()).await {
                warn!("Failed to delete branch for task {}: {}", self.task_id(), e);
                self.log.append_line(&format!(
                    "Failed to delete branch for task {}: {}",
                    self.task_id(),
                    e
                ));
            }
        }
        self.diff.invalidate();
        self.tracker.reset().await;
        Ok(())
    }
}
