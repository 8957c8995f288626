//! Per-task checkpoint lifecycle
//!
//! A [`CheckpointTracker`] binds one task to the shared shadow repository of
//! its workspace. It moves through `Uninitialized -> Initializing -> Ready`;
//! every operation other than [`CheckpointTracker::initialize`] requires
//! `Ready`.

#[cfg(test)]
mod tests;

use crate::error::{CheckpointError, CheckpointResult};
use crate::git::{task_branch_name, GitOperations};
use crate::types::{Checkpoint, CheckpointDiff};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Lifecycle state of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Checkpoint coordinator for one task
pub struct CheckpointTracker {
    task_id: String,
    branch: String,
    git: Arc<GitOperations>,
    state: RwLock<TrackerState>,
}

impl CheckpointTracker {
    pub fn new(task_id: impl Into<String>, git: Arc<GitOperations>) -> Self {
        let task_id = task_id.into();
        Self {
            branch: task_branch_name(&task_id),
            task_id,
            git,
            state: RwLock::new(TrackerState::Uninitialized),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn git(&self) -> &Arc<GitOperations> {
        &self.git
    }

    /// Get current state
    pub async fn state(&self) -> TrackerState {
        *self.state.read().await
    }

    pub async fn is_ready(&self) -> bool {
        self.state().await == TrackerState::Ready
    }

    /// Create or verify the shadow repository and check out the task branch
    ///
    /// A no-op once `Ready`. An existing task branch is resumed with its
    /// history; otherwise it is created from the base branch.
    pub async fn initialize(&self) -> CheckpointResult<()> {
        let mut state = self.state.write().await;
        if *state == TrackerState::Ready {
            debug!("Tracker for task {} already initialized", self.task_id);
            return Ok(());
        }
        *state = TrackerState::Initializing;

        match self.prepare_repository().await {
            Ok(()) => {
                *state = TrackerState::Ready;
                info!("Checkpoint tracking ready for task {}", self.task_id);
                Ok(())
            }
            Err(e) => {
                *state = TrackerState::Uninitialized;
                Err(e)
            }
        }
    }

    async fn prepare_repository(&self) -> CheckpointResult<()> {
        self.git.init_shadow_git().await?;
        if self.git.branch_exists(&self.branch).await? {
            self.git.switch_branch(&self.branch).await
        } else {
            self.git.create_task_branch(&self.task_id).await.map(|_| ())
        }
    }

    /// Return to `Uninitialized`
    pub async fn reset(&self) {
        *self.state.write().await = TrackerState::Uninitialized;
    }

    async fn ensure_ready(&self) -> CheckpointResult<()> {
        if self.is_ready().await {
            return Ok(());
        }
        Err(CheckpointError::not_initialized(format!(
            "Checkpoint tracker for task {} is not initialized",
            self.task_id
        )))
    }

    /// Several tasks share one repository; make sure `HEAD` is ours
    async fn ensure_task_branch(&self) -> CheckpointResult<()> {
        if self.git.current_branch().await?.as_deref() != Some(self.branch.as_str()) {
            self.git.switch_branch(&self.branch).await?;
        }
        Ok(())
    }

    /// Run `operation` with nested repositories masked, unmasking afterwards
    /// whatever the outcome
    async fn with_masking<T, F>(&self, operation: F) -> CheckpointResult<T>
    where
        F: Future<Output = CheckpointResult<T>>,
    {
        self.git.rename_nested_git_repos(true).await;
        let result = operation.await;
        self.git.rename_nested_git_repos(false).await;
        result
    }

    /// Snapshot the workspace; returns the checkpoint hash
    ///
    /// Returns the current `HEAD` when nothing changed.
    pub async fn create_checkpoint(&self, message: &str) -> CheckpointResult<String> {
        self.ensure_ready().await?;
        self.ensure_task_branch().await?;

        let full_message = format!("{}\n\ntask:{}", message, self.task_id);
        self.with_masking(self.git.commit(&full_message)).await
    }

    /// Restore the workspace to `hash`, carrying in-flight changes across
    ///
    /// Uncommitted changes are stashed first and re-applied after the reset.
    /// If the reset fails the stash is popped back before the error is
    /// returned. The stash entry is kept after a successful restore; when
    /// re-applying it conflicts, the work tree is put back to the restored
    /// tree and the changes stay in the stash only.
    pub async fn restore_checkpoint(&self, hash: &str) -> CheckpointResult<String> {
        self.ensure_ready().await?;
        self.ensure_task_branch().await?;

        self.with_masking(async {
            let stashed = self.git.stash_changes().await?;
            match self.git.restore_checkpoint(hash).await {
                Ok(new_hash) => {
                    if stashed && !self.git.apply_stash().await? {
                        self.git.discard_work_tree_changes().await?;
                        warn!(
                            "In-flight changes conflict with checkpoint {}; they remain stashed",
                            hash
                        );
                    }
                    Ok(new_hash)
                }
                Err(e) => {
                    if stashed && !self.git.pop_stash().await.unwrap_or(false) {
                        warn!("Failed to restore stashed changes after failed restore");
                    }
                    Err(e)
                }
            }
        })
        .await
    }

    /// Diff two checkpoints, or a checkpoint against the work tree
    ///
    /// Work-tree diffs stage into a scratch index, so they run masked.
    pub async fn get_diff(
        &self,
        hash1: &str,
        hash2: Option<&str>,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        self.ensure_ready().await?;
        match hash2 {
            Some(_) => self.git.get_diff(hash1, hash2).await,
            None => self.with_masking(self.git.get_diff(hash1, None)).await,
        }
    }

    /// Checkpoints of this task, newest first
    pub async fn history(&self) -> CheckpointResult<Vec<Checkpoint>> {
        self.ensure_ready().await?;
        Ok(self
            .git
            .history(&self.branch)
            .await?
            .into_iter()
            .map(|commit| Checkpoint {
                hash: commit.hash,
                message: commit.subject,
                timestamp: commit.timestamp,
            })
            .collect())
    }

    pub async fn commit_count(&self) -> CheckpointResult<usize> {
        self.ensure_ready().await?;
        self.git.commit_count(&self.branch).await
    }
}
