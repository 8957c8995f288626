//! Stash wrappers for in-flight changes

use super::GitOperations;
use crate::error::CheckpointResult;
use chrono::Utc;
use tracing::{debug, warn};

impl GitOperations {
    /// Number of stash entries
    pub async fn stash_count(&self) -> CheckpointResult<usize> {
        let output = self.git_output(&["stash", "list"]).await?;
        if !output.success {
            return Ok(0);
        }
        Ok(output
            .stdout_text()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .count())
    }

    /// Stash tracked and untracked changes; `false` when there was nothing
    pub async fn stash_changes(&self) -> CheckpointResult<bool> {
        if !self.has_changes().await? {
            return Ok(false);
        }

        let before = self.stash_count().await?;
        let label = format!("shadowpoint-{}", Utc::now().timestamp_millis());
        let output = self
            .git_output(&["stash", "push", "--include-untracked", "-q", "-m", &label])
            .await?;
        if !output.success {
            warn!("git stash push failed: {}", output.stderr);
            return Ok(false);
        }

        let stashed = self.stash_count().await? > before;
        debug!("Stashed in-flight changes: {}", stashed);
        Ok(stashed)
    }

    /// Apply the newest stash entry, keeping it in the list
    pub async fn apply_stash(&self) -> CheckpointResult<bool> {
        self.replay_stash("apply").await
    }

    /// Apply and drop the newest stash entry
    pub async fn pop_stash(&self) -> CheckpointResult<bool> {
        self.replay_stash("pop").await
    }

    /// Put the work tree back to `HEAD` exactly, dropping unignored
    /// untracked files; stash entries are left alone
    pub async fn discard_work_tree_changes(&self) -> CheckpointResult<()> {
        self.git(&["reset", "--hard", "-q", "HEAD"]).await?;
        self.git(&["clean", "-f", "-d", "-q"]).await?;
        Ok(())
    }

    async fn replay_stash(&self, action: &str) -> CheckpointResult<bool> {
        if self.stash_count().await? == 0 {
            return Ok(false);
        }
        let output = self.git_output(&["stash", action, "-q"]).await?;
        if !output.success {
            warn!("git stash {} failed: {}", action, output.stderr);
        }
        Ok(output.success)
    }
}
