//! Task branch lifecycle

use super::{task_branch_name, GitOperations, TASK_BRANCH_PREFIX};
use crate::error::CheckpointResult;
use chrono::Utc;
use tracing::{debug, info, warn};

const TEMP_BRANCH_PREFIX: &str = "shadowpoint-tmp-";

impl GitOperations {
    /// Whether `refs/heads/<branch>` exists
    pub async fn branch_exists(&self, branch: &str) -> CheckpointResult<bool> {
        let reference = format!("refs/heads/{}", branch);
        self.git_succeeds(&["show-ref", "--verify", "--quiet", &reference])
            .await
    }

    /// Branch `HEAD` points at, `None` when detached
    pub async fn current_branch(&self) -> CheckpointResult<Option<String>> {
        let output = self
            .git_output(&["symbolic-ref", "--short", "-q", "HEAD"])
            .await?;
        let name = output.stdout_text().trim().to_string();
        Ok((output.success && !name.is_empty()).then_some(name))
    }

    /// Point `HEAD` at `branch` and reset the index to its tip
    ///
    /// The work tree is left alone: switching tasks never rewrites the
    /// user's files.
    pub async fn switch_branch(&self, branch: &str) -> CheckpointResult<()> {
        let reference = format!("refs/heads/{}", branch);
        self.git(&["symbolic-ref", "HEAD", &reference]).await?;
        self.git(&["reset", "--mixed", "-q"]).await?;
        debug!("Switched shadow repository to {}", branch);
        Ok(())
    }

    /// Create `task-<task_id>` from the base branch and switch to it
    ///
    /// An existing branch of that name is deleted and recreated. When it is
    /// the current branch, `HEAD` moves to a temporary branch first; the
    /// temporary branch is removed whether or not recreation succeeds.
    pub async fn create_task_branch(&self, task_id: &str) -> CheckpointResult<String> {
        let branch = task_branch_name(task_id);
        let base = self.config().base_branch.clone();

        if self.branch_exists(&branch).await? {
            if self.current_branch().await?.as_deref() == Some(branch.as_str()) {
                let temp = format!(
                    "{}{}-{}",
                    TEMP_BRANCH_PREFIX,
                    task_id,
                    Utc::now().timestamp_millis()
                );
                self.git(&["branch", "-f", &temp, &base]).await?;

                let result = self.recreate_from_temp(&branch, &temp, &base).await;

                let cleanup = self.git_output(&["branch", "-D", &temp]).await;
                if !matches!(cleanup, Ok(ref output) if output.success) {
                    warn!("Failed to delete temporary branch {}", temp);
                }
                result?;
                info!("Recreated task branch {}", branch);
                return Ok(branch);
            }
            self.git(&["branch", "-D", &branch]).await?;
        }

        self.git(&["branch", &branch, &base]).await?;
        self.switch_branch(&branch).await?;
        info!("Created task branch {}", branch);
        Ok(branch)
    }

    async fn recreate_from_temp(&self, branch: &str, temp: &str, base: &str) -> CheckpointResult<()> {
        self.switch_branch(temp).await?;
        self.git(&["branch", "-D", branch]).await?;
        self.git(&["branch", branch, base]).await?;
        self.switch_branch(branch).await
    }

    /// Delete `task-<task_id>`; a missing branch is not an error
    pub async fn delete_task_branch(&self, task_id: &str) -> CheckpointResult<bool> {
        let branch = task_branch_name(task_id);
        if !self.branch_exists(&branch).await? {
            return Ok(false);
        }

        if self.current_branch().await?.as_deref() == Some(branch.as_str()) {
            let base = self.config().base_branch.clone();
            self.switch_branch(&base).await?;
        }
        self.git(&["branch", "-D", &branch]).await?;
        info!("Deleted task branch {}", branch);
        Ok(true)
    }

    /// Names of every `task-*` branch
    pub async fn list_task_branches(&self) -> CheckpointResult<Vec<String>> {
        let output = self
            .git(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])
            .await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|name| name.starts_with(TASK_BRANCH_PREFIX))
            .map(String::from)
            .collect())
    }
}
