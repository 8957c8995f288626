//! Shadow repository creation and ownership verification

use super::GitOperations;
use crate::error::{CheckpointError, CheckpointResult};
use crate::exclusions;
use crate::paths;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

impl GitOperations {
    /// Create the shadow repository, or verify an existing one
    ///
    /// An existing repository whose `core.worktree` points at a different
    /// workspace is rejected with `OwnershipMismatch`, so a copied or moved
    /// shadow store never operates on the wrong files.
    pub async fn init_shadow_git(&self) -> CheckpointResult<PathBuf> {
        if self.exists() {
            self.verify_ownership().await?;
            debug!("Using existing shadow repository at {}", self.git_dir().display());
            return Ok(self.git_dir().to_path_buf());
        }

        info!(
            "Creating shadow repository for {} at {}",
            self.workspace().display(),
            self.git_dir().display()
        );

        fs::create_dir_all(self.shadow_dir()).await.map_err(|e| {
            CheckpointError::io_with_path(
                format!("Failed to create shadow repository directory: {}", e),
                self.shadow_dir().display().to_string(),
            )
        })?;

        self.git(&["init", "--quiet"]).await?;

        let base_ref = format!("refs/heads/{}", self.config().base_branch);
        self.git(&["symbolic-ref", "HEAD", &base_ref]).await?;

        let worktree = paths::to_posix(self.workspace());
        self.git(&["config", "core.worktree", &worktree]).await?;
        self.git(&["config", "commit.gpgSign", "false"]).await?;
        self.git(&["config", "core.autocrlf", "false"]).await?;
        self.git(&["config", "core.quotePath", "false"]).await?;
        self.configure_identity().await?;

        self.refresh_exclusions(&[]).await?;

        self.git(&[
            "commit",
            "--allow-empty",
            "--no-verify",
            "--quiet",
            "-m",
            "Initial commit",
        ])
        .await?;

        Ok(self.git_dir().to_path_buf())
    }

    /// Compare the stored work-tree pointer with this driver's workspace
    pub async fn verify_ownership(&self) -> CheckpointResult<()> {
        let output = self.git_output(&["config", "--get", "core.worktree"]).await?;
        let actual = output.stdout_text().trim().to_string();

        if actual.is_empty() || !paths::paths_equal(Path::new(&actual), self.workspace()) {
            return Err(CheckpointError::ownership_mismatch(
                paths::to_posix(self.workspace()),
                if actual.is_empty() {
                    "<unset>".to_string()
                } else {
                    actual
                },
            ));
        }
        Ok(())
    }

    /// Set a repository-local identity for whichever of name/email has no
    /// global value; an existing user identity is never overridden.
    async fn configure_identity(&self) -> CheckpointResult<()> {
        let global_name = self
            .git_global(&["config", "--global", "--get", "user.name"])
            .await?;
        if !global_name.success || global_name.stdout_text().trim().is_empty() {
            let name = self.config().git_user_name.clone();
            self.git(&["config", "user.name", &name]).await?;
        }

        let global_email = self
            .git_global(&["config", "--global", "--get", "user.email"])
            .await?;
        if !global_email.success || global_email.stdout_text().trim().is_empty() {
            let email = self.config().git_user_email.clone();
            self.git(&["config", "user.email", &email]).await?;
        }
        Ok(())
    }

    /// Rewrite `info/exclude`: default patterns, workspace large-file
    /// patterns, configured extras, then anchored `extra_paths`
    pub(crate) async fn refresh_exclusions(&self, extra_paths: &[String]) -> CheckpointResult<()> {
        let lfs_patterns = exclusions::read_lfs_patterns(self.workspace()).await;
        let mut patterns =
            exclusions::default_exclusions(&self.config().disabled_git_name(), &lfs_patterns);
        patterns.extend(self.config().extra_exclusions.iter().cloned());
        patterns.extend(extra_paths.iter().map(|path| format!("/{}", path)));
        exclusions::write_exclusions(self.git_dir(), &patterns).await
    }
}
