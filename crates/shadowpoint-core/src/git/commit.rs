//! Staging, committing and restoring

use super::executor::split_nul;
use super::{task_id_from_branch, GitOperations, RestoreMarker, StageResult, StatusEntry};
use crate::error::{CheckpointError, CheckpointResult};
use crate::filter::{FileFilter, FileTraverser};
use crate::paths;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl GitOperations {
    /// Porcelain status of the work tree against the current branch
    pub async fn status_entries(&self) -> CheckpointResult<Vec<StatusEntry>> {
        let output = self
            .git_output(&[
                "status",
                "--porcelain",
                "-z",
                "--untracked-files=all",
                "--no-renames",
            ])
            .await?;
        if !output.success {
            return Err(CheckpointError::repository_with_code(
                "git status",
                output.stderr,
                output.exit_code,
            ));
        }

        Ok(split_nul(&output.stdout)
            .into_iter()
            .filter(|record| record.len() > 3)
            .map(|record| StatusEntry {
                code: record[..2].to_string(),
                path: record[3..].to_string(),
            })
            .collect())
    }

    /// Whether anything is modified, staged or untracked
    pub async fn has_changes(&self) -> CheckpointResult<bool> {
        Ok(!self.status_entries().await?.is_empty())
    }

    /// Stage the whole work tree
    ///
    /// Files over the size ceiling or registered for the large-file filter
    /// are added to the exclusion list first. Failures are reported through
    /// `success` rather than returned.
    pub async fn add_checkpoint_files(&self) -> StageResult {
        let skipped = match self.oversized_paths().await {
            Ok(skipped) => skipped,
            Err(e) => {
                warn!("Size scan failed, staging without size exclusions: {}", e);
                Vec::new()
            }
        };

        if let Err(e) = self.refresh_exclusions(&skipped).await {
            warn!("Failed to refresh exclusion rules: {}", e);
            return StageResult {
                success: false,
                skipped_large_files: 0,
            };
        }

        let output = match self.git_output(&["add", "-A", "--ignore-errors"]).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to stage workspace: {}", e);
                return StageResult {
                    success: false,
                    skipped_large_files: skipped.len(),
                };
            }
        };
        if !output.success {
            warn!("git add reported errors: {}", output.stderr);
        }

        // Already-tracked files that outgrew the ceiling keep their last version
        if !skipped.is_empty() {
            let mut args = vec!["reset", "-q", "--"];
            args.extend(skipped.iter().map(String::as_str));
            if let Ok(out) = self.git_output(&args).await {
                if !out.success {
                    debug!("Unstaging oversized files failed: {}", out.stderr);
                }
            }
        }

        StageResult {
            success: output.success,
            skipped_large_files: skipped.len(),
        }
    }

    async fn oversized_paths(&self) -> CheckpointResult<Vec<String>> {
        let config = self.config();
        let filter = Arc::new(FileFilter::for_workspace(self.workspace(), config).await?);
        let traverser = FileTraverser::new(
            filter,
            config.traversal_batch_size,
            config.traversal_concurrency,
        )
        // `git add -A` stages dot entries as well
        .with_dot_files(true)
        .with_masked_marker(config.disabled_git_name());

        let report = traverser.traverse().await?;
        Ok(report
            .size_rejections()
            .filter_map(|path| paths::relative_to(path, self.workspace()))
            .map(|relative| paths::to_posix(&relative))
            .collect())
    }

    /// Commit the work tree, returning the new `HEAD`
    ///
    /// With nothing to record the current `HEAD` is returned and no commit
    /// is created.
    pub async fn commit(&self, message: &str) -> CheckpointResult<String> {
        if !self.has_changes().await? {
            debug!("Nothing to commit, keeping HEAD");
            return self.head_hash().await;
        }

        let stage = self.add_checkpoint_files().await;
        if !stage.success {
            return Err(CheckpointError::repository(
                "git add -A",
                "Failed to stage workspace changes",
            ));
        }
        if stage.skipped_large_files > 0 {
            info!(
                "Skipped {} oversized or large-file entries",
                stage.skipped_large_files
            );
        }

        if self.git_succeeds(&["diff", "--cached", "--quiet"]).await? {
            debug!("Only excluded files changed, keeping HEAD");
            return self.head_hash().await;
        }

        self.git(&["commit", "--no-verify", "-q", "-m", message])
            .await?;
        let hash = self.head_hash().await?;
        debug!("Created commit {}", hash);
        Ok(hash)
    }

    /// Full hash of `HEAD`
    pub async fn head_hash(&self) -> CheckpointResult<String> {
        Ok(self.git(&["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    /// Resolve any revision to a full commit hash
    pub async fn resolve_commit(&self, revision: &str) -> CheckpointResult<String> {
        let spec = format!("{}^{{commit}}", revision);
        let output = self
            .git_output(&["rev-parse", "--verify", "--quiet", &spec])
            .await?;
        let hash = output.stdout_text().trim().to_string();
        if !output.success || hash.is_empty() {
            return Err(CheckpointError::not_found(format!(
                "Unknown checkpoint: {}",
                revision
            )));
        }
        Ok(hash)
    }

    /// Full message of a commit
    pub async fn commit_message(&self, hash: &str) -> CheckpointResult<String> {
        Ok(self
            .git(&["log", "-1", "--format=%B", hash])
            .await?
            .trim()
            .to_string())
    }

    /// Move the work tree back to `hash` and record a restore marker commit
    ///
    /// Untracked files are cleaned and the tree is hard-reset to `hash`,
    /// then the branch tip is put back and a marker commit carrying the
    /// restored tree is appended. The branch only ever grows.
    pub async fn restore_checkpoint(&self, hash: &str) -> CheckpointResult<String> {
        let target = self.resolve_commit(hash).await?;
        let message = self.commit_message(&target).await?;

        let task_id = match RestoreMarker::task_id_in(&message) {
            Some(id) => id,
            None => self
                .current_branch()
                .await?
                .as_deref()
                .and_then(task_id_from_branch)
                .map(String::from)
                .ok_or_else(|| {
                    CheckpointError::invalid_input_field(
                        format!("Cannot attribute restore of {} to a task", target),
                        "hash",
                    )
                })?,
        };

        let previous_tip = self.head_hash().await?;

        self.git(&["clean", "-f", "-d", "-q"]).await?;
        self.git(&["reset", "--hard", "-q", &target]).await?;
        self.git(&["reset", "--soft", "-q", &previous_tip]).await?;

        let marker = RestoreMarker::new(task_id, target.clone());
        self.git(&[
            "commit",
            "--allow-empty",
            "--no-verify",
            "-q",
            "-m",
            &marker.to_string(),
        ])
        .await?;

        let new_hash = self.head_hash().await?;
        info!("Restored {} as marker commit {}", target, new_hash);
        Ok(new_hash)
    }
}
