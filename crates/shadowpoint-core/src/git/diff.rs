//! Whole-file diffs between revisions and against the work tree

use super::executor::split_nul;
use super::{task_branch_name, ChangedFile, FileStatus, GitOperations};
use crate::error::{CheckpointError, CheckpointResult};
use crate::types::CheckpointDiff;
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// Bytes inspected when sniffing for binary content
const BINARY_SNIFF_LEN: usize = 8000;

/// Text content of a blob; binary or non-UTF-8 content yields `""`
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return String::new();
    }
    String::from_utf8(bytes.to_vec()).unwrap_or_default()
}

fn parse_name_status(output: &[u8]) -> Vec<ChangedFile> {
    let fields = split_nul(output);
    fields
        .chunks(2)
        .filter(|pair| pair.len() == 2)
        .map(|pair| ChangedFile {
            status: FileStatus::from_code(&pair[0]),
            path: pair[1].clone(),
        })
        .collect()
}

impl GitOperations {
    /// Paths that differ between two revisions
    pub async fn changed_files(&self, from: &str, to: &str) -> CheckpointResult<Vec<ChangedFile>> {
        let output = self
            .git_output(&["diff", "--name-status", "--no-renames", "-z", from, to])
            .await?;
        if !output.success {
            return Err(CheckpointError::repository_with_code(
                format!("git diff {} {}", from, to),
                output.stderr,
                output.exit_code,
            ));
        }
        Ok(parse_name_status(&output.stdout))
    }

    /// Content of `path` at `revision`; `""` when absent or binary
    pub async fn show_file(&self, revision: &str, path: &str) -> CheckpointResult<String> {
        let object = format!("{}:{}", revision, path);
        let output = self.git_output(&["cat-file", "blob", &object]).await?;
        if !output.success {
            return Ok(String::new());
        }
        Ok(decode_text(&output.stdout))
    }

    async fn read_workspace_file(&self, relative: &str) -> String {
        match fs::read(self.workspace().join(relative)).await {
            Ok(bytes) => decode_text(&bytes),
            Err(_) => String::new(),
        }
    }

    fn diff_entry(&self, relative: String, before: String, after: String) -> CheckpointDiff {
        CheckpointDiff {
            absolute_path: self.workspace().join(&relative),
            relative_path: relative,
            before,
            after,
        }
    }

    /// Diff `hash1` against `hash2`, or against the work tree when `hash2`
    /// is `None`
    pub async fn get_diff(
        &self,
        hash1: &str,
        hash2: Option<&str>,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        let Some(hash2) = hash2 else {
            return self.working_tree_diff(hash1).await;
        };
        if hash1 == hash2 {
            return Ok(Vec::new());
        }

        let mut diffs = Vec::new();
        for file in self.changed_files(hash1, hash2).await? {
            let before = self.show_file(hash1, &file.path).await?;
            let after = self.show_file(hash2, &file.path).await?;
            diffs.push(self.diff_entry(file.path, before, after));
        }
        Ok(diffs)
    }

    /// Diff a commit against the live work tree
    ///
    /// When `target` is `HEAD` the status listing is enough. Otherwise the
    /// work tree is staged into a throwaway index so the real one is never
    /// touched.
    pub async fn working_tree_diff(&self, target: &str) -> CheckpointResult<Vec<CheckpointDiff>> {
        let target = self.resolve_commit(target).await?;
        let head = self.head_hash().await?;

        let changed: Vec<String> = if target == head {
            self.status_entries()
                .await?
                .into_iter()
                .map(|entry| entry.path)
                .collect()
        } else {
            self.changed_against_index(&target)
                .await?
                .into_iter()
                .map(|file| file.path)
                .collect()
        };

        let mut diffs = Vec::with_capacity(changed.len());
        for path in changed {
            let before = self.show_file(&target, &path).await?;
            let after = self.read_workspace_file(&path).await;
            diffs.push(self.diff_entry(path, before, after));
        }
        debug!("Working tree differs from {} in {} files", target, diffs.len());
        Ok(diffs)
    }

    async fn changed_against_index(&self, target: &str) -> CheckpointResult<Vec<ChangedFile>> {
        let index = self.temporary_index_path();
        let result = async {
            self.git_with_index(&["read-tree", "HEAD"], &index).await?;
            self.git_with_index(&["add", "-A", "--ignore-errors"], &index)
                .await
                .or_else(|e| {
                    warn!("Staging into diff index reported errors: {}", e);
                    Ok::<_, CheckpointError>(Vec::new())
                })?;
            let output = self
                .git_with_index(
                    &["diff", "--cached", "--name-status", "--no-renames", "-z", target],
                    &index,
                )
                .await?;
            Ok::<_, CheckpointError>(parse_name_status(&output))
        }
        .await;

        if let Err(e) = fs::remove_file(&index).await {
            debug!("Failed to remove diff index {}: {}", index.display(), e);
        }
        result
    }

    fn temporary_index_path(&self) -> PathBuf {
        let stamp = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        self.git_dir()
            .join(format!("shadowpoint-diff-{}-{}.index", std::process::id(), stamp))
    }

    /// Diff between checkpoints of two task branches
    ///
    /// Each hash is resolved while its task's branch is checked out; the
    /// original branch is checked out again afterwards, also on error.
    pub async fn get_diff_across_tasks(
        &self,
        from_task: &str,
        from_hash: &str,
        to_task: &str,
        to_hash: &str,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        let original = self.current_branch().await?;

        let result = async {
            let from = self.resolve_on_branch(from_task, from_hash).await?;
            let to = self.resolve_on_branch(to_task, to_hash).await?;
            self.get_diff(&from, Some(&to)).await
        }
        .await;

        if let Some(branch) = original {
            if let Err(e) = self.switch_branch(&branch).await {
                warn!("Failed to switch back to {}: {}", branch, e);
                if result.is_ok() {
                    return Err(e);
                }
            }
        }
        result
    }

    async fn resolve_on_branch(&self, task_id: &str, hash: &str) -> CheckpointResult<String> {
        let branch = task_branch_name(task_id);
        if !self.branch_exists(&branch).await? {
            return Err(CheckpointError::not_found(format!(
                "Task branch {} does not exist",
                branch
            )));
        }
        self.switch_branch(&branch).await?;

        let resolved = self.resolve_commit(hash).await?;
        if !self
            .git_succeeds(&["merge-base", "--is-ancestor", &resolved, "HEAD"])
            .await?
        {
            return Err(CheckpointError::not_found(format!(
                "Checkpoint {} is not part of {}",
                hash, branch
            )));
        }
        Ok(resolved)
    }
}
