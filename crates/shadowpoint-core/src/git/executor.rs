//! Git command execution

use super::GitOperations;
use crate::error::{CheckpointError, CheckpointResult};
use crate::paths;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::debug;

/// Captured result of one git invocation
#[derive(Debug)]
pub(crate) struct GitOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub success: bool,
}

impl GitOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }
}

impl GitOperations {
    /// Build a command pinned to this shadow repository and work tree
    fn command(&self, args: &[&str]) -> TokioCommand {
        let mut cmd = TokioCommand::new("git");
        cmd.args(args)
            .current_dir(paths::to_long_path(self.workspace()))
            .env("GIT_DIR", self.git_dir())
            .env("GIT_WORK_TREE", self.workspace())
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .env_remove("GIT_INDEX_FILE")
            .stdin(Stdio::null());
        cmd
    }

    /// Run git and capture its output whatever the exit status
    pub(crate) async fn git_output(&self, args: &[&str]) -> CheckpointResult<GitOutput> {
        self.git_output_with_index(args, None).await
    }

    /// Run git against an alternate index file
    pub(crate) async fn git_output_with_index(
        &self,
        args: &[&str],
        index_file: Option<&Path>,
    ) -> CheckpointResult<GitOutput> {
        let mut cmd = self.command(args);
        if let Some(index) = index_file {
            cmd.env("GIT_INDEX_FILE", index.as_os_str());
        }

        debug!("Executing git command: git {}", args.join(" "));

        let output = cmd.output().await.map_err(|e| {
            CheckpointError::repository(
                format!("git {}", args.join(" ")),
                format!("Failed to execute git: {}", e),
            )
        })?;

        Ok(GitOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }

    /// Run git, failing on a non-zero exit status; returns stdout
    pub(crate) async fn git(&self, args: &[&str]) -> CheckpointResult<String> {
        let output = self.git_output(args).await?;
        Self::require_success(args, &output)?;
        Ok(output.stdout_text())
    }

    /// Like [`Self::git`] but with an alternate index file
    pub(crate) async fn git_with_index(
        &self,
        args: &[&str],
        index_file: &Path,
    ) -> CheckpointResult<Vec<u8>> {
        let output = self.git_output_with_index(args, Some(index_file)).await?;
        Self::require_success(args, &output)?;
        Ok(output.stdout)
    }

    /// Run git and report only whether it succeeded
    pub(crate) async fn git_succeeds(&self, args: &[&str]) -> CheckpointResult<bool> {
        Ok(self.git_output(args).await?.success)
    }

    fn require_success(args: &[&str], output: &GitOutput) -> CheckpointResult<()> {
        if output.success {
            return Ok(());
        }
        Err(CheckpointError::repository_with_code(
            format!("git {}", args.join(" ")),
            output.stderr.clone(),
            output.exit_code,
        ))
    }

    /// Run git with the process-global configuration only (no repository)
    pub(crate) async fn git_global(&self, args: &[&str]) -> CheckpointResult<GitOutput> {
        debug!("Executing git command: git {}", args.join(" "));
        let output = TokioCommand::new("git")
            .args(args)
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env("LC_ALL", "C")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                CheckpointError::repository(
                    format!("git {}", args.join(" ")),
                    format!("Failed to execute git: {}", e),
                )
            })?;
        Ok(GitOutput {
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            exit_code: output.status.code(),
            success: output.status.success(),
        })
    }
}

/// Split NUL-terminated git output into UTF-8 fields
pub(crate) fn split_nul(output: &[u8]) -> Vec<String> {
    output
        .split(|b| *b == 0)
        .filter(|field| !field.is_empty())
        .map(|field| String::from_utf8_lossy(field).to_string())
        .collect()
}
