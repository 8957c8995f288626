//! Task branch history and retention

use super::{CommitInfo, GitOperations};
use crate::error::CheckpointResult;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

const FIELD_SEP: char = '\u{1f}';
const RECORD_SEP: char = '\u{1e}';

fn parse_log(output: &str) -> Vec<CommitInfo> {
    output
        .split(RECORD_SEP)
        .filter_map(|record| {
            let mut fields = record.trim_start_matches('\n').splitn(3, FIELD_SEP);
            let hash = fields.next()?.trim();
            let subject = fields.next()?;
            let seconds: i64 = fields.next()?.trim().parse().ok()?;
            if hash.is_empty() {
                return None;
            }
            Some(CommitInfo {
                hash: hash.to_string(),
                subject: subject.to_string(),
                timestamp: DateTime::<Utc>::from_timestamp(seconds, 0).unwrap_or_default(),
            })
        })
        .collect()
}

impl GitOperations {
    /// Commits on `branch` that are not on the base branch, newest first
    pub async fn history(&self, branch: &str) -> CheckpointResult<Vec<CommitInfo>> {
        let base = self.config().base_branch.clone();
        let output = self
            .git(&[
                "log",
                "--format=%H%x1f%s%x1f%ct%x1e",
                branch,
                "--not",
                &base,
            ])
            .await?;
        Ok(parse_log(&output))
    }

    /// Number of commits on `branch` that are not on the base branch
    pub async fn commit_count(&self, branch: &str) -> CheckpointResult<usize> {
        let base = self.config().base_branch.clone();
        let output = self
            .git(&["rev-list", "--count", branch, "--not", &base])
            .await?;
        Ok(output.trim().parse().unwrap_or(0))
    }

    /// Commits that currently carry a replace ref
    pub async fn replaced_commits(&self) -> CheckpointResult<Vec<String>> {
        let output = self.git(&["replace", "-l"]).await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect())
    }

    /// Keep only the newest `keep` commits of `branch`
    ///
    /// The oldest kept commit is grafted as a root (`git replace --graft`),
    /// so every kept hash stays valid. Grafts left by earlier prunes on the
    /// cut commits are deleted. Returns how many commits were cut.
    pub async fn prune_history(&self, branch: &str, keep: usize) -> CheckpointResult<usize> {
        if keep == 0 {
            return Ok(0);
        }

        let base = self.config().base_branch.clone();
        let output = self.git(&["rev-list", branch, "--not", &base]).await?;
        let commits: Vec<&str> = output.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if commits.len() <= keep {
            return Ok(0);
        }

        let oldest_kept = commits[keep - 1];
        self.git(&["replace", "-f", "--graft", oldest_kept]).await?;

        let grafted = self.replaced_commits().await?;
        for stale in commits[keep..]
            .iter()
            .copied()
            .filter(|c| grafted.iter().any(|g| g == c))
        {
            self.git(&["replace", "-d", stale]).await?;
            debug!("Dropped superseded graft on {}", stale);
        }

        let pruned = commits.len() - keep;
        info!("Pruned {} old checkpoints from {}", pruned, branch);
        Ok(pruned)
    }
}
