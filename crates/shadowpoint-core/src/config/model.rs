//! Checkpoint engine configuration model

use crate::error::{CheckpointError, CheckpointResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 100 MB
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
/// 10 MB
pub const DEFAULT_MAX_DIFF_SIZE: u64 = 10 * 1024 * 1024;

/// Configuration for the checkpoint engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Files larger than this are never snapshotted
    pub max_file_size: u64,
    /// Diff entries whose before+after exceed this are dropped from results
    pub max_diff_size: u64,
    /// Number of checkpoints kept per task branch
    pub retention_threshold: usize,
    /// Maximum number of cached diff results
    pub cache_capacity: usize,
    /// Lifetime of a cached diff result
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    /// Concurrent content reads while diffing
    pub diff_concurrency: usize,
    /// Concurrent admission checks while traversing
    pub traversal_concurrency: usize,
    /// Paths per traversal batch
    pub traversal_batch_size: usize,
    /// Identity used when no global git identity exists
    pub git_user_name: String,
    pub git_user_email: String,
    /// Branch holding the shared initial commit
    pub base_branch: String,
    /// Suffix appended to nested `.git` entries while they are masked
    pub disabled_git_suffix: String,
    /// Additional exclusion patterns appended to the defaults
    pub extra_exclusions: Vec<String>,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_diff_size: DEFAULT_MAX_DIFF_SIZE,
            retention_threshold: 50,
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(5 * 60),
            diff_concurrency: 5,
            traversal_concurrency: 5,
            traversal_batch_size: 1000,
            git_user_name: "Shadowpoint Checkpoint".to_string(),
            git_user_email: "checkpoint@shadowpoint.local".to_string(),
            base_branch: "main".to_string(),
            disabled_git_suffix: "_disabled".to_string(),
            extra_exclusions: Vec::new(),
        }
    }
}

impl CheckpointConfig {
    /// Set the per-file size ceiling
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Set the per-entry diff size ceiling
    pub fn with_max_diff_size(mut self, bytes: u64) -> Self {
        self.max_diff_size = bytes;
        self
    }

    /// Set how many checkpoints each task keeps
    pub fn with_retention_threshold(mut self, keep: usize) -> Self {
        self.retention_threshold = keep;
        self
    }

    /// Set diff cache capacity and TTL
    pub fn with_cache(mut self, capacity: usize, ttl: Duration) -> Self {
        self.cache_capacity = capacity;
        self.cache_ttl = ttl;
        self
    }

    /// Set the content-read concurrency used while diffing
    pub fn with_diff_concurrency(mut self, limit: usize) -> Self {
        self.diff_concurrency = limit;
        self
    }

    /// Set traversal batching and concurrency
    pub fn with_traversal(mut self, batch_size: usize, concurrency: usize) -> Self {
        self.traversal_batch_size = batch_size;
        self.traversal_concurrency = concurrency;
        self
    }

    /// Set the fallback commit identity
    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.git_user_name = name.into();
        self.git_user_email = email.into();
        self
    }

    /// Append extra exclusion patterns
    pub fn with_extra_exclusions(
        mut self,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.extra_exclusions
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Name of the masked nested git marker, e.g. `.git_disabled`
    pub fn disabled_git_name(&self) -> String {
        format!(".git{}", self.disabled_git_suffix)
    }

    /// Reject settings the engine cannot operate with
    pub fn validate(&self) -> CheckpointResult<()> {
        if self.diff_concurrency == 0 {
            return Err(CheckpointError::invalid_input_field(
                "must be at least 1",
                "diff_concurrency",
            ));
        }
        if self.traversal_concurrency == 0 {
            return Err(CheckpointError::invalid_input_field(
                "must be at least 1",
                "traversal_concurrency",
            ));
        }
        if self.traversal_batch_size == 0 {
            return Err(CheckpointError::invalid_input_field(
                "must be at least 1",
                "traversal_batch_size",
            ));
        }
        if self.cache_capacity == 0 {
            return Err(CheckpointError::invalid_input_field(
                "must be at least 1",
                "cache_capacity",
            ));
        }
        if self.base_branch.trim().is_empty() || self.base_branch.starts_with("task-") {
            return Err(CheckpointError::invalid_input_field(
                "must be non-empty and must not look like a task branch",
                "base_branch",
            ));
        }
        if self.disabled_git_suffix.is_empty() {
            return Err(CheckpointError::invalid_input_field(
                "must not be empty",
                "disabled_git_suffix",
            ));
        }
        Ok(())
    }
}
