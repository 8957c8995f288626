//! Value types produced by the shadow repository driver

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static RESTORE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^task:([^,\s]*),restore:([0-9a-fA-F]+),Time:(\d+)$").expect("valid regex")
});

// Checkpoint commits end with a `task:<id>` paragraph of their own
static TASK_TRAILER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\A|\n\n)task:([A-Za-z0-9_.\-]+)\z").expect("valid regex")
});

/// Change kind reported by `git diff --name-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    TypeChanged,
    Other,
}

impl FileStatus {
    pub(crate) fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('A') => Self::Added,
            Some('M') => Self::Modified,
            Some('D') => Self::Deleted,
            Some('T') => Self::TypeChanged,
            _ => Self::Other,
        }
    }
}

/// A path that differs between two revisions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Workspace-relative, `/`-separated
    pub path: String,
    pub status: FileStatus,
}

/// One line of `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    /// Two-letter porcelain code, e.g. ` M` or `??`
    pub code: String,
    pub path: String,
}

impl StatusEntry {
    /// Untracked entries (`??`)
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }
}

/// A commit as listed by the history walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of staging the workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageResult {
    pub success: bool,
    /// Files kept out for their size or large-file registration
    pub skipped_large_files: usize,
}

/// Message of the synthetic commit recorded after a restore
///
/// Format: `task:<taskId>,restore:<hash>,Time:<epoch-ms>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreMarker {
    pub task_id: String,
    pub restored_hash: String,
    pub timestamp_ms: i64,
}

impl RestoreMarker {
    pub fn new(task_id: impl Into<String>, restored_hash: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            restored_hash: restored_hash.into(),
            timestamp_ms: Utc::now().timestamp_millis(),
        }
    }

    /// Parse a marker commit message
    pub fn parse(message: &str) -> Option<Self> {
        let captures = RESTORE_MARKER.captures(message.trim())?;
        Some(Self {
            task_id: captures[1].to_string(),
            restored_hash: captures[2].to_string(),
            timestamp_ms: captures[3].parse().ok()?,
        })
    }

    /// Owning task of a restore marker or of a checkpoint's trailing
    /// `task:<id>` paragraph; tags inside the user's text are ignored
    pub fn task_id_in(message: &str) -> Option<String> {
        if let Some(marker) = Self::parse(message) {
            if !marker.task_id.is_empty() {
                return Some(marker.task_id);
            }
        }
        TASK_TRAILER
            .captures(message.trim())
            .map(|captures| captures[1].to_string())
    }
}

impl fmt::Display for RestoreMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "task:{},restore:{},Time:{}",
            self.task_id, self.restored_hash, self.timestamp_ms
        )
    }
}
