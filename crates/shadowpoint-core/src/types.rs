//! Checkpoint data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single commit on a task branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Full commit hash
    pub hash: String,
    /// Commit subject
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Checkpoint {
    /// First seven characters of the hash
    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }

    /// Whether this checkpoint records a restore rather than new work
    pub fn is_restore_marker(&self) -> bool {
        crate::git::RestoreMarker::parse(&self.message).is_some()
    }
}

/// Whole-file before/after capture for one changed path
///
/// An empty string means the file is absent at that revision (or binary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointDiff {
    /// Path relative to the workspace root, `/`-separated
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub before: String,
    pub after: String,
}

impl CheckpointDiff {
    /// Combined size used against the diff ceiling
    pub fn size(&self) -> u64 {
        (self.before.len() + self.after.len()) as u64
    }
}
