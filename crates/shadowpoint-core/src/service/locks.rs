//! Per-repository mutual exclusion

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry of one read/write lock per shadow repository, keyed by the
/// hashed workspace path
///
/// Mutations (save, restore, branch switches, work-tree diffs) take the
/// write side; revision-to-revision diffs and history reads share the read
/// side.
#[derive(Debug, Clone, Default)]
pub struct RepositoryLocks {
    locks: Arc<DashMap<String, Arc<RwLock<()>>>>,
}

impl RepositoryLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `workspace_hash`, created on first use
    pub fn lock_for(&self, workspace_hash: &str) -> Arc<RwLock<()>> {
        self.locks
            .entry(workspace_hash.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
