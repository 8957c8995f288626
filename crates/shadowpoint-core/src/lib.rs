//! Shadowpoint checkpoint engine
//!
//! Snapshots a workspace into a hidden "shadow" git repository that lives
//! outside the user's own repository, with one branch per task. Provides
//! diffing, restore with append-only history, crash recovery around each
//! snapshot and migration of older on-disk layouts.

pub mod cache;
pub mod config;
pub mod diff;
pub mod error;
pub mod exclusions;
pub mod filter;
pub mod git;
pub mod interfaces;
pub mod migration;
pub mod paths;
pub mod recovery;
pub mod service;
pub mod tracker;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheEntry, CacheStatistics, TtlCache};
pub use config::{CheckpointConfig, LogFormat, LoggingConfig};
pub use diff::{DiffCache, DiffEngine};
pub use error::{CheckpointError, CheckpointResult, ResultExt};
pub use filter::{ExclusionReason, FileFilter, FileTraverser, TraversalReport};
pub use git::{GitOperations, RestoreMarker};
pub use interfaces::{
    FileLogSink, LogSink, MemoryLogSink, StaticStorageRoot, StaticWorkspaceResolver,
    StorageRootProvider, TracingLogSink, WorkspaceRootResolver,
};
pub use migration::{MigrationReport, MigrationRunner};
pub use recovery::{ChangeReporter, TransactionGuard, TransactionLock, TransactionState};
pub use service::{CheckpointEngine, CheckpointService, RepositoryLocks};
pub use tracker::{CheckpointTracker, TrackerState};
pub use types::{Checkpoint, CheckpointDiff};
