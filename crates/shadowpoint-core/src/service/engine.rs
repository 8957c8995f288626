//! Engine construction and per-task service creation

use super::{CheckpointService, RepositoryLocks};
use crate::config::CheckpointConfig;
use crate::diff::{DiffCache, DiffEngine};
use crate::error::{CheckpointError, CheckpointResult};
use crate::git::GitOperations;
use crate::interfaces::{LogSink, StorageRootProvider, TracingLogSink, WorkspaceRootResolver};
use crate::migration::MigrationRunner;
use crate::paths;
use crate::recovery::TransactionGuard;
use crate::tracker::CheckpointTracker;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

static TASK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

/// Shared state behind every [`CheckpointService`]
///
/// Built once at start-up. Owns the configuration, the diff cache, the
/// per-repository lock registry and the host collaborators.
pub struct CheckpointEngine {
    config: Arc<CheckpointConfig>,
    storage: Arc<dyn StorageRootProvider>,
    resolver: Arc<dyn WorkspaceRootResolver>,
    log: Arc<dyn LogSink>,
    cache: Arc<DiffCache>,
    locks: RepositoryLocks,
    transactions: Arc<Mutex<()>>,
}

impl CheckpointEngine {
    pub fn new(
        config: CheckpointConfig,
        storage: Arc<dyn StorageRootProvider>,
        resolver: Arc<dyn WorkspaceRootResolver>,
    ) -> CheckpointResult<Self> {
        config.validate()?;
        let cache = Arc::new(DiffCache::new(config.cache_capacity, config.cache_ttl));
        Ok(Self {
            config: Arc::new(config),
            storage,
            resolver,
            log: Arc::new(TracingLogSink),
            cache,
            locks: RepositoryLocks::new(),
            transactions: Arc::new(Mutex::new(())),
        })
    }

    /// Send best-effort diagnostics to `log`
    pub fn with_log_sink(mut self, log: Arc<dyn LogSink>) -> Self {
        self.log = log;
        self
    }

    pub fn config(&self) -> &CheckpointConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<DiffCache> {
        &self.cache
    }

    pub fn locks(&self) -> &RepositoryLocks {
        &self.locks
    }

    pub fn storage_root(&self) -> PathBuf {
        self.storage.storage_root()
    }

    /// Create the service for one task
    ///
    /// Resolves the workspace first; a missing or protected workspace fails
    /// here, before anything is written to disk.
    pub fn service_for_task(&self, task_id: &str) -> CheckpointResult<CheckpointService> {
        if !TASK_ID.is_match(task_id) {
            return Err(CheckpointError::invalid_input_field(
                format!("Invalid task id: {:?}", task_id),
                "task_id",
            ));
        }

        // Host resolvers may hand back relative or protected roots
        let workspace = paths::absolute_path(&self.resolver.workspace_root()?);
        if paths::is_protected_directory(&workspace) {
            return Err(CheckpointError::protected_directory(
                workspace.display().to_string(),
            ));
        }
        let storage_root = self.storage.storage_root();
        let git = Arc::new(GitOperations::new(
            &workspace,
            &storage_root,
            Arc::clone(&self.config),
        ));
        debug!(
            "Checkpoint service for task {} in {} (repository {})",
            task_id,
            git.workspace().display(),
            git.workspace_hash()
        );

        let tracker = CheckpointTracker::new(task_id, Arc::clone(&git));
        let diff = DiffEngine::new(
            Arc::clone(&git),
            Arc::clone(&self.cache),
            self.config.diff_concurrency,
        );
        let guard = TransactionGuard::new(&storage_root, git.workspace(), git.clone())
            .with_log_sink(Arc::clone(&self.log));
        let repo_lock = self.locks.lock_for(git.workspace_hash());

        Ok(CheckpointService::new(
            Arc::clone(&self.config),
            git,
            tracker,
            diff,
            guard,
            repo_lock,
            Arc::clone(&self.transactions),
            Arc::clone(&self.log),
        ))
    }

    /// Migration runner over this engine's storage root
    pub fn migration_runner(&self) -> MigrationRunner {
        MigrationRunner::new(self.storage.storage_root(), Arc::clone(&self.log))
    }
}
