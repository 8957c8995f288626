//! Cached, concurrency-limited diff computation
//!
//! [`DiffEngine`] sits on top of [`GitOperations`] and the engine-wide
//! [`TtlCache`]. Changed paths come from one `git diff` call; blob reads for
//! each path then run concurrently under a semaphore.


use crate::cache::{CacheStatistics, TtlCache};
use crate::error::{CheckpointError, CheckpointResult, ResultExt};
use crate::git::{ChangedFile, GitOperations};
use crate::types::CheckpointDiff;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Shared cache of computed diffs, keyed per workspace and revision pair
pub type DiffCache = TtlCache<String, Arc<Vec<CheckpointDiff>>>;

/// Diff computation for one shadow repository
#[derive(Clone)]
pub struct DiffEngine {
    git: Arc<GitOperations>,
    cache: Arc<DiffCache>,
    limiter: Arc<Semaphore>,
    warmup_limiter: Arc<Semaphore>,
}

impl DiffEngine {
    /// Create an engine reading at most `concurrency` blobs at a time
    pub fn new(git: Arc<GitOperations>, cache: Arc<DiffCache>, concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            git,
            cache,
            limiter: Arc::new(Semaphore::new(concurrency)),
            // Warmup jobs never share permits with the reads they drive
            warmup_limiter: Arc::new(Semaphore::new(concurrency)),
        }
    }

    fn cache_key(&self, from: &str, to: &str) -> String {
        format!("{}:{}:{}", self.git.workspace_hash(), from, to)
    }

    /// Whether the diff between two full commit hashes is cached
    pub fn is_cached(&self, from: &str, to: &str) -> bool {
        self.cache.contains(&self.cache_key(from, to))
    }

    /// Diff two revisions, serving repeated requests from the cache
    ///
    /// Both sides are resolved to commit hashes first, so symbolic names
    /// such as `HEAD` never hit a stale entry.
    pub async fn compute_diff(&self, from: &str, to: &str) -> CheckpointResult<Vec<CheckpointDiff>> {
        let from = self.git.resolve_commit(from).await?;
        let to = self.git.resolve_commit(to).await?;
        self.compute_resolved(&from, &to).await
    }

    async fn compute_resolved(&self, from: &str, to: &str) -> CheckpointResult<Vec<CheckpointDiff>> {
        let key = self.cache_key(from, to);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Diff cache hit for {}..{}", from, to);
            return Ok(cached.as_ref().clone());
        }

        let diffs = if from == to {
            Vec::new()
        } else {
            let changed = self.git.changed_files(from, to).await?;
            self.read_contents(from, to, changed).await?
        };

        self.cache.set(key, Arc::new(diffs.clone()));
        Ok(diffs)
    }

    async fn read_contents(
        &self,
        from: &str,
        to: &str,
        changed: Vec<ChangedFile>,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        let reads = changed.into_iter().map(|file| {
            let limiter = Arc::clone(&self.limiter);
            let git = Arc::clone(&self.git);
            async move {
                let _permit = limiter.acquire_owned().await.context("Diff limiter closed")?;
                let before = git.show_file(from, &file.path).await?;
                let after = git.show_file(to, &file.path).await?;
                Ok::<_, CheckpointError>(CheckpointDiff {
                    absolute_path: git.workspace().join(&file.path),
                    relative_path: file.path,
                    before,
                    after,
                })
            }
        });

        join_all(reads).await.into_iter().collect()
    }

    /// Diff `base..target`, reusing a cached `base..last_known` result when
    /// nothing changed between `last_known` and `target`
    pub async fn compute_incremental_diff(
        &self,
        base: &str,
        target: &str,
        last_known: Option<&str>,
    ) -> CheckpointResult<Vec<CheckpointDiff>> {
        let Some(last_known) = last_known else {
            return self.compute_diff(base, target).await;
        };
        let base = self.git.resolve_commit(base).await?;
        let target = self.git.resolve_commit(target).await?;
        let last_known = self.git.resolve_commit(last_known).await?;

        if self.git.changed_files(&last_known, &target).await?.is_empty() {
            if let Some(cached) = self.cache.get(&self.cache_key(&base, &last_known)) {
                debug!("Reusing cached diff {}..{}", base, last_known);
                return Ok(cached.as_ref().clone());
            }
        }
        self.compute_resolved(&last_known, &target).await
    }

    /// Precompute the diff of every ordered pair in `hashes` not yet cached
    ///
    /// Returns how many diffs were computed. Failures are logged and skipped.
    pub async fn warmup_cache(&self, hashes: &[String]) -> usize {
        let mut resolved = Vec::with_capacity(hashes.len());
        for hash in hashes {
            match self.git.resolve_commit(hash).await {
                Ok(full) => resolved.push(full),
                Err(e) => warn!("Skipping warmup of {}: {}", hash, e),
            }
        }
        let hashes = resolved;

        let mut pairs = Vec::new();
        for (i, from) in hashes.iter().enumerate() {
            for to in &hashes[i + 1..] {
                if !self.is_cached(from, to) {
                    pairs.push((from.clone(), to.clone()));
                }
            }
        }

        let jobs = pairs.into_iter().map(|(from, to)| {
            let limiter = Arc::clone(&self.warmup_limiter);
            async move {
                let _permit = limiter.acquire_owned().await.ok()?;
                match self.compute_resolved(&from, &to).await {
                    Ok(_) => Some(()),
                    Err(e) => {
                        warn!("Warmup of {}..{} failed: {}", from, to, e);
                        None
                    }
                }
            }
        });

        let computed = join_all(jobs).await.into_iter().flatten().count();
        debug!("Warmed {} diffs", computed);
        computed
    }

    /// Drop every cached diff of this workspace
    pub fn invalidate(&self) -> usize {
        let prefix = format!("{}:", self.git.workspace_hash());
        self.cache.remove_where(|key| key.starts_with(&prefix))
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }
}
