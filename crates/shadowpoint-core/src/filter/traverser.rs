//! Batched, concurrency-limited directory traversal

use super::{ExclusionReason, FileFilter};
use crate::error::CheckpointResult;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Outcome of a traversal
#[derive(Debug, Default, Clone)]
pub struct TraversalReport {
    /// Admitted files (absolute paths)
    pub included: Vec<PathBuf>,
    /// Rejected files with the reason
    pub excluded: Vec<(PathBuf, ExclusionReason)>,
}

impl TraversalReport {
    /// Rejected files that no pattern covers, i.e. rejected for their size
    /// or large-file registration
    pub fn size_rejections(&self) -> impl Iterator<Item = &Path> {
        self.excluded
            .iter()
            .filter(|(_, reason)| *reason != ExclusionReason::Pattern)
            .map(|(path, _)| path.as_path())
    }
}

/// Walks a workspace and applies a [`FileFilter`] to every file
pub struct FileTraverser {
    filter: Arc<FileFilter>,
    batch_size: usize,
    limiter: Arc<Semaphore>,
    include_dot_files: bool,
    masked_marker: String,
}

impl FileTraverser {
    pub fn new(filter: Arc<FileFilter>, batch_size: usize, concurrency: usize) -> Self {
        Self {
            filter,
            batch_size: batch_size.max(1),
            limiter: Arc::new(Semaphore::new(concurrency.max(1))),
            include_dot_files: false,
            masked_marker: ".git_disabled".to_string(),
        }
    }

    /// Descend into dot-files and dot-directories too
    pub fn with_dot_files(mut self, include: bool) -> Self {
        self.include_dot_files = include;
        self
    }

    /// Name nested repository markers carry while masked
    pub fn with_masked_marker(mut self, name: impl Into<String>) -> Self {
        self.masked_marker = name.into();
        self
    }

    /// Admitted files only
    pub async fn traverse_files(&self) -> CheckpointResult<Vec<PathBuf>> {
        Ok(self.traverse().await?.included)
    }

    /// Walk the tree, then decide admission batch by batch
    pub async fn traverse(&self) -> CheckpointResult<TraversalReport> {
        let candidates = self.collect_candidates().await?;
        debug!(
            "Traversal found {} candidate files under {}",
            candidates.len(),
            self.filter.root().display()
        );

        let mut report = TraversalReport::default();
        for batch in candidates.chunks(self.batch_size) {
            let decisions = join_all(batch.iter().map(|path| {
                let limiter = Arc::clone(&self.limiter);
                let filter = Arc::clone(&self.filter);
                async move {
                    let _permit = limiter.acquire_owned().await.ok();
                    (path.clone(), filter.evaluate(path).await)
                }
            }))
            .await;

            for (path, decision) in decisions {
                match decision {
                    Some(reason) => report.excluded.push((path, reason)),
                    None => report.included.push(path),
                }
            }
        }
        Ok(report)
    }

    async fn collect_candidates(&self) -> CheckpointResult<Vec<PathBuf>> {
        let root = self.filter.root().to_path_buf();
        let filter = Arc::clone(&self.filter);
        let include_dot_files = self.include_dot_files;
        let masked_marker = self.masked_marker.clone();

        tokio::task::spawn_blocking(move || -> CheckpointResult<Vec<PathBuf>> {
            let keep = |entry: &DirEntry| {
                if entry.depth() == 0 {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if name == ".git" || name == masked_marker.as_str() {
                    return false;
                }
                if !include_dot_files && name.starts_with('.') {
                    return false;
                }
                !(entry.file_type().is_dir() && filter.matches_pattern(entry.path(), true))
            };

            let mut files = Vec::new();
            for entry in WalkDir::new(&root).into_iter().filter_entry(keep) {
                let entry = entry?;
                if !entry.file_type().is_dir() {
                    files.push(entry.into_path());
                }
            }
            Ok(files)
        })
        .await?
    }
}
