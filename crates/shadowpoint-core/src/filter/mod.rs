//! Per-file admission decisions
//!
//! A [`FileFilter`] decides whether a single path may enter a snapshot. The
//! [`FileTraverser`] applies it to a whole tree in bounded batches.

mod traverser;

#[cfg(test)]
mod tests;

pub use traverser::{FileTraverser, TraversalReport};

use crate::config::CheckpointConfig;
use crate::error::CheckpointResult;
use crate::exclusions;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Why a path was kept out of a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Matches an exclusion pattern
    Pattern,
    /// Larger than the configured ceiling
    TooLarge { size: u64 },
    /// Registered for the large-file filter
    LargeFile,
}

/// Admission filter for a single workspace
#[derive(Debug)]
pub struct FileFilter {
    root: PathBuf,
    exclusions: Gitignore,
    large_files: Gitignore,
    max_file_size: u64,
}

fn build_matcher(root: &Path, patterns: &[String]) -> CheckpointResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder.add_line(None, pattern)?;
    }
    Ok(builder.build()?)
}

impl FileFilter {
    /// Create a filter from explicit pattern lists
    pub fn new(
        root: impl Into<PathBuf>,
        patterns: &[String],
        lfs_patterns: &[String],
        max_file_size: u64,
    ) -> CheckpointResult<Self> {
        let root = root.into();
        Ok(Self {
            exclusions: build_matcher(&root, patterns)?,
            large_files: build_matcher(&root, lfs_patterns)?,
            root,
            max_file_size,
        })
    }

    /// Create the filter the engine uses for `root`: default patterns, the
    /// workspace's large-file patterns and any configured extras.
    pub async fn for_workspace(root: &Path, config: &CheckpointConfig) -> CheckpointResult<Self> {
        let lfs_patterns = exclusions::read_lfs_patterns(root).await;
        let mut patterns = exclusions::default_exclusions(&config.disabled_git_name(), &[]);
        patterns.extend(config.extra_exclusions.iter().cloned());
        Self::new(root, &patterns, &lfs_patterns, config.max_file_size)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Whether `path` (or any of its parents) matches an exclusion pattern
    pub fn matches_pattern(&self, path: &Path, is_dir: bool) -> bool {
        let relative = self.relative(path);
        if relative.is_absolute() {
            return false;
        }
        self.exclusions
            .matched_path_or_any_parents(relative, is_dir)
            .is_ignore()
    }

    fn matches_large_file(&self, path: &Path) -> bool {
        let relative = self.relative(path);
        if relative.is_absolute() {
            return false;
        }
        self.large_files
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }

    /// Reason `path` must stay out of a snapshot, if any
    ///
    /// A path that cannot be stat'd is admitted so that its deletion is
    /// still observed.
    pub async fn evaluate(&self, path: &Path) -> Option<ExclusionReason> {
        let full_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        let metadata = fs::symlink_metadata(&full_path).await.ok()?;

        if self.matches_pattern(&full_path, metadata.is_dir()) {
            return Some(ExclusionReason::Pattern);
        }
        if metadata.is_file() && metadata.len() > self.max_file_size {
            return Some(ExclusionReason::TooLarge {
                size: metadata.len(),
            });
        }
        if self.matches_large_file(&full_path) {
            return Some(ExclusionReason::LargeFile);
        }
        None
    }

    /// Whether `path` must stay out of a snapshot
    pub async fn should_exclude(&self, path: &Path) -> bool {
        self.evaluate(path).await.is_some()
    }
}
