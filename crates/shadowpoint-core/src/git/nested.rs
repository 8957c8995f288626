//! Masking of repositories nested inside the workspace
//!
//! Git treats a directory holding a `.git` entry as a repository boundary
//! and records it as a gitlink instead of its files. Renaming the marker to
//! `.git_disabled` for the duration of a staging operation makes the nested
//! tree ordinary content.

use super::GitOperations;
use crate::filter::FileFilter;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

const GIT_MARKER: &str = ".git";

impl GitOperations {
    /// Rename nested `.git` markers to the disabled name (`disable = true`)
    /// or back. Never fails; returns how many markers were renamed.
    pub async fn rename_nested_git_repos(&self, disable: bool) -> usize {
        let disabled_name = self.config().disabled_git_name();
        let (from, to) = if disable {
            (GIT_MARKER.to_string(), disabled_name.clone())
        } else {
            (disabled_name.clone(), GIT_MARKER.to_string())
        };

        let filter = match FileFilter::for_workspace(self.workspace(), self.config()).await {
            Ok(filter) => Some(filter),
            Err(e) => {
                debug!("Scanning nested repositories without pruning: {}", e);
                None
            }
        };

        let root = self.workspace().to_path_buf();
        let from_name = from.clone();
        let scan = tokio::task::spawn_blocking(move || {
            find_markers(root, &from_name, &disabled_name, filter.as_ref())
        })
        .await;

        let markers = match scan {
            Ok(markers) => markers,
            Err(e) => {
                warn!("Nested repository scan failed: {}", e);
                return 0;
            }
        };

        let mut renamed = 0;
        for marker in markers {
            let target = marker.with_file_name(&to);
            if fs::symlink_metadata(&target).await.is_ok() {
                warn!(
                    "Not renaming {}: {} already exists",
                    marker.display(),
                    target.display()
                );
                continue;
            }
            match fs::rename(&marker, &target).await {
                Ok(()) => renamed += 1,
                Err(e) => warn!("Failed to rename {}: {}", marker.display(), e),
            }
        }

        if renamed > 0 {
            debug!(
                "{} {} nested repositories",
                if disable { "Masked" } else { "Unmasked" },
                renamed
            );
        }
        renamed
    }
}

/// Markers named `from` below the workspace root; the root's own marker is
/// never reported and excluded directories are not entered
fn find_markers(
    root: PathBuf,
    from: &str,
    disabled_name: &str,
    filter: Option<&FileFilter>,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(&root).into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name == GIT_MARKER || name == disabled_name {
            if entry.depth() >= 2 && name == from {
                found.push(entry.path().to_path_buf());
            }
            if entry.file_type().is_dir() {
                walker.skip_current_dir();
            }
            continue;
        }

        if entry.file_type().is_dir()
            && filter.is_some_and(|filter| filter.matches_pattern(entry.path(), true))
        {
            walker.skip_current_dir();
        }
    }
    found
}
