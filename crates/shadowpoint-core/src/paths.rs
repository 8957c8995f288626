//! Path helpers shared by every component
//!
//! Workspace paths are made absolute against the current directory and
//! normalized lexically (symlinks are not resolved) so that the work-tree
//! pointer stored in the shadow repository compares equal no matter how the
//! workspace path was spelled by the caller.

use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};

/// Windows refuses ordinary paths beyond this length
const WINDOWS_MAX_PATH: usize = 260;

/// Remove `.` and `..` components and trailing separators without touching
/// the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match normalized.components().next_back() {
                    Some(Component::Normal(_)) => normalized.pop(),
                    _ => false,
                };
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Absolute, normalized form of `path`, resolved against the current
/// directory when relative
pub fn absolute_path(path: &Path) -> PathBuf {
    match std::path::absolute(path) {
        Ok(absolute) => normalize_path(&absolute),
        Err(_) => normalize_path(path),
    }
}

/// Forward-slash form of a path, as git expects in pathspecs and listings
pub fn to_posix(path: &Path) -> String {
    let text = path.to_string_lossy();
    if cfg!(windows) {
        text.replace('\\', "/")
    } else {
        text.into_owned()
    }
}

/// Prefix long absolute Windows paths with `\\?\`; identity elsewhere
pub fn to_long_path(path: &Path) -> PathBuf {
    if cfg!(windows) {
        let text = path.to_string_lossy();
        if path.is_absolute() && text.len() >= WINDOWS_MAX_PATH && !text.starts_with(r"\\?\") {
            return PathBuf::from(format!(r"\\?\{}", text));
        }
    }
    path.to_path_buf()
}

/// Compare two paths after normalization
///
/// Case-insensitive on Windows and macOS, whose default filesystems are.
pub fn paths_equal(a: &Path, b: &Path) -> bool {
    let a = to_posix(&normalize_path(a));
    let b = to_posix(&normalize_path(b));
    if cfg!(any(windows, target_os = "macos")) {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}

/// Stable identifier for a workspace, used as the shadow repository name
pub fn hash_workspace_path(workspace: &Path) -> String {
    let normalized = to_posix(&normalize_path(workspace));
    let digest = Sha256::digest(normalized.as_bytes());
    digest
        .iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// `path` relative to `root`, or `None` if it lies outside
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    normalize_path(path)
        .strip_prefix(normalize_path(root))
        .ok()
        .map(Path::to_path_buf)
}

/// Directories checkpoints refuse to snapshot
pub fn protected_directories() -> Vec<PathBuf> {
    [
        dirs::home_dir(),
        dirs::desktop_dir(),
        dirs::document_dir(),
        dirs::download_dir(),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Whether `path` is the home, desktop, documents or downloads directory
pub fn is_protected_directory(path: &Path) -> bool {
    let path = absolute_path(path);
    protected_directories()
        .iter()
        .any(|protected| paths_equal(protected, &path))
}
