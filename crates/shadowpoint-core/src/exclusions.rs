//! Default exclusion patterns for the shadow repository
//!
//! Patterns use gitignore syntax and are written to the shadow repository's
//! `info/exclude`, so they never touch the user's own `.gitignore`.

use crate::error::{CheckpointError, CheckpointResult};
use std::path::Path;
use tokio::fs;

/// Attribute marking a path for the large-file filter
const LFS_FILTER_MARKER: &str = "filter=lfs";

/// Dependency folders, compiler output and IDE state
pub fn build_artifact_patterns() -> Vec<&'static str> {
    vec![
        ".gradle/",
        ".idea/",
        ".next/",
        ".nuxt/",
        ".parcel-cache/",
        ".pytest_cache/",
        ".sass-cache/",
        ".vs/",
        ".vscode/",
        "Pods/",
        "__pycache__/",
        "bin/",
        "build/",
        "bundle/",
        "coverage/",
        "deps/",
        "dist/",
        "env/",
        "node_modules/",
        "obj/",
        "out/",
        "pkg/",
        "target/",
        "temp/",
        "vendor/",
        "venv/",
        ".venv/",
    ]
}

/// Images, audio, video and fonts
pub fn media_patterns() -> Vec<&'static str> {
    vec![
        "*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp", "*.ico", "*.webp", "*.tiff", "*.tif",
        "*.raw", "*.heic", "*.avif", "*.psd", "*.mp3", "*.wav", "*.flac", "*.ogg", "*.aac",
        "*.m4a", "*.mp4", "*.mov", "*.avi", "*.mkv", "*.webm", "*.wmv", "*.woff", "*.woff2",
        "*.ttf", "*.otf", "*.eot",
    ]
}

/// Caches, editor swap files and temporary downloads
pub fn cache_patterns() -> Vec<&'static str> {
    vec![
        "*.DS_Store",
        "*.bak",
        "*.cache",
        "*.crdownload",
        "*.dmp",
        "*.dump",
        "*.eslintcache",
        "*.old",
        "*.part",
        "*.partial",
        "*.pyc",
        "*.pyo",
        "*.stackdump",
        "*.swo",
        "*.swp",
        "*.temp",
        "*.tmp",
        "Thumbs.db",
    ]
}

/// Environment and secret files
pub fn env_patterns() -> Vec<&'static str> {
    vec![
        ".env",
        ".env.*",
        "*.env",
        "*.pem",
        "*.key",
        "*.p12",
        "*.pfx",
        "id_rsa*",
        "id_ed25519*",
        ".npmrc",
        ".netrc",
    ]
}

/// Archives and compiled binaries
pub fn archive_patterns() -> Vec<&'static str> {
    vec![
        "*.zip", "*.tar", "*.gz", "*.tgz", "*.bz2", "*.xz", "*.rar", "*.7z", "*.iso",
        "*.dmg", "*.jar", "*.war", "*.exe", "*.dll", "*.so", "*.dylib", "*.bin", "*.o",
        "*.a", "*.class",
    ]
}

/// Databases and bulk data formats
pub fn database_patterns() -> Vec<&'static str> {
    vec![
        "*.db",
        "*.sqlite",
        "*.sqlite3",
        "*.db-journal",
        "*.db-wal",
        "*.db-shm",
        "*.mdb",
        "*.accdb",
        "*.parquet",
        "*.arrow",
        "*.avro",
        "*.orc",
        "*.rdb",
        "*.bson",
        "*.ibd",
        "*.frm",
    ]
}

/// Log output
pub fn log_patterns() -> Vec<&'static str> {
    vec![
        "*.log",
        "*.logs",
        "logs/",
        "npm-debug.log*",
        "yarn-debug.log*",
        "yarn-error.log*",
        "*.stdout",
        "*.stderr",
    ]
}

/// Repository markers that must never be staged, masked ones included
pub fn repository_marker_patterns(disabled_git_name: &str) -> Vec<String> {
    vec![".git/".to_string(), format!("{}/", disabled_git_name)]
}

/// The full default pattern set followed by workspace large-file patterns
pub fn default_exclusions(disabled_git_name: &str, lfs_patterns: &[String]) -> Vec<String> {
    let mut patterns = repository_marker_patterns(disabled_git_name);
    for category in [
        build_artifact_patterns(),
        media_patterns(),
        cache_patterns(),
        env_patterns(),
        archive_patterns(),
        database_patterns(),
        log_patterns(),
    ] {
        patterns.extend(category.into_iter().map(String::from));
    }
    patterns.extend(lfs_patterns.iter().cloned());
    patterns
}

/// Extract the leading pattern of every `.gitattributes` line tagged for LFS
pub fn parse_lfs_patterns(attributes: &str) -> Vec<String> {
    attributes
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && line.contains(LFS_FILTER_MARKER))
        .filter_map(|line| line.split_whitespace().next())
        .map(String::from)
        .collect()
}

/// Read large-file patterns from the workspace's `.gitattributes`
///
/// A missing or unreadable attributes file yields no patterns.
pub async fn read_lfs_patterns(workspace: &Path) -> Vec<String> {
    match fs::read_to_string(workspace.join(".gitattributes")).await {
        Ok(content) => parse_lfs_patterns(&content),
        Err(_) => Vec::new(),
    }
}

/// Write `patterns` to `<git_dir>/info/exclude`, replacing its content
pub async fn write_exclusions(git_dir: &Path, patterns: &[String]) -> CheckpointResult<()> {
    let info_dir = git_dir.join("info");
    fs::create_dir_all(&info_dir).await.map_err(|e| {
        CheckpointError::io_with_path(
            format!("Failed to create exclude directory: {}", e),
            info_dir.display().to_string(),
        )
    })?;

    let mut content = String::from("# Managed by shadowpoint; regenerated before staging\n");
    for pattern in patterns {
        content.push_str(pattern);
        content.push('\n');
    }

    let exclude_path = info_dir.join("exclude");
    fs::write(&exclude_path, content).await.map_err(|e| {
        CheckpointError::io_with_path(
            format!("Failed to write exclusions: {}", e),
            exclude_path.display().to_string(),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_cover_every_category() {
        let patterns = default_exclusions(".git_disabled", &[]);
        for expected in [
            ".git/",
            ".git_disabled/",
            "node_modules/",
            "*.png",
            "*.swp",
            ".env",
            "*.zip",
            "*.sqlite",
            "*.log",
        ] {
            assert!(
                patterns.iter().any(|p| p == expected),
                "missing {}",
                expected
            );
        }
    }

    #[test]
    fn test_lfs_patterns_are_appended_last() {
        let lfs = vec!["*.psd".to_string(), "assets/**".to_string()];
        let patterns = default_exclusions(".git_disabled", &lfs);
        assert_eq!(&patterns[patterns.len() - 2..], lfs.as_slice());
    }

    #[test]
    fn test_parse_lfs_patterns() {
        let attributes = "\
# comment filter=lfs
*.psd filter=lfs diff=lfs merge=lfs -text
*.rs text eol=lf

models/*.bin filter=lfs diff=lfs merge=lfs -text
";
        assert_eq!(parse_lfs_patterns(attributes), vec!["*.psd", "models/*.bin"]);
    }

    #[tokio::test]
    async fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = temp_dir.path();
        fs::write(
            workspace.join(".gitattributes"),
            "*.mov filter=lfs diff=lfs merge=lfs -text\n",
        )
        .await
        .unwrap();

        let lfs = read_lfs_patterns(workspace).await;
        assert_eq!(lfs, vec!["*.mov"]);

        let git_dir = workspace.join("shadow/.git");
        write_exclusions(&git_dir, &default_exclusions(".git_disabled", &lfs))
            .await
            .unwrap();
        let written = fs::read_to_string(git_dir.join("info/exclude")).await.unwrap();
        assert!(written.lines().any(|l| l == "node_modules/"));
        assert!(written.lines().any(|l| l == "*.mov"));
    }

    #[tokio::test]
    async fn test_missing_attributes_file_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_lfs_patterns(temp_dir.path()).await.is_empty());
    }
}
