use super::*;
use crate::config::CheckpointConfig;
use std::sync::Arc;
use tempfile::TempDir;

const CEILING: u64 = 4096;

async fn write_sized(path: &Path, size: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.unwrap();
    }
    let file = fs::File::create(path).await.unwrap();
    file.set_len(size).await.unwrap();
}

async fn workspace_filter(root: &Path) -> FileFilter {
    let config = CheckpointConfig::default().with_max_file_size(CEILING);
    FileFilter::for_workspace(root, &config).await.unwrap()
}

#[tokio::test]
async fn test_size_ceiling_boundary() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let filter = workspace_filter(root).await;

    let over = root.join("data.txt");
    write_sized(&over, CEILING + 1).await;
    assert_eq!(
        filter.evaluate(&over).await,
        Some(ExclusionReason::TooLarge { size: CEILING + 1 })
    );

    write_sized(&over, CEILING - 1).await;
    assert!(!filter.should_exclude(&over).await);
}

#[tokio::test]
async fn test_patterns_match_files_and_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let filter = workspace_filter(root).await;

    write_sized(&root.join("node_modules/pkg/index.js"), 10).await;
    write_sized(&root.join("debug.log"), 10).await;
    write_sized(&root.join("src/main.rs"), 10).await;

    assert_eq!(
        filter.evaluate(&root.join("node_modules/pkg/index.js")).await,
        Some(ExclusionReason::Pattern)
    );
    assert!(filter.should_exclude(Path::new("debug.log")).await);
    assert!(!filter.should_exclude(&root.join("src/main.rs")).await);
}

#[tokio::test]
async fn test_missing_file_is_admitted() {
    let temp_dir = TempDir::new().unwrap();
    let filter = workspace_filter(temp_dir.path()).await;
    assert!(!filter.should_exclude(&temp_dir.path().join("gone.log")).await);
}

#[tokio::test]
async fn test_large_file_patterns_from_attributes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join(".gitattributes"),
        "*.blend filter=lfs diff=lfs merge=lfs -text\n",
    )
    .await
    .unwrap();
    write_sized(&root.join("scene.blend"), 10).await;

    let filter = workspace_filter(root).await;
    assert_eq!(
        filter.evaluate(&root.join("scene.blend")).await,
        Some(ExclusionReason::LargeFile)
    );
}

#[tokio::test]
async fn test_extra_exclusions_are_honored() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_sized(&root.join("notes.draft"), 10).await;

    let config = CheckpointConfig::default().with_extra_exclusions(["*.draft"]);
    let filter = FileFilter::for_workspace(root, &config).await.unwrap();
    assert!(filter.should_exclude(&root.join("notes.draft")).await);
}

#[tokio::test]
async fn test_traverser_batches_and_prunes() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for name in ["a.rs", "b.rs", "c.rs", "src/d.rs", "src/e.rs"] {
        write_sized(&root.join(name), 5).await;
    }
    write_sized(&root.join("huge.txt"), CEILING * 2).await;
    write_sized(&root.join("node_modules/x/index.js"), 5).await;
    write_sized(&root.join(".hidden/secret.rs"), 5).await;
    write_sized(&root.join("sub/.git/HEAD"), 5).await;

    let filter = Arc::new(workspace_filter(root).await);
    let report = FileTraverser::new(filter, 2, 3).traverse().await.unwrap();

    let mut included: Vec<_> = report
        .included
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
        .collect();
    included.sort();
    assert_eq!(
        included,
        vec![
            PathBuf::from("a.rs"),
            PathBuf::from("b.rs"),
            PathBuf::from("c.rs"),
            PathBuf::from("src/d.rs"),
            PathBuf::from("src/e.rs"),
        ]
    );

    let rejected: Vec<_> = report.size_rejections().collect();
    assert_eq!(rejected, vec![root.join("huge.txt").as_path()]);
}

#[tokio::test]
async fn test_traverser_can_include_dot_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_sized(&root.join(".config/settings.toml"), 5).await;

    let filter = Arc::new(workspace_filter(root).await);
    let files = FileTraverser::new(filter, 1000, 5)
        .with_dot_files(true)
        .traverse_files()
        .await
        .unwrap();
    assert_eq!(files, vec![root.join(".config/settings.toml")]);
}
