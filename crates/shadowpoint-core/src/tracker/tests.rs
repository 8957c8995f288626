//! Tests for the checkpoint tracker

use super::*;
use crate::config::CheckpointConfig;
use crate::git::RestoreMarker;
use std::fs;
use tempfile::TempDir;

fn git_for(workspace: &TempDir, storage: &TempDir) -> Arc<GitOperations> {
    let config = CheckpointConfig::default().with_identity("Shadowpoint Test", "test@shadowpoint.dev");
    Arc::new(GitOperations::new(
        workspace.path(),
        storage.path(),
        Arc::new(config),
    ))
}

#[tokio::test]
async fn test_operations_require_initialization() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));

    assert_eq!(tracker.state().await, TrackerState::Uninitialized);
    let err = tracker.create_checkpoint("early").await.unwrap_err();
    assert!(matches!(err, CheckpointError::NotInitialized { .. }));
    assert!(tracker.history().await.is_err());
    assert!(!tracker.git().exists());
}

#[tokio::test]
async fn test_initialize_is_idempotent() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));

    tracker.initialize().await.unwrap();
    fs::write(workspace.path().join("a.txt"), "a").unwrap();
    let hash = tracker.create_checkpoint("first").await.unwrap();
    tracker.initialize().await.unwrap();

    assert_eq!(tracker.state().await, TrackerState::Ready);
    assert_eq!(tracker.history().await.unwrap()[0].hash, hash);
}

#[tokio::test]
async fn test_new_tracker_resumes_existing_branch() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let git = git_for(&workspace, &storage);

    let first = CheckpointTracker::new("t1", Arc::clone(&git));
    first.initialize().await.unwrap();
    fs::write(workspace.path().join("a.txt"), "a").unwrap();
    first.create_checkpoint("first").await.unwrap();

    let second = CheckpointTracker::new("t1", git);
    second.initialize().await.unwrap();
    assert_eq!(second.commit_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_checkpoint_message_carries_task() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t-42", git_for(&workspace, &storage));
    tracker.initialize().await.unwrap();

    fs::write(workspace.path().join("a.txt"), "a").unwrap();
    let hash = tracker.create_checkpoint("edit a").await.unwrap();

    let message = tracker.git().commit_message(&hash).await.unwrap();
    assert_eq!(message, "edit a\n\ntask:t-42");
    let history = tracker.history().await.unwrap();
    assert_eq!(history[0].message, "edit a");
    assert!(!history[0].is_restore_marker());
}

#[tokio::test]
async fn test_restore_keeps_in_flight_changes() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));
    tracker.initialize().await.unwrap();

    fs::write(workspace.path().join("app.js"), "v1").unwrap();
    let c1 = tracker.create_checkpoint("c1").await.unwrap();
    fs::write(workspace.path().join("app.js"), "v2").unwrap();
    tracker.create_checkpoint("c2").await.unwrap();
    fs::write(workspace.path().join("notes.txt"), "unsaved").unwrap();

    let marker = tracker.restore_checkpoint(&c1).await.unwrap();

    assert_eq!(fs::read_to_string(workspace.path().join("app.js")).unwrap(), "v1");
    assert_eq!(
        fs::read_to_string(workspace.path().join("notes.txt")).unwrap(),
        "unsaved"
    );
    let history = tracker.history().await.unwrap();
    assert_eq!(history[0].hash, marker);
    assert!(history[0].is_restore_marker());
    assert_eq!(
        RestoreMarker::parse(&history[0].message).unwrap().restored_hash,
        c1
    );
}

#[tokio::test]
async fn test_restore_over_conflicting_edit_leaves_clean_tree() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));
    tracker.initialize().await.unwrap();

    let app = workspace.path().join("app.js");
    fs::write(&app, "v1\n").unwrap();
    let c1 = tracker.create_checkpoint("c1").await.unwrap();
    fs::write(&app, "v2\n").unwrap();
    tracker.create_checkpoint("c2").await.unwrap();
    fs::write(&app, "v3\n").unwrap();

    let marker = tracker.restore_checkpoint(&c1).await.unwrap();

    assert_eq!(fs::read_to_string(&app).unwrap(), "v1\n");
    assert!(!tracker.git().has_changes().await.unwrap());
    assert_eq!(tracker.git().stash_count().await.unwrap(), 1);
    assert_eq!(tracker.history().await.unwrap()[0].hash, marker);
}

#[tokio::test]
async fn test_failed_restore_puts_changes_back() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));
    tracker.initialize().await.unwrap();
    fs::write(workspace.path().join("draft.txt"), "wip").unwrap();

    let result = tracker
        .restore_checkpoint("0123456789abcdef0123456789abcdef01234567")
        .await;

    assert!(result.is_err());
    assert_eq!(
        fs::read_to_string(workspace.path().join("draft.txt")).unwrap(),
        "wip"
    );
    assert_eq!(tracker.git().stash_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_nested_repository_is_snapshotted_and_unmasked() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let tracker = CheckpointTracker::new("t1", git_for(&workspace, &storage));
    tracker.initialize().await.unwrap();

    let nested = workspace.path().join("lib").join("inner");
    fs::create_dir_all(nested.join(".git")).unwrap();
    fs::write(nested.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
    fs::write(nested.join("code.rs"), "fn main() {}").unwrap();

    let hash = tracker.create_checkpoint("nested").await.unwrap();

    assert!(nested.join(".git").exists());
    assert!(!nested.join(".git_disabled").exists());
    let files = tracker.git().changed_files("main", &hash).await.unwrap();
    let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["lib/inner/code.rs"]);
}

#[tokio::test]
async fn test_two_tasks_share_one_repository() {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let git = git_for(&workspace, &storage);
    let first = CheckpointTracker::new("a", Arc::clone(&git));
    let second = CheckpointTracker::new("b", Arc::clone(&git));
    first.initialize().await.unwrap();
    second.initialize().await.unwrap();

    fs::write(workspace.path().join("x.txt"), "1").unwrap();
    first.create_checkpoint("from a").await.unwrap();
    fs::write(workspace.path().join("x.txt"), "2").unwrap();
    second.create_checkpoint("from b").await.unwrap();

    assert_eq!(first.commit_count().await.unwrap(), 1);
    assert_eq!(second.commit_count().await.unwrap(), 1);
    let mut branches = git.list_task_branches().await.unwrap();
    branches.sort();
    assert_eq!(branches, vec!["task-a".to_string(), "task-b".to_string()]);
}
