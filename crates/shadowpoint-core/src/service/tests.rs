//! Tests for the checkpoint service

use super::*;
use crate::config::CheckpointConfig;
use crate::error::{CheckpointError, CheckpointResult};
use crate::interfaces::{MemoryLogSink, StaticStorageRoot, StaticWorkspaceResolver};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    workspace: TempDir,
    storage: TempDir,
    engine: CheckpointEngine,
    sink: Arc<MemoryLogSink>,
}

fn test_config() -> CheckpointConfig {
    CheckpointConfig::default().with_identity("Shadowpoint Test", "test@shadowpoint.dev")
}

fn fixture_with(config: CheckpointConfig) -> Fixture {
    let workspace = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    let sink = Arc::new(MemoryLogSink::new());
    let engine = CheckpointEngine::new(
        config,
        Arc::new(StaticStorageRoot::new(storage.path())),
        Arc::new(StaticWorkspaceResolver::new(workspace.path())),
    )
    .unwrap()
    .with_log_sink(sink.clone());
    Fixture {
        workspace,
        storage,
        engine,
        sink,
    }
}

impl Fixture {
    fn write(&self, relative: &str, content: &str) {
        fs::write(self.workspace.path().join(relative), content).unwrap();
    }

    async fn service(&self, task_id: &str) -> CheckpointService {
        let service = self.engine.service_for_task(task_id).unwrap();
        service.initialize().await.unwrap();
        service
    }
}

struct HomeResolver;

impl crate::interfaces::WorkspaceRootResolver for HomeResolver {
    fn workspace_root(&self) -> CheckpointResult<std::path::PathBuf> {
        dirs::home_dir().ok_or_else(|| CheckpointError::invalid_input("no home"))
    }
}

#[test]
fn test_engine_rejects_protected_root_from_host_resolver() {
    if dirs::home_dir().is_none() {
        return;
    }
    let storage = TempDir::new().unwrap();
    let engine = CheckpointEngine::new(
        test_config(),
        Arc::new(StaticStorageRoot::new(storage.path())),
        Arc::new(HomeResolver),
    )
    .unwrap();

    let err = engine.service_for_task("t1").err().unwrap();
    assert!(matches!(err, CheckpointError::ProtectedDirectory { .. }));
}

#[tokio::test]
async fn test_operations_before_initialize_fail() {
    let fixture = fixture_with(test_config());
    let service = fixture.engine.service_for_task("t1").unwrap();

    let err = service.save_checkpoint("early").await.unwrap_err();
    assert!(matches!(err, CheckpointError::NotInitialized { .. }));
    assert!(matches!(
        service.get_history().await,
        Err(CheckpointError::NotInitialized { .. })
    ));
    assert!(!fixture.storage.path().join(".checkpoint-lock").exists());
}

#[tokio::test]
async fn test_invalid_task_id_is_rejected() {
    let fixture = fixture_with(test_config());
    for bad in ["", "has space", "a/b", "x~1"] {
        let result = fixture.engine.service_for_task(bad);
        assert!(
            matches!(result, Err(CheckpointError::InvalidInput { .. })),
            "{:?} accepted",
            bad
        );
    }
}

#[tokio::test]
async fn test_save_is_idempotent_without_changes() {
    let fixture = fixture_with(test_config());
    let service = fixture.service("t1").await;
    fixture.write("a.txt", "a");

    let first = service.save_checkpoint("one").await.unwrap();
    let second = service.save_checkpoint("two").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(service.get_history().await.unwrap().len(), 1);
    assert!(!fixture.storage.path().join(".checkpoint-lock").exists());
    assert!(!fixture.storage.path().join(".checkpoint-backup").exists());
}

#[tokio::test]
async fn test_oversized_diffs_are_omitted() {
    let fixture = fixture_with(test_config().with_max_diff_size(10));
    let service = fixture.service("t1").await;
    fixture.write("small.txt", "a");
    fixture.write("large.txt", "short");
    let c1 = service.save_checkpoint("c1").await.unwrap();
    fixture.write("small.txt", "b");
    fixture.write("large.txt", "this line is long");
    let c2 = service.save_checkpoint("c2").await.unwrap();

    let diffs = service.get_diff(&c1, Some(&c2)).await.unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].relative_path, "small.txt");
    assert_eq!(service.get_diff_count(&c1, Some(&c2)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_working_tree_diff_and_count() {
    let fixture = fixture_with(test_config());
    let service = fixture.service("t1").await;
    fixture.write("a.txt", "saved");
    let c1 = service.save_checkpoint("c1").await.unwrap();
    fixture.write("a.txt", "edited");
    fixture.write("b.txt", "new");

    let mut diffs = service.get_diff(&c1, None).await.unwrap();
    diffs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    assert_eq!(diffs.len(), 2);
    assert_eq!(diffs[0].before, "saved");
    assert_eq!(diffs[0].after, "edited");
    assert_eq!(diffs[1].before, "");
    assert_eq!(service.get_diff_count(&c1, None).await.unwrap(), 2);
}

#[tokio::test]
async fn test_retention_keeps_newest_checkpoints() {
    let fixture = fixture_with(test_config().with_retention_threshold(2));
    let service = fixture.service("t1").await;

    let mut hashes = Vec::new();
    for i in 0..4 {
        fixture.write("counter.txt", &i.to_string());
        hashes.push(service.save_checkpoint(&format!("step {}", i)).await.unwrap());
    }

    let history = service.get_history().await.unwrap();
    let kept: Vec<_> = history.iter().map(|c| c.hash.as_str()).collect();
    assert_eq!(kept, vec![hashes[3].as_str(), hashes[2].as_str()]);
    assert!(fixture.sink.contains("Pruned 1 checkpoints"));
    assert_eq!(service.git().replaced_commits().await.unwrap().len(), 1);

    let diffs = service.get_diff(&hashes[2], Some(&hashes[3])).await.unwrap();
    assert_eq!(diffs[0].before, "2");
    assert_eq!(diffs[0].after, "3");
}

#[tokio::test]
async fn test_restore_grows_history() {
    let fixture = fixture_with(test_config());
    let service = fixture.service("t1").await;
    fixture.write("app.js", "v1");
    let c1 = service.save_checkpoint("c1").await.unwrap();
    fixture.write("app.js", "v2");
    service.save_checkpoint("c2").await.unwrap();

    let before = service.get_history().await.unwrap().len();
    service.restore_checkpoint(&c1).await.unwrap();
    let history = service.get_history().await.unwrap();

    assert_eq!(history.len(), before + 1);
    assert!(history[0].message.contains(&format!("restore:{}", c1)));
    assert_eq!(
        fs::read_to_string(fixture.workspace.path().join("app.js")).unwrap(),
        "v1"
    );
}

#[tokio::test]
async fn test_services_for_same_workspace_share_lock() {
    let fixture = fixture_with(test_config());
    let a = fixture.engine.service_for_task("a").unwrap();
    let b = fixture.engine.service_for_task("b").unwrap();

    assert_eq!(a.git().workspace_hash(), b.git().workspace_hash());
    assert_eq!(fixture.engine.locks().len(), 1);
}

#[tokio::test]
async fn test_cross_task_diff() {
    let fixture = fixture_with(test_config());
    let a = fixture.service("a").await;
    fixture.write("shared.txt", "from a");
    let ha = a.save_checkpoint("a1").await.unwrap();

    let b = fixture.service("b").await;
    fixture.write("shared.txt", "from b");
    let hb = b.save_checkpoint("b1").await.unwrap();

    let diffs = b.get_diff_across_tasks("a", &ha, "b", &hb).await.unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].before, "from a");
    assert_eq!(diffs[0].after, "from b");
}

#[tokio::test]
async fn test_cleanup_deletes_branch_and_resets() {
    let fixture = fixture_with(test_config());
    let service = fixture.service("t1").await;
    fixture.write("a.txt", "a");
    service.save_checkpoint("c1").await.unwrap();

    service.cleanup().await.unwrap();

    assert!(!service.is_initialized().await);
    assert!(service.git().list_task_branches().await.unwrap().is_empty());
    // Cleaning up twice is harmless
    service.cleanup().await.unwrap();
}

#[tokio::test]
async fn test_warmup_diffs() {
    let fixture = fixture_with(test_config());
    let service = fixture.service("t1").await;
    let mut hashes = Vec::new();
    for i in 0..3 {
        fixture.write("n.txt", &i.to_string());
        hashes.push(service.save_checkpoint("step").await.unwrap());
    }

    assert_eq!(service.warmup_diffs(&hashes).await.unwrap(), 3);
    service.get_diff(&hashes[0], Some(&hashes[2])).await.unwrap();
    assert!(service.diff_engine().cache_statistics().hits >= 1);
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let storage = TempDir::new().unwrap();
    let result = CheckpointEngine::new(
        test_config().with_diff_concurrency(0),
        Arc::new(StaticStorageRoot::new(storage.path())),
        Arc::new(StaticWorkspaceResolver::none()),
    );
    assert!(matches!(result, Err(CheckpointError::InvalidInput { .. })));
}
