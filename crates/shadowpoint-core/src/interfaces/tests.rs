//! Tests for the host application seams

use super::*;
use crate::error::CheckpointError;
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_resolver_without_workspace_fails() {
    let err = StaticWorkspaceResolver::none().workspace_root().unwrap_err();
    assert!(matches!(err, CheckpointError::InvalidInput { .. }));
}

#[test]
fn test_resolver_rejects_home_directory() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let err = StaticWorkspaceResolver::new(&home).workspace_root().unwrap_err();
    assert!(matches!(err, CheckpointError::ProtectedDirectory { .. }));
}

#[test]
#[serial]
fn test_resolver_rejects_relative_spelling_of_home() {
    let Some(home) = dirs::home_dir().filter(|home| home.is_dir()) else {
        return;
    };
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(&home).unwrap();
    let result = StaticWorkspaceResolver::new(".").workspace_root();
    std::env::set_current_dir(previous).unwrap();

    assert!(matches!(
        result.unwrap_err(),
        CheckpointError::ProtectedDirectory { .. }
    ));
}

#[test]
fn test_resolver_normalizes_root() {
    let dir = TempDir::new().unwrap();
    let messy = dir.path().join("project").join("..").join("project");
    let root = StaticWorkspaceResolver::new(&messy).workspace_root().unwrap();
    assert_eq!(root, dir.path().join("project"));
}

#[test]
fn test_static_storage_root() {
    let provider = StaticStorageRoot::new("/var/lib/shadowpoint");
    assert_eq!(
        provider.storage_root(),
        std::path::PathBuf::from("/var/lib/shadowpoint")
    );
}

#[test]
fn test_memory_sink_collects_lines() {
    let sink = MemoryLogSink::new();
    sink.append_line("first");
    sink.append_line("second problem");
    assert_eq!(sink.lines(), vec!["first", "second problem"]);
    assert!(sink.contains("problem"));
}

#[test]
fn test_file_sink_appends_timestamped_lines() {
    let dir = TempDir::new().unwrap();
    let sink = FileLogSink::new(dir.path().join("logs").join("migration.log"));
    sink.append_line("one");
    sink.append_line("two");

    let content = std::fs::read_to_string(sink.path()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('[') && lines[0].ends_with("] one"));
    assert!(lines[1].ends_with("] two"));
}
