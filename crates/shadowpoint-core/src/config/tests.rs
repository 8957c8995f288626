use super::*;
use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_defaults_match_documented_limits() {
    let config = CheckpointConfig::default();
    assert_eq!(config.max_file_size, 100 * 1024 * 1024);
    assert_eq!(config.max_diff_size, 10 * 1024 * 1024);
    assert_eq!(config.retention_threshold, 50);
    assert_eq!(config.cache_capacity, 1000);
    assert_eq!(config.cache_ttl, Duration::from_secs(300));
    assert_eq!(config.diff_concurrency, 5);
    assert_eq!(config.traversal_batch_size, 1000);
    assert_eq!(config.disabled_git_name(), ".git_disabled");
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_from_file(&temp_dir.path().join("nope.json")).unwrap();
    assert_eq!(config.retention_threshold, 50);
}

#[test]
fn test_load_json_partial_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shadowpoint.json");
    fs::write(
        &path,
        r#"{ "retention_threshold": 7, "cache_ttl": "30s", "extra_exclusions": ["*.bak"] }"#,
    )
    .unwrap();

    let config = load_from_file(&path).unwrap();
    assert_eq!(config.retention_threshold, 7);
    assert_eq!(config.cache_ttl, Duration::from_secs(30));
    assert_eq!(config.extra_exclusions, vec!["*.bak".to_string()]);
    assert_eq!(config.diff_concurrency, 5);
}

#[test]
fn test_load_toml_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shadowpoint.toml");
    fs::write(&path, "max_file_size = 2048\nbase_branch = \"root\"\n").unwrap();

    let config = load_from_file(&path).unwrap();
    assert_eq!(config.max_file_size, 2048);
    assert_eq!(config.base_branch, "root");
}

#[test]
fn test_invalid_json_reports_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    let err = load_from_file(&path).unwrap_err();
    assert_eq!(err.error_code(), "CHECKPOINT_CONFIG");
}

#[test]
fn test_validate_rejects_zero_limits() {
    assert!(CheckpointConfig::default().with_diff_concurrency(0).validate().is_err());
    assert!(CheckpointConfig::default().with_traversal(0, 5).validate().is_err());
    assert!(CheckpointConfig::default()
        .with_cache(0, Duration::from_secs(1))
        .validate()
        .is_err());
}

#[test]
#[serial]
fn test_env_overrides_apply() {
    unsafe {
        std::env::set_var("SHADOWPOINT_RETENTION", "3");
        std::env::set_var("SHADOWPOINT_EXTRA_EXCLUSIONS", "*.tmp, secrets/");
    }
    let mut config = CheckpointConfig::default();
    let result = apply_env_overrides(&mut config);
    unsafe {
        std::env::remove_var("SHADOWPOINT_RETENTION");
        std::env::remove_var("SHADOWPOINT_EXTRA_EXCLUSIONS");
    }
    result.unwrap();
    assert_eq!(config.retention_threshold, 3);
    assert_eq!(config.extra_exclusions, vec!["*.tmp", "secrets/"]);
}

#[test]
#[serial]
fn test_env_override_rejects_garbage() {
    unsafe {
        std::env::set_var("SHADOWPOINT_DIFF_CONCURRENCY", "many");
    }
    let mut config = CheckpointConfig::default();
    let result = apply_env_overrides(&mut config);
    unsafe {
        std::env::remove_var("SHADOWPOINT_DIFF_CONCURRENCY");
    }
    assert!(result.is_err());
}

#[test]
fn test_logging_filter_directive() {
    let logging = LoggingConfig::verbose();
    assert_eq!(
        logging.filter_directive(),
        "shadowpoint=debug,shadowpoint_core=debug,shadowpoint_cli=debug"
    );
}
