//! Environment variable overrides

use super::model::CheckpointConfig;
use crate::error::{CheckpointError, CheckpointResult};
use std::env;
use std::str::FromStr;
use std::time::Duration;

fn parse_var<T: FromStr>(name: &str) -> CheckpointResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CheckpointError::config(format!("Invalid {} value: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Apply `SHADOWPOINT_*` environment variables on top of `config`
pub fn apply_env_overrides(config: &mut CheckpointConfig) -> CheckpointResult<()> {
    if let Some(v) = parse_var("SHADOWPOINT_MAX_FILE_SIZE")? {
        config.max_file_size = v;
    }
    if let Some(v) = parse_var("SHADOWPOINT_MAX_DIFF_SIZE")? {
        config.max_diff_size = v;
    }
    if let Some(v) = parse_var("SHADOWPOINT_RETENTION")? {
        config.retention_threshold = v;
    }
    if let Some(v) = parse_var("SHADOWPOINT_CACHE_CAPACITY")? {
        config.cache_capacity = v;
    }
    if let Some(secs) = parse_var::<u64>("SHADOWPOINT_CACHE_TTL_SECS")? {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(v) = parse_var("SHADOWPOINT_DIFF_CONCURRENCY")? {
        config.diff_concurrency = v;
    }
    if let Ok(name) = env::var("SHADOWPOINT_GIT_USER_NAME") {
        config.git_user_name = name;
    }
    if let Ok(email) = env::var("SHADOWPOINT_GIT_USER_EMAIL") {
        config.git_user_email = email;
    }
    if let Ok(patterns) = env::var("SHADOWPOINT_EXTRA_EXCLUSIONS") {
        config.extra_exclusions.extend(
            patterns
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        );
    }
    Ok(())
}
