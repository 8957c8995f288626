//! Engine configuration
//!
//! Thresholds, limits and identity settings live in one explicit
//! [`CheckpointConfig`] that is handed to the engine at construction. It can be
//! loaded from a JSON or TOML file and then overridden from `SHADOWPOINT_*`
//! environment variables.

mod env_loader;
mod file_loader;
mod logging_config;
mod model;

#[cfg(test)]
mod tests;

pub use env_loader::apply_env_overrides;
pub use file_loader::load_from_file;
pub use logging_config::{LogFormat, LoggingConfig};
pub use model::CheckpointConfig;

use crate::error::CheckpointResult;
use std::path::Path;

/// Load configuration from `path` (if it exists) and apply env overrides
pub fn load(path: Option<&Path>) -> CheckpointResult<CheckpointConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => CheckpointConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}
