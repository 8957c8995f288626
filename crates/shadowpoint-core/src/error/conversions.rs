//! From trait implementations for CheckpointError conversions

use super::types::CheckpointError;

impl From<std::io::Error> for CheckpointError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for CheckpointError {
    fn from(error: toml::de::Error) -> Self {
        Self::config(format!("Failed to parse TOML: {}", error))
    }
}

impl From<ignore::Error> for CheckpointError {
    fn from(error: ignore::Error) -> Self {
        Self::config_with_context(error.to_string(), "Building exclusion matcher")
    }
}

impl From<walkdir::Error> for CheckpointError {
    fn from(error: walkdir::Error) -> Self {
        let path = error.path().map(|p| p.display().to_string());
        Self::Io {
            message: error.to_string(),
            path,
        }
    }
}

impl From<tokio::task::JoinError> for CheckpointError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::other(format!("Background task failed: {}", error))
    }
}
