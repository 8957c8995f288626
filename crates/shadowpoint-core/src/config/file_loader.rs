//! Config file parsing

use super::model::CheckpointConfig;
use crate::error::{CheckpointError, CheckpointResult};
use std::fs;
use std::path::Path;

/// Config files are TOML when named `*.toml`, JSON otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    fn parse(self, content: &str) -> Result<CheckpointConfig, String> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// Read a `CheckpointConfig` from `path`; a missing file yields the defaults
pub fn load_from_file(path: &Path) -> CheckpointResult<CheckpointConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(CheckpointConfig::default());
        }
        Err(e) => {
            return Err(CheckpointError::config_with_context(
                format!("Cannot read config file: {}", e),
                path.display().to_string(),
            ));
        }
    };

    let format = FileFormat::of(path);
    format.parse(&content).map_err(|e| {
        CheckpointError::config_with_context(
            format!("Malformed {:?} config: {}", format, e),
            path.display().to_string(),
        )
    })
}
