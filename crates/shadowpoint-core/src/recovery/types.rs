//! Persisted transaction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// State recorded in the lock file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    Started,
}

/// Contents of `.checkpoint-lock`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLock {
    pub task_id: String,
    pub timestamp: DateTime<Utc>,
    pub state: TransactionState,
    /// Workspace the backup belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
}

impl TransactionLock {
    pub fn started(task_id: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            task_id: task_id.into(),
            timestamp: Utc::now(),
            state: TransactionState::Started,
            workspace: Some(workspace.into()),
        }
    }
}

/// Contents of `status.json` in the backup directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupStatus {
    pub modified: Vec<String>,
    pub backed_up: Vec<String>,
}
