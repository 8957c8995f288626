//! Core error type for the checkpoint engine

use thiserror::Error;

/// Result type alias for checkpoint engine operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Extension trait for adding context to foreign `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C: std::fmt::Display>(self, context: C) -> CheckpointResult<T>;

    /// Add context lazily (only evaluated on error)
    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> CheckpointResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context<C: std::fmt::Display>(self, context: C) -> CheckpointResult<T> {
        self.map_err(|e| CheckpointError::other(format!("{}: {}", context, e)))
    }

    fn with_context<C: std::fmt::Display, F: FnOnce() -> C>(self, f: F) -> CheckpointResult<T> {
        self.map_err(|e| CheckpointError::other(format!("{}: {}", f(), e)))
    }
}

/// Main error type for the checkpoint engine
///
/// Oversized diffs are deliberately absent: they are filtered out of diff
/// results instead of being reported.
#[derive(Error, Debug, Clone)]
pub enum CheckpointError {
    /// An operation was called before the tracker reached `Ready`
    #[error("Checkpoints not initialized: {message}")]
    NotInitialized { message: String },

    /// The shadow repository's work tree points somewhere else
    #[error("Shadow repository belongs to {actual}, not {expected}")]
    OwnershipMismatch { expected: String, actual: String },

    /// The workspace root is a directory checkpoints must never snapshot
    #[error("Cannot use checkpoints in protected directory: {path}")]
    ProtectedDirectory { path: String },

    /// The underlying `git` invocation failed
    #[error("Git command failed ({command}): {message}")]
    RepositoryCommand {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    /// Lock or backup handling failed during a transaction
    #[error("Transaction error: {message}")]
    Transaction {
        message: String,
        context: Option<String>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Generic error with context
    #[error("Error: {message}")]
    Other {
        message: String,
        context: Option<String>,
    },
}

impl CheckpointError {
    /// Stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotInitialized { .. } => "CHECKPOINT_NOT_INITIALIZED",
            Self::OwnershipMismatch { .. } => "CHECKPOINT_OWNERSHIP_MISMATCH",
            Self::ProtectedDirectory { .. } => "CHECKPOINT_PROTECTED_DIRECTORY",
            Self::RepositoryCommand { .. } => "CHECKPOINT_GIT_COMMAND",
            Self::Transaction { .. } => "CHECKPOINT_TRANSACTION",
            Self::Io { .. } => "CHECKPOINT_IO",
            Self::Json { .. } => "CHECKPOINT_JSON",
            Self::Config { .. } => "CHECKPOINT_CONFIG",
            Self::InvalidInput { .. } => "CHECKPOINT_INVALID_INPUT",
            Self::NotFound { .. } => "CHECKPOINT_NOT_FOUND",
            Self::Other { .. } => "CHECKPOINT_OTHER",
        }
    }

    /// Whether retrying the same call may succeed
    ///
    /// Git reports a concurrent writer through `index.lock`; everything else
    /// needs a different input or a repaired repository.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::RepositoryCommand { message, .. } => message.contains("index.lock"),
            Self::Io { .. } | Self::Transaction { .. } => true,
            _ => false,
        }
    }
}
