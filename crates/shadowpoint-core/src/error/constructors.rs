//! Constructor methods for CheckpointError

use super::types::CheckpointError;

impl CheckpointError {
    /// Create a not-initialized error
    pub fn not_initialized(message: impl Into<String>) -> Self {
        Self::NotInitialized {
            message: message.into(),
        }
    }

    /// Create an ownership mismatch error
    pub fn ownership_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::OwnershipMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a protected directory error
    pub fn protected_directory(path: impl Into<String>) -> Self {
        Self::ProtectedDirectory { path: path.into() }
    }

    /// Create a git command failure
    pub fn repository(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RepositoryCommand {
            command: command.into(),
            message: message.into(),
            exit_code: None,
        }
    }

    /// Create a git command failure carrying the process exit code
    pub fn repository_with_code(
        command: impl Into<String>,
        message: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::RepositoryCommand {
            command: command.into(),
            message: message.into(),
            exit_code,
        }
    }

    /// Create a transaction error
    pub fn transaction(message: impl Into<String>) -> Self {
        Self::Transaction {
            message: message.into(),
            context: None,
        }
    }

    /// Create a transaction error with context
    pub fn transaction_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::Transaction {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: None,
        }
    }

    /// Create an IO error naming the path involved
    pub fn io_with_path(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new JSON error
    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: None,
        }
    }

    /// Create a configuration error with context
    pub fn config_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error for a specific field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            context: None,
        }
    }
}
