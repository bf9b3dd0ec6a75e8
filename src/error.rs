//! Error types for mytasks
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, missing identity, unknown task)
//! - 4: Operation failed (I/O, malformed documents, lock contention)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the mytasks CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for mytasks operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No identity supplied: set --user-id, --user-name or --user-email")]
    IdentityMissing,

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Invalid document in {path}: {reason}")]
    InvalidDocument { path: PathBuf, reason: String },

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::IdentityMissing
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::InvalidDocument { .. }
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error output.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidArgument(message)
            | Error::InvalidConfig(message)
            | Error::OperationFailed(message) => Some(serde_json::json!({ "message": message })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "task_id": id })),
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path })),
            Error::InvalidDocument { path, reason } => Some(serde_json::json!({
                "path": path,
                "reason": reason,
            })),
            _ => None,
        }
    }
}

/// Result type alias for mytasks operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
