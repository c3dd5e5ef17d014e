//! Error types and exit codes for zettelflow
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure
//! - 2: Usage error (bad flags/args, invalid configuration)
//! - 3: Data/vault error (missing vault or Inbox, invalid frontmatter, etc.)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the zettelflow binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage error - bad flags/args (2)
    Usage = 2,
    /// Data/vault error - missing vault, invalid frontmatter (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur during zettelflow operations
#[derive(Error, Debug)]
pub enum ZettelError {
    // Usage errors (exit code 2)
    #[error("unknown format: {0} (expected: human or json)")]
    UnknownFormat(String),

    #[error("{0}")]
    UsageError(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // Data/vault errors (exit code 3)
    #[error("vault not found: {path:?}")]
    VaultNotFound { path: PathBuf },

    #[error("inbox directory not found: {path:?}")]
    InboxNotFound { path: PathBuf },

    #[error("note not found: {name}")]
    NoteNotFound { name: String },

    #[error("invalid frontmatter in {path:?}: {reason}")]
    InvalidFrontmatter { path: PathBuf, reason: String },

    #[error("missing required field '{field}' in {note}")]
    MissingField { field: String, note: String },

    #[error("{context} already exists: {value}")]
    AlreadyExists { context: String, value: String },

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to {operation} {target}: {reason}")]
    FailedOperationWithTarget {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),

    #[error("Batch interrupted. Already processed notes were saved.")]
    Interrupted,
}

impl ZettelError {
    /// Create an error for a failed IO operation with context
    pub fn io_operation(
        operation: &str,
        path: impl std::fmt::Display,
        error: impl std::fmt::Display,
    ) -> Self {
        ZettelError::FailedOperationWithTarget {
            operation: operation.to_string(),
            target: path.to_string(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        ZettelError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a note that could not be located
    pub fn not_found(name: impl std::fmt::Display) -> Self {
        ZettelError::NoteNotFound {
            name: name.to_string(),
        }
    }

    /// Create an error for an entity that already exists
    pub fn already_exists(context: &str, value: impl std::fmt::Display) -> Self {
        ZettelError::AlreadyExists {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a required frontmatter field that is absent
    pub fn missing_field(field: &str, note: impl std::fmt::Display) -> Self {
        ZettelError::MissingField {
            field: field.to_string(),
            note: note.to_string(),
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ZettelError::UnknownFormat(_)
            | ZettelError::UsageError(_)
            | ZettelError::InvalidValue { .. }
            | ZettelError::InvalidConfig { .. } => ExitCode::Usage,

            ZettelError::VaultNotFound { .. }
            | ZettelError::InboxNotFound { .. }
            | ZettelError::NoteNotFound { .. }
            | ZettelError::InvalidFrontmatter { .. }
            | ZettelError::MissingField { .. }
            | ZettelError::AlreadyExists { .. } => ExitCode::Data,

            ZettelError::Io(_)
            | ZettelError::Json(_)
            | ZettelError::Toml(_)
            | ZettelError::FailedOperationWithTarget { .. }
            | ZettelError::Other(_)
            | ZettelError::Interrupted => ExitCode::Failure,
        }
    }

    /// Get the error type identifier
    pub fn error_type(&self) -> &'static str {
        match self {
            ZettelError::UnknownFormat(_) => "unknown_format",
            ZettelError::UsageError(_) => "usage_error",
            ZettelError::InvalidValue { .. } => "invalid_value",
            ZettelError::InvalidConfig { .. } => "invalid_config",
            ZettelError::VaultNotFound { .. } => "vault_not_found",
            ZettelError::InboxNotFound { .. } => "inbox_not_found",
            ZettelError::NoteNotFound { .. } => "note_not_found",
            ZettelError::InvalidFrontmatter { .. } => "invalid_frontmatter",
            ZettelError::MissingField { .. } => "missing_field",
            ZettelError::AlreadyExists { .. } => "already_exists",
            ZettelError::Io(_) => "io_error",
            ZettelError::Json(_) => "json_error",
            ZettelError::Toml(_) => "toml_error",
            ZettelError::FailedOperationWithTarget { .. } => "failed_operation_with_target",
            ZettelError::Other(_) => "other",
            ZettelError::Interrupted => "interrupted",
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.exit_code() as i32,
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
    }
}

/// Result type alias for zettelflow operations
pub type Result<T> = std::result::Result<T, ZettelError>;
