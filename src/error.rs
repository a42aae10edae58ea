//! Error types for taskboard
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad input, unknown task, invalid config)
//! - 3: Forbidden (comment owned by someone else)
//! - 4: Operation failed (persistence rejected, IO)

use thiserror::Error;

/// Exit codes for the board CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const FORBIDDEN: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for board operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    #[error("Unknown status '{status}' for this board")]
    UnknownStatus { status: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Forbidden (exit code 3)
    #[error("Comment {comment_id} belongs to {author}; only the author may change it")]
    NotCommentAuthor { comment_id: String, author: String },

    // Operation failures (exit code 4)
    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_)
            | Error::TaskNotFound(_)
            | Error::CommentNotFound(_)
            | Error::UnknownStatus { .. }
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            Error::NotCommentAuthor { .. } => exit_codes::FORBIDDEN,

            Error::Persistence(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Whether the caller may retry the gesture after this error.
    ///
    /// Persistence failures leave the store reverted to a consistent state,
    /// so the same mutation can be re-issued. Validation and ownership errors
    /// never reach the store at all.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::InvalidConfig(_))
    }
}

/// Result type alias for board operations
pub type Result<T> = std::result::Result<T, Error>;
