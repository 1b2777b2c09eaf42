//! Error types for udr-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from udr-core
    #[error(transparent)]
    Core(#[from] udr_core::Error),

    /// Error from udr-tags
    #[error(transparent)]
    Tags(#[from] udr_tags::Error),

    /// Error from udr-tables
    #[error(transparent)]
    Tables(#[from] udr_tables::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Config file could not be read or parsed
    #[error("Invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
