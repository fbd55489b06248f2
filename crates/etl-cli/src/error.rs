//! Error types for the ETL CLI
//!
//! User-facing errors with clear, actionable messages.

use etl_core::EtlError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// A core operation failed; the core error already says what and where
    #[error("{0}")]
    Core(#[from] EtlError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// No file source with the given key
    #[error("File source '{0}' not found. Run 'etl source list' to see configured sources.")]
    SourceNotFound(String),

    /// Interactive prompt failed or was interrupted
    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    /// JSON output could not be rendered
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
