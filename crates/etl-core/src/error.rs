//! Error types for the ETL core
//!
//! Discovery and configuration errors abort a run before any step executes.
//! Step failures are wrapped in [`EtlError::StepExecution`] by the runner and
//! reported per step instead of being propagated.

use etl_common::{CommonError, FileType};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, EtlError>;

#[derive(Error, Debug)]
pub enum EtlError {
    /// A step unit failed to load or produced an invalid step
    #[error("Failed to load step unit '{unit}': {source}")]
    Discovery {
        unit: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Step name '{name}' is declared by both unit '{first_unit}' and unit '{second_unit}'")]
    DuplicateStepName {
        name: String,
        first_unit: String,
        second_unit: String,
    },

    #[error("Unknown step '{0}'. Run 'etl steps' to list registered steps.")]
    UnknownStep(String),

    /// Folder creation or listing failed for a reason other than "not found"
    #[error("Filesystem error at '{}': {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type: '{0}'")]
    UnsupportedFileType(String),

    #[error("File source '{0}' already exists")]
    DuplicateKey(String),

    #[error("Step '{step}' failed: {message}")]
    StepExecution { step: String, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Failed to process {file_type} file '{}': {message}", .path.display())]
    Codec {
        file_type: FileType,
        path: PathBuf,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No control store is configured. Set PG_DB (or PG_<ENV>_DB) to connect one.")]
    ControlStoreUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl EtlError {
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn codec(file_type: FileType, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Codec {
            file_type,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<CommonError> for EtlError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::UnsupportedFileType(tag) => EtlError::UnsupportedFileType(tag),
            other => EtlError::Validation(other.to_string()),
        }
    }
}
