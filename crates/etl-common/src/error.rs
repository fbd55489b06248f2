//! Error types shared by all ETL crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised while parsing the shared enumerations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Unsupported file type: '{0}'. Expected one of: csv, excel, json, parquet, xml")]
    UnsupportedFileType(String),

    #[error("Unknown folder kind: '{0}'. Expected one of: inbox, outbox, logs, temp, data, control")]
    UnknownFolderKind(String),
}
