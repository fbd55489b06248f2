//! ETL Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the ETL harness.
//!
//! # Overview
//!
//! This crate provides functionality used across all workspace members:
//!
//! - **Types**: the working folder roles ([`FolderKind`]) and tabular file
//!   formats ([`FileType`])
//! - **Error Handling**: parse errors for the shared types
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` variables
//!
//! # Example
//!
//! ```no_run
//! use etl_common::{FileType, FolderKind};
//!
//! let file_type: FileType = "parquet".parse().unwrap();
//! assert_eq!(file_type.as_str(), "parquet");
//! assert_eq!(FolderKind::Inbox.segment(), "in");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{FileType, FolderKind};
