//! ETL Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! The batch ETL harness: working folder layout, tabular file codecs, the
//! control schema, and the registry and runner for pluggable steps.
//!
//! # Components
//!
//! - **[`Environment`]**: root folder, folder layout and optional control store
//! - **[`codec`]**: read/write [`TabularData`] as CSV, Excel, JSON, Parquet or XML
//! - **[`SourceConfig`]**: control database connection from `PG_*` variables
//! - **[`ControlStore`]**: file/HTTP sources and generic tables over `sqlx`
//! - **[`StepRegistry`]**: steps discovered from `src/steps/` at build time
//! - **[`Runner`]**: runs all or selected steps and collects a [`RunSummary`]
//!
//! # Example
//!
//! ```no_run
//! use etl_core::{Environment, Runner, StepRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let env = Environment::new("/srv/etl");
//!     env.ensure_folders()?;
//!
//!     let registry = StepRegistry::discover()?;
//!     let summary = Runner::new(&env, &registry).run_all().await;
//!     println!("{}", summary);
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod control;
pub mod environment;
pub mod error;
pub mod registry;
pub mod runner;
pub mod source;
pub mod step;
pub mod steps;

pub use codec::{Cell, TabularData};
pub use control::{ControlStore, FileSourceRecord, HttpSourceRecord, NewFileSource, WriteMode};
pub use environment::{Environment, FolderLayout};
pub use error::{EtlError, Result};
pub use registry::StepRegistry;
pub use runner::{RunSummary, Runner, RunnerOptions, StepOutcome, StepStatus};
pub use source::SourceConfig;
pub use step::{EtlStep, StepUnit};

// Re-exported so step units and embedders need only this crate
pub use etl_common::{FileType, FolderKind};
