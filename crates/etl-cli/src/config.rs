//! Configuration for the ETL CLI
//!
//! Resolves the working root and environment name from flags (with
//! `ETL_ROOT`/`ETL_ENV` fallbacks), then builds the core objects from them in
//! order: [`SourceConfig`], optional [`ControlStore`], [`Environment`].

use crate::error::{CliError, Result};
use etl_common::FolderKind;
use etl_core::{ControlStore, Environment, SourceConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

// ============================================================================
// CLI Configuration Constants
// ============================================================================

/// Root folder when neither `--root` nor `ETL_ROOT` is given
pub const DEFAULT_ROOT: &str = ".";

/// Explicit process configuration passed to every command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    root: PathBuf,
    env_name: Option<String>,
}

impl CliConfig {
    pub fn new(root: impl Into<PathBuf>, env_name: Option<String>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(CliError::config("root folder is empty"));
        }

        let env_name = env_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        Ok(Self { root, env_name })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env_name(&self) -> Option<&str> {
        self.env_name.as_deref()
    }

    /// Database settings from `PG_*` (or `PG_<ENV>_*`) variables
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::from_env(self.env_name())
    }

    /// Log folder of this root, for file logging
    pub fn log_dir(&self) -> PathBuf {
        Environment::new(&self.root).resolve(FolderKind::Logs)
    }

    /// Environment without a control store
    pub fn environment(&self) -> Environment {
        Environment::new(&self.root)
    }

    /// Environment with the control store attached when one is configured
    pub async fn connected_environment(&self) -> Result<Environment> {
        let env = self.environment();
        match self.connect_control().await? {
            Some(control) => Ok(env.with_control(control)),
            None => Ok(env),
        }
    }

    /// Connect the control store, or `None` when no database is configured
    pub async fn connect_control(&self) -> Result<Option<ControlStore>> {
        let source = self.source_config();
        if !source.is_configured() {
            debug!(prefix = %source.prefix, "No control database configured");
            return Ok(None);
        }

        let control = ControlStore::connect(&source).await?;
        Ok(Some(control))
    }

    /// Connect the control store, failing when none is configured
    pub async fn require_control(&self) -> Result<ControlStore> {
        self.connect_control()
            .await?
            .ok_or_else(|| CliError::Core(etl_core::EtlError::ControlStoreUnavailable))
    }
}
