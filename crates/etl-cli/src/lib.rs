//! ETL CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line interface for the batch ETL harness.
//!
//! # Overview
//!
//! - **Folder setup**: create the working folders under a root (`etl init`)
//! - **Steps**: list discovered steps (`etl steps`) and run them (`etl run`)
//! - **Sources**: add and inspect file sources (`etl source add/list/show`)
//! - **Control schema**: apply migrations and show the connection (`etl db`)

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::CliConfig;
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ETL - batch ETL harness
#[derive(Parser, Debug)]
#[command(name = "etl")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Root folder holding in/, out/, logs/, tmp/, dat/ and ctl/
    #[arg(long, env = "ETL_ROOT", default_value = config::DEFAULT_ROOT, global = true)]
    pub root: PathBuf,

    /// Environment name; selects PG_<ENV>_* database variables
    #[arg(short, long = "env", env = "ETL_ENV", global = true)]
    pub env_name: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the working folders
    Init,

    /// List discovered steps
    Steps,

    /// Run all steps, or only the named ones in the given order
    Run {
        /// Step names (defaults to every step)
        steps: Vec<String>,

        /// Stop after the first failed step
        #[arg(long)]
        fail_fast: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage file sources in the control schema
    Source {
        #[command(subcommand)]
        command: SourceCommand,
    },

    /// Control database administration
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
}

/// Source management subcommands
#[derive(Subcommand, Debug)]
pub enum SourceCommand {
    /// Add a file source; prompts for the fields when --key is omitted
    Add {
        /// Unique file key (at most 50 characters)
        #[arg(short, long)]
        key: Option<String>,

        /// Description (at most 100 characters)
        #[arg(short, long)]
        description: Option<String>,

        /// File type (csv, excel, json, parquet, xml)
        #[arg(short = 't', long = "type")]
        file_type: Option<String>,

        /// Add the source disabled
        #[arg(long)]
        disabled: bool,
    },

    /// List file and HTTP sources
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one file source
    Show {
        /// File key
        key: String,
    },
}

/// Control database subcommands
#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Apply pending control schema migrations
    Upgrade,

    /// Print the connection URI with the password masked
    Uri,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_parses_steps_and_flags() {
        let cli = Cli::try_parse_from([
            "etl",
            "--root",
            "/srv/etl",
            "run",
            "001_check_for_inbox_files",
            "--fail-fast",
        ])
        .unwrap();

        assert_eq!(cli.root, PathBuf::from("/srv/etl"));
        match cli.command {
            Commands::Run {
                steps, fail_fast, json,
            } => {
                assert_eq!(steps, vec!["001_check_for_inbox_files"]);
                assert!(fail_fast);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_source_add_flags() {
        let cli = Cli::try_parse_from([
            "etl", "source", "add", "--key", "orders", "--type", "csv", "--disabled",
        ])
        .unwrap();

        match cli.command {
            Commands::Source {
                command:
                    SourceCommand::Add {
                        key,
                        file_type,
                        disabled,
                        ..
                    },
            } => {
                assert_eq!(key.as_deref(), Some("orders"));
                assert_eq!(file_type.as_deref(), Some("csv"));
                assert!(disabled);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
