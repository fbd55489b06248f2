//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function (or one function
//! per nested subcommand).

pub mod db;
pub mod init;
pub mod run;
pub mod source;
pub mod steps;
