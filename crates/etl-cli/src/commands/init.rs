//! `etl init` command implementation
//!
//! Creates the working folders under the root.

use crate::config::CliConfig;
use crate::error::Result;
use colored::Colorize;

/// Ensure every working folder exists and print it
pub async fn run(config: &CliConfig) -> Result<()> {
    let env = config.environment();
    let folders = env.ensure_folders()?;

    println!(
        "{} Working folders ready under {}",
        "✓".green(),
        config.root().display().to_string().cyan()
    );
    for (kind, path) in folders {
        println!("  {:<8} {}", kind.to_string(), path.display());
    }

    Ok(())
}
