//! `etl db` command implementation

use crate::config::CliConfig;
use crate::error::Result;
use colored::Colorize;

/// Apply pending control schema migrations
pub async fn upgrade(config: &CliConfig) -> Result<()> {
    let control = config.require_control().await?;
    let applied = control.migrate().await?;

    if applied == 0 {
        println!("{} Control schema is already up to date", "✓".green());
    } else {
        println!("{} Applied {} migration(s)", "✓".green(), applied);
    }

    Ok(())
}

/// Print the control database URI with the password masked
pub async fn uri(config: &CliConfig) -> Result<()> {
    let source = config.source_config();

    if !source.is_configured() {
        println!(
            "{} No database configured. Set {}DB to connect a control store.",
            "✗".yellow(),
            source.prefix
        );
        return Ok(());
    }

    println!("{}", source.redacted_uri());
    Ok(())
}
