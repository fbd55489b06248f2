//! ETL CLI - Main entry point

use clap::Parser;
use etl_cli::commands::source::AddArgs;
use etl_cli::{CliConfig, Cli, Commands, DbCommand, SourceCommand};
use etl_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

/// Events from step units stay visible at the default level
const STEP_REPORT_DIRECTIVE: &str = "etl_core::steps=info";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // .env is optional; values already in the environment win
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match CliConfig::new(cli.root.clone(), cli.env_name.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let builder = LogConfig::builder()
        .output(LogOutput::Console)
        .log_dir(config.log_dir())
        .log_file_prefix("etl");
    let defaults = if cli.verbose {
        builder.level(LogLevel::Debug).build()
    } else {
        // Quiet by default, but step reports are the output of `etl run`
        builder
            .level(LogLevel::Warn)
            .filter_directives(STEP_REPORT_DIRECTIVE)
            .build()
    };

    // LOG_* variables take precedence over the flag-derived defaults
    let log_config = defaults.clone().merge_env().unwrap_or(defaults);

    // The CLI works without logging; keep the guard so file output flushes
    let _guard = init_logging(&log_config).ok().flatten();

    match execute_command(&cli, &config).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Execute the CLI command; `Ok(false)` when it finished but reported failure
async fn execute_command(cli: &Cli, config: &CliConfig) -> etl_cli::Result<bool> {
    match &cli.command {
        Commands::Init => etl_cli::commands::init::run(config).await?,
        Commands::Steps => etl_cli::commands::steps::run().await?,
        Commands::Run {
            steps,
            fail_fast,
            json,
        } => {
            let summary = etl_cli::commands::run::run(config, steps, *fail_fast, *json).await?;
            return Ok(summary.is_success());
        }
        Commands::Source { command } => match command {
            SourceCommand::Add {
                key,
                description,
                file_type,
                disabled,
            } => {
                let args = AddArgs {
                    key: key.clone(),
                    description: description.clone(),
                    file_type: file_type.clone(),
                    disabled: *disabled,
                };
                etl_cli::commands::source::add(config, args).await?
            }
            SourceCommand::List { json } => {
                etl_cli::commands::source::list(config, *json).await?
            }
            SourceCommand::Show { key } => etl_cli::commands::source::show(config, key).await?,
        },
        Commands::Db { command } => match command {
            DbCommand::Upgrade => etl_cli::commands::db::upgrade(config).await?,
            DbCommand::Uri => etl_cli::commands::db::uri(config).await?,
        },
    }

    Ok(true)
}
