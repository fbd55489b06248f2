//! `etl run` command implementation

use crate::config::CliConfig;
use crate::error::Result;
use colored::Colorize;
use etl_core::{RunSummary, Runner, RunnerOptions, StepRegistry, StepStatus};
use tracing::info;

/// Discover steps and run all of them, or the named ones.
///
/// Returns the summary so the caller can pick the exit code.
pub async fn run(
    config: &CliConfig,
    steps: &[String],
    fail_fast: bool,
    json: bool,
) -> Result<RunSummary> {
    let registry = StepRegistry::discover()?;
    let env = config.connected_environment().await?;
    // Steps assume every working folder exists
    env.ensure_folders()?;
    info!(
        root = %env.root().display(),
        control = env.control().is_some(),
        "Environment ready"
    );

    let runner = Runner::new(&env, &registry).with_options(RunnerOptions { fail_fast });
    let summary = if steps.is_empty() {
        runner.run_all().await
    } else {
        runner.run_selected(steps).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    for outcome in summary.outcomes() {
        let millis = outcome.duration.as_millis();
        match &outcome.status {
            StepStatus::Succeeded => {
                println!("{} {} ({} ms)", "✓".green(), outcome.name, millis);
            }
            StepStatus::Failed(message) => {
                println!("{} {} ({} ms)", "✗".red(), outcome.name, millis);
                println!("    {}", message.red());
            }
        }
    }

    let totals = format!(
        "{} succeeded, {} failed",
        summary.succeeded(),
        summary.failed()
    );
    if summary.is_success() {
        println!("\n{}", totals.green());
    } else {
        println!("\n{}", totals.red());
    }
}
