//! Pipeline runner
//!
//! Steps run strictly one after another against the same [`Environment`].
//! A failing step is recorded and the run moves on, unless
//! [`RunnerOptions::fail_fast`] is set.

use crate::environment::Environment;
use crate::error::{EtlError, Result};
use crate::registry::StepRegistry;
use crate::step::EtlStep;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, Instrument};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Stop after the first failed step; later steps are not reported
    pub fail_fast: bool,
}

/// Final state of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum StepStatus {
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: StepStatus,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    /// The failure as a typed error, if the step failed
    pub fn error(&self) -> Option<EtlError> {
        match &self.status {
            StepStatus::Succeeded => None,
            StepStatus::Failed(message) => Some(EtlError::StepExecution {
                step: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

/// Outcomes of one run, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    outcomes: Vec<StepOutcome>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// True when no step failed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn total_duration(&self) -> Duration {
        self.outcomes.iter().map(|o| o.duration).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            match &outcome.status {
                StepStatus::Succeeded => writeln!(
                    f,
                    "ok     {} ({} ms)",
                    outcome.name,
                    outcome.duration.as_millis()
                )?,
                StepStatus::Failed(message) => writeln!(
                    f,
                    "FAILED {} ({} ms): {}",
                    outcome.name,
                    outcome.duration.as_millis(),
                    message
                )?,
            }
        }
        write!(
            f,
            "{} step(s): {} succeeded, {} failed",
            self.outcomes.len(),
            self.succeeded(),
            self.failed()
        )
    }
}

/// Runs registered steps against an environment
pub struct Runner<'a> {
    env: &'a Environment,
    registry: &'a StepRegistry,
    options: RunnerOptions,
}

impl<'a> Runner<'a> {
    pub fn new(env: &'a Environment, registry: &'a StepRegistry) -> Self {
        Self {
            env,
            registry,
            options: RunnerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunnerOptions) -> Self {
        self.options = options;
        self
    }

    /// Run every registered step in name order
    pub async fn run_all(&self) -> RunSummary {
        info!(steps = self.registry.len(), "Running all steps");
        self.run_steps(self.registry.iter()).await
    }

    /// Run the named steps in the given order.
    ///
    /// Every name is checked first; an unknown name fails with
    /// [`EtlError::UnknownStep`] before anything runs.
    pub async fn run_selected<S: AsRef<str>>(&self, names: &[S]) -> Result<RunSummary> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let step = self
                .registry
                .get(name)
                .ok_or_else(|| EtlError::UnknownStep(name.to_string()))?;
            selected.push((name, step));
        }

        info!(steps = selected.len(), "Running selected steps");
        Ok(self.run_steps(selected.into_iter()).await)
    }

    async fn run_steps<'s>(
        &self,
        steps: impl Iterator<Item = (&'s str, &'s dyn EtlStep)>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();

        for (name, step) in steps {
            let outcome = run_one(self.env, name, step)
                .instrument(info_span!("step", name = %name))
                .await;
            let failed = !outcome.is_success();
            summary.outcomes.push(outcome);

            if failed && self.options.fail_fast {
                info!("Stopping after failed step");
                break;
            }
        }

        info!(
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "Run finished"
        );
        summary
    }
}

async fn run_one(env: &Environment, name: &str, step: &dyn EtlStep) -> StepOutcome {
    info!("Starting step");
    let started = Instant::now();
    let result = step.run(env).await;
    let duration = started.elapsed();

    let status = match result {
        Ok(()) => {
            info!(duration_ms = duration.as_millis() as u64, "Step succeeded");
            StepStatus::Succeeded
        }
        Err(e) => {
            let message = format!("{:#}", e);
            error!(duration_ms = duration.as_millis() as u64, error = %message, "Step failed");
            StepStatus::Failed(message)
        }
    };

    StepOutcome {
        name: name.to_string(),
        status,
        duration,
    }
}

/// Run every registered step with default options
pub async fn run_all(env: &Environment, registry: &StepRegistry) -> RunSummary {
    Runner::new(env, registry).run_all().await
}

/// Run the named steps with default options
pub async fn run_selected<S: AsRef<str>>(
    env: &Environment,
    registry: &StepRegistry,
    names: &[S],
) -> Result<RunSummary> {
    Runner::new(env, registry).run_selected(names).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: StepStatus) -> StepOutcome {
        StepOutcome {
            name: name.to_string(),
            status,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            outcomes: vec![
                outcome("a", StepStatus::Succeeded),
                outcome("b", StepStatus::Failed("boom".to_string())),
            ],
        };

        assert_eq!(summary.succeeded(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(!summary.is_success());
        assert_eq!(summary.total_duration(), Duration::from_millis(10));

        let rendered = summary.to_string();
        assert!(rendered.contains("FAILED b (5 ms): boom"));
        assert!(rendered.ends_with("2 step(s): 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_failed_outcome_error() {
        let failed = outcome("load", StepStatus::Failed("no rows".to_string()));
        let err = failed.error().unwrap();
        assert_eq!(err.to_string(), "Step 'load' failed: no rows");
        assert!(outcome("ok", StepStatus::Succeeded).error().is_none());
    }

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(outcome("b", StepStatus::Failed("boom".to_string()))).unwrap();
        assert_eq!(json["name"], "b");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["duration_ms"], 5);
    }

    #[test]
    fn test_empty_summary_is_success() {
        let summary = RunSummary::default();
        assert!(summary.is_success());
        assert_eq!(summary.to_string(), "0 step(s): 0 succeeded, 0 failed");
    }
}
