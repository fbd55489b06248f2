//! Integration tests for step discovery and the pipeline runner
//!
//! These tests validate:
//! - Registry construction from explicit units (sorting, collisions, failures)
//! - Run-all and selective runs against a real environment
//! - Failure isolation and the fail-fast option

use async_trait::async_trait;
use etl_core::{
    EtlError, EtlStep, Environment, FolderKind, Runner, RunnerOptions, StepRegistry, StepStatus,
    StepUnit,
};
use tempfile::TempDir;

/// Writes a marker file to the outbox so tests can see which steps ran
struct Marker(&'static str);

#[async_trait]
impl EtlStep for Marker {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, env: &Environment) -> anyhow::Result<()> {
        let outbox = env.resolve(FolderKind::Outbox);
        std::fs::create_dir_all(&outbox)?;
        std::fs::write(outbox.join(format!("{}.done", self.0)), b"")?;
        Ok(())
    }
}

struct Failing(&'static str);

#[async_trait]
impl EtlStep for Failing {
    fn name(&self) -> &str {
        self.0
    }

    async fn run(&self, _env: &Environment) -> anyhow::Result<()> {
        anyhow::bail!("source file is empty")
    }
}

fn load_markers() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    Ok(vec![Box::new(Marker("010_extract")), Box::new(Marker("030_load"))])
}

fn load_failing() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    Ok(vec![Box::new(Failing("020_transform"))])
}

fn load_duplicate() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    Ok(vec![Box::new(Marker("010_extract"))])
}

fn load_broken() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    anyhow::bail!("missing lookup table")
}

fn three_step_registry() -> StepRegistry {
    StepRegistry::from_units(&[
        StepUnit { name: "markers", load: load_markers },
        StepUnit { name: "failing", load: load_failing },
    ])
    .unwrap()
}

fn marker_exists(env: &Environment, step: &str) -> bool {
    env.resolve(FolderKind::Outbox)
        .join(format!("{}.done", step))
        .exists()
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[test]
fn test_one_entry_per_declared_name() {
    let registry = three_step_registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(
        registry.names().collect::<Vec<_>>(),
        vec!["010_extract", "020_transform", "030_load"]
    );
}

#[test]
fn test_duplicate_name_fails_discovery() {
    let err = StepRegistry::from_units(&[
        StepUnit { name: "markers", load: load_markers },
        StepUnit { name: "copycat", load: load_duplicate },
    ])
    .unwrap_err();

    match err {
        EtlError::DuplicateStepName {
            name,
            first_unit,
            second_unit,
        } => {
            assert_eq!(name, "010_extract");
            assert_eq!(first_unit, "markers");
            assert_eq!(second_unit, "copycat");
        }
        other => panic!("expected DuplicateStepName, got {:?}", other),
    }
}

#[test]
fn test_failing_unit_names_the_unit() {
    let err = StepRegistry::from_units(&[
        StepUnit { name: "markers", load: load_markers },
        StepUnit { name: "broken", load: load_broken },
    ])
    .unwrap_err();

    assert!(matches!(err, EtlError::Discovery { ref unit, .. } if unit == "broken"));
    assert!(err.to_string().contains("missing lookup table"));
}

#[test]
fn test_builtin_steps_discovered() {
    let registry = StepRegistry::discover().unwrap();
    let names: Vec<&str> = registry.names().collect();
    assert!(names.contains(&"001_check_for_inbox_files"));
    assert!(names.contains(&"002_list_file_sources"));
}

// ============================================================================
// Runner Tests
// ============================================================================

#[tokio::test]
async fn test_failure_does_not_stop_later_steps() {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::new(temp_dir.path());
    let registry = three_step_registry();

    let summary = Runner::new(&env, &registry).run_all().await;

    let statuses: Vec<&StepStatus> = summary.outcomes().iter().map(|o| &o.status).collect();
    assert_eq!(
        statuses,
        vec![
            &StepStatus::Succeeded,
            &StepStatus::Failed("source file is empty".to_string()),
            &StepStatus::Succeeded,
        ]
    );
    assert_eq!(summary.failed(), 1);
    assert!(marker_exists(&env, "030_load"));

    let err = summary.outcomes()[1].error().unwrap();
    assert!(matches!(err, EtlError::StepExecution { ref step, .. } if step == "020_transform"));
}

#[tokio::test]
async fn test_fail_fast_stops_after_failure() {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::new(temp_dir.path());
    let registry = three_step_registry();

    let summary = Runner::new(&env, &registry)
        .with_options(RunnerOptions { fail_fast: true })
        .run_all()
        .await;

    assert_eq!(summary.outcomes().len(), 2);
    assert!(!marker_exists(&env, "030_load"));
}

#[tokio::test]
async fn test_selected_steps_run_in_given_order() {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::new(temp_dir.path());
    let registry = three_step_registry();

    let summary = Runner::new(&env, &registry)
        .run_selected(&["030_load", "010_extract"])
        .await
        .unwrap();

    let names: Vec<&str> = summary.outcomes().iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["030_load", "010_extract"]);
    assert!(summary.is_success());
}

#[tokio::test]
async fn test_unknown_step_runs_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::new(temp_dir.path());
    let registry = three_step_registry();

    let err = Runner::new(&env, &registry)
        .run_selected(&["010_extract", "999_missing"])
        .await
        .unwrap_err();

    assert!(matches!(err, EtlError::UnknownStep(ref name) if name == "999_missing"));
    assert!(!marker_exists(&env, "010_extract"));
}

#[tokio::test]
async fn test_builtin_pipeline_runs_on_fresh_root() {
    let temp_dir = TempDir::new().unwrap();
    let env = Environment::new(temp_dir.path());
    env.ensure_folders().unwrap();
    std::fs::write(env.resolve(FolderKind::Inbox).join("orders.csv"), "id\n1\n").unwrap();

    let registry = StepRegistry::discover().unwrap();
    let summary = etl_core::runner::run_all(&env, &registry).await;

    assert!(summary.is_success(), "{}", summary);
    assert_eq!(summary.outcomes().len(), registry.len());
}
