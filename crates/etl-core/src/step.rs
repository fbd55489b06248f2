//! The step contract
//!
//! A step is one named unit of ETL work. Steps live in `src/steps/`, one
//! file per unit; the build script turns every file there into a
//! [`StepUnit`] so the registry never names a concrete step.
//!
//! # Writing a step
//!
//! ```ignore
//! // src/steps/load_orders.rs
//! use crate::environment::Environment;
//! use crate::step::EtlStep;
//! use async_trait::async_trait;
//!
//! pub fn load() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
//!     Ok(vec![Box::new(LoadOrders)])
//! }
//!
//! struct LoadOrders;
//!
//! #[async_trait]
//! impl EtlStep for LoadOrders {
//!     fn name(&self) -> &str {
//!         "010_load_orders"
//!     }
//!
//!     async fn run(&self, env: &Environment) -> anyhow::Result<()> {
//!         // read from env.resolve(FolderKind::Inbox) ...
//!         Ok(())
//!     }
//! }
//! ```

use crate::environment::Environment;
use async_trait::async_trait;

/// One named, independently pluggable unit of ETL work
#[async_trait]
pub trait EtlStep: Send + Sync {
    /// Unique name used for registration, logging and selective runs
    fn name(&self) -> &str;

    /// Short human-readable summary
    fn description(&self) -> &str {
        ""
    }

    /// Execute against the shared environment.
    ///
    /// Errors are reported by the runner; they never abort the process.
    async fn run(&self, env: &Environment) -> anyhow::Result<()>;
}

/// Constructor exported by a step unit
pub type LoadFn = fn() -> anyhow::Result<Vec<Box<dyn EtlStep>>>;

/// A source file under `src/steps/` and its constructor
#[derive(Clone, Copy)]
pub struct StepUnit {
    pub name: &'static str,
    pub load: LoadFn,
}

impl std::fmt::Debug for StepUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepUnit").field("name", &self.name).finish()
    }
}
