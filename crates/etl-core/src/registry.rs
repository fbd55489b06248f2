//! Step discovery and lookup

use crate::error::{EtlError, Result};
use crate::step::{EtlStep, StepUnit};
use crate::steps::STEP_UNITS;
use std::collections::BTreeMap;
use tracing::{debug, info};

struct Entry {
    unit: &'static str,
    step: Box<dyn EtlStep>,
}

/// Every discovered step, keyed by its unique name.
///
/// Each unit is loaded exactly once and its instances are reused for every
/// run. Iteration is in ascending name order.
pub struct StepRegistry {
    steps: BTreeMap<String, Entry>,
}

impl StepRegistry {
    /// Load every unit under `src/steps/`
    pub fn discover() -> Result<Self> {
        Self::from_units(STEP_UNITS)
    }

    /// Load an explicit list of units.
    ///
    /// Fails on the first unit whose `load()` errors, on a blank step name or
    /// one with surrounding whitespace, and on a name declared twice. No
    /// partial registry is returned.
    pub fn from_units(units: &[StepUnit]) -> Result<Self> {
        let mut steps: BTreeMap<String, Entry> = BTreeMap::new();

        for unit in units {
            let loaded = (unit.load)().map_err(|source| EtlError::Discovery {
                unit: unit.name.to_string(),
                source,
            })?;
            debug!(unit = unit.name, count = loaded.len(), "Loaded step unit");

            for step in loaded {
                let name = step.name().to_string();
                if name.trim().is_empty() {
                    return Err(EtlError::Discovery {
                        unit: unit.name.to_string(),
                        source: anyhow::anyhow!("step declares an empty name"),
                    });
                }
                // Lookups use the exact name, so it must be typeable as given
                if name.trim() != name {
                    return Err(EtlError::Discovery {
                        unit: unit.name.to_string(),
                        source: anyhow::anyhow!("step name '{}' has surrounding whitespace", name),
                    });
                }
                if let Some(existing) = steps.get(&name) {
                    return Err(EtlError::DuplicateStepName {
                        name,
                        first_unit: existing.unit.to_string(),
                        second_unit: unit.name.to_string(),
                    });
                }
                steps.insert(
                    name,
                    Entry {
                        unit: unit.name,
                        step,
                    },
                );
            }
        }

        info!(steps = steps.len(), units = units.len(), "Discovered steps");
        Ok(Self { steps })
    }

    pub fn get(&self, name: &str) -> Option<&dyn EtlStep> {
        self.steps.get(name).map(|entry| entry.step.as_ref())
    }

    /// The unit a step was loaded from
    pub fn unit_of(&self, name: &str) -> Option<&'static str> {
        self.steps.get(name).map(|entry| entry.unit)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    /// Registered names in run order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.keys().map(String::as_str)
    }

    /// Steps in run order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn EtlStep)> + '_ {
        self.steps
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.step.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.steps.iter().map(|(name, entry)| (name, entry.unit)))
            .finish()
    }
}
