//! Generates the step unit table from the files in `src/steps/`.
//!
//! Every `src/steps/<unit>.rs` (except `mod.rs`) becomes a module of
//! `crate::steps` and one entry of `STEP_UNITS`. Each unit must export
//! `pub fn load() -> anyhow::Result<Vec<Box<dyn EtlStep>>>`.

use std::collections::BTreeSet;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?);
    let manifest_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").ok_or("CARGO_MANIFEST_DIR is not set")?);
    let steps_dir = manifest_dir.join("src").join("steps");

    println!("cargo:rerun-if-changed=src/steps");
    println!("cargo:rerun-if-changed=migrations");

    let units = collect_step_units(&steps_dir)?;
    let source = generate_unit_table(&steps_dir, &units)?;
    fs::write(out_dir.join("step_units.rs"), source)?;

    Ok(())
}

fn collect_step_units(steps_dir: &Path) -> Result<BTreeSet<String>, Box<dyn std::error::Error>> {
    let mut units = BTreeSet::new();

    for entry in fs::read_dir(steps_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some("rs") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem == "mod" {
            continue;
        }
        if !is_module_name(stem) {
            return Err(format!(
                "step unit '{}' is not a valid module name (use lowercase letters, digits and '_', not starting with a digit)",
                path.display()
            )
            .into());
        }
        units.insert(stem.to_string());
    }

    Ok(units)
}

fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn generate_unit_table(
    steps_dir: &Path,
    units: &BTreeSet<String>,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    for unit in units {
        let path = steps_dir.join(format!("{unit}.rs"));
        writeln!(out, "#[path = {:?}]", path.display().to_string())?;
        writeln!(out, "pub mod {unit};")?;
    }

    writeln!(out)?;
    writeln!(out, "/// Every step unit found under `src/steps/`, sorted by unit name")?;
    writeln!(out, "pub static STEP_UNITS: &[crate::step::StepUnit] = &[")?;
    for unit in units {
        writeln!(
            out,
            "    crate::step::StepUnit {{ name: {unit:?}, load: {unit}::load }},"
        )?;
    }
    writeln!(out, "];")?;

    Ok(out)
}
