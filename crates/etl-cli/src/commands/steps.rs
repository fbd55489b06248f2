//! `etl steps` command implementation

use crate::error::Result;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use etl_core::StepRegistry;

/// List discovered steps in run order
pub async fn run() -> Result<()> {
    let registry = StepRegistry::discover()?;

    if registry.is_empty() {
        println!("No steps found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Step", "Unit", "Description"]);

    for (name, step) in registry.iter() {
        table.add_row(vec![
            name,
            registry.unit_of(name).unwrap_or_default(),
            step.description(),
        ]);
    }

    println!("{}", table);
    println!("\n{} {} step(s)", "Total:".cyan(), registry.len());

    Ok(())
}
