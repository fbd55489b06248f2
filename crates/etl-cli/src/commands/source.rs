//! `etl source` command implementation
//!
//! Manages file sources in the control schema. `add` runs non-interactively
//! when `--key` is given and prompts for every field otherwise; both paths
//! validate through [`NewFileSource::new`].

use crate::config::CliConfig;
use crate::error::{CliError, Result};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use etl_core::control::{MAX_DESCRIPTION_LEN, MAX_FILE_KEY_LEN};
use etl_core::{FileSourceRecord, FileType, NewFileSource};
use inquire::validator::{StringValidator, Validation};
use inquire::{Confirm, Select, Text};
use serde_json::json;

/// Raw field values for a new file source
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub key: Option<String>,
    pub description: Option<String>,
    pub file_type: Option<String>,
    pub disabled: bool,
}

/// Add a file source
pub async fn add(config: &CliConfig, args: AddArgs) -> Result<()> {
    let source = match args.key {
        Some(ref key) => NewFileSource::new(
            key,
            args.description.as_deref(),
            args.file_type.as_deref(),
            !args.disabled,
        )?,
        None => match prompt_new_source()? {
            Some(source) => source,
            None => {
                println!("{} Nothing added", "✗".yellow());
                return Ok(());
            }
        },
    };

    let control = config.require_control().await?;
    let record = control.add_file_source(source).await?;

    println!("{} Added file source: {}", "✓".green(), record.file_key.cyan());
    Ok(())
}

/// Ask for each field, show a summary and confirm. `None` when declined.
fn prompt_new_source() -> Result<Option<NewFileSource>> {
    let key = Text::new("File key:")
        .with_help_message(&format!("Unique, at most {} characters", MAX_FILE_KEY_LEN))
        .with_validator(MaxLen {
            max: MAX_FILE_KEY_LEN,
            required: true,
        })
        .prompt()?;

    let description = Text::new("Description:")
        .with_help_message("Optional")
        .with_validator(MaxLen {
            max: MAX_DESCRIPTION_LEN,
            required: false,
        })
        .prompt()?;

    let mut type_options = vec!["(none)".to_string()];
    type_options.extend(FileType::ALL.iter().map(|t| t.as_str().to_string()));
    let file_type = Select::new("File type:", type_options).prompt()?;
    let file_type = (file_type != "(none)").then_some(file_type);

    let enabled = Confirm::new("Enabled?").with_default(true).prompt()?;

    let source = NewFileSource::new(&key, Some(&description), file_type.as_deref(), enabled)?;

    println!();
    println!("{}", "New file source:".cyan().bold());
    println!("{}", source_table(&FileSourceRecord::from(source.clone())));

    let confirmed = Confirm::new("Add this file source?")
        .with_default(true)
        .prompt()?;

    Ok(confirmed.then_some(source))
}

/// Length check shared by the key and description prompts
#[derive(Clone)]
struct MaxLen {
    max: usize,
    required: bool,
}

impl StringValidator for MaxLen {
    fn validate(&self, input: &str) -> std::result::Result<Validation, inquire::CustomUserError> {
        let len = input.trim().chars().count();
        if self.required && len == 0 {
            return Ok(Validation::Invalid("This field is required".into()));
        }
        if len > self.max {
            return Ok(Validation::Invalid(
                format!("At most {} characters (got {})", self.max, len).into(),
            ));
        }
        Ok(Validation::Valid)
    }
}

/// List file and HTTP sources
pub async fn list(config: &CliConfig, json_output: bool) -> Result<()> {
    let control = config.require_control().await?;
    let file_sources = control.list_file_sources().await?;
    let http_sources = control.list_http_sources().await?;

    if json_output {
        let doc = json!({
            "file_sources": file_sources,
            "http_sources": http_sources,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    if file_sources.is_empty() && http_sources.is_empty() {
        println!("No sources configured.");
        println!("Run 'etl source add' to add a file source.");
        return Ok(());
    }

    if !file_sources.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Key", "Type", "Enabled", "Description"]);
        for source in &file_sources {
            table.add_row(vec![
                source.file_key.clone(),
                source.file_type.map(|t| t.to_string()).unwrap_or_default(),
                yes_no(source.enabled).to_string(),
                source.file_description.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", "File sources:".cyan().bold());
        println!("{}", table);
    }

    if !http_sources.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec!["Key", "URL", "Enabled", "Description"]);
        for source in &http_sources {
            table.add_row(vec![
                source.http_key.clone(),
                source.url.clone().unwrap_or_default(),
                yes_no(source.enabled).to_string(),
                source.http_description.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", "HTTP sources:".cyan().bold());
        println!("{}", table);
    }

    println!(
        "\nTotal: {} file source(s), {} HTTP source(s)",
        file_sources.len(),
        http_sources.len()
    );
    Ok(())
}

/// Show one file source
pub async fn show(config: &CliConfig, key: &str) -> Result<()> {
    let control = config.require_control().await?;
    let record = control
        .get_file_source(key)
        .await?
        .ok_or_else(|| CliError::SourceNotFound(key.to_string()))?;

    println!("{}", source_table(&record));
    Ok(())
}

fn source_table(record: &FileSourceRecord) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);

    table.add_row(vec!["Key", record.file_key.as_str()]);
    table.add_row(vec![
        "Description",
        record.file_description.as_deref().unwrap_or("-"),
    ]);
    table.add_row(vec![
        "Type",
        record.file_type.map(|t| t.as_str()).unwrap_or("-"),
    ]);
    table.add_row(vec!["Enabled", yes_no(record.enabled)]);
    table
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
