//! Reports the files waiting in the inbox

use crate::environment::Environment;
use crate::error::{EtlError, Result};
use crate::step::EtlStep;
use async_trait::async_trait;
use etl_common::FolderKind;
use std::io::ErrorKind;
use tracing::info;

pub fn load() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    Ok(vec![Box::new(CheckForInboxFiles)])
}

struct CheckForInboxFiles;

#[async_trait]
impl EtlStep for CheckForInboxFiles {
    fn name(&self) -> &str {
        "001_check_for_inbox_files"
    }

    fn description(&self) -> &str {
        "List the regular files waiting in the inbox"
    }

    async fn run(&self, env: &Environment) -> anyhow::Result<()> {
        let files = list_inbox_files(env)?;

        if files.is_empty() {
            info!("No files found");
        }
        for file in &files {
            info!(file = %file, "Inbox file");
        }

        Ok(())
    }
}

/// Names of the regular files in the inbox, sorted.
///
/// A missing inbox folder yields an empty list.
pub fn list_inbox_files(env: &Environment) -> Result<Vec<String>> {
    let inbox = env.resolve(FolderKind::Inbox);

    let entries = match std::fs::read_dir(&inbox) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(EtlError::filesystem(&inbox, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EtlError::filesystem(&inbox, e))?;
        // follows symlinks
        if entry.path().is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();

    Ok(files)
}
