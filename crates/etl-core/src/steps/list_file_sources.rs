//! Reports configured sources and which file sources have inbox files ready

use super::check_for_inbox_files::list_inbox_files;
use crate::control::FileSourceRecord;
use crate::environment::Environment;
use crate::step::EtlStep;
use async_trait::async_trait;
use etl_common::FileType;
use std::path::Path;
use tracing::{info, warn};

pub fn load() -> anyhow::Result<Vec<Box<dyn EtlStep>>> {
    Ok(vec![Box::new(ListFileSources)])
}

struct ListFileSources;

#[async_trait]
impl EtlStep for ListFileSources {
    fn name(&self) -> &str {
        "002_list_file_sources"
    }

    fn description(&self) -> &str {
        "List file and HTTP sources and match file sources to inbox files"
    }

    async fn run(&self, env: &Environment) -> anyhow::Result<()> {
        let Some(control) = env.control() else {
            warn!("No control store configured, skipping");
            return Ok(());
        };

        let file_sources = control.list_file_sources().await?;
        let http_sources = control.list_http_sources().await?;
        info!(
            file_sources = file_sources.len(),
            http_sources = http_sources.len(),
            "Loaded sources"
        );

        for source in &http_sources {
            info!(
                http_key = %source.http_key,
                url = source.url.as_deref().unwrap_or_default(),
                enabled = source.enabled,
                "HTTP source"
            );
        }

        let inbox_files = list_inbox_files(env)?;
        for source in file_sources.iter().filter(|s| s.enabled) {
            let matched: Vec<&String> = inbox_files
                .iter()
                .filter(|file| matches_source(source, file))
                .collect();

            if matched.is_empty() {
                info!(file_key = %source.file_key, "No inbox file for source");
            }
            for file in matched {
                info!(file_key = %source.file_key, file = %file, "Inbox file ready");
            }
        }

        Ok(())
    }
}

/// True when the file's stem is the source key and, if the source declares a
/// file type, the extension agrees with it
fn matches_source(source: &FileSourceRecord, file_name: &str) -> bool {
    let path = Path::new(file_name);
    let stem_matches = path
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem == source.file_key);

    stem_matches
        && match source.file_type {
            Some(expected) => FileType::from_extension(path) == Some(expected),
            None => true,
        }
}
