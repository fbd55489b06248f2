//! Control schema records

use crate::error::{EtlError, Result};
use etl_common::FileType;
use serde::{Deserialize, Serialize};

// ============================================================================
// Column Limits
// ============================================================================

/// Width of `ctl_file_sources.file_key`
pub const MAX_FILE_KEY_LEN: usize = 50;

/// Width of `ctl_file_sources.file_description`
pub const MAX_DESCRIPTION_LEN: usize = 100;

/// A row of `ctl_file_sources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSourceRecord {
    pub file_key: String,
    pub file_description: Option<String>,
    pub file_type: Option<FileType>,
    pub enabled: bool,
}

/// A row of `ctl_http_sources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSourceRecord {
    pub http_key: String,
    pub url: Option<String>,
    pub http_description: Option<String>,
    pub enabled: bool,
}

/// Validated input for adding a file source
///
/// Both the flag-driven and the interactive add flow build one of these, so
/// they share the same rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFileSource {
    file_key: String,
    file_description: Option<String>,
    file_type: Option<FileType>,
    enabled: bool,
}

impl NewFileSource {
    /// Validate raw field values.
    ///
    /// The key is trimmed and required. Blank description and type are
    /// treated as unset. The type must name a supported file type.
    pub fn new(
        file_key: &str,
        file_description: Option<&str>,
        file_type: Option<&str>,
        enabled: bool,
    ) -> Result<Self> {
        let file_key = file_key.trim();
        if file_key.is_empty() {
            return Err(EtlError::validation("file key is required"));
        }
        if file_key.chars().count() > MAX_FILE_KEY_LEN {
            return Err(EtlError::validation(format!(
                "file key must be at most {} characters",
                MAX_FILE_KEY_LEN
            )));
        }

        let file_description = file_description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if let Some(ref description) = file_description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(EtlError::validation(format!(
                    "description must be at most {} characters",
                    MAX_DESCRIPTION_LEN
                )));
            }
        }

        let file_type = file_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::parse::<FileType>)
            .transpose()?;

        Ok(Self {
            file_key: file_key.to_string(),
            file_description,
            file_type,
            enabled,
        })
    }

    pub fn file_key(&self) -> &str {
        &self.file_key
    }

    pub fn file_description(&self) -> Option<&str> {
        self.file_description.as_deref()
    }

    pub fn file_type(&self) -> Option<FileType> {
        self.file_type
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

impl From<NewFileSource> for FileSourceRecord {
    fn from(source: NewFileSource) -> Self {
        Self {
            file_key: source.file_key,
            file_description: source.file_description,
            file_type: source.file_type,
            enabled: source.enabled,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_source() {
        let source = NewFileSource::new("  orders ", None, None, true).unwrap();
        assert_eq!(source.file_key(), "orders");
        assert_eq!(source.file_description(), None);
        assert_eq!(source.file_type(), None);
        assert!(source.enabled());
    }

    #[test]
    fn test_key_required() {
        let err = NewFileSource::new("   ", None, None, true).unwrap_err();
        assert!(matches!(err, EtlError::Validation(_)));
    }

    #[test]
    fn test_length_limits() {
        let key = "k".repeat(MAX_FILE_KEY_LEN);
        assert!(NewFileSource::new(&key, None, None, true).is_ok());

        let too_long = "k".repeat(MAX_FILE_KEY_LEN + 1);
        assert!(matches!(
            NewFileSource::new(&too_long, None, None, true),
            Err(EtlError::Validation(_))
        ));

        let description = "d".repeat(MAX_DESCRIPTION_LEN + 1);
        assert!(matches!(
            NewFileSource::new("orders", Some(&description), None, true),
            Err(EtlError::Validation(_))
        ));
    }

    #[test]
    fn test_file_type_parsed() {
        let source = NewFileSource::new("orders", Some(""), Some("CSV"), false).unwrap();
        assert_eq!(source.file_type(), Some(FileType::Csv));
        assert_eq!(source.file_description(), None);
        assert!(!source.enabled());

        let err = NewFileSource::new("orders", None, Some("yaml"), true).unwrap_err();
        assert!(matches!(err, EtlError::UnsupportedFileType(ref t) if t == "yaml"));
    }
}
