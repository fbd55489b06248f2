//! Common types used across the ETL harness

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Working Folders
// ============================================================================

/// Role of a working directory under the ETL root.
///
/// Every kind maps to exactly one fixed path segment, so the folder layout
/// is fully determined by the root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FolderKind {
    /// Incoming files waiting to be processed
    Inbox,
    /// Files produced for downstream consumers
    Outbox,
    /// Log files
    Logs,
    /// Scratch space
    Temp,
    /// Persisted intermediate data
    Data,
    /// Control files
    Control,
}

impl FolderKind {
    /// All folder kinds in declaration order
    pub const ALL: [FolderKind; 6] = [
        FolderKind::Inbox,
        FolderKind::Outbox,
        FolderKind::Logs,
        FolderKind::Temp,
        FolderKind::Data,
        FolderKind::Control,
    ];

    /// Relative path segment of this folder under the root
    pub fn segment(self) -> &'static str {
        match self {
            FolderKind::Inbox => "in",
            FolderKind::Outbox => "out",
            FolderKind::Logs => "logs",
            FolderKind::Temp => "tmp",
            FolderKind::Data => "dat",
            FolderKind::Control => "ctl",
        }
    }

    /// Upper-case kind name used in reports (e.g. `INBOX`)
    pub fn name(self) -> &'static str {
        match self {
            FolderKind::Inbox => "INBOX",
            FolderKind::Outbox => "OUTBOX",
            FolderKind::Logs => "LOGS",
            FolderKind::Temp => "TEMP",
            FolderKind::Data => "DATA",
            FolderKind::Control => "CONTROL",
        }
    }
}

impl std::fmt::Display for FolderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FolderKind {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        FolderKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&lower) || kind.segment() == lower)
            .ok_or_else(|| CommonError::UnknownFolderKind(s.to_string()))
    }
}

// ============================================================================
// File Types
// ============================================================================

/// Tabular serialization format of a data file.
///
/// The lower-case string value is what gets persisted in the control schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Excel,
    Json,
    Parquet,
    Xml,
}

impl FileType {
    /// All file types in declaration order
    pub const ALL: [FileType; 5] = [
        FileType::Csv,
        FileType::Excel,
        FileType::Json,
        FileType::Parquet,
        FileType::Xml,
    ];

    /// Persisted string value
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Csv => "csv",
            FileType::Excel => "excel",
            FileType::Json => "json",
            FileType::Parquet => "parquet",
            FileType::Xml => "xml",
        }
    }

    /// Infer the file type from a path's extension
    ///
    /// Returns `None` when the extension is missing or not a known tabular format.
    pub fn from_extension(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(FileType::Csv),
            "xlsx" | "xls" | "xlsm" => Some(FileType::Excel),
            "json" => Some(FileType::Json),
            "parquet" => Some(FileType::Parquet),
            "xml" => Some(FileType::Xml),
            _ => None,
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FileType {
    type Err = CommonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(FileType::Csv),
            "excel" => Ok(FileType::Excel),
            "json" => Ok(FileType::Json),
            "parquet" => Ok(FileType::Parquet),
            "xml" => Ok(FileType::Xml),
            _ => Err(CommonError::UnsupportedFileType(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_segments_are_fixed() {
        let segments: Vec<&str> = FolderKind::ALL.iter().map(|k| k.segment()).collect();
        assert_eq!(segments, vec!["in", "out", "logs", "tmp", "dat", "ctl"]);
    }

    #[test]
    fn test_folder_kind_from_str() {
        assert_eq!("inbox".parse::<FolderKind>().unwrap(), FolderKind::Inbox);
        assert_eq!("CONTROL".parse::<FolderKind>().unwrap(), FolderKind::Control);
        assert_eq!("dat".parse::<FolderKind>().unwrap(), FolderKind::Data);
        assert!("attic".parse::<FolderKind>().is_err());
    }

    #[test]
    fn test_file_type_from_str() {
        assert_eq!("csv".parse::<FileType>().unwrap(), FileType::Csv);
        assert_eq!("EXCEL".parse::<FileType>().unwrap(), FileType::Excel);
        assert_eq!(" Parquet ".parse::<FileType>().unwrap(), FileType::Parquet);
        assert_eq!(
            "yaml".parse::<FileType>(),
            Err(CommonError::UnsupportedFileType("yaml".to_string()))
        );
    }

    #[test]
    fn test_file_type_string_values_round_trip() {
        for file_type in FileType::ALL {
            assert_eq!(file_type.as_str().parse::<FileType>().unwrap(), file_type);
        }
    }

    #[test]
    fn test_file_type_from_extension() {
        assert_eq!(FileType::from_extension("in/orders.CSV"), Some(FileType::Csv));
        assert_eq!(FileType::from_extension("report.xlsx"), Some(FileType::Excel));
        assert_eq!(FileType::from_extension("events.parquet"), Some(FileType::Parquet));
        assert_eq!(FileType::from_extension("notes.txt"), None);
        assert_eq!(FileType::from_extension("README"), None);
    }

    #[test]
    fn test_file_type_serde_uses_lowercase() {
        let json = serde_json::to_string(&FileType::Json).unwrap();
        assert_eq!(json, "\"json\"");
        let parsed: FileType = serde_json::from_str("\"xml\"").unwrap();
        assert_eq!(parsed, FileType::Xml);
    }
}
