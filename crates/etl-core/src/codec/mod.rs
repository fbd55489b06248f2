//! File type codec
//!
//! Reads and writes [`TabularData`] in every supported [`FileType`]. Dispatch
//! goes through the static [`HANDLERS`] table; supporting another format is a
//! new module plus one table entry.
//!
//! Round-trip fidelity per format (row count and column set are always kept):
//!
//! | Format  | Value types on read-back                                   |
//! |---------|------------------------------------------------------------|
//! | CSV     | re-inferred from text (`"007"` becomes `7`)                |
//! | JSON    | kept exactly; nested arrays/objects become their JSON text |
//! | XML     | re-inferred from text                                      |
//! | Parquet | kept; int/float mixes become floats, other mixes text      |
//! | Excel   | numbers stored as floats; whole values read back as ints   |

mod csv_file;
mod excel;
mod json;
mod parquet_file;
mod tabular;
mod xml;

pub use tabular::{Cell, TabularData};

use crate::error::{EtlError, Result};
use etl_common::FileType;
use std::path::Path;
use tracing::debug;

type ReadFn = fn(&Path) -> Result<TabularData>;
type WriteFn = fn(&TabularData, &Path) -> Result<()>;

/// Read/write pair for one file type
pub struct FormatHandler {
    pub file_type: FileType,
    read: ReadFn,
    write: WriteFn,
}

/// Registered format handlers
pub static HANDLERS: &[FormatHandler] = &[
    FormatHandler {
        file_type: FileType::Csv,
        read: csv_file::read,
        write: csv_file::write,
    },
    FormatHandler {
        file_type: FileType::Excel,
        read: excel::read,
        write: excel::write,
    },
    FormatHandler {
        file_type: FileType::Json,
        read: json::read,
        write: json::write,
    },
    FormatHandler {
        file_type: FileType::Parquet,
        read: parquet_file::read,
        write: parquet_file::write,
    },
    FormatHandler {
        file_type: FileType::Xml,
        read: xml::read,
        write: xml::write,
    },
];

fn handler(file_type: FileType) -> Result<&'static FormatHandler> {
    HANDLERS
        .iter()
        .find(|h| h.file_type == file_type)
        .ok_or_else(|| EtlError::UnsupportedFileType(file_type.to_string()))
}

/// File types with a registered handler
pub fn supported_types() -> impl Iterator<Item = FileType> {
    HANDLERS.iter().map(|h| h.file_type)
}

/// Read a file as tabular data
pub fn read(path: impl AsRef<Path>, file_type: FileType) -> Result<TabularData> {
    let path = path.as_ref();
    let data = (handler(file_type)?.read)(path)?;
    debug!(
        path = %path.display(),
        file_type = %file_type,
        rows = data.num_rows(),
        columns = data.num_columns(),
        "Read tabular file"
    );
    Ok(data)
}

/// Write tabular data to a file, creating the parent folder if needed
pub fn write(data: &TabularData, path: impl AsRef<Path>, file_type: FileType) -> Result<()> {
    let path = path.as_ref();
    let handler = handler(file_type)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EtlError::filesystem(parent, e))?;
    }

    (handler.write)(data, path)?;
    debug!(
        path = %path.display(),
        file_type = %file_type,
        rows = data.num_rows(),
        "Wrote tabular file"
    );
    Ok(())
}

/// [`read`] with the file type given as its persisted tag (e.g. `"csv"`)
pub fn read_tagged(path: impl AsRef<Path>, tag: &str) -> Result<TabularData> {
    read(path, tag.parse::<FileType>()?)
}

/// [`write`] with the file type given as its persisted tag
pub fn write_tagged(data: &TabularData, path: impl AsRef<Path>, tag: &str) -> Result<()> {
    write(data, path, tag.parse::<FileType>()?)
}

/// Attaches the file type and path to a format crate's error
trait CodecContext<T> {
    fn codec_context(self, file_type: FileType, path: &Path) -> Result<T>;
}

impl<T, E: std::fmt::Display> CodecContext<T> for std::result::Result<T, E> {
    fn codec_context(self, file_type: FileType, path: &Path) -> Result<T> {
        self.map_err(|e| EtlError::codec(file_type, path, e))
    }
}
