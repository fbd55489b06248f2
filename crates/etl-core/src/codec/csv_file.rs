//! CSV with a header row

use super::{Cell, CodecContext, TabularData};
use crate::error::Result;
use etl_common::FileType;
use std::path::Path;

const CSV: FileType = FileType::Csv;

pub(super) fn read(path: &Path) -> Result<TabularData> {
    let mut reader = ::csv::Reader::from_path(path).codec_context(CSV, path)?;

    let columns = reader
        .headers()
        .codec_context(CSV, path)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut data = TabularData::new(columns)?;

    for record in reader.records() {
        let record = record.codec_context(CSV, path)?;
        data.push_row(record.iter().map(Cell::infer).collect())?;
    }

    Ok(data)
}

pub(super) fn write(data: &TabularData, path: &Path) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path).codec_context(CSV, path)?;

    writer.write_record(data.columns()).codec_context(CSV, path)?;
    for row in data.rows() {
        writer
            .write_record(row.iter().map(|cell| cell.to_text().unwrap_or_default()))
            .codec_context(CSV, path)?;
    }
    writer.flush().codec_context(CSV, path)?;

    Ok(())
}
