//! Excel workbooks: first worksheet, header row then data rows
//!
//! Trailing rows whose cells are all empty leave nothing in the worksheet, so
//! the writer records the data row count in the `etl_row_count` defined name
//! and the reader pads back up to it.

use super::{Cell, CodecContext, TabularData};
use crate::error::{EtlError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use etl_common::FileType;
use rust_xlsxwriter::Workbook;
use std::path::Path;

const EXCEL: FileType = FileType::Excel;

/// Workbook-level name holding the number of data rows
const ROW_COUNT_NAME: &str = "etl_row_count";

pub(super) fn read(path: &Path) -> Result<TabularData> {
    let mut workbook = open_workbook_auto(path).codec_context(EXCEL, path)?;
    let recorded_rows = recorded_row_count(workbook.defined_names());
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::codec(EXCEL, path, "workbook has no worksheets"))?
        .codec_context(EXCEL, path)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(TabularData::default());
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::Empty => format!("column_{}", idx + 1),
            other => other.to_string().trim().to_string(),
        })
        .collect();
    let mut data = TabularData::new(columns)?;
    let width = data.num_columns();

    for row in rows {
        let mut cells: Vec<Cell> = row.iter().take(width).map(to_cell).collect();
        cells.resize(width, Cell::Null);
        data.push_row(cells)?;
    }

    if let Some(recorded) = recorded_rows {
        while data.num_rows() < recorded {
            data.push_row(vec![Cell::Null; width])?;
        }
    }

    Ok(data)
}

fn recorded_row_count(names: &[(String, String)]) -> Option<usize> {
    names
        .iter()
        .find(|(name, _)| name == ROW_COUNT_NAME)
        .and_then(|(_, value)| value.trim().trim_start_matches('=').parse().ok())
}

fn to_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Null,
        Data::String(s) if s.is_empty() => Cell::Null,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        // Excel stores every number as a double
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Cell::Int(*f as i64),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        other => Cell::Text(other.to_string()),
    }
}

pub(super) fn write(data: &TabularData, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in data.columns().iter().enumerate() {
        let col = column_index(col, path)?;
        worksheet.write_string(0, col, name).codec_context(EXCEL, path)?;
    }

    for (row_idx, row) in data.rows().iter().enumerate() {
        let excel_row = u32::try_from(row_idx + 1)
            .map_err(|_| EtlError::codec(EXCEL, path, "too many rows for a worksheet"))?;

        for (col, cell) in row.iter().enumerate() {
            let col = column_index(col, path)?;
            match cell {
                Cell::Null => {}
                Cell::Bool(b) => {
                    worksheet
                        .write_boolean(excel_row, col, *b)
                        .codec_context(EXCEL, path)?;
                }
                Cell::Int(i) => {
                    worksheet
                        .write_number(excel_row, col, *i as f64)
                        .codec_context(EXCEL, path)?;
                }
                Cell::Float(f) => {
                    worksheet
                        .write_number(excel_row, col, *f)
                        .codec_context(EXCEL, path)?;
                }
                Cell::Text(s) => {
                    worksheet
                        .write_string(excel_row, col, s)
                        .codec_context(EXCEL, path)?;
                }
            }
        }
    }

    workbook
        .define_name(ROW_COUNT_NAME, &format!("={}", data.num_rows()))
        .codec_context(EXCEL, path)?;
    workbook.save(path).codec_context(EXCEL, path)?;
    Ok(())
}

fn column_index(col: usize, path: &Path) -> Result<u16> {
    u16::try_from(col).map_err(|_| EtlError::codec(EXCEL, path, "too many columns for a worksheet"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_whole_floats_read_back_as_ints() {
        assert_eq!(to_cell(&Data::Float(3.0)), Cell::Int(3));
        assert_eq!(to_cell(&Data::Float(3.25)), Cell::Float(3.25));
        assert_eq!(to_cell(&Data::String(String::new())), Cell::Null);
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stock.xlsx");
        let data = TabularData::from_rows(
            vec!["sku".to_string(), "qty".to_string(), "price".to_string(), "active".to_string()],
            vec![
                vec![Cell::Text("A-1".to_string()), Cell::Int(4), Cell::Float(1.5), Cell::Bool(true)],
                vec![Cell::Text("B-2".to_string()), Cell::Null, Cell::Float(2.25), Cell::Bool(false)],
            ],
        )
        .unwrap();

        write(&data, &path).unwrap();
        assert_eq!(read(&path).unwrap(), data);
    }

    #[test]
    fn test_trailing_nulls_are_padded() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sparse.xlsx");
        let data = TabularData::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Cell::Int(1), Cell::Int(2)],
                vec![Cell::Int(3), Cell::Null],
            ],
        )
        .unwrap();

        write(&data, &path).unwrap();
        let back = read(&path).unwrap();
        assert_eq!(back.rows()[1], vec![Cell::Int(3), Cell::Null]);
    }

    #[test]
    fn test_trailing_empty_rows_survive() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gaps.xlsx");
        let data = TabularData::from_rows(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec![Cell::Int(1), Cell::Int(2)],
                vec![Cell::Null, Cell::Null],
                vec![Cell::Null, Cell::Null],
            ],
        )
        .unwrap();

        write(&data, &path).unwrap();
        let back = read(&path).unwrap();
        assert_eq!(back.num_rows(), 3);
        assert_eq!(back, data);
    }

    #[test]
    fn test_recorded_row_count() {
        let names = vec![
            ("Print_Area".to_string(), "Sheet1!$A$1:$B$2".to_string()),
            (ROW_COUNT_NAME.to_string(), "4".to_string()),
        ];
        assert_eq!(recorded_row_count(&names), Some(4));
        assert_eq!(recorded_row_count(&[]), None);
    }
}
