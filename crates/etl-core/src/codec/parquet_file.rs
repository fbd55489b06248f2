//! Parquet through Arrow record batches

use super::{Cell, CodecContext, TabularData};
use crate::error::Result;
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use etl_common::FileType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const PARQUET: FileType = FileType::Parquet;

/// Arrow type for a column: the narrowest type holding every non-null cell
fn infer_type<'a>(cells: impl Iterator<Item = &'a Cell>) -> DataType {
    let mut inferred: Option<DataType> = None;

    for cell in cells {
        let cell_type = match cell {
            Cell::Null => continue,
            Cell::Bool(_) => DataType::Boolean,
            Cell::Int(_) => DataType::Int64,
            Cell::Float(_) => DataType::Float64,
            Cell::Text(_) => return DataType::Utf8,
        };
        inferred = Some(match (inferred, cell_type) {
            (None, t) => t,
            (Some(a), b) if a == b => a,
            (Some(DataType::Int64), DataType::Float64)
            | (Some(DataType::Float64), DataType::Int64) => DataType::Float64,
            _ => return DataType::Utf8,
        });
    }

    inferred.unwrap_or(DataType::Utf8)
}

fn build_array<'a>(data_type: &DataType, cells: impl Iterator<Item = &'a Cell>) -> ArrayRef {
    match data_type {
        DataType::Boolean => {
            let mut builder = BooleanBuilder::new();
            for cell in cells {
                match cell {
                    Cell::Bool(b) => builder.append_value(*b),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Int64 => {
            let mut builder = Int64Builder::new();
            for cell in cells {
                match cell {
                    Cell::Int(i) => builder.append_value(*i),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        DataType::Float64 => {
            let mut builder = Float64Builder::new();
            for cell in cells {
                match cell {
                    Cell::Float(f) => builder.append_value(*f),
                    Cell::Int(i) => builder.append_value(*i as f64),
                    _ => builder.append_null(),
                }
            }
            Arc::new(builder.finish())
        }
        _ => {
            let mut builder = StringBuilder::new();
            for cell in cells {
                builder.append_option(cell.to_text());
            }
            Arc::new(builder.finish())
        }
    }
}

pub(super) fn write(data: &TabularData, path: &Path) -> Result<()> {
    let mut fields = Vec::with_capacity(data.num_columns());
    let mut arrays = Vec::with_capacity(data.num_columns());

    for (idx, name) in data.columns().iter().enumerate() {
        let data_type = infer_type(data.rows().iter().map(|row| &row[idx]));
        arrays.push(build_array(&data_type, data.rows().iter().map(|row| &row[idx])));
        fields.push(Field::new(name, data_type, true));
    }

    let schema = Arc::new(Schema::new(fields));
    let options = RecordBatchOptions::new().with_row_count(Some(data.num_rows()));
    let batch = RecordBatch::try_new_with_options(schema.clone(), arrays, &options)
        .codec_context(PARQUET, path)?;

    let file = File::create(path).codec_context(PARQUET, path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None).codec_context(PARQUET, path)?;
    writer.write(&batch).codec_context(PARQUET, path)?;
    writer.close().codec_context(PARQUET, path)?;

    Ok(())
}

pub(super) fn read(path: &Path) -> Result<TabularData> {
    let file = File::open(path).codec_context(PARQUET, path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).codec_context(PARQUET, path)?;
    let columns = builder
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect();
    let reader = builder.build().codec_context(PARQUET, path)?;

    let mut data = TabularData::new(columns)?;
    for batch in reader {
        let batch = batch.codec_context(PARQUET, path)?;
        let decoded = batch
            .columns()
            .iter()
            .map(decode_column)
            .collect::<std::result::Result<Vec<_>, _>>()
            .codec_context(PARQUET, path)?;

        for row in 0..batch.num_rows() {
            data.push_row(decoded.iter().map(|column| column[row].clone()).collect())?;
        }
    }

    Ok(data)
}

/// Decode one Arrow column into cells, casting to the nearest supported type
fn decode_column(array: &ArrayRef) -> std::result::Result<Vec<Cell>, arrow::error::ArrowError> {
    let len = array.len();

    let cells: Vec<Cell> = match array.data_type() {
        DataType::Boolean => {
            let values = array.as_boolean();
            (0..len)
                .map(|i| if values.is_null(i) { Cell::Null } else { Cell::Bool(values.value(i)) })
                .collect()
        }
        t if t.is_integer() => {
            let casted = cast(array, &DataType::Int64)?;
            let values = casted.as_primitive::<Int64Type>();
            (0..len)
                .map(|i| if values.is_null(i) { Cell::Null } else { Cell::Int(values.value(i)) })
                .collect()
        }
        t if t.is_floating() || matches!(t, DataType::Decimal128(..) | DataType::Decimal256(..)) => {
            let casted = cast(array, &DataType::Float64)?;
            let values = casted.as_primitive::<Float64Type>();
            (0..len)
                .map(|i| if values.is_null(i) { Cell::Null } else { Cell::Float(values.value(i)) })
                .collect()
        }
        _ => {
            let casted = cast(array, &DataType::Utf8)?;
            let values = casted.as_string::<i32>();
            (0..len)
                .map(|i| {
                    if values.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Text(values.value(i).to_string())
                    }
                })
                .collect()
        }
    };

    Ok(cells)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_infer_column_types() {
        let ints = [Cell::Int(1), Cell::Null, Cell::Int(3)];
        assert_eq!(infer_type(ints.iter()), DataType::Int64);

        let mixed_numbers = [Cell::Int(1), Cell::Float(2.5)];
        assert_eq!(infer_type(mixed_numbers.iter()), DataType::Float64);

        let mixed = [Cell::Int(1), Cell::Bool(true)];
        assert_eq!(infer_type(mixed.iter()), DataType::Utf8);

        let nulls = [Cell::Null, Cell::Null];
        assert_eq!(infer_type(nulls.iter()), DataType::Utf8);
    }

    #[test]
    fn test_types_survive_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("orders.parquet");
        let data = TabularData::from_rows(
            vec!["id".to_string(), "customer".to_string(), "paid".to_string(), "amount".to_string()],
            vec![
                vec![Cell::Int(1), Cell::Text("ACME".to_string()), Cell::Bool(true), Cell::Float(9.5)],
                vec![Cell::Int(2), Cell::Null, Cell::Bool(false), Cell::Null],
            ],
        )
        .unwrap();

        write(&data, &path).unwrap();
        assert_eq!(read(&path).unwrap(), data);
    }

    #[test]
    fn test_empty_table_keeps_columns() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.parquet");
        let data = TabularData::new(vec!["id".to_string(), "name".to_string()]).unwrap();

        write(&data, &path).unwrap();
        let back = read(&path).unwrap();
        assert_eq!(back.columns(), data.columns());
        assert!(back.is_empty());
    }

    #[test]
    fn test_not_a_parquet_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fake.parquet");
        std::fs::write(&path, "id,name\n1,a\n").unwrap();

        assert!(read(&path).is_err());
    }
}
