//! JSON records: an array of objects
//!
//! Reading also accepts the column-oriented layout
//! (`{"col": {"0": v, "1": v}, ...}`). A table without rows is written in that
//! layout (`{"col": {}}`) so its columns survive.

use super::{Cell, CodecContext, TabularData};
use crate::error::{EtlError, Result};
use etl_common::FileType;
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const JSON: FileType = FileType::Json;

pub(super) fn read(path: &Path) -> Result<TabularData> {
    let file = File::open(path).codec_context(JSON, path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file)).codec_context(JSON, path)?;

    match value {
        Value::Array(records) => from_records(records).codec_context(JSON, path),
        Value::Object(columns) => from_columns(columns).codec_context(JSON, path),
        _ => Err(EtlError::codec(JSON, path, "expected an array of objects")),
    }
}

fn from_records(records: Vec<Value>) -> std::result::Result<TabularData, String> {
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());

    for (idx, record) in records.into_iter().enumerate() {
        let Value::Object(object) = record else {
            return Err(format!("record {} is not an object", idx + 1));
        };
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(object);
    }

    let rows = objects
        .into_iter()
        .map(|mut object| {
            columns
                .iter()
                .map(|column| object.remove(column).map(to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    TabularData::from_rows(columns, rows).map_err(|e| e.to_string())
}

fn from_columns(columns: Map<String, Value>) -> std::result::Result<TabularData, String> {
    let mut index: Vec<String> = Vec::new();
    let mut series = Vec::with_capacity(columns.len());

    for (name, values) in columns {
        let Value::Object(values) = values else {
            return Err(format!("column '{}' is not an object of index → value", name));
        };
        for key in values.keys() {
            if !index.contains(key) {
                index.push(key.clone());
            }
        }
        series.push((name, values));
    }

    let names = series.iter().map(|(name, _)| name.clone()).collect();
    let rows = index
        .iter()
        .map(|key| {
            series
                .iter_mut()
                .map(|(_, values)| values.remove(key).map(to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    TabularData::from_rows(names, rows).map_err(|e| e.to_string())
}

fn to_cell(value: Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
        },
        Value::String(s) => Cell::Text(s),
        nested => Cell::Text(nested.to_string()),
    }
}

fn to_value(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Int(i) => Value::from(*i),
        Cell::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Cell::Text(s) => Value::String(s.clone()),
    }
}

pub(super) fn write(data: &TabularData, path: &Path) -> Result<()> {
    let document = if data.num_rows() == 0 {
        empty_columns(data)
    } else {
        records(data)
    };

    let file = File::create(path).codec_context(JSON, path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document).codec_context(JSON, path)?;
    writer.flush().codec_context(JSON, path)?;

    Ok(())
}

fn empty_columns(data: &TabularData) -> Value {
    let columns: Map<String, Value> = data
        .columns()
        .iter()
        .map(|name| (name.clone(), Value::Object(Map::new())))
        .collect();
    Value::Object(columns)
}

fn records(data: &TabularData) -> Value {
    let records: Vec<Value> = data
        .rows()
        .iter()
        .map(|row| {
            let object: Map<String, Value> = data
                .columns()
                .iter()
                .cloned()
                .zip(row.iter().map(to_value))
                .collect();
            Value::Object(object)
        })
        .collect();
    Value::Array(records)
}
