//! XML in the `<data><row><column>value</column></row></data>` shape
//!
//! The root carries the column names in a `columns` attribute so a table
//! without rows keeps them. Files without the attribute take their columns
//! from the rows.

use super::{Cell, CodecContext, TabularData};
use crate::error::{EtlError, Result};
use etl_common::FileType;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const XML: FileType = FileType::Xml;

const ROOT_TAG: &str = "data";
const ROW_TAG: &str = "row";
const COLUMNS_ATTR: &str = "columns";

// Element depth of a column value: root = 1, row = 2, column = 3
const COLUMN_DEPTH: usize = 3;

pub(super) fn read(path: &Path) -> Result<TabularData> {
    let mut reader = Reader::from_file(path).codec_context(XML, path)?;
    reader.config_mut().trim_text(true);

    let mut rows: Vec<Vec<(String, Cell)>> = Vec::new();
    let mut current_row: Vec<(String, Cell)> = Vec::new();
    let mut current_column: Option<String> = None;
    let mut text = String::new();
    let mut depth = 0usize;
    let mut columns: Vec<String> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf).codec_context(XML, path)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    columns = declared_columns(&e).codec_context(XML, path)?;
                } else if depth == COLUMN_DEPTH {
                    current_column = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                    text.clear();
                }
            }
            Event::Empty(e) => match depth + 1 {
                // `<data/>`
                1 => columns = declared_columns(&e).codec_context(XML, path)?,
                // `<row/>`
                d if d == COLUMN_DEPTH - 1 => rows.push(Vec::new()),
                d if d == COLUMN_DEPTH => current_row.push((
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    Cell::Null,
                )),
                _ => {}
            },
            Event::Text(t) if current_column.is_some() => {
                text.push_str(&t.unescape().codec_context(XML, path)?);
            }
            Event::CData(c) if current_column.is_some() => {
                text.push_str(&String::from_utf8_lossy(&c));
            }
            Event::End(_) => {
                if depth == COLUMN_DEPTH {
                    if let Some(column) = current_column.take() {
                        current_row.push((column, Cell::infer(&text)));
                    }
                } else if depth == COLUMN_DEPTH - 1 {
                    rows.push(std::mem::take(&mut current_row));
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    for row in &rows {
        for (column, _) in row {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut data = TabularData::new(columns)?;
    for row in rows {
        let mut cells = vec![Cell::Null; data.num_columns()];
        for (column, cell) in row {
            if let Some(idx) = data.column_index(&column) {
                cells[idx] = cell;
            }
        }
        data.push_row(cells)?;
    }

    Ok(data)
}

pub(super) fn write(data: &TabularData, path: &Path) -> Result<()> {
    if let Some(bad) = data.columns().iter().find(|c| !is_xml_name(c)) {
        return Err(EtlError::codec(
            XML,
            path,
            format!("column '{}' is not a valid element name", bad),
        ));
    }

    let file = File::create(path).codec_context(XML, path)?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .codec_context(XML, path)?;
    let column_list = data.columns().join(" ");
    let mut root = BytesStart::new(ROOT_TAG);
    if !data.columns().is_empty() {
        root.push_attribute((COLUMNS_ATTR, column_list.as_str()));
    }
    writer
        .write_event(Event::Start(root))
        .codec_context(XML, path)?;

    for row in data.rows() {
        writer
            .write_event(Event::Start(BytesStart::new(ROW_TAG)))
            .codec_context(XML, path)?;
        for (column, cell) in data.columns().iter().zip(row) {
            match cell.to_text() {
                None => writer
                    .write_event(Event::Empty(BytesStart::new(column.as_str())))
                    .codec_context(XML, path)?,
                Some(value) => {
                    writer
                        .write_event(Event::Start(BytesStart::new(column.as_str())))
                        .codec_context(XML, path)?;
                    writer
                        .write_event(Event::Text(BytesText::new(&value)))
                        .codec_context(XML, path)?;
                    writer
                        .write_event(Event::End(BytesEnd::new(column.as_str())))
                        .codec_context(XML, path)?;
                }
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(ROW_TAG)))
            .codec_context(XML, path)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(ROOT_TAG)))
        .codec_context(XML, path)?;
    writer.into_inner().flush().codec_context(XML, path)?;

    Ok(())
}

/// Column names from the root's `columns` attribute, if present
fn declared_columns(root: &BytesStart<'_>) -> std::result::Result<Vec<String>, String> {
    let Some(attr) = root
        .try_get_attribute(COLUMNS_ATTR)
        .map_err(|e| e.to_string())?
    else {
        return Ok(Vec::new());
    };
    let value = attr.unescape_value().map_err(|e| e.to_string())?;
    Ok(value.split_whitespace().map(str::to_string).collect())
}

fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    !name.to_ascii_lowercase().starts_with("xml")
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
