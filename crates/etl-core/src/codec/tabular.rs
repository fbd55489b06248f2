//! In-memory tabular data exchanged between codecs, steps and the control store

use crate::error::{EtlError, Result};
use std::collections::HashSet;

/// A single typed value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Type a raw text value the way text-based formats are read back:
    /// empty → Null, `true`/`false` → Bool, then integer, float, text.
    pub fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Cell::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Cell::Bool(false);
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Cell::Int(value);
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Float(value),
            _ => Cell::Text(raw.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Text rendering used by text formats; `None` for Null.
    ///
    /// Whole floats keep a fractional digit (`2.0`) so they read back as floats.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(format!("{:.1}", f)),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_text().as_deref().unwrap_or_default())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Null)
    }
}

/// Named columns plus rows of cells.
///
/// Column names are unique and every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularData {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TabularData {
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(EtlError::validation(format!("duplicate column '{}'", column)));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Build from columns and rows, checking every row's width
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut data = Self::new(columns)?;
        for row in rows {
            data.push_row(row)?;
        }
        Ok(data)
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(EtlError::validation(format!(
                "row {} has {} cells, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate one column's cells
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_cell_types() {
        assert_eq!(Cell::infer(""), Cell::Null);
        assert_eq!(Cell::infer("  "), Cell::Null);
        assert_eq!(Cell::infer("TRUE"), Cell::Bool(true));
        assert_eq!(Cell::infer("false"), Cell::Bool(false));
        assert_eq!(Cell::infer("-42"), Cell::Int(-42));
        assert_eq!(Cell::infer("3.5"), Cell::Float(3.5));
        assert_eq!(Cell::infer("NaN"), Cell::Text("NaN".to_string()));
        assert_eq!(Cell::infer("ACME Ltd"), Cell::Text("ACME Ltd".to_string()));
    }

    #[test]
    fn test_whole_float_keeps_fraction() {
        assert_eq!(Cell::Float(2.0).to_text().as_deref(), Some("2.0"));
        assert_eq!(Cell::infer(&Cell::Float(2.0).to_string()), Cell::Float(2.0));
        assert_eq!(Cell::Null.to_string(), "");
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = TabularData::new(vec!["id".to_string(), "id".to_string()]);
        assert!(matches!(result, Err(EtlError::Validation(_))));
    }

    #[test]
    fn test_row_width_checked() {
        let mut data = TabularData::new(vec!["id".to_string(), "name".to_string()]).unwrap();
        data.push_row(vec![Cell::Int(1), "widget".into()]).unwrap();
        assert!(data.push_row(vec![Cell::Int(2)]).is_err());
        assert_eq!(data.num_rows(), 1);
    }

    #[test]
    fn test_column_access() {
        let data = TabularData::from_rows(
            vec!["id".to_string(), "qty".to_string()],
            vec![
                vec![Cell::Int(1), Cell::Int(10)],
                vec![Cell::Int(2), Cell::Null],
            ],
        )
        .unwrap();

        let qty: Vec<&Cell> = data.column("qty").unwrap().collect();
        assert_eq!(qty, vec![&Cell::Int(10), &Cell::Null]);
        assert!(data.column("price").is_none());
    }
}
