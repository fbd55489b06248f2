//! Control schema repository
//!
//! [`ControlStore`] wraps a `sqlx` [`AnyPool`] so the same queries run on
//! PostgreSQL and on SQLite. Queries use `$N` placeholders, which both drivers
//! accept.

mod models;

pub use models::{
    FileSourceRecord, HttpSourceRecord, NewFileSource, MAX_DESCRIPTION_LEN, MAX_FILE_KEY_LEN,
};

use crate::codec::{Cell, TabularData};
use crate::error::{EtlError, Result};
use crate::source::SourceConfig;
use etl_common::FileType;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::migrate::Migrator;
use sqlx::{AnyPool, Column, Executor, Row, Statement};
use tracing::{debug, info};

/// Versioned control schema migrations, applied in order
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const FILE_SOURCE_COLUMNS: &str = "file_key, file_description, file_type, enabled";
const HTTP_SOURCE_COLUMNS: &str = "http_key, url, http_description, enabled";

/// How [`ControlStore::write_table`] treats an existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Drop and recreate the table
    #[default]
    Overwrite,
    /// Create the table if missing, then insert
    Append,
}

/// Handle to the control database
#[derive(Debug, Clone)]
pub struct ControlStore {
    pool: AnyPool,
}

impl ControlStore {
    /// Connect using a resolved [`SourceConfig`]
    pub async fn connect(config: &SourceConfig) -> Result<Self> {
        if !config.is_configured() {
            return Err(EtlError::config(format!(
                "no database name set ({}DB)",
                config.prefix
            )));
        }

        sqlx::any::install_default_drivers();
        let url = config.driver_url()?;

        let mut options = AnyPoolOptions::new();
        if url.starts_with("sqlite::memory:") {
            // Every connection to an in-memory database opens a fresh one
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.max_connections(5);
        }

        let pool = options.connect(&url).await?;
        info!(uri = %config.redacted_uri(), "Connected to control store");

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Apply pending control schema migrations; returns how many ran
    pub async fn migrate(&self) -> Result<usize> {
        let applied_before = self.applied_migrations().await;
        MIGRATOR.run(&self.pool).await?;
        let applied = MIGRATOR.iter().count().saturating_sub(applied_before);

        info!(applied, "Control schema is up to date");
        Ok(applied)
    }

    async fn applied_migrations(&self) -> usize {
        // The bookkeeping table is missing before the first run
        sqlx::query("SELECT version FROM _sqlx_migrations WHERE success = $1")
            .bind(true)
            .fetch_all(&self.pool)
            .await
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    // ------------------------------------------------------------------------
    // File and HTTP sources
    // ------------------------------------------------------------------------

    /// Insert a new file source. Fails with [`EtlError::DuplicateKey`] when
    /// the key exists; the existing row is left untouched.
    pub async fn add_file_source(&self, source: NewFileSource) -> Result<FileSourceRecord> {
        if self.get_file_source(source.file_key()).await?.is_some() {
            return Err(EtlError::DuplicateKey(source.file_key().to_string()));
        }

        let sql = format!(
            "INSERT INTO ctl_file_sources ({}) VALUES ($1, $2, $3, $4)",
            FILE_SOURCE_COLUMNS
        );
        sqlx::query(&sql)
            .bind(source.file_key())
            .bind(source.file_description())
            .bind(source.file_type().map(|t| t.as_str()))
            .bind(source.enabled())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    EtlError::DuplicateKey(source.file_key().to_string())
                }
                other => EtlError::Database(other),
            })?;

        info!(file_key = %source.file_key(), "Added file source");
        Ok(source.into())
    }

    pub async fn get_file_source(&self, file_key: &str) -> Result<Option<FileSourceRecord>> {
        let sql = format!(
            "SELECT {} FROM ctl_file_sources WHERE file_key = $1",
            FILE_SOURCE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(file_key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(file_source_from_row).transpose()
    }

    /// All file sources ordered by key
    pub async fn list_file_sources(&self) -> Result<Vec<FileSourceRecord>> {
        let sql = format!(
            "SELECT {} FROM ctl_file_sources ORDER BY file_key",
            FILE_SOURCE_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed file sources");

        rows.iter().map(file_source_from_row).collect()
    }

    /// All HTTP sources ordered by key
    pub async fn list_http_sources(&self) -> Result<Vec<HttpSourceRecord>> {
        let sql = format!(
            "SELECT {} FROM ctl_http_sources ORDER BY http_key",
            HTTP_SOURCE_COLUMNS
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        debug!(count = rows.len(), "Listed HTTP sources");

        rows.iter()
            .map(|row| -> Result<HttpSourceRecord> {
                Ok(HttpSourceRecord {
                    http_key: row.try_get("http_key")?,
                    url: row.try_get("url")?,
                    http_description: row.try_get("http_description")?,
                    enabled: row.try_get::<Option<bool>, _>("enabled")?.unwrap_or(true),
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Generic tables
    // ------------------------------------------------------------------------

    /// Read a whole table
    pub async fn read_table(&self, table: &str) -> Result<TabularData> {
        self.read_sql(&format!("SELECT * FROM {}", quote_identifier(table)?))
            .await
    }

    /// Run a query and collect its result set
    pub async fn read_sql(&self, sql: &str) -> Result<TabularData> {
        let statement = (&self.pool).prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = statement.query().fetch_all(&self.pool).await?;

        let mut data = TabularData::new(columns)?;
        for row in &rows {
            let cells = (0..row.len())
                .map(|idx| decode_cell(row, idx))
                .collect::<Result<Vec<_>>>()?;
            data.push_row(cells)?;
        }

        debug!(rows = data.num_rows(), "Read query result");
        Ok(data)
    }

    /// Write tabular data into `table`.
    ///
    /// Column types are inferred from the cells (BIGINT, DOUBLE PRECISION,
    /// BOOLEAN, TEXT). Returns the number of rows written.
    pub async fn write_table(&self, data: &TabularData, table: &str, mode: WriteMode) -> Result<u64> {
        if data.num_columns() == 0 {
            return Err(EtlError::validation("cannot write a table without columns"));
        }

        let table_ident = quote_identifier(table)?;
        let column_types: Vec<SqlType> = (0..data.num_columns())
            .map(|idx| SqlType::infer(data.rows().iter().map(|row| &row[idx])))
            .collect();
        let column_defs = data
            .columns()
            .iter()
            .zip(&column_types)
            .map(|(name, ty)| Ok(format!("{} {}", quote_identifier(name)?, ty.ddl())))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let mut tx = self.pool.begin().await?;

        if mode == WriteMode::Overwrite {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_ident))
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(&format!("CREATE TABLE IF NOT EXISTS {} ({})", table_ident, column_defs))
            .execute(&mut *tx)
            .await?;

        let column_list = data
            .columns()
            .iter()
            .map(|name| quote_identifier(name))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let placeholders = (1..=data.num_columns())
            .map(|n| format!("${}", n))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table_ident, column_list, placeholders
        );

        let mut written = 0;
        for row in data.rows() {
            let mut query = sqlx::query(&insert);
            for (cell, ty) in row.iter().zip(&column_types) {
                query = ty.bind(query, cell);
            }
            written += query.execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        info!(table = %table, rows = written, ?mode, "Wrote table");
        Ok(written)
    }
}

fn file_source_from_row(row: &AnyRow) -> Result<FileSourceRecord> {
    let file_type = row
        .try_get::<Option<String>, _>("file_type")?
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.parse::<FileType>())
        .transpose()?;

    Ok(FileSourceRecord {
        file_key: row.try_get("file_key")?,
        file_description: row.try_get("file_description")?,
        file_type,
        enabled: row.try_get::<Option<bool>, _>("enabled")?.unwrap_or(true),
    })
}

/// Decode one value of a generic row, trying the supported types in turn
fn decode_cell(row: &AnyRow, idx: usize) -> Result<Cell> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(idx) {
        return Ok(value.map(Cell::Int).unwrap_or(Cell::Null));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(idx) {
        return Ok(value.map(Cell::Float).unwrap_or(Cell::Null));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(idx) {
        return Ok(value.map(Cell::Bool).unwrap_or(Cell::Null));
    }
    let value = row.try_get::<Option<String>, _>(idx)?;
    Ok(value.map(Cell::Text).unwrap_or(Cell::Null))
}

/// Quote a table or column name as a SQL identifier
fn quote_identifier(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.contains('\0') {
        return Err(EtlError::validation(format!("invalid identifier '{}'", name)));
    }
    Ok(format!("\"{}\"", trimmed.replace('"', "\"\"")))
}

/// Column type used when creating a table from tabular data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SqlType {
    BigInt,
    Double,
    Boolean,
    Text,
}

impl SqlType {
    fn infer<'a>(cells: impl Iterator<Item = &'a Cell>) -> Self {
        let mut inferred = None;
        for cell in cells {
            let ty = match cell {
                Cell::Null => continue,
                Cell::Bool(_) => SqlType::Boolean,
                Cell::Int(_) => SqlType::BigInt,
                Cell::Float(_) => SqlType::Double,
                Cell::Text(_) => return SqlType::Text,
            };
            inferred = Some(match (inferred, ty) {
                (None, ty) => ty,
                (Some(a), b) if a == b => a,
                (Some(SqlType::BigInt), SqlType::Double)
                | (Some(SqlType::Double), SqlType::BigInt) => SqlType::Double,
                _ => return SqlType::Text,
            });
        }
        inferred.unwrap_or(SqlType::Text)
    }

    fn ddl(self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE PRECISION",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Text => "TEXT",
        }
    }

    /// Bind a cell with the column's type, so NULLs are typed too
    fn bind<'q>(
        self,
        query: sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>>,
        cell: &Cell,
    ) -> sqlx::query::Query<'q, sqlx::Any, sqlx::any::AnyArguments<'q>> {
        match (self, cell) {
            (SqlType::BigInt, Cell::Int(i)) => query.bind(Some(*i)),
            (SqlType::BigInt, _) => query.bind(None::<i64>),
            (SqlType::Double, Cell::Float(f)) => query.bind(Some(*f)),
            (SqlType::Double, Cell::Int(i)) => query.bind(Some(*i as f64)),
            (SqlType::Double, _) => query.bind(None::<f64>),
            (SqlType::Boolean, Cell::Bool(b)) => query.bind(Some(*b)),
            (SqlType::Boolean, _) => query.bind(None::<bool>),
            (SqlType::Text, cell) => query.bind(cell.to_text()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("orders").unwrap(), "\"orders\"");
        assert_eq!(quote_identifier("a\"b").unwrap(), "\"a\"\"b\"");
        assert!(quote_identifier("  ").is_err());
    }

    #[test]
    fn test_sql_type_inference() {
        let ints = [Cell::Int(1), Cell::Null];
        assert_eq!(SqlType::infer(ints.iter()), SqlType::BigInt);

        let numbers = [Cell::Int(1), Cell::Float(0.5)];
        assert_eq!(SqlType::infer(numbers.iter()), SqlType::Double);

        let mixed = [Cell::Bool(true), Cell::Int(1)];
        assert_eq!(SqlType::infer(mixed.iter()), SqlType::Text);

        assert_eq!(SqlType::infer([Cell::Null].iter()), SqlType::Text);
    }
}
