//! DuckDB connection wrapper with lazy table registration and query execution.
//!
//! Catalog and drop-point snapshots are loaded through the [`CacheManager`],
//! validated by deserializing into their model types, and copied into
//! in-memory DuckDB tables on first use.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::cache::CacheManager;
use crate::config;
use crate::error::{MarketError, Result};
use crate::models::{DropPoint, WasteItem};

// ---------------------------------------------------------------------------
// TableRecord
// ---------------------------------------------------------------------------

/// A model type that can be copied into a DuckDB table.
///
/// `COLUMNS` lists `(json key, DuckDB type)` pairs in serialization order.
pub trait TableRecord: Serialize {
    const TABLE: &'static str;
    const COLUMNS: &'static [(&'static str, &'static str)];
}

impl TableRecord for WasteItem {
    const TABLE: &'static str = "catalog";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("code", "VARCHAR"),
        ("name", "VARCHAR"),
        ("category", "VARCHAR"),
        ("basePrice", "DOUBLE"),
        ("unit", "VARCHAR"),
    ];
}

impl TableRecord for DropPoint {
    const TABLE: &'static str = "drop_points";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id", "VARCHAR"),
        ("name", "VARCHAR"),
        ("kind", "VARCHAR"),
        ("address", "VARCHAR"),
        ("latitude", "DOUBLE"),
        ("longitude", "DOUBLE"),
        ("operator", "VARCHAR"),
    ];
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Wraps an in-memory DuckDB database and the cache feeding it.
pub struct Connection {
    conn: DuckDbConnection,
    /// The cache manager used to download/locate data files.
    pub cache: RefCell<CacheManager>,
    registered: RefCell<HashSet<String>>,
}

impl Connection {
    pub fn new(cache: CacheManager) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            registered: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more tables are registered, loading data if needed.
    pub fn ensure_views(&self, views: &[&str]) -> Result<()> {
        for name in views {
            if !self.has_view(name) {
                self.ensure_view(name)?;
            }
        }
        Ok(())
    }

    fn ensure_view(&self, name: &str) -> Result<()> {
        match name {
            "catalog" => {
                let loaded = self.cache.borrow_mut().load_records::<WasteItem>("catalog");
                let items = match loaded {
                    Ok(items) => items,
                    Err(e) => {
                        warn!("catalog unavailable ({}); using built-in catalog", e);
                        config::builtin_catalog()
                    }
                };
                self.register_records(&items)
            }
            "drop_points" => {
                let points = self
                    .cache
                    .borrow_mut()
                    .load_records::<DropPoint>("drop_points")?;
                self.register_records(&points)
            }
            other => Err(MarketError::NotFound(format!("Unknown view: {}", other))),
        }
    }

    /// Replace the table for `T` with the given rows.
    ///
    /// Rows are streamed to DuckDB through a newline-delimited JSON temp file.
    pub fn register_records<T: TableRecord>(&self, rows: &[T]) -> Result<()> {
        let columns_ddl = T::COLUMNS
            .iter()
            .map(|(col, ty)| format!("\"{}\" {}", col, ty))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({columns_ddl})",
            table = T::TABLE
        ))?;

        if !rows.is_empty() {
            let mut file = NamedTempFile::new()?;
            for row in rows {
                serde_json::to_writer(&mut file, row)?;
                writeln!(file)?;
            }
            file.flush()?;

            let path = file.path().to_string_lossy().replace('\\', "/");
            let columns_spec = T::COLUMNS
                .iter()
                .map(|(col, ty)| format!("'{}': '{}'", col, ty))
                .collect::<Vec<_>>()
                .join(", ");
            self.conn.execute_batch(&format!(
                "INSERT INTO {} SELECT * FROM read_json('{}', format='newline_delimited', \
                 columns={{{}}})",
                T::TABLE,
                path,
                columns_spec
            ))?;
        }

        self.registered.borrow_mut().insert(T::TABLE.to_string());
        info!("registered table {} ({} rows)", T::TABLE, rows.len());
        Ok(())
    }

    /// Execute SQL and return each row as a map of column name to JSON value.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the query has run.
        let statement = rows
            .as_ref()
            .ok_or_else(|| MarketError::InvalidArgument("statement already finalized".into()))?;
        let column_names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }

    /// Execute SQL and deserialize each row into `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        self.execute(sql, params)?
            .into_iter()
            .map(|row| {
                let value = serde_json::Value::Object(row.into_iter().collect());
                serde_json::from_value(value).map_err(MarketError::from)
            })
            .collect()
    }

    /// Execute SQL and return the first column of the first row, if any.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(param_values.as_slice())?;

        match rows.next()? {
            Some(row) => Ok(Some(convert_value_ref(row.get_ref(0)?))),
            None => Ok(None),
        }
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.registered.borrow().contains(name)
    }

    pub fn views(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registered.borrow().iter().cloned().collect();
        names.sort();
        names
    }

    /// Forget registered tables so they are reloaded on next access.
    pub fn reset_views(&self) {
        self.registered.borrow_mut().clear();
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;

    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::from(n),
        ValueRef::SmallInt(n) => Value::from(n),
        ValueRef::Int(n) => Value::from(n),
        ValueRef::BigInt(n) => Value::from(n),
        ValueRef::HugeInt(n) => i64::try_from(n)
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(n.to_string())),
        ValueRef::UTinyInt(n) => Value::from(n),
        ValueRef::USmallInt(n) => Value::from(n),
        ValueRef::UInt(n) => Value::from(n),
        ValueRef::UBigInt(n) => Value::from(n),
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        // Dates, lists, structs etc. never appear in the registered tables.
        _ => Value::Null,
    }
}
