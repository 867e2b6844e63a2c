//! Record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide column-addressed read/write access to entity rows, keyed by
//!   (table, key, column).
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - "Row does not exist" is reported as `Ok(None)`, distinct from a null
//!   column which is `Ok(Some(Value::None))`.
//! - Column names are validated against the table's declared column set
//!   before any SQL is built.
//! - Values are encoded/decoded by declared `ColumnType`; no guessing from
//!   the raw storage class.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::table::{inventory_column_type, ColumnType, Table};
use crate::model::text;
use crate::model::value::Value;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer error for row addressing, encoding and persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Connection schema version does not match this binary.
    SchemaNotReady { found: u32, expected: u32 },
    /// Write addressed a row that does not exist.
    RowNotFound { table: &'static str, key: i64 },
    /// Column is not declared for the addressed table.
    UnknownColumn { table: &'static str, column: String },
    /// Table has no linked inventory table.
    NoInventoryTable { table: &'static str },
    /// Operation requires the owning entity to be persisted first.
    UnsavedEntity { table: &'static str },
    /// Lineage may only reference an entity of the same table.
    TableMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// Value variant does not match the column's declared type.
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Persisted state failed to decode.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "schema version {found} does not match expected {expected}; apply migrations first"
            ),
            Self::RowNotFound { table, key } => write!(f, "no row {key} in table `{table}`"),
            Self::UnknownColumn { table, column } => {
                write!(f, "table `{table}` has no column `{column}`")
            }
            Self::NoInventoryTable { table } => {
                write!(f, "table `{table}` has no linked inventory table")
            }
            Self::UnsavedEntity { table } => {
                write!(f, "entity in table `{table}` has no row yet")
            }
            Self::TableMismatch { expected, found } => write!(
                f,
                "lineage must stay within one table: expected `{expected}`, found `{found}`"
            ),
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{column}` expects {expected}, got {found}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Column-addressed access to entity rows and their linked inventory rows.
///
/// Addressed by (`Table`, key, column name). Implementations own the
/// physical layout; callers never see SQL. No retries happen at this layer;
/// persistence failures propagate unchanged.
pub trait RecordStore {
    /// Reads one column of one row.
    ///
    /// Returns `Ok(None)` when the row does not exist and
    /// `Ok(Some(Value::None))` when the row exists but the column is null.
    fn read_column(&self, table: Table, key: i64, column: &str) -> StoreResult<Option<Value>>;

    /// Writes one column of one existing row.
    fn write_column(&self, table: Table, key: i64, column: &str, value: &Value)
        -> StoreResult<()>;

    /// Inserts a new row from a column/value list and returns its key.
    fn insert_row(&self, table: Table, values: &[(&str, Value)]) -> StoreResult<i64>;

    /// Key of the inventory row linked to `owner_key`, if one exists.
    fn inventory_key(&self, table: Table, owner_key: i64) -> StoreResult<Option<i64>>;

    /// Creates the linked inventory row for `owner_key` and returns its key.
    fn inventory_create(&self, table: Table, owner_key: i64) -> StoreResult<i64>;

    /// Reads one column of the inventory row linked to `owner_key`.
    ///
    /// Same row-missing/null distinction as [`RecordStore::read_column`].
    fn inventory_read(&self, table: Table, owner_key: i64, column: &str)
        -> StoreResult<Option<Value>>;

    /// Writes one column of an inventory row addressed by its own key.
    fn inventory_write(
        &self,
        table: Table,
        inv_key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()>;
}

/// SQLite-backed record store.
#[derive(Debug)]
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected = latest_version();
        if found != expected {
            return Err(StoreError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }

    fn entity_column_type(table: Table, column: &str) -> StoreResult<ColumnType> {
        table
            .column_type(column)
            .ok_or_else(|| StoreError::UnknownColumn {
                table: table.sql_name(),
                column: column.to_string(),
            })
    }

    fn inventory_table(table: Table) -> StoreResult<&'static str> {
        table
            .inventory_sql_name()
            .ok_or(StoreError::NoInventoryTable {
                table: table.sql_name(),
            })
    }

    fn checked_inventory_column(table: Table, column: &str) -> StoreResult<ColumnType> {
        let inventory_table = Self::inventory_table(table)?;
        inventory_column_type(column).ok_or_else(|| StoreError::UnknownColumn {
            table: inventory_table,
            column: column.to_string(),
        })
    }

    fn read_one(
        &self,
        sql: &str,
        key: i64,
        table_name: &'static str,
        column: &str,
        column_type: ColumnType,
    ) -> StoreResult<Option<Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => {
                let raw = row.get_ref(0)?;
                Ok(Some(decode_value(raw, column_type, table_name, column)?))
            }
            None => Ok(None),
        }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn read_column(&self, table: Table, key: i64, column: &str) -> StoreResult<Option<Value>> {
        let column_type = Self::entity_column_type(table, column)?;
        let sql = format!("SELECT {column} FROM {} WHERE id = ?1;", table.sql_name());
        self.read_one(&sql, key, table.sql_name(), column, column_type)
    }

    fn write_column(
        &self,
        table: Table,
        key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let column_type = Self::entity_column_type(table, column)?;
        let encoded = encode_value(value, column_type, column)?;
        let sql = format!("UPDATE {} SET {column} = ?1 WHERE id = ?2;", table.sql_name());
        let changed = self.conn.execute(&sql, params![encoded, key])?;
        if changed == 0 {
            return Err(StoreError::RowNotFound {
                table: table.sql_name(),
                key,
            });
        }
        Ok(())
    }

    fn insert_row(&self, table: Table, values: &[(&str, Value)]) -> StoreResult<i64> {
        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        let mut encoded = Vec::with_capacity(values.len());

        for (index, (column, value)) in values.iter().enumerate() {
            let column_type = Self::entity_column_type(table, column)?;
            columns.push(*column);
            placeholders.push(format!("?{}", index + 1));
            encoded.push(encode_value(value, column_type, column)?);
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            table.sql_name(),
            columns.join(", "),
            placeholders.join(", ")
        );
        self.conn
            .execute(&sql, rusqlite::params_from_iter(encoded))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn inventory_key(&self, table: Table, owner_key: i64) -> StoreResult<Option<i64>> {
        let inventory_table = Self::inventory_table(table)?;
        let sql = format!("SELECT id FROM {inventory_table} WHERE owner_id = ?1;");
        let key = self
            .conn
            .query_row(&sql, params![owner_key], |row| row.get::<_, i64>(0))
            .optional()?;
        Ok(key)
    }

    fn inventory_create(&self, table: Table, owner_key: i64) -> StoreResult<i64> {
        let inventory_table = Self::inventory_table(table)?;
        let sql = format!("INSERT INTO {inventory_table} (owner_id) VALUES (?1);");
        self.conn.execute(&sql, params![owner_key])?;
        Ok(self.conn.last_insert_rowid())
    }

    fn inventory_read(
        &self,
        table: Table,
        owner_key: i64,
        column: &str,
    ) -> StoreResult<Option<Value>> {
        let column_type = Self::checked_inventory_column(table, column)?;
        let inventory_table = Self::inventory_table(table)?;
        let sql = format!("SELECT {column} FROM {inventory_table} WHERE owner_id = ?1;");
        self.read_one(&sql, owner_key, inventory_table, column, column_type)
    }

    fn inventory_write(
        &self,
        table: Table,
        inv_key: i64,
        column: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let column_type = Self::checked_inventory_column(table, column)?;
        let inventory_table = Self::inventory_table(table)?;
        let encoded = encode_value(value, column_type, column)?;
        let sql = format!("UPDATE {inventory_table} SET {column} = ?1 WHERE id = ?2;");
        let changed = self.conn.execute(&sql, params![encoded, inv_key])?;
        if changed == 0 {
            return Err(StoreError::RowNotFound {
                table: inventory_table,
                key: inv_key,
            });
        }
        Ok(())
    }
}

fn decode_value(
    raw: ValueRef<'_>,
    column_type: ColumnType,
    table: &'static str,
    column: &str,
) -> StoreResult<Value> {
    if matches!(raw, ValueRef::Null) {
        return Ok(Value::None);
    }

    match column_type {
        ColumnType::Bool => match raw {
            ValueRef::Integer(0) => Ok(Value::Bool(false)),
            ValueRef::Integer(1) => Ok(Value::Bool(true)),
            other => Err(invalid_cell(table, column, &other)),
        },
        ColumnType::Int => match raw {
            ValueRef::Integer(value) => Ok(Value::Int(value)),
            other => Err(invalid_cell(table, column, &other)),
        },
        ColumnType::Double => match raw {
            ValueRef::Real(value) => Ok(Value::Double(value)),
            ValueRef::Integer(value) => Ok(Value::Double(value as f64)),
            other => Err(invalid_cell(table, column, &other)),
        },
        ColumnType::Text => match raw.as_str() {
            Ok(value) => Ok(Value::Text(value.to_string())),
            Err(_) => Err(invalid_cell(table, column, &raw)),
        },
        ColumnType::Date => {
            let cell = raw
                .as_str()
                .map_err(|_| invalid_cell(table, column, &raw))?;
            text::parse_date(cell)
                .map(Value::Date)
                .map_err(|err| StoreError::InvalidData(format!("{table}.{column}: {err}")))
        }
        ColumnType::DateTime => {
            let cell = raw
                .as_str()
                .map_err(|_| invalid_cell(table, column, &raw))?;
            text::parse_date_time(cell)
                .map(Value::DateTime)
                .map_err(|err| StoreError::InvalidData(format!("{table}.{column}: {err}")))
        }
    }
}

fn invalid_cell(table: &'static str, column: &str, raw: &ValueRef<'_>) -> StoreError {
    StoreError::InvalidData(format!(
        "unexpected storage class {:?} in {table}.{column}",
        raw.data_type()
    ))
}

fn encode_value(
    value: &Value,
    column_type: ColumnType,
    column: &str,
) -> StoreResult<rusqlite::types::Value> {
    use rusqlite::types::Value as SqlValue;

    let encoded = match (value, column_type) {
        (Value::None, _) => SqlValue::Null,
        (Value::Bool(flag), ColumnType::Bool) => SqlValue::Integer(i64::from(*flag)),
        (Value::Int(number), ColumnType::Int) => SqlValue::Integer(*number),
        (Value::Double(number), ColumnType::Double) => SqlValue::Real(*number),
        (Value::Text(string), ColumnType::Text) => SqlValue::Text(string.clone()),
        (Value::Date(date), ColumnType::Date) => SqlValue::Text(text::render_date(*date)),
        (Value::DateTime(stamp), ColumnType::DateTime) => {
            SqlValue::Text(text::render_date_time(*stamp))
        }
        (other, expected) => {
            return Err(StoreError::TypeMismatch {
                column: column.to_string(),
                expected: expected.name(),
                found: other.type_name(),
            });
        }
    };
    Ok(encoded)
}
