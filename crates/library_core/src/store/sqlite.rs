//! SQLite-backed record store.
//!
//! # Responsibility
//! - Provide the record store contract against a local SQLite file, for
//!   development and tests without a hosted project.
//!
//! # Invariants
//! - Rows are JSON documents grouped by logical table name.
//! - Filters compare the column's textual value for exact equality.
//! - Selects return rows in insertion order and expose the row id as `id`.
//! - Multi-row inserts are all-or-nothing.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::store::{
    reject_unfiltered_delete, Filters, RecordStoreClient, Row, StoreError, StoreResult,
};
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection};
use serde_json::Value;
use std::path::Path;

/// Local record store over one SQLite connection.
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens (or creates) a store file and applies the local schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a fresh in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps a connection already bootstrapped by `open_db`.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let actual_version = current_user_version(&conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(DbError::UninitializedConnection {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self { conn })
    }

    /// Counts rows stored for `table`.
    pub fn count(&self, table: &str) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM records WHERE table_name = ?1;",
            [table],
            |row| row.get(0),
        )?;
        usize::try_from(count)
            .map_err(|_| StoreError::InvalidData(format!("negative row count {count}")))
    }
}

impl RecordStoreClient for SqliteRecordStore {
    fn select(&self, table: &str, filters: &Filters) -> StoreResult<Vec<Row>> {
        let (where_sql, binds) = where_clause(table, filters)?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT id, body FROM records WHERE {where_sql} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query(params_from_iter(binds))?;

        let mut selected = Vec::new();
        while let Some(row) = rows.next()? {
            let id: i64 = row.get("id")?;
            let body: String = row.get("body")?;
            selected.push(parse_body(id, &body)?);
        }

        debug!(
            "event=store_select module=store status=ok backend=sqlite table={table} filters={} rows={}",
            filters.len(),
            selected.len()
        );
        Ok(selected)
    }

    fn insert(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for row in rows {
            let body = serde_json::to_string(row)
                .map_err(|err| StoreError::InvalidData(format!("row is not serializable: {err}")))?;
            tx.execute(
                "INSERT INTO records (table_name, body) VALUES (?1, ?2);",
                params![table, body],
            )?;
        }
        tx.commit()?;

        debug!(
            "event=store_insert module=store status=ok backend=sqlite table={table} rows={}",
            rows.len()
        );
        Ok(())
    }

    fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        reject_unfiltered_delete(table, filters)?;

        let (where_sql, binds) = where_clause(table, filters)?;
        let changed = self.conn.execute(
            &format!("DELETE FROM records WHERE {where_sql};"),
            params_from_iter(binds),
        )?;

        debug!(
            "event=store_delete module=store status=ok backend=sqlite table={table} filters={} rows={changed}",
            filters.len()
        );
        Ok(())
    }
}

fn where_clause(table: &str, filters: &Filters) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut sql = String::from("table_name = ?");
    let mut binds = vec![SqlValue::Text(table.to_string())];

    for (column, value) in filters.iter() {
        sql.push_str(" AND CAST(json_extract(body, ?) AS TEXT) = ?");
        binds.push(SqlValue::Text(json_path(column)?));
        binds.push(SqlValue::Text(value.to_string()));
    }

    Ok((sql, binds))
}

fn json_path(column: &str) -> StoreResult<String> {
    if column.is_empty() || column.contains('"') {
        return Err(StoreError::InvalidData(format!(
            "unsupported column name `{column}`"
        )));
    }
    Ok(format!("$.\"{column}\""))
}

fn parse_body(id: i64, body: &str) -> StoreResult<Row> {
    let mut row: Row = serde_json::from_str(body).map_err(|err| {
        StoreError::InvalidData(format!("invalid JSON body in records row {id}: {err}"))
    })?;
    row.insert("id".to_string(), Value::from(id));
    Ok(row)
}
