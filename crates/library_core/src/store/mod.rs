//! Record store contract and implementations.
//!
//! # Responsibility
//! - Define the filtered select/insert/delete contract the catalog consumes.
//! - Keep transport details (HTTP, SQLite) out of service orchestration.
//!
//! # Invariants
//! - Filters are exact-match equality on named columns, AND-combined.
//! - Implementations never retry; failures surface as `StoreError`.
//! - Unfiltered deletes are refused.

use crate::db::DbError;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod rest;
pub mod sqlite;

pub use rest::RestRecordStore;
pub use sqlite::SqliteRecordStore;

/// One store row: column name to JSON value.
pub type Row = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

const MAX_ERROR_BODY_CHARS: usize = 256;

/// Transport or persistence failure reported by a record store.
#[derive(Debug)]
pub enum StoreError {
    /// Request could not be sent or the connection failed.
    Http(reqwest::Error),
    /// Store answered with a non-success HTTP status.
    Status { status: u16, body: String },
    /// Response body could not be decoded into rows.
    Decode(String),
    /// Local SQLite failure.
    Db(DbError),
    /// Request or stored data violates the store contract.
    InvalidData(String),
}

impl StoreError {
    pub(crate) fn status(status: u16, body: &str) -> Self {
        let normalized = body.replace(['\n', '\r'], " ");
        let mut truncated = normalized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        if normalized.chars().count() > MAX_ERROR_BODY_CHARS {
            truncated.push_str("...");
        }
        Self::Status {
            status,
            body: truncated,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http(err) => write!(f, "store request failed: {err}"),
            Self::Status { status, body } if body.is_empty() => {
                write!(f, "store responded with status {status}")
            }
            Self::Status { status, body } => {
                write!(f, "store responded with status {status}: {body}")
            }
            Self::Decode(message) => write!(f, "failed to decode store response: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid store data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Status { .. } | Self::Decode(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
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

/// Exact-match column filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    clauses: Vec<(String, String)>,
}

impl Filters {
    /// No filters: matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `column == value` clause.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push((column.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.clauses
            .iter()
            .map(|(column, value)| (column.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Client contract for a key-attribute table store.
pub trait RecordStoreClient {
    /// Returns rows in `table` matching every filter, in store order.
    fn select(&self, table: &str, filters: &Filters) -> StoreResult<Vec<Row>>;
    /// Appends rows to `table`.
    fn insert(&self, table: &str, rows: &[Row]) -> StoreResult<()>;
    /// Removes every row in `table` matching every filter.
    fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()>;
}

impl<T: RecordStoreClient + ?Sized> RecordStoreClient for &T {
    fn select(&self, table: &str, filters: &Filters) -> StoreResult<Vec<Row>> {
        (**self).select(table, filters)
    }

    fn insert(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        (**self).insert(table, rows)
    }

    fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        (**self).delete(table, filters)
    }
}

pub(crate) fn reject_unfiltered_delete(table: &str, filters: &Filters) -> StoreResult<()> {
    if filters.is_empty() {
        return Err(StoreError::InvalidData(format!(
            "refusing unfiltered delete on table `{table}`"
        )));
    }
    Ok(())
}
