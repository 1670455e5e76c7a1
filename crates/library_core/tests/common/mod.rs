#![allow(dead_code)]

use library_core::{
    Filters, NewBook, ReadStatus, RecordStoreClient, Row, SqliteRecordStore, StoreResult,
};
use std::cell::Cell;

/// Store wrapper counting calls per operation.
pub struct CountingStore<S> {
    inner: S,
    selects: Cell<usize>,
    inserts: Cell<usize>,
    deletes: Cell<usize>,
}

impl<S: RecordStoreClient> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            selects: Cell::new(0),
            inserts: Cell::new(0),
            deletes: Cell::new(0),
        }
    }

    pub fn selects(&self) -> usize {
        self.selects.get()
    }

    pub fn inserts(&self) -> usize {
        self.inserts.get()
    }

    pub fn deletes(&self) -> usize {
        self.deletes.get()
    }

    pub fn mutations(&self) -> usize {
        self.inserts() + self.deletes()
    }
}

impl<S: RecordStoreClient> RecordStoreClient for CountingStore<S> {
    fn select(&self, table: &str, filters: &Filters) -> StoreResult<Vec<Row>> {
        self.selects.set(self.selects.get() + 1);
        self.inner.select(table, filters)
    }

    fn insert(&self, table: &str, rows: &[Row]) -> StoreResult<()> {
        self.inserts.set(self.inserts.get() + 1);
        self.inner.insert(table, rows)
    }

    fn delete(&self, table: &str, filters: &Filters) -> StoreResult<()> {
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete(table, filters)
    }
}

pub fn counting_store() -> CountingStore<SqliteRecordStore> {
    CountingStore::new(SqliteRecordStore::open_in_memory().unwrap())
}

pub fn dune() -> NewBook {
    NewBook::new("Dune", "Herbert", 1965, "Sci-Fi", ReadStatus::Read)
}
