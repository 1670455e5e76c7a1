//! Catalog use-case service.
//!
//! # Responsibility
//! - Validate add-book input and enforce `(title, author)` uniqueness.
//! - Translate store query results into added/duplicate/removed/not-found
//!   outcomes and catalog statistics.
//!
//! # Invariants
//! - Expected outcomes are returned as values; only store faults are `Err`.
//! - Invalid or duplicate adds perform zero store mutations.
//! - No state is cached between calls; every read goes to the store.
//! - The duplicate check and insert are two calls, so concurrent adds of the
//!   same pair can both succeed. Closing that gap needs a store-side unique
//!   constraint.

use crate::config::DEFAULT_TABLE;
use crate::model::book::{BookRecord, BookValidationError, NewBook, AUTHOR_COLUMN, TITLE_COLUMN};
use crate::store::{Filters, RecordStoreClient, Row, StoreError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Fault raised by catalog operations.
#[derive(Debug)]
pub enum CatalogError {
    /// The underlying store call failed.
    RemoteUnavailable(StoreError),
    /// The store returned a row that is not a valid book record.
    InvalidRow(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteUnavailable(err) => write!(f, "record store unavailable: {err}"),
            Self::InvalidRow(message) => write!(f, "invalid book row in store: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RemoteUnavailable(err) => Some(err),
            Self::InvalidRow(_) => None,
        }
    }
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        Self::RemoteUnavailable(value)
    }
}

/// Result of `add_book`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// One row was inserted.
    Added(BookRecord),
    /// A book with the same title and author already exists.
    Duplicate,
    /// A mandatory field was left empty.
    InvalidInput(BookValidationError),
}

/// Result of `remove_book`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// `count` rows sharing the title were deleted.
    Removed { count: usize },
    NotFound,
}

/// Result of `search_by_title`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query; the store was not contacted.
    EmptyQuery,
    NoResults,
    Found(Vec<BookRecord>),
}

impl SearchOutcome {
    /// Matching books; empty for `EmptyQuery` and `NoResults`.
    pub fn books(&self) -> &[BookRecord] {
        match self {
            Self::Found(books) => books,
            Self::EmptyQuery | Self::NoResults => &[],
        }
    }

    pub fn into_books(self) -> Vec<BookRecord> {
        match self {
            Self::Found(books) => books,
            Self::EmptyQuery | Self::NoResults => Vec::new(),
        }
    }
}

/// Read/unread counts over the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
}

impl CatalogStats {
    pub fn from_books(books: &[BookRecord]) -> Self {
        let total = books.len();
        let read = books.iter().filter(|book| book.is_read()).count();
        Self {
            total,
            read,
            unread: total - read,
        }
    }
}

/// Catalog facade over a record store client.
pub struct CatalogService<C: RecordStoreClient> {
    store: C,
    table: String,
}

impl<C: RecordStoreClient> CatalogService<C> {
    /// Creates a service over the default catalog table.
    pub fn new(store: C) -> Self {
        Self::with_table(store, DEFAULT_TABLE)
    }

    /// Creates a service over a named table.
    pub fn with_table(store: C, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Adds one book unless input is incomplete or the title/author pair
    /// already exists.
    pub fn add_book(&self, book: &NewBook) -> CatalogResult<AddOutcome> {
        let started_at = Instant::now();
        let record = match book.validate() {
            Ok(record) => record,
            Err(err) => {
                info!(
                    "event=book_add module=catalog status=invalid_input field={:?}",
                    err.field()
                );
                return Ok(AddOutcome::InvalidInput(err));
            }
        };

        let existing = self.store.select(
            &self.table,
            &Filters::new()
                .eq(TITLE_COLUMN, record.title.as_str())
                .eq(AUTHOR_COLUMN, record.author.as_str()),
        )?;
        if !existing.is_empty() {
            info!(
                "event=book_add module=catalog status=duplicate matches={} duration_ms={}",
                existing.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(AddOutcome::Duplicate);
        }

        self.store.insert(&self.table, &[record.to_row()])?;
        info!(
            "event=book_add module=catalog status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(AddOutcome::Added(record))
    }

    /// Removes every book with exactly this title, regardless of author.
    pub fn remove_book(&self, title: &str) -> CatalogResult<RemoveOutcome> {
        let started_at = Instant::now();
        let filters = Filters::new().eq(TITLE_COLUMN, title);

        let matches = self.store.select(&self.table, &filters)?;
        if matches.is_empty() {
            info!(
                "event=book_remove module=catalog status=not_found duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(RemoveOutcome::NotFound);
        }

        self.store.delete(&self.table, &filters)?;
        info!(
            "event=book_remove module=catalog status=ok removed={} duration_ms={}",
            matches.len(),
            started_at.elapsed().as_millis()
        );
        Ok(RemoveOutcome::Removed {
            count: matches.len(),
        })
    }

    /// Lists every book in store order.
    pub fn list_all_books(&self) -> CatalogResult<Vec<BookRecord>> {
        let rows = self.store.select(&self.table, &Filters::new())?;
        let books = decode_rows(rows)?;
        debug!("event=book_list module=catalog status=ok rows={}", books.len());
        Ok(books)
    }

    /// Finds books whose title equals `title` exactly.
    pub fn search_by_title(&self, title: &str) -> CatalogResult<SearchOutcome> {
        if title.trim().is_empty() {
            debug!("event=book_search module=catalog status=empty_query");
            return Ok(SearchOutcome::EmptyQuery);
        }

        let rows = self
            .store
            .select(&self.table, &Filters::new().eq(TITLE_COLUMN, title))?;
        let books = decode_rows(rows)?;
        debug!(
            "event=book_search module=catalog status=ok rows={}",
            books.len()
        );

        if books.is_empty() {
            return Ok(SearchOutcome::NoResults);
        }
        Ok(SearchOutcome::Found(books))
    }

    /// Computes total/read/unread counts from a fresh listing.
    pub fn compute_statistics(&self) -> CatalogResult<CatalogStats> {
        let books = self.list_all_books()?;
        Ok(CatalogStats::from_books(&books))
    }
}

fn decode_rows(rows: Vec<Row>) -> CatalogResult<Vec<BookRecord>> {
    rows.iter()
        .map(|row| {
            BookRecord::from_row(row).map_err(|err| {
                warn!("event=row_decode module=catalog status=error error={err}");
                CatalogError::InvalidRow(err.to_string())
            })
        })
        .collect()
}
