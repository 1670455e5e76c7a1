//! Core catalog logic for the library manager.
//! This crate owns every validation and uniqueness rule; shells only render.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use config::{ConfigError, StoreConfig, DEFAULT_TABLE};
pub use logging::{default_log_dir, default_log_level, init_logging, logging_status, LoggingError};
pub use model::book::{
    BookField, BookRecord, BookValidationError, NewBook, ParseReadStatusError, ReadStatus,
};
pub use service::catalog_service::{
    AddOutcome, CatalogError, CatalogResult, CatalogService, CatalogStats, RemoveOutcome,
    SearchOutcome,
};
pub use store::{
    Filters, RecordStoreClient, RestRecordStore, Row, SqliteRecordStore, StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
