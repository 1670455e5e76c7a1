//! Domain model for catalog records.
//!
//! # Responsibility
//! - Define the canonical book shape shared by service and store layers.
//! - Own the row wire schema (column names, read status values).
//!
//! # Invariants
//! - `(title, author)` identifies a book; no other identity is kept in core.
//! - Records are created whole and never edited in place.

pub mod book;
