//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into catalog-level operations.
//! - Keep shells (CLI, UI) free of validation and uniqueness rules.

pub mod catalog_service;
