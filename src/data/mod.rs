//! Data ingestion and storage
//!
//! The match store abstraction, its SQLite and in-memory implementations,
//! and the submission import path.

pub mod database;
pub mod ingest;
pub mod store;

pub use database::Database;
pub use ingest::{import_file, import_records, ImportSummary};
pub use store::{InMemoryStore, MatchStore};
