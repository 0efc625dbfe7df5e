//! Persistence layer for dokan
//!
//! Provides:
//! - A synchronous string key-value store trait, the equivalent of a
//!   browser's local storage for one installation
//! - SQLite (on disk) and in-memory backends
//! - [`Storage`], a JSON-aware wrapper that never fails: read errors give
//!   empty/default state and write errors are logged and dropped

mod memory;
mod sqlite;
mod storage;
mod traits;

pub use memory::*;
pub use sqlite::*;
pub use storage::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage quota exceeded")]
    QuotaExceeded,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
