//! Store trait definitions

use crate::StoreResult;

/// Origin-scoped string key-value store.
///
/// No transactions and no schema: callers read and write whole values.
/// Implementations must be safe to share between threads, but dokan only
/// ever has a single writer.
pub trait KvStore: Send + Sync {
    /// Get the value under `key`, `None` when absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Insert or replace the value under `key`
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key`; removing an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> StoreResult<Vec<String>>;

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
