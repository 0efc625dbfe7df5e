//! In-memory store for tests and ephemeral sessions

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::{KvStore, StoreError, StoreResult};

/// In-memory key-value store
///
/// Failure injection mirrors what a browser store can do to its caller:
/// a full quota on write and an unavailable store on read.
#[derive(Default)]
pub struct MemoryKvStore {
    values: Mutex<BTreeMap<String, String>>,

    /// Make every `set` fail with [`StoreError::QuotaExceeded`]
    pub fail_writes: AtomicBool,

    /// Make every `get` fail with [`StoreError::Unavailable`]
    pub fail_reads: AtomicBool,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> StoreResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    /// Number of keys present
    pub fn len(&self) -> usize {
        self.values().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::QuotaExceeded);
        }
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.values()?.keys().cloned().collect())
    }

    fn is_healthy(&self) -> bool {
        self.values().is_ok()
    }
}
