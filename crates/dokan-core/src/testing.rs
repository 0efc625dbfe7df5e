//! Test helpers shared by the unit tests of this crate

use chrono::{DateTime, Local, TimeZone};
use dokan_store::{KvStore, MemoryKvStore, StoreResult};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A fixed, millisecond-aligned "now"
pub fn fixed_now() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 15, 10, 30, 0).unwrap()
}

/// Memory store that counts writes and removals made through the trait
#[derive(Default)]
pub struct CountingKvStore {
    inner: MemoryKvStore,
    mutations: AtomicUsize,
}

impl CountingKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls so far
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Seed a value without counting it
    pub fn put(&self, key: &str, value: &str) {
        self.inner.set(key, value).unwrap();
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.inner.get(key).unwrap()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.inner.fail_reads.store(fail, Ordering::SeqCst);
    }
}

impl KvStore for CountingKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }

    fn keys(&self) -> StoreResult<Vec<String>> {
        self.inner.keys()
    }

    fn is_healthy(&self) -> bool {
        self.inner.is_healthy()
    }
}
