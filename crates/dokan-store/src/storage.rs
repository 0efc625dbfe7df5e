//! Defensive typed access on top of a [`KvStore`]

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::{KvStore, StoreResult};

/// Literal stored for a set boolean flag
const FLAG_TRUE: &str = "true";

/// One element of a stored collection.
///
/// Elements that do not decode as `T` are kept as raw JSON so writing the
/// collection back leaves them as they were.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry<T> {
    Record(T),
    Unknown(Value),
}

impl<T> Entry<T> {
    pub fn record(&self) -> Option<&T> {
        match self {
            Entry::Record(record) => Some(record),
            Entry::Unknown(_) => None,
        }
    }

    pub fn record_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Record(record) => Some(record),
            Entry::Unknown(_) => None,
        }
    }

    pub fn into_record(self) -> Option<T> {
        match self {
            Entry::Record(record) => Some(record),
            Entry::Unknown(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Entry<U> {
        match self {
            Entry::Record(record) => Entry::Record(f(record)),
            Entry::Unknown(value) => Entry::Unknown(value),
        }
    }
}

/// Outcome of loading a collection for a read-modify-write
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionRead<T> {
    /// Nothing stored under the key
    Absent,
    /// The store failed or the value is not a JSON array
    Unreadable,
    Entries(Vec<Entry<T>>),
}

/// Typed, failure-absorbing view of a [`KvStore`].
///
/// Nothing here returns an error. Reads that fail or hold unparseable data
/// come back as `None` (or an empty collection); writes that fail are
/// logged and reported as `false`. Callers that need to know whether a
/// write landed can check the return value, most don't.
///
/// Callers about to overwrite a collection use
/// [`load_collection`](Self::load_collection), which tells a missing
/// collection apart from one that could not be read.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KvStore>,
}

impl Storage {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// The underlying store
    pub fn kv(&self) -> &Arc<dyn KvStore> {
        &self.kv
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed, treating as absent");
                None
            }
        }
    }

    pub fn set_string(&self, key: &str, value: &str) -> bool {
        match self.kv.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Storage write failed, change not persisted");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.kv.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Storage remove failed");
                false
            }
        }
    }

    /// True only when the key holds the literal `"true"`
    pub fn get_flag(&self, key: &str) -> bool {
        self.get_string(key).as_deref() == Some(FLAG_TRUE)
    }

    pub fn set_flag(&self, key: &str) -> bool {
        self.set_string(key, FLAG_TRUE)
    }

    /// Integer stored as decimal text; `None` when absent or unparseable
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }

    pub fn set_i64(&self, key: &str, value: i64) -> bool {
        self.set_string(key, &value.to_string())
    }

    pub fn read_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_string(key)?;
        match decode(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Stored JSON unreadable, treating as absent");
                None
            }
        }
    }

    pub fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match encode(value) {
            Ok(json) => self.set_string(key, &json),
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value, change not persisted");
                false
            }
        }
    }

    /// Load a collection element by element.
    ///
    /// A failed read or a value that is not a JSON array is
    /// [`CollectionRead::Unreadable`]. Inside a readable array, elements
    /// that do not decode as `T` are logged and kept as [`Entry::Unknown`].
    pub fn load_collection<T: DeserializeOwned>(&self, key: &str) -> CollectionRead<T> {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CollectionRead::Absent,
            Err(e) => {
                warn!(key, error = %e, "Collection read failed");
                return CollectionRead::Unreadable;
            }
        };

        let values: Vec<Value> = match decode(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(key, error = %e, "Stored collection is not a JSON array");
                return CollectionRead::Unreadable;
            }
        };

        let entries = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| match <T as Deserialize>::deserialize(&value) {
                Ok(record) => Entry::Record(record),
                Err(e) => {
                    warn!(key, index, error = %e, "Skipping unreadable record");
                    Entry::Unknown(value)
                }
            })
            .collect();
        CollectionRead::Entries(entries)
    }

    /// Readable records under `key`; empty when absent or unreadable
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load_collection(key) {
            CollectionRead::Entries(entries) => {
                entries.into_iter().filter_map(Entry::into_record).collect()
            }
            CollectionRead::Absent | CollectionRead::Unreadable => Vec::new(),
        }
    }

    pub fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> bool {
        self.write_json(key, items)
    }
}

fn decode<T: DeserializeOwned>(raw: &str) -> StoreResult<T> {
    Ok(serde_json::from_str(raw)?)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<String> {
    Ok(serde_json::to_string(value)?)
}
