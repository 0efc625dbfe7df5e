//! Whole-array persistence shared by the record stores

use chrono::{DateTime, Local};
use dokan_api::{
    ChangeEvent, CollectionKind, ProductRecord, SaleRecord, ShoppingListItem, TaskItem,
};
use dokan_store::{CollectionRead, Entry, Storage};
use dokan_util::{to_epoch_millis, DokanError, RecordId, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ChangeBus;

/// A record kept in one of the persisted collections
pub trait Record: Serialize + DeserializeOwned + Clone {
    const KIND: CollectionKind;

    fn id(&self) -> &RecordId;
}

impl Record for SaleRecord {
    const KIND: CollectionKind = CollectionKind::Sales;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for ProductRecord {
    const KIND: CollectionKind = CollectionKind::Products;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for ShoppingListItem {
    const KIND: CollectionKind = CollectionKind::ShoppingList;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Record for TaskItem {
    const KIND: CollectionKind = CollectionKind::Tasks;

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Where new records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Front,
    Back,
}

/// The stored array as loaded for a mutation, unreadable elements included
pub(crate) struct Snapshot<T> {
    entries: Vec<Entry<T>>,
}

impl<T: Record> Snapshot<T> {
    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(Entry::record)
    }

    /// Number of readable records
    pub fn len(&self) -> usize {
        self.records().count()
    }

    fn find_mut(&mut self, id: &RecordId) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .filter_map(Entry::record_mut)
            .find(|r| r.id() == id)
    }

    /// Drop readable records failing `keep`; returns how many went
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.record().is_none_or(&mut keep));
        before - self.entries.len()
    }
}

/// Read-modify-write access to one collection.
///
/// Every mutation loads the whole array, applies the change, writes the
/// array back and publishes [`ChangeEvent::CollectionChanged`]. A
/// collection that cannot be read is never written over.
#[derive(Clone)]
pub(crate) struct Collection<T> {
    storage: Storage,
    bus: ChangeBus,
    _record: std::marker::PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self {
            storage,
            bus,
            _record: std::marker::PhantomData,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Readable records; empty when absent or unreadable
    pub fn load(&self) -> Vec<T> {
        self.storage.read_collection(T::KIND.key())
    }

    /// Load for a mutation. Fails when the stored array cannot be read.
    pub fn snapshot(&self) -> Result<Snapshot<T>> {
        match self.storage.load_collection(T::KIND.key()) {
            CollectionRead::Absent => Ok(Snapshot {
                entries: Vec::new(),
            }),
            CollectionRead::Entries(entries) => Ok(Snapshot { entries }),
            CollectionRead::Unreadable => {
                warn!(collection = %T::KIND, "Collection unreadable, change refused");
                Err(DokanError::StorageUnreadable(T::KIND.to_string()))
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot<T>) {
        // Write failures are logged by Storage; subscribers still refresh
        let _ = self
            .storage
            .write_collection(T::KIND.key(), &snapshot.entries);
        self.bus.publish(ChangeEvent::CollectionChanged {
            collection: T::KIND,
        });
    }

    /// Id derived from `now`, bumped past any id already in the snapshot
    pub fn fresh_id(snapshot: &Snapshot<T>, now: DateTime<Local>) -> RecordId {
        RecordId::unique_from_millis(to_epoch_millis(&now), snapshot.records().map(|r| r.id()))
    }

    pub fn insert(&self, mut snapshot: Snapshot<T>, record: T, placement: Placement) -> T {
        debug!(collection = %T::KIND, id = %record.id(), "Adding record");
        let entry = Entry::Record(record.clone());
        match placement {
            Placement::Front => snapshot.entries.insert(0, entry),
            Placement::Back => snapshot.entries.push(entry),
        }
        self.save(&snapshot);
        record
    }

    /// Apply `change` to the record with `id` and persist
    pub fn modify<F>(&self, id: &RecordId, change: F) -> Result<T>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let mut snapshot = self.snapshot()?;
        let record = snapshot
            .find_mut(id)
            .ok_or_else(|| DokanError::RecordNotFound(id.clone()))?;
        change(record)?;
        let updated = record.clone();
        self.save(&snapshot);
        Ok(updated)
    }

    /// Remove the record with `id`; false when there was none or the
    /// collection could not be read
    pub fn delete(&self, id: &RecordId) -> bool {
        self.remove_where(|r| r.id() == id) > 0
    }

    /// Remove every record matching `pred` and persist when any went
    pub fn remove_where(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let Ok(mut snapshot) = self.snapshot() else {
            return 0;
        };
        let removed = snapshot.retain(|r| !pred(r));
        if removed == 0 {
            debug!(collection = %T::KIND, "Nothing to remove");
            return 0;
        }
        self.save(&snapshot);
        removed
    }
}

/// Trimmed, non-empty text or a validation error naming `field`
pub(crate) fn required_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DokanError::validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Finite and not negative
pub(crate) fn check_amount(value: f64, field: &str) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DokanError::validation(format!(
            "{} must be a non-negative number",
            field
        )));
    }
    Ok(())
}
