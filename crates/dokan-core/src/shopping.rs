//! Shopping list with the free-tier item cap

use chrono::{DateTime, Local};
use dokan_api::ShoppingListItem;
use dokan_store::Storage;
use dokan_util::{to_epoch_millis, DokanError, RecordId, Result};
use tracing::{debug, info};

use crate::collection::{required_text, Collection, Placement};
use crate::{ChangeBus, EntitlementEvaluator};

/// Shopping list in insertion order
#[derive(Clone)]
pub struct ShoppingListStore {
    records: Collection<ShoppingListItem>,
    entitlement: EntitlementEvaluator,
    free_cap: usize,
}

impl ShoppingListStore {
    pub fn new(
        storage: Storage,
        bus: ChangeBus,
        entitlement: EntitlementEvaluator,
        free_cap: usize,
    ) -> Self {
        Self {
            records: Collection::new(storage, bus),
            entitlement,
            free_cap,
        }
    }

    pub fn list(&self) -> Vec<ShoppingListItem> {
        self.records.load()
    }

    /// Items a free user may hold
    pub fn free_cap(&self) -> usize {
        self.free_cap
    }

    /// Append an item.
    ///
    /// Without premium the list holds at most [`free_cap`](Self::free_cap)
    /// items; one more fails with [`DokanError::LimitReached`].
    pub fn add(
        &self,
        name: &str,
        quantity: &str,
        now: DateTime<Local>,
    ) -> Result<ShoppingListItem> {
        let name = required_text(name, "Item name")?;
        let items = self.records.snapshot()?;

        if items.len() >= self.free_cap && !self.entitlement.evaluate(now).is_active {
            info!(limit = self.free_cap, "Shopping list full for free tier");
            return Err(DokanError::LimitReached {
                limit: self.free_cap,
            });
        }

        let item = ShoppingListItem {
            id: Collection::fresh_id(&items, now),
            name,
            quantity: quantity.trim().to_string(),
            bought: false,
            created_at: to_epoch_millis(&now),
        };
        Ok(self.records.insert(items, item, Placement::Back))
    }

    /// Flip the bought mark and return the new state
    pub fn toggle_bought(&self, id: &RecordId) -> Result<bool> {
        let item = self.records.modify(id, |item| {
            item.bought = !item.bought;
            Ok(())
        })?;
        debug!(id = %id, bought = item.bought, "Shopping item toggled");
        Ok(item.bought)
    }

    pub fn delete(&self, id: &RecordId) -> bool {
        self.records.delete(id)
    }

    /// Drop every bought item; returns how many went
    pub fn clear_bought(&self) -> usize {
        let removed = self.records.remove_where(|item| item.bought);
        if removed > 0 {
            info!(removed, "Cleared bought items");
        }
        removed
    }

    /// Additions left before the cap; `None` when premium lifts it
    pub fn remaining_free_slots(&self, now: DateTime<Local>) -> Option<usize> {
        if self.entitlement.evaluate(now).is_active {
            return None;
        }
        Some(self.free_cap.saturating_sub(self.list().len()))
    }
}
