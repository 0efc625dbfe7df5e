//! Change events published to subscribers

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{CollectionKind, EntitlementStatus};

/// Published after every persisted mutation.
///
/// Views showing derived data (today's totals, the premium badge) re-read
/// their source when they receive the matching event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    CollectionChanged { collection: CollectionKind },

    /// Entitlement was activated, cleared or normalized
    EntitlementChanged { status: EntitlementStatus },

    /// A trial ran out and premium was switched off
    TrialExpired { deadline: DateTime<Local> },

    ProfileChanged,

    PreferencesChanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged() {
        let event = ChangeEvent::CollectionChanged {
            collection: CollectionKind::ShoppingList,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "collection_changed");
        assert_eq!(json["collection"], "shopping_list");
    }
}
