//! Application context: one store, one bus, handles for every component

use chrono::{DateTime, Local};
use dokan_api::{keys, ChangeEvent};
use dokan_config::Settings;
use dokan_store::{KvStore, Storage};
use dokan_util::InstallationId;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    ChangeBus, CodeValidator, EntitlementEvaluator, HoldProgress, PreferencesStore, ProductStore,
    ProfileStore, SalesStore, ShoppingListStore, TaskStore,
};

/// Everything the front ends need, built from settings and a store.
///
/// Handles returned by the accessors are cheap clones sharing the same
/// store and bus, so a change made through one is seen by all.
pub struct AppContext {
    settings: Settings,
    storage: Storage,
    bus: ChangeBus,
    installation_id: InstallationId,
}

impl AppContext {
    pub fn new(settings: Settings, kv: Arc<dyn KvStore>) -> Self {
        let storage = Storage::new(kv);
        let installation_id = load_or_create_installation_id(&storage);

        info!(
            installation_id = %installation_id,
            healthy = storage.kv().is_healthy(),
            "Application context ready"
        );

        Self {
            settings,
            storage,
            bus: ChangeBus::new(),
            installation_id,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Receive every [`ChangeEvent`] published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.bus.subscribe()
    }

    pub fn is_healthy(&self) -> bool {
        self.storage.kv().is_healthy()
    }

    pub fn entitlement(&self) -> EntitlementEvaluator {
        EntitlementEvaluator::new(
            self.storage.clone(),
            self.bus.clone(),
            self.settings.entitlement.term,
        )
    }

    pub fn codes(&self) -> CodeValidator {
        CodeValidator::new(
            self.storage.clone(),
            self.entitlement(),
            &self.settings.entitlement,
        )
    }

    pub fn sales(&self) -> SalesStore {
        SalesStore::new(self.storage.clone(), self.bus.clone())
    }

    pub fn products(&self) -> ProductStore {
        ProductStore::new(self.storage.clone(), self.bus.clone())
    }

    pub fn shopping_list(&self) -> ShoppingListStore {
        ShoppingListStore::new(
            self.storage.clone(),
            self.bus.clone(),
            self.entitlement(),
            self.settings.limits.shopping_list_free_cap,
        )
    }

    pub fn tasks(&self) -> TaskStore {
        TaskStore::new(self.storage.clone(), self.bus.clone())
    }

    /// A fresh hold gesture with the configured duration
    pub fn hold_gesture(&self) -> HoldProgress {
        HoldProgress::new(self.settings.tasks.hold_to_complete)
    }

    pub fn profile(&self) -> ProfileStore {
        ProfileStore::new(self.storage.clone(), self.bus.clone())
    }

    pub fn preferences(&self) -> PreferencesStore {
        PreferencesStore::new(self.storage.clone(), self.bus.clone())
    }

    /// Run time-driven work due at `now` and return the events it emitted.
    ///
    /// Fires a reached trial deadline and clears a lapsed premium term.
    /// Safe to call as often as wanted; with nothing due it changes nothing.
    pub fn tick(&self, now: DateTime<Local>) -> Vec<ChangeEvent> {
        let mut rx = self.bus.subscribe();

        let evaluator = self.entitlement();
        if let Some(deadline) = evaluator.expire_trial_if_due(now) {
            info!(
                installation_id = %self.installation_id,
                deadline = %deadline,
                "Trial deadline reached"
            );
        }
        evaluator.evaluate(now);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        if !events.is_empty() {
            debug!(count = events.len(), "Tick emitted events");
        }
        events
    }
}

fn load_or_create_installation_id(storage: &Storage) -> InstallationId {
    if let Some(raw) = storage.get_string(keys::INSTALLATION_ID) {
        match InstallationId::parse(&raw) {
            Some(id) => return id,
            None => warn!(value = %raw, "Unreadable installation id, generating a new one"),
        }
    }

    let id = InstallationId::new();
    if !storage.set_string(keys::INSTALLATION_ID, &id.to_string()) {
        warn!("Installation id not persisted, it will change on next start");
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixed_now;
    use dokan_api::{CollectionKind, NewSale};
    use dokan_store::{MemoryKvStore, SqliteKvStore};
    use dokan_util::{DokanError, ONE_YEAR_MS};
    use tempfile::tempdir;

    fn context() -> (Arc<MemoryKvStore>, AppContext) {
        let kv = Arc::new(MemoryKvStore::new());
        (kv.clone(), AppContext::new(Settings::default(), kv))
    }

    #[test]
    fn installation_id_is_stable() {
        let (kv, first) = context();
        let again = AppContext::new(Settings::default(), kv.clone());
        assert_eq!(first.installation_id(), again.installation_id());

        kv.set(keys::INSTALLATION_ID, "garbage").unwrap();
        let replaced = AppContext::new(Settings::default(), kv);
        assert_ne!(replaced.installation_id(), first.installation_id());
    }

    #[test]
    fn purchase_code_grants_a_year() {
        let (_, ctx) = context();
        let now = fixed_now();

        let status = ctx.codes().redeem("987987", now).unwrap();
        assert!(status.is_active);
        assert_eq!(
            status.expiry_date,
            Some(now + chrono::Duration::milliseconds(ONE_YEAR_MS))
        );

        let later = now + chrono::Duration::milliseconds(ONE_YEAR_MS + 1);
        let expired = ctx.entitlement().evaluate(later);
        assert!(!expired.is_active);
        assert!(!ctx.entitlement().evaluate(later).is_active);
    }

    #[test]
    fn wrong_code_changes_nothing() {
        let (kv, ctx) = context();
        let keys_before = kv.len();
        assert!(matches!(
            ctx.codes().redeem("wrong", fixed_now()),
            Err(DokanError::InvalidCode)
        ));
        assert_eq!(kv.len(), keys_before);
        assert!(!ctx.entitlement().evaluate(fixed_now()).is_active);
    }

    #[test]
    fn tick_ends_trial_exactly_once() {
        let (kv, ctx) = context();
        let now = fixed_now();
        ctx.codes().start_trial(now).unwrap();

        assert!(ctx.tick(now + chrono::Duration::seconds(59)).is_empty());

        let events = ctx.tick(now + chrono::Duration::seconds(60));
        assert!(matches!(events[0], ChangeEvent::TrialExpired { .. }));
        assert!(kv.get(keys::PREMIUM_ACTIVE).unwrap().is_none());
        assert!(kv.get(keys::PREMIUM_ACTIVATED_AT).unwrap().is_none());

        assert!(ctx.tick(now + chrono::Duration::seconds(61)).is_empty());
        assert!(matches!(
            ctx.codes().start_trial(now + chrono::Duration::seconds(62)),
            Err(DokanError::TrialAlreadyUsed)
        ));
    }

    #[test]
    fn trial_ends_without_tick_after_restart() {
        let (kv, ctx) = context();
        let now = fixed_now();
        ctx.codes().start_trial(now).unwrap();
        drop(ctx);

        let restarted = AppContext::new(Settings::default(), kv.clone());
        let status = restarted
            .entitlement()
            .evaluate(now + chrono::Duration::seconds(90));
        assert!(!status.is_active);
        assert!(kv.get(keys::PREMIUM_ACTIVE).unwrap().is_none());
    }

    #[test]
    fn shopping_cap_follows_entitlement() {
        let (_, ctx) = context();
        let now = fixed_now();
        let list = ctx.shopping_list();

        for i in 0..199 {
            list.add(&format!("item {}", i), "", now).unwrap();
        }
        assert!(list.add("one more", "", now).unwrap_err().is_limit_reached());

        ctx.codes().redeem("DOKAN2026", now).unwrap();
        assert!(list.add("one more", "", now).is_ok());
        assert_eq!(list.list().len(), 200);
    }

    #[test]
    fn subscribers_see_collection_changes() {
        let (_, ctx) = context();
        let mut rx = ctx.subscribe();

        ctx.sales()
            .add(
                NewSale {
                    item_name: "Tea".into(),
                    wholesale_price: 5.0,
                    selling_price: 8.0,
                    quantity: 1,
                    ..Default::default()
                },
                fixed_now(),
            )
            .unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            ChangeEvent::CollectionChanged {
                collection: CollectionKind::Sales
            }
        );
    }

    #[test]
    fn state_survives_reopening_the_database() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dokan.db");
        let now = fixed_now();

        let first = AppContext::new(
            Settings::default(),
            Arc::new(SqliteKvStore::open(&path).unwrap()),
        );
        first.codes().start_trial(now).unwrap();
        first.tasks().add("Count cash", now).unwrap();
        let id = first.installation_id();
        drop(first);

        let second = AppContext::new(
            Settings::default(),
            Arc::new(SqliteKvStore::open(&path).unwrap()),
        );
        assert_eq!(second.installation_id(), id);
        assert_eq!(second.tasks().list().len(), 1);
        assert!(second.codes().trial_used());

        let events = second.tick(now + chrono::Duration::minutes(5));
        assert!(matches!(events[0], ChangeEvent::TrialExpired { .. }));
        assert!(!second.entitlement().evaluate(now).is_active);
    }
}
