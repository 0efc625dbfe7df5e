//! Premium entitlement evaluation
//!
//! The persisted record is two keys, an active flag and an activation
//! timestamp, plus an optional trial deadline. [`EntitlementEvaluator::evaluate`]
//! is the only reader; it normalizes whatever it finds:
//!
//! | stored state                              | result   | mutation           |
//! |-------------------------------------------|----------|--------------------|
//! | flag absent or not `"true"`               | inactive | none               |
//! | flag set, timestamp absent                | inactive | clear flag + deadline |
//! | timestamp unparseable                     | inactive | clear both         |
//! | trial deadline reached                    | inactive | clear both + deadline |
//! | `now > activatedAt + term`                | inactive, dates kept | clear both |
//! | otherwise                                 | active   | none               |

use chrono::{DateTime, Local};
use dokan_api::{keys, ChangeEvent, EntitlementStatus};
use dokan_store::Storage;
use dokan_util::{from_epoch_millis, to_epoch_millis};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ChangeBus;

/// Reads, activates and clears the premium entitlement
#[derive(Clone)]
pub struct EntitlementEvaluator {
    storage: Storage,
    bus: ChangeBus,
    term: Duration,
}

impl EntitlementEvaluator {
    pub fn new(storage: Storage, bus: ChangeBus, term: Duration) -> Self {
        Self { storage, bus, term }
    }

    /// Length of one premium term
    pub fn term(&self) -> Duration {
        self.term
    }

    /// Is premium active at `now`? Clears invalid or lapsed state as a side
    /// effect; calling again with unchanged state mutates nothing.
    pub fn evaluate(&self, now: DateTime<Local>) -> EntitlementStatus {
        if !self.storage.get_flag(keys::PREMIUM_ACTIVE) {
            return EntitlementStatus::inactive();
        }

        let Some(raw_activated_at) = self.storage.get_string(keys::PREMIUM_ACTIVATED_AT) else {
            warn!("Premium flag set without activation time, clearing flag");
            self.storage.remove(keys::PREMIUM_ACTIVE);
            self.cancel_trial_deadline();
            return self.changed(EntitlementStatus::inactive());
        };

        let Some(activated_at) = parse_millis(&raw_activated_at) else {
            warn!(
                activated_at = %raw_activated_at,
                "Unreadable premium activation time, clearing entitlement"
            );
            self.clear_record();
            return self.changed(EntitlementStatus::inactive());
        };

        if let Some(deadline) = self.due_trial_deadline(now) {
            self.expire_trial(deadline);
            return EntitlementStatus::inactive();
        }

        let Some(expiry) = chrono::Duration::from_std(self.term)
            .ok()
            .and_then(|term| activated_at.checked_add_signed(term))
        else {
            warn!("Premium expiry out of range, clearing entitlement");
            self.clear_record();
            return self.changed(EntitlementStatus::inactive());
        };

        if now > expiry {
            info!(
                activated_at = %activated_at,
                expired_at = %expiry,
                "Premium expired"
            );
            self.clear_record();
            return self.changed(EntitlementStatus {
                is_active: false,
                expiry_date: Some(expiry),
                activation_date: Some(activated_at),
            });
        }

        EntitlementStatus {
            is_active: true,
            expiry_date: Some(expiry),
            activation_date: Some(activated_at),
        }
    }

    /// Grant premium starting at `now` and return the normalized status
    pub fn activate(&self, now: DateTime<Local>) -> EntitlementStatus {
        // Timestamp first: the flag must never persist without it
        self.storage
            .set_i64(keys::PREMIUM_ACTIVATED_AT, to_epoch_millis(&now));
        self.storage.set_flag(keys::PREMIUM_ACTIVE);

        let status = self.evaluate(now);
        if status.is_active {
            info!(expires = ?status.expiry_date, "Premium activated");
        } else {
            warn!("Premium activation did not persist");
        }
        self.changed(status)
    }

    /// Remove the entitlement and any pending trial deadline
    pub fn deactivate(&self) {
        self.clear_record();
        self.storage.remove(keys::PREMIUM_TRIAL_DEADLINE);
        info!("Premium deactivated");
        self.changed(EntitlementStatus::inactive());
    }

    /// Activate premium for a trial that ends at `deadline`
    pub fn begin_trial(&self, now: DateTime<Local>, deadline: DateTime<Local>) -> EntitlementStatus {
        // Deadline first: an active trial must never lack one
        self.storage
            .set_i64(keys::PREMIUM_TRIAL_DEADLINE, to_epoch_millis(&deadline));
        info!(deadline = %deadline, "Trial started");
        self.activate(now)
    }

    /// Forget a pending trial deadline, e.g. when a code supersedes the trial
    pub fn cancel_trial_deadline(&self) {
        if self.storage.get_string(keys::PREMIUM_TRIAL_DEADLINE).is_some() {
            self.storage.remove(keys::PREMIUM_TRIAL_DEADLINE);
            debug!("Pending trial deadline cancelled");
        }
    }

    /// Time left on a running trial, `None` when no trial is pending
    pub fn trial_remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        let raw = self.storage.get_string(keys::PREMIUM_TRIAL_DEADLINE)?;
        let deadline = parse_millis(&raw)?;
        Some((deadline - now).to_std().unwrap_or(Duration::ZERO))
    }

    /// Switch a trial off if its deadline has passed.
    ///
    /// Fires at most once per trial: the deadline is removed when it fires,
    /// whether here or from inside [`evaluate`](Self::evaluate).
    pub fn expire_trial_if_due(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let deadline = self.due_trial_deadline(now)?;
        self.expire_trial(deadline);
        Some(deadline)
    }

    /// The trial deadline if it has been reached. An unreadable deadline
    /// counts as reached so a corrupt record cannot extend a trial.
    fn due_trial_deadline(&self, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let raw = self.storage.get_string(keys::PREMIUM_TRIAL_DEADLINE)?;
        match parse_millis(&raw) {
            Some(deadline) if now >= deadline => Some(deadline),
            Some(_) => None,
            None => {
                warn!(deadline = %raw, "Unreadable trial deadline, ending trial");
                Some(now)
            }
        }
    }

    fn expire_trial(&self, deadline: DateTime<Local>) {
        self.clear_record();
        self.storage.remove(keys::PREMIUM_TRIAL_DEADLINE);
        info!(deadline = %deadline, "Trial ended");
        self.bus.publish(ChangeEvent::TrialExpired { deadline });
        self.changed(EntitlementStatus::inactive());
    }

    fn clear_record(&self) {
        self.storage.remove(keys::PREMIUM_ACTIVE);
        self.storage.remove(keys::PREMIUM_ACTIVATED_AT);
    }

    fn changed(&self, status: EntitlementStatus) -> EntitlementStatus {
        self.bus.publish(ChangeEvent::EntitlementChanged { status });
        status
    }
}

/// End of a trial of `length` started at `now`; `None` when out of range
pub fn trial_deadline(now: DateTime<Local>, length: Duration) -> Option<DateTime<Local>> {
    chrono::Duration::from_std(length)
        .ok()
        .and_then(|length| now.checked_add_signed(length))
}

fn parse_millis(raw: &str) -> Option<DateTime<Local>> {
    raw.trim().parse::<i64>().ok().and_then(from_epoch_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixed_now, CountingKvStore};
    use dokan_util::ONE_YEAR;
    use std::sync::Arc;

    fn evaluator() -> (Arc<CountingKvStore>, EntitlementEvaluator) {
        let kv = Arc::new(CountingKvStore::new());
        let evaluator = EntitlementEvaluator::new(Storage::new(kv.clone()), ChangeBus::new(), ONE_YEAR);
        (kv, evaluator)
    }

    fn store_record(kv: &CountingKvStore, activated_at: DateTime<Local>) {
        kv.put(keys::PREMIUM_ACTIVE, "true");
        kv.put(keys::PREMIUM_ACTIVATED_AT, &to_epoch_millis(&activated_at).to_string());
    }

    #[test]
    fn absent_flag_is_inactive_without_mutation() {
        let (kv, evaluator) = evaluator();
        let status = evaluator.evaluate(fixed_now());
        assert_eq!(status, EntitlementStatus::inactive());
        assert_eq!(kv.mutations(), 0);
    }

    #[test]
    fn non_literal_flag_is_inactive_without_mutation() {
        let (kv, evaluator) = evaluator();
        kv.put(keys::PREMIUM_ACTIVE, "yes");
        kv.put(keys::PREMIUM_ACTIVATED_AT, "1");

        assert!(!evaluator.evaluate(fixed_now()).is_active);
        assert_eq!(kv.mutations(), 0);
        assert!(kv.value(keys::PREMIUM_ACTIVE).is_some());
    }

    #[test]
    fn flag_without_timestamp_clears_flag() {
        let (kv, evaluator) = evaluator();
        kv.put(keys::PREMIUM_ACTIVE, "true");

        let status = evaluator.evaluate(fixed_now());
        assert_eq!(status, EntitlementStatus::inactive());
        assert!(kv.value(keys::PREMIUM_ACTIVE).is_none());
        assert_eq!(kv.mutations(), 1);
    }

    #[test]
    fn flag_without_timestamp_drops_pending_deadline() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();
        kv.put(keys::PREMIUM_ACTIVE, "true");
        kv.put(
            keys::PREMIUM_TRIAL_DEADLINE,
            &to_epoch_millis(&(now + chrono::Duration::seconds(30))).to_string(),
        );

        assert!(!evaluator.evaluate(now).is_active);
        assert!(kv.value(keys::PREMIUM_TRIAL_DEADLINE).is_none());
        assert!(evaluator
            .expire_trial_if_due(now + chrono::Duration::seconds(60))
            .is_none());
    }

    #[test]
    fn trial_deadline_out_of_range() {
        let now = fixed_now();
        assert_eq!(
            trial_deadline(now, Duration::from_secs(60)),
            Some(now + chrono::Duration::seconds(60))
        );
        assert_eq!(trial_deadline(now, Duration::from_secs(100_000_000_000_000)), None);
        assert_eq!(trial_deadline(now, Duration::MAX), None);
    }

    #[test]
    fn unparseable_timestamp_clears_both() {
        let (kv, evaluator) = evaluator();
        kv.put(keys::PREMIUM_ACTIVE, "true");
        kv.put(keys::PREMIUM_ACTIVATED_AT, "yesterday");

        let status = evaluator.evaluate(fixed_now());
        assert_eq!(status, EntitlementStatus::inactive());
        assert!(kv.value(keys::PREMIUM_ACTIVE).is_none());
        assert!(kv.value(keys::PREMIUM_ACTIVATED_AT).is_none());
    }

    #[test]
    fn within_term_is_active_with_expiry() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();

        for age in [
            chrono::Duration::zero(),
            chrono::Duration::days(1),
            chrono::Duration::days(364),
            chrono::Duration::milliseconds(dokan_util::ONE_YEAR_MS),
        ] {
            let activated_at = now - age;
            store_record(&kv, activated_at);

            let status = evaluator.evaluate(now);
            assert!(status.is_active, "age {:?} should be active", age);
            assert_eq!(status.activation_date, Some(activated_at));
            assert_eq!(
                status.expiry_date,
                Some(activated_at + chrono::Duration::milliseconds(dokan_util::ONE_YEAR_MS))
            );
        }
        assert_eq!(kv.mutations(), 0);
    }

    #[test]
    fn past_term_clears_and_reports_dates() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();

        for age in [
            chrono::Duration::milliseconds(dokan_util::ONE_YEAR_MS + 1),
            chrono::Duration::days(400),
            chrono::Duration::days(3650),
        ] {
            let activated_at = now - age;
            store_record(&kv, activated_at);

            let status = evaluator.evaluate(now);
            assert!(!status.is_active);
            assert_eq!(status.activation_date, Some(activated_at));
            assert_eq!(
                status.expiry_date,
                Some(activated_at + chrono::Duration::milliseconds(dokan_util::ONE_YEAR_MS))
            );
            assert!(kv.value(keys::PREMIUM_ACTIVE).is_none());
            assert!(kv.value(keys::PREMIUM_ACTIVATED_AT).is_none());
        }
    }

    #[test]
    fn evaluate_is_idempotent() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();

        // Active: no mutation at all
        store_record(&kv, now - chrono::Duration::days(10));
        let first = evaluator.evaluate(now);
        let second = evaluator.evaluate(now);
        assert_eq!(first, second);
        assert_eq!(kv.mutations(), 0);

        // Expired: the first call normalizes, the second is a no-op
        store_record(&kv, now - chrono::Duration::days(500));
        let before = kv.mutations();
        let first = evaluator.evaluate(now);
        let after_first = kv.mutations();
        let second = evaluator.evaluate(now);
        assert_eq!(first.is_active, second.is_active);
        assert!(after_first > before);
        assert_eq!(kv.mutations(), after_first);
    }

    #[test]
    fn activate_sets_both_fields() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();

        let status = evaluator.activate(now);
        assert!(status.is_active);
        assert_eq!(status.activation_date, Some(now));
        assert_eq!(status.expiry_date, Some(now + chrono::Duration::days(365)));
        assert_eq!(kv.value(keys::PREMIUM_ACTIVE).as_deref(), Some("true"));
        assert_eq!(
            kv.value(keys::PREMIUM_ACTIVATED_AT),
            Some(to_epoch_millis(&now).to_string())
        );
    }

    #[test]
    fn failed_activation_stays_inactive() {
        let (kv, evaluator) = evaluator();
        kv.fail_writes(true);
        assert!(!evaluator.activate(fixed_now()).is_active);
    }

    #[test]
    fn trial_expires_once_at_deadline() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();

        let deadline = now + chrono::Duration::seconds(60);
        assert!(evaluator.begin_trial(now, deadline).is_active);
        assert_eq!(evaluator.trial_remaining(now), Some(Duration::from_secs(60)));

        let almost = now + chrono::Duration::seconds(59);
        assert!(evaluator.expire_trial_if_due(almost).is_none());
        assert!(evaluator.evaluate(almost).is_active);

        let later = now + chrono::Duration::seconds(60);
        assert!(evaluator.expire_trial_if_due(later).is_some());
        assert!(evaluator.expire_trial_if_due(later).is_none());
        assert!(kv.value(keys::PREMIUM_ACTIVE).is_none());
        assert!(kv.value(keys::PREMIUM_ACTIVATED_AT).is_none());
        assert!(evaluator.trial_remaining(later).is_none());
    }

    #[test]
    fn evaluate_enforces_trial_deadline() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();
        evaluator.begin_trial(now, now + chrono::Duration::seconds(60));

        let status = evaluator.evaluate(now + chrono::Duration::seconds(61));
        assert!(!status.is_active);
        assert!(kv.value(keys::PREMIUM_TRIAL_DEADLINE).is_none());
        assert!(evaluator.expire_trial_if_due(now + chrono::Duration::seconds(62)).is_none());
    }

    #[test]
    fn corrupt_trial_deadline_ends_trial() {
        let (kv, evaluator) = evaluator();
        let now = fixed_now();
        evaluator.activate(now);
        kv.put(keys::PREMIUM_TRIAL_DEADLINE, "later");

        assert!(!evaluator.evaluate(now).is_active);
        assert!(kv.value(keys::PREMIUM_TRIAL_DEADLINE).is_none());
    }

    #[test]
    fn deactivate_publishes_change() {
        let (_, evaluator) = evaluator();
        let mut rx = evaluator.bus.subscribe();
        evaluator.activate(fixed_now());
        evaluator.deactivate();

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert_eq!(
            last,
            Some(ChangeEvent::EntitlementChanged {
                status: EntitlementStatus::inactive()
            })
        );
    }
}
