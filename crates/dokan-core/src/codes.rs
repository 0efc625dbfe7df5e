//! Premium code redemption and the one-time trial

use chrono::{DateTime, Local};
use dokan_api::{keys, EntitlementStatus};
use dokan_config::EntitlementSettings;
use dokan_store::Storage;
use dokan_util::{DokanError, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{trial_deadline, EntitlementEvaluator};

/// Which allow-list a code matched. Only ever logged, never shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeKind {
    Promo,
    Purchase,
}

/// Checks user-entered codes against the configured allow-lists
#[derive(Clone)]
pub struct CodeValidator {
    storage: Storage,
    evaluator: EntitlementEvaluator,
    promo_codes: Vec<String>,
    purchase_code: String,
    trial_length: Duration,
}

impl CodeValidator {
    pub fn new(
        storage: Storage,
        evaluator: EntitlementEvaluator,
        settings: &EntitlementSettings,
    ) -> Self {
        Self {
            storage,
            evaluator,
            promo_codes: settings.promo_codes.clone(),
            purchase_code: settings.purchase_code.clone(),
            trial_length: settings.trial_length,
        }
    }

    /// Redeem a promo or purchase code.
    ///
    /// The input is trimmed, then matched exactly and case-sensitively.
    /// A match supersedes any running trial. Any failure is the same
    /// [`DokanError::InvalidCode`] and leaves the entitlement untouched.
    pub fn redeem(&self, code: &str, now: DateTime<Local>) -> Result<EntitlementStatus> {
        let Some(kind) = self.classify(code.trim()) else {
            info!("Code rejected");
            return Err(DokanError::InvalidCode);
        };

        debug!(kind = ?kind, "Code accepted");
        self.evaluator.cancel_trial_deadline();
        Ok(self.evaluator.activate(now))
    }

    /// Start the one-time trial.
    ///
    /// Fails with [`DokanError::TrialAlreadyUsed`] once any trial has been
    /// started on this installation, and with
    /// [`DokanError::PremiumAlreadyActive`] while premium is on. Premium
    /// switches itself off again after the configured trial length.
    pub fn start_trial(&self, now: DateTime<Local>) -> Result<EntitlementStatus> {
        if self.trial_used() {
            info!("Trial refused, already used");
            return Err(DokanError::TrialAlreadyUsed);
        }

        if self.evaluator.evaluate(now).is_active {
            info!("Trial refused, premium already active");
            return Err(DokanError::PremiumAlreadyActive);
        }

        let Some(deadline) = trial_deadline(now, self.trial_length) else {
            warn!(length = ?self.trial_length, "Trial length out of range");
            return Err(DokanError::validation("Trial length out of range"));
        };

        // Consumed before activation so a failed activation cannot be retried
        self.storage.set_flag(keys::PREMIUM_TRIAL_USED);
        Ok(self.evaluator.begin_trial(now, deadline))
    }

    /// Has this installation ever started a trial?
    pub fn trial_used(&self) -> bool {
        self.storage.get_flag(keys::PREMIUM_TRIAL_USED)
    }

    pub fn trial_length(&self) -> Duration {
        self.trial_length
    }

    /// Countdown for a running trial
    pub fn trial_remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        self.evaluator.trial_remaining(now)
    }

    fn classify(&self, code: &str) -> Option<CodeKind> {
        if code.is_empty() {
            return None;
        }
        if self.promo_codes.iter().any(|c| c == code) {
            Some(CodeKind::Promo)
        } else if self.purchase_code == code {
            Some(CodeKind::Purchase)
        } else {
            None
        }
    }
}
