//! Validated settings structures

use crate::schema::RawConfig;
use dokan_util::{data_dir_without_env, ONE_YEAR};
use std::path::PathBuf;
use std::time::Duration;

/// Promo codes accepted when the config names none
pub const DEFAULT_PROMO_CODES: &[&str] = &["DOKAN2026", "SHOPKEEPER"];

/// Purchase code accepted when the config names none
pub const DEFAULT_PURCHASE_CODE: &str = "987987";

pub const DEFAULT_TRIAL_LENGTH: Duration = Duration::from_secs(60);

pub const DEFAULT_SHOPPING_LIST_FREE_CAP: usize = 199;

pub const DEFAULT_HOLD_TO_COMPLETE: Duration = Duration::from_millis(2000);

/// Longest premium term a config may set
pub const MAX_TERM_DAYS: u64 = 36_500;

pub(crate) const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Validated settings ready for use by the core
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub entitlement: EntitlementSettings,
    pub limits: LimitSettings,
    pub tasks: TaskSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let defaults = Settings::default();

        let storage = StorageSettings {
            data_dir: raw.storage.data_dir.unwrap_or(defaults.storage.data_dir),
        };

        let entitlement = EntitlementSettings {
            promo_codes: raw
                .entitlement
                .promo_codes
                .unwrap_or(defaults.entitlement.promo_codes),
            purchase_code: raw
                .entitlement
                .purchase_code
                .unwrap_or(defaults.entitlement.purchase_code),
            term: raw
                .entitlement
                .term_days
                .and_then(|days| days.checked_mul(SECONDS_PER_DAY))
                .map(Duration::from_secs)
                .unwrap_or(defaults.entitlement.term),
            trial_length: raw
                .entitlement
                .trial_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.entitlement.trial_length),
        };

        let limits = LimitSettings {
            shopping_list_free_cap: raw
                .limits
                .shopping_list_free_cap
                .unwrap_or(defaults.limits.shopping_list_free_cap),
        };

        let tasks = TaskSettings {
            hold_to_complete: raw
                .tasks
                .hold_to_complete_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tasks.hold_to_complete),
        };

        Self {
            storage,
            entitlement,
            limits,
            tasks,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: data_dir_without_env(),
        }
    }
}

/// Code allow-lists and term lengths
#[derive(Debug, Clone)]
pub struct EntitlementSettings {
    pub promo_codes: Vec<String>,
    pub purchase_code: String,
    pub term: Duration,
    pub trial_length: Duration,
}

impl Default for EntitlementSettings {
    fn default() -> Self {
        Self {
            promo_codes: DEFAULT_PROMO_CODES.iter().map(|c| c.to_string()).collect(),
            purchase_code: DEFAULT_PURCHASE_CODE.to_string(),
            term: ONE_YEAR,
            trial_length: DEFAULT_TRIAL_LENGTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LimitSettings {
    pub shopping_list_free_cap: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            shopping_list_free_cap: DEFAULT_SHOPPING_LIST_FREE_CAP,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskSettings {
    pub hold_to_complete: Duration,
}

impl Default for TaskSettings {
    fn default() -> Self {
        Self {
            hold_to_complete: DEFAULT_HOLD_TO_COMPLETE,
        }
    }
}
