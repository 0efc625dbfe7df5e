//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    #[serde(default)]
    pub storage: RawStorageConfig,

    #[serde(default)]
    pub entitlement: RawEntitlementConfig,

    #[serde(default)]
    pub limits: RawLimits,

    #[serde(default)]
    pub tasks: RawTaskConfig,
}

/// Where the store lives
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStorageConfig {
    /// Data directory for the store (default: XDG data dir)
    pub data_dir: Option<PathBuf>,
}

/// Premium unlock settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawEntitlementConfig {
    /// Promotional codes, matched exactly after trimming the input
    pub promo_codes: Option<Vec<String>>,

    /// The single code handed out on purchase
    pub purchase_code: Option<String>,

    /// Length of a premium term in days
    pub term_days: Option<u64>,

    /// Length of the one-time trial in seconds
    pub trial_seconds: Option<u64>,
}

/// Free-tier limits
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLimits {
    /// Shopping list size without premium
    pub shopping_list_free_cap: Option<usize>,
}

/// Task list behaviour
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTaskConfig {
    /// How long a task must be held to complete it, in milliseconds
    pub hold_to_complete_ms: Option<u64>,
}
