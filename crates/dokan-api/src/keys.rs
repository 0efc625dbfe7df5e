//! Canonical storage keys
//!
//! One key set for every front end. Values are JSON unless noted.

/// `"true"` or absent
pub const PREMIUM_ACTIVE: &str = "premium.active";

/// Activation time, epoch milliseconds as a decimal string
pub const PREMIUM_ACTIVATED_AT: &str = "premium.activatedAt";

/// `"true"` once a trial has been started; never removed
pub const PREMIUM_TRIAL_USED: &str = "premium.trialUsed";

/// Deadline of a running trial, epoch milliseconds as a decimal string
pub const PREMIUM_TRIAL_DEADLINE: &str = "premium.trialDeadline";

/// UUID of this installation, plain text
pub const INSTALLATION_ID: &str = "installation.id";

pub const SALES: &str = "ledger.sales";
pub const PRODUCTS: &str = "ledger.products";

/// Schema version of [`PRODUCTS`], plain integer
pub const PRODUCTS_SCHEMA_VERSION: &str = "ledger.products.schemaVersion";

pub const SHOPPING_LIST: &str = "ledger.shoppingList";
pub const TASKS: &str = "ledger.tasks";

pub const SHOP_PROFILE: &str = "shop.profile";

// Preferences, all plain text
pub const LANGUAGE: &str = "prefs.language";
pub const THEME_MODE: &str = "prefs.themeMode";
pub const THEME_COLOR: &str = "prefs.themeColor";
pub const SOUND_ENABLED: &str = "prefs.soundEnabled";
pub const CUSTOM_SOUND: &str = "prefs.customSound";
