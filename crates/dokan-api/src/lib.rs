//! Domain types for dokan
//!
//! This crate defines the data model shared by the store, the core and any
//! front end:
//! - Ledger records (sales, products, shopping list, tasks, shop profile)
//! - Preferences and entitlement status
//! - The canonical storage key set
//! - Change events published on every mutation

mod events;
pub mod keys;
mod types;

pub use events::*;
pub use types::*;
