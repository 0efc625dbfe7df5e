//! Core of dokan
//!
//! This crate contains:
//! - Premium entitlement evaluation (activation, one-year term, trial deadline)
//! - Code redemption and the one-time trial
//! - Record stores for sales, products, the shopping list and tasks
//! - Daily sales reports
//! - The application context that wires them to one store and one change bus
//!
//! Every operation that depends on the wall clock takes `now` explicitly.

mod bus;
mod codes;
mod collection;
mod context;
mod entitlement;
mod hold;
mod products;
mod profile;
mod reports;
mod sales;
mod shopping;
mod tasks;

#[cfg(test)]
mod testing;

pub use bus::*;
pub use codes::*;
pub use collection::Record;
pub use context::*;
pub use entitlement::*;
pub use hold::*;
pub use products::*;
pub use profile::*;
pub use reports::*;
pub use sales::*;
pub use shopping::*;
pub use tasks::*;
