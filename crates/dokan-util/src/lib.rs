//! Shared utilities for dokan
//!
//! This crate provides:
//! - ID types (RecordId, InstallationId)
//! - Time utilities (wall clock with mock override, epoch-millisecond helpers,
//!   monotonic instants for gesture timing)
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
