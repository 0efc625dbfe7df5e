//! Time utilities for dokan
//!
//! Provides wall-clock time (entitlement activation and expiry, sale dates)
//! stored as epoch milliseconds, and monotonic time for gesture timing.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `DOKAN_MOCK_TIME` environment variable can be set
//! to override the system time. This is the easiest way to check premium
//! expiry by hand without editing the store.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2026-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! DOKAN_MOCK_TIME="2027-12-25 14:30:00" dokan status
//! ```

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "DOKAN_MOCK_TIME";

/// Length of one premium term: 365 days, no leap-year adjustment.
pub const ONE_YEAR: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// [`ONE_YEAR`] in milliseconds.
pub const ONE_YEAR_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Offset of the mock clock from the real one, read once per process.
/// The mock clock keeps ticking from the configured instant.
static MOCK_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

fn mock_offset() -> Option<chrono::Duration> {
    *MOCK_OFFSET.get_or_init(|| {
        if cfg!(debug_assertions) {
            mock_offset_from_env()
        } else {
            None
        }
    })
}

fn mock_offset_from_env() -> Option<chrono::Duration> {
    let raw = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
    let Some(mock) = parse_mock_time(&raw) else {
        tracing::warn!(
            value = %raw,
            "{} is not YYYY-MM-DD HH:MM:SS, ignoring it",
            MOCK_TIME_ENV_VAR
        );
        return None;
    };
    let offset = mock - Local::now();
    tracing::info!(mock_time = %raw, offset_secs = offset.num_seconds(), "Mock clock active");
    Some(offset)
}

/// Parse `YYYY-MM-DD HH:MM:SS` as local time
pub fn parse_mock_time(s: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S").ok()?;
    Local.from_local_datetime(&naive).single()
}

pub fn is_mock_time_active() -> bool {
    mock_offset().is_some()
}

/// Wall-clock now, shifted by the mock offset when one is set
pub fn now() -> DateTime<Local> {
    let real = Local::now();
    mock_offset().map_or(real, |offset| real + offset)
}

/// Milliseconds since the Unix epoch, the persisted timestamp format.
pub fn to_epoch_millis(dt: &DateTime<Local>) -> i64 {
    dt.timestamp_millis()
}

/// Inverse of [`to_epoch_millis`]. `None` when out of chrono's range.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Local>> {
    Local.timestamp_millis_opt(millis).single()
}

/// Format a DateTime for display with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Represents a point in monotonic time for gesture timing.
/// This is immune to wall-clock changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    /// Duration since `earlier`, or zero if `earlier` is later than `self`
    pub fn saturating_duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.saturating_duration_since(earlier.0)
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
