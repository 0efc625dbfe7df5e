//! Strongly-typed identifiers for dokan

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Client-generated identifier of a record within one collection.
///
/// Fresh ids are time based (epoch milliseconds rendered as decimal), which
/// keeps them readable and roughly ordered. Older data may hold any string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Time-based id that does not collide with any of `existing`.
    ///
    /// Two records created within the same millisecond get consecutive ids.
    pub fn unique_from_millis<'a>(
        millis: i64,
        existing: impl IntoIterator<Item = &'a RecordId>,
    ) -> Self {
        let taken: HashSet<&str> = existing.into_iter().map(|id| id.as_str()).collect();
        let mut candidate = millis;
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        Self::from_millis(candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of one installation (one persisted store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstallationId(Uuid);

impl InstallationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for InstallationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstallationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
