//! Error types for dokan

use thiserror::Error;

use crate::RecordId;

/// Core error type for dokan operations
///
/// Storage failures on read never surface here: the record stores degrade
/// to an empty or default state instead. The one exception is a mutation
/// over a collection that could not be read, which is refused with
/// [`DokanError::StorageUnreadable`] so the stored data is not replaced.
#[derive(Debug, Error)]
pub enum DokanError {
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Limit reached: at most {limit} items without premium")]
    LimitReached { limit: usize },

    /// Deliberately generic: never says which code category was tried.
    #[error("Invalid code")]
    InvalidCode,

    #[error("Trial already used")]
    TrialAlreadyUsed,

    #[error("Premium is already active")]
    PremiumAlreadyActive,

    #[error("Stored {0} could not be read; not overwriting it")]
    StorageUnreadable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl DokanError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// True when the caller should be prompted to buy premium.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, Self::LimitReached { .. })
    }
}

pub type Result<T> = std::result::Result<T, DokanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_code_message_is_generic() {
        assert_eq!(DokanError::InvalidCode.to_string(), "Invalid code");
    }

    #[test]
    fn limit_reached_is_distinguishable() {
        assert!(DokanError::LimitReached { limit: 199 }.is_limit_reached());
        assert!(!DokanError::InvalidCode.is_limit_reached());
    }
}
