//! Configuration validation

use crate::schema::RawConfig;
use crate::settings::{
    DEFAULT_PROMO_CODES, DEFAULT_PURCHASE_CODE, MAX_TERM_DAYS, SECONDS_PER_DAY,
};
use dokan_util::ONE_YEAR;
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{category} code cannot be empty")]
    EmptyCode { category: &'static str },

    #[error("{category} code '{code}' has surrounding whitespace and could never match")]
    UntrimmedCode { category: &'static str, code: String },

    #[error("Duplicate code: {0}")]
    DuplicateCode(String),

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("{field} must be at most {max}")]
    OutOfRange { field: &'static str, max: u64 },

    #[error("Trial of {trial_seconds}s is not shorter than the premium term of {term_seconds}s")]
    TrialExceedsTerm {
        trial_seconds: u64,
        term_seconds: u64,
    },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_codes(config));

    let entitlement = &config.entitlement;
    if entitlement.term_days == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "entitlement.term_days",
        });
    }
    if entitlement.trial_seconds == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "entitlement.trial_seconds",
        });
    }

    // The trial must end inside the term, configured or default
    let term_seconds = match entitlement.term_days {
        None => Some(ONE_YEAR.as_secs()),
        Some(0) => None,
        Some(days) if days > MAX_TERM_DAYS => {
            errors.push(ValidationError::OutOfRange {
                field: "entitlement.term_days",
                max: MAX_TERM_DAYS,
            });
            None
        }
        Some(days) => days.checked_mul(SECONDS_PER_DAY),
    };
    if let (Some(trial_seconds), Some(term_seconds)) = (entitlement.trial_seconds, term_seconds)
        && trial_seconds >= term_seconds
    {
        errors.push(ValidationError::TrialExceedsTerm {
            trial_seconds,
            term_seconds,
        });
    }

    if config.limits.shopping_list_free_cap == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "limits.shopping_list_free_cap",
        });
    }

    if config.tasks.hold_to_complete_ms == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "tasks.hold_to_complete_ms",
        });
    }

    errors
}

fn validate_codes(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let promo_codes: Vec<&str> = match &config.entitlement.promo_codes {
        Some(codes) => codes.iter().map(String::as_str).collect(),
        None => DEFAULT_PROMO_CODES.to_vec(),
    };
    let purchase_code = config
        .entitlement
        .purchase_code
        .as_deref()
        .unwrap_or(DEFAULT_PURCHASE_CODE);

    let categorized = promo_codes
        .iter()
        .map(|code| ("promo", *code))
        .chain(std::iter::once(("purchase", purchase_code)));

    // Duplicates across categories too: a code must name exactly one category
    let mut seen = HashSet::new();
    for (category, code) in categorized {
        if code.trim().is_empty() {
            errors.push(ValidationError::EmptyCode { category });
            continue;
        }
        if code.trim() != code {
            errors.push(ValidationError::UntrimmedCode {
                category,
                code: code.to_string(),
            });
        }
        if !seen.insert(code) {
            errors.push(ValidationError::DuplicateCode(code.to_string()));
        }
    }

    errors
}
