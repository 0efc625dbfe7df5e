//! Configuration parsing and validation for dokan
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Premium code allow-lists and term lengths
//! - Free-tier limits and task gesture timing
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the default settings
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        info!(config_path = %path.display(), "No config file, using defaults");
        return Ok(Settings::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    // Check version
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    // Validate
    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}
