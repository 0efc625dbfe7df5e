//! Default paths for dokan components
//!
//! Paths are user-writable (no root required):
//! - Config: `$XDG_CONFIG_HOME/dokan/config.toml` or `~/.config/dokan/config.toml`
//! - Data: `$XDG_DATA_HOME/dokan` or `~/.local/share/dokan`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const DOKAN_CONFIG_ENV: &str = "DOKAN_CONFIG";

/// Application subdirectory name
const APP_DIR: &str = "dokan";

/// Store filename within the data directory
pub const STORE_FILENAME: &str = "dokan.db";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$DOKAN_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/dokan/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/dokan/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(DOKAN_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/tmp").join(APP_DIR).join("config.toml")
}

/// Get the data directory without checking DOKAN_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_dir_contains_app_dir() {
        let path = data_dir_without_env();
        assert!(path.to_string_lossy().contains("dokan"));
    }

    #[test]
    fn config_path_is_toml() {
        let path = default_config_path();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
    }
}
