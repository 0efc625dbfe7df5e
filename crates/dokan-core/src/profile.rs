//! Shop profile and user preferences

use dokan_api::{keys, ChangeEvent, Language, Preferences, ShopProfile, ThemeColor, ThemeMode};
use dokan_store::Storage;
use dokan_util::Result;
use std::str::FromStr;
use tracing::{info, warn};

use crate::collection::required_text;
use crate::ChangeBus;

/// The registered shop. Absent until first-run registration.
#[derive(Clone)]
pub struct ProfileStore {
    storage: Storage,
    bus: ChangeBus,
}

impl ProfileStore {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self { storage, bus }
    }

    pub fn load(&self) -> Option<ShopProfile> {
        self.storage.read_json(keys::SHOP_PROFILE)
    }

    /// True until a profile has been saved
    pub fn needs_registration(&self) -> bool {
        self.load().is_none()
    }

    pub fn save(&self, profile: ShopProfile) -> Result<ShopProfile> {
        let profile = ShopProfile {
            shop_name: required_text(&profile.shop_name, "Shop name")?,
            ..profile
        };
        let _ = self.storage.write_json(keys::SHOP_PROFILE, &profile);
        info!(shop = %profile.shop_name, "Shop profile saved");
        self.bus.publish(ChangeEvent::ProfileChanged);
        Ok(profile)
    }

    pub fn clear(&self) {
        let _ = self.storage.remove(keys::SHOP_PROFILE);
        info!("Shop profile cleared");
        self.bus.publish(ChangeEvent::ProfileChanged);
    }
}

/// Typed preferences with defaults for anything unset or unreadable
#[derive(Clone)]
pub struct PreferencesStore {
    storage: Storage,
    bus: ChangeBus,
}

impl PreferencesStore {
    pub fn new(storage: Storage, bus: ChangeBus) -> Self {
        Self { storage, bus }
    }

    pub fn load(&self) -> Preferences {
        let defaults = Preferences::default();
        Preferences {
            language: self.parsed(keys::LANGUAGE).unwrap_or(defaults.language),
            theme_mode: self.parsed(keys::THEME_MODE).unwrap_or(defaults.theme_mode),
            theme_color: self.parsed(keys::THEME_COLOR).unwrap_or(defaults.theme_color),
            sound_enabled: self
                .parsed(keys::SOUND_ENABLED)
                .unwrap_or(defaults.sound_enabled),
            custom_sound: self.storage.get_string(keys::CUSTOM_SOUND),
        }
    }

    pub fn set_language(&self, language: Language) {
        self.write(keys::LANGUAGE, language.as_str());
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) {
        self.write(keys::THEME_MODE, mode.as_str());
    }

    pub fn set_theme_color(&self, color: ThemeColor) {
        self.write(keys::THEME_COLOR, color.as_str());
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.write(keys::SOUND_ENABLED, if enabled { "true" } else { "false" });
    }

    /// Set or clear the custom notification sound
    pub fn set_custom_sound(&self, sound: Option<&str>) {
        match sound {
            Some(data_url) => self.write(keys::CUSTOM_SOUND, data_url),
            None => {
                let _ = self.storage.remove(keys::CUSTOM_SOUND);
                self.bus.publish(ChangeEvent::PreferencesChanged);
            }
        }
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.storage.get_string(key)?;
        match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Unreadable preference, using default");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        let _ = self.storage.set_string(key, value);
        self.bus.publish(ChangeEvent::PreferencesChanged);
    }
}
