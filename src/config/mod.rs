//! Configuration management for the touch overlay
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//! Preferences given in the file are pushed into the preference store on
//! load and on every reload, overriding whatever the user last set.

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::fs;

use crate::geometry::ScreenMetrics;
use crate::input::ButtonType;
use crate::layout::{keys, PrefValue, PreferenceStore};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Controller index reported to the core
    #[serde(default)]
    pub device_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferencesConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
}

/// Emulated screen size in pixels
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_width")]
    pub width: f32,
    #[serde(default = "default_screen_height")]
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: default_screen_width(),
            height: default_screen_height(),
        }
    }
}

impl ScreenConfig {
    pub fn metrics(&self) -> ScreenMetrics {
        ScreenMetrics::new(self.width, self.height)
    }
}

/// Overlay preferences; anything left out keeps its stored value
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreferencesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub touch_enabled: Option<bool>,
    /// 0..=100; 50 is the default size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_scale: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpad_slide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dpad_two_directions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joystick_relative_center: Option<bool>,
    /// Per-control visibility keyed by anchor code (`dpad_up` for the dpad,
    /// `stick_l`/`stick_r` for the sticks)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub toggles: BTreeMap<ButtonType, bool>,
}

/// Preference database settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// sled database directory; defaults to the state directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Background flush interval for buffered writes
    #[serde(default = "default_flush_every_ms")]
    pub flush_every_ms: u64,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            anyhow::bail!(
                "Screen size must be positive (got {}x{})",
                self.screen.width,
                self.screen.height
            );
        }

        if self.device_id < 0 {
            anyhow::bail!("device_id cannot be negative (got {})", self.device_id);
        }

        if let Some(prefs) = &self.preferences {
            if let Some(scale) = prefs.control_scale {
                if !(0..=100).contains(&scale) {
                    anyhow::bail!("control_scale {} is invalid (must be 0-100)", scale);
                }
            }

            for button in prefs.toggles.keys() {
                if keys::toggle_index(*button).is_none() {
                    anyhow::bail!(
                        "'{}' cannot be toggled (use dpad_up for the dpad, stick_l/stick_r for sticks)",
                        button
                    );
                }
            }
        }

        if let Some(storage) = &self.storage {
            if storage.flush_every_ms == 0 {
                anyhow::bail!("storage.flush_every_ms must be greater than 0");
            }
        }

        Ok(())
    }

    /// Write configured preferences into `store` and commit
    ///
    /// Returns how many values were written.
    pub fn apply_preferences(&self, store: &dyn PreferenceStore) -> Result<usize> {
        let Some(prefs) = &self.preferences else {
            return Ok(0);
        };

        let mut values: Vec<(String, PrefValue)> = [
            (keys::SHOW_OVERLAY, prefs.show),
            (keys::TOUCH_ENABLED, prefs.touch_enabled),
            (keys::DPAD_SLIDE, prefs.dpad_slide),
            (keys::DPAD_TWO_DIRECTIONS, prefs.dpad_two_directions),
            (keys::JOYSTICK_REL_CENTER, prefs.joystick_relative_center),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), PrefValue::Bool(v))))
        .collect();

        if let Some(scale) = prefs.control_scale {
            values.push((keys::CONTROL_SCALE.to_string(), PrefValue::Int(scale)));
        }

        for (button, enabled) in &prefs.toggles {
            if let Some(index) = keys::toggle_index(*button) {
                values.push((keys::toggle_key(index), PrefValue::Bool(*enabled)));
            }
        }

        for (key, value) in &values {
            store
                .put(key, *value)
                .with_context(|| format!("Failed to store preference {}", key))?;
        }
        store.commit().context("Failed to commit preferences")?;

        Ok(values.len())
    }

    pub fn flush_every_ms(&self) -> u64 {
        self.storage
            .as_ref()
            .map(|s| s.flush_every_ms)
            .unwrap_or_else(default_flush_every_ms)
    }
}

fn default_screen_width() -> f32 { 1920.0 }
fn default_screen_height() -> f32 { 1080.0 }
fn default_flush_every_ms() -> u64 { 500 }
