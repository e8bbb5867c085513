//! Narrow get/set interface to the instance settings store.
//!
//! Persistence of these values belongs to the caller; the instance only reads
//! and writes keys through [`SettingsStore`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Setting keys understood by this crate
pub mod keys {
    pub const INTENDED_VERSION: &str = "IntendedVersion";
    pub const SHOULD_UPDATE: &str = "ShouldUpdate";
    pub const LAUNCH_MAXIMIZED: &str = "LaunchMaximized";
    pub const WINDOW_WIDTH: &str = "MinecraftWinWidth";
    pub const WINDOW_HEIGHT: &str = "MinecraftWinHeight";
    pub const ASSET_CONCURRENCY: &str = "AssetCopyConcurrency";
}

/// A single stored setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Int(i) => Some(*i != 0),
            SettingValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" | "" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            SettingValue::Int(i) => u32::try_from(*i).ok(),
            SettingValue::String(s) => s.trim().parse().ok(),
            SettingValue::Bool(_) => None,
        }
    }

    /// String form of the value; booleans and integers are rendered.
    pub fn to_string_value(&self) -> String {
        match self {
            SettingValue::Bool(b) => b.to_string(),
            SettingValue::Int(i) => i.to_string(),
            SettingValue::String(s) => s.clone(),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

/// Key/value settings owned by an external store
pub trait SettingsStore: Send + Sync {
    /// Current value for `key`, or None when never set
    fn get(&self, key: &str) -> Option<SettingValue>;

    /// Store `value` under `key`
    fn set(&mut self, key: &str, value: SettingValue);
}

/// In-memory settings store.
/// Useful for embedding callers that persist settings themselves, and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySettings {
    values: HashMap<String, SettingValue>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed settings from a flat JSON object, e.g. `{"LaunchMaximized": true}`
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse settings JSON")
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: SettingValue) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_coercions() {
        assert_eq!(SettingValue::Bool(true).as_bool(), Some(true));
        assert_eq!(SettingValue::Int(0).as_bool(), Some(false));
        assert_eq!(SettingValue::from("TRUE").as_bool(), Some(true));
        assert_eq!(SettingValue::from("maybe").as_bool(), None);
    }

    #[test]
    fn u32_coercions() {
        assert_eq!(SettingValue::Int(854).as_u32(), Some(854));
        assert_eq!(SettingValue::Int(-1).as_u32(), None);
        assert_eq!(SettingValue::from(" 480 ").as_u32(), Some(480));
        assert_eq!(SettingValue::Bool(true).as_u32(), None);
    }

    #[test]
    fn memory_settings_from_json() {
        let settings = MemorySettings::from_json(
            r#"{"IntendedVersion": "1.6.4", "ShouldUpdate": false, "MinecraftWinWidth": 1024}"#,
        )
        .unwrap();

        assert_eq!(
            settings.get(keys::INTENDED_VERSION),
            Some(SettingValue::String("1.6.4".to_string()))
        );
        assert_eq!(settings.get(keys::SHOULD_UPDATE), Some(SettingValue::Bool(false)));
        assert_eq!(settings.get(keys::WINDOW_WIDTH), Some(SettingValue::Int(1024)));
        assert!(settings.get(keys::WINDOW_HEIGHT).is_none());
    }

    #[test]
    fn memory_settings_rejects_non_object() {
        assert!(MemorySettings::from_json("[1, 2]").is_err());
    }
}
