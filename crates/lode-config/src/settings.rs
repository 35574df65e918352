//! The settings store.
//!
//! Values are kept RON-encoded per key, so any serde-serialisable type can
//! round-trip through the store: floats, flag strings, noise parameter
//! blocks. A present-but-unparsable value logs a warning and reads as
//! absent; callers treat both the same way (taking their default or
//! reporting the whole parameter block as unconfigured).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::SettingsError;

/// String-keyed settings with RON-encoded values. Keys are kept sorted so
/// saved files diff cleanly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value under `key`, replacing any previous value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match ron::to_string(value) {
            Ok(encoded) => {
                self.values.insert(key.to_string(), encoded);
            }
            Err(err) => warn!(key, %err, "failed to encode setting"),
        }
    }

    /// Reads a typed value. `None` when the key is absent or its stored
    /// value does not parse as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.values.get(key)?;
        match ron::from_str(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "malformed setting value");
                None
            }
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        self.get(key)
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, &value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Loads a settings file written by [`Settings::save`].
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(SettingsError::Read)?;
        let values = ron::from_str(&text).map_err(SettingsError::Parse)?;
        Ok(Self { values })
    }

    /// Saves the store as pretty-printed RON.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = ron::ser::to_string_pretty(&self.values, ron::ser::PrettyConfig::default())
            .map_err(SettingsError::Serialize)?;
        fs::write(path, text).map_err(SettingsError::Write)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_round_trip() {
        let mut settings = Settings::new();
        settings.set_float("water_level", 1.0);
        assert_eq!(settings.get_float("water_level"), Some(1.0));
    }

    #[test]
    fn test_missing_key_reads_none() {
        let settings = Settings::new();
        assert_eq!(settings.get_float("absent"), None);
    }

    #[test]
    fn test_typed_value_round_trip() {
        let mut settings = Settings::new();
        settings.set("spawn", &(3_i32, -7_i32));
        assert_eq!(settings.get::<(i32, i32)>("spawn"), Some((3, -7)));
    }

    #[test]
    fn test_malformed_value_reads_none() {
        let mut settings = Settings::new();
        settings.set("flags", &"trees,caves".to_string());
        assert_eq!(
            settings.get::<f32>("flags"),
            None,
            "a string must not read back as a float"
        );
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.conf");

        let mut settings = Settings::new();
        settings.set_float("mg_water_level", -2.5);
        settings.set("mg_flags", &"trees,caves".to_string());
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let result = Settings::load(Path::new("/nonexistent/lode.conf"));
        assert!(matches!(result, Err(SettingsError::Read(_))));
    }
}
