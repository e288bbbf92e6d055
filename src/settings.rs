//! Runtime tunables and preferences
//!
//! Persisted as JSON next to the arena, separate from the engine config.
//! Sensitivity is the only value the running session reads; obstacle and NPC
//! counts are carried for the external arena generator.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_SENSITIVITY, SENSITIVITY_MAX, SENSITIVITY_MIN};

/// Errors raised while saving or strictly loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persisted tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sensor-fusion sensitivity, kept in [20, 150]
    pub sensitivity: f32,
    pub obstacle_count: u32,
    pub npc_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            obstacle_count: 6,
            npc_count: 5,
        }
    }
}

impl Settings {
    /// Sensitivity change per key press
    pub const SENSITIVITY_STEP: f32 = 5.0;

    /// Nudge sensitivity by `delta`, clamped to the allowed range
    pub fn adjust_sensitivity(&mut self, delta: f32) -> f32 {
        self.sensitivity = clamp_sensitivity(self.sensitivity + delta);
        self.sensitivity
    }

    /// Read and parse a settings file
    pub fn try_load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: Settings = serde_json::from_str(&json)?;
        settings.sensitivity = clamp_sensitivity(settings.sensitivity);
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring settings: {e}");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

fn clamp_sensitivity(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
    } else {
        DEFAULT_SENSITIVITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("arena-duel-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.sensitivity, 60.0);
        assert_eq!(s.obstacle_count, 6);
        assert_eq!(s.npc_count, 5);
    }

    #[test]
    fn test_adjust_sensitivity_clamps() {
        let mut s = Settings::default();
        assert_eq!(s.adjust_sensitivity(Settings::SENSITIVITY_STEP), 65.0);
        assert_eq!(s.adjust_sensitivity(500.0), 150.0);
        assert_eq!(s.adjust_sensitivity(-1000.0), 20.0);
        assert_eq!(s.adjust_sensitivity(f32::NAN), 60.0);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip");
        let s = Settings {
            sensitivity: 85.0,
            obstacle_count: 9,
            npc_count: 2,
        };
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path), s);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_or_missing_falls_back() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
        assert!(matches!(Settings::try_load(&path), Err(SettingsError::Json(_))));
        let _ = fs::remove_file(&path);

        assert_eq!(Settings::load(&temp_path("missing")), Settings::default());
    }

    #[test]
    fn test_out_of_range_file_is_clamped() {
        let path = temp_path("range");
        fs::write(&path, r#"{"sensitivity": 400}"#).unwrap();
        let s = Settings::load(&path);
        assert_eq!(s.sensitivity, 150.0);
        assert_eq!(s.npc_count, 5);
        let _ = fs::remove_file(&path);
    }
}
