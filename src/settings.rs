//! Persisted appearance settings.
//!
//! One TOML file at `~/.glassterm.toml` with a single `[Appearance]`
//! section. The file is created with defaults when absent; individual
//! missing keys fall back to their defaults instead of failing the load.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// User-adjustable appearance of the terminal window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub font_family: String,
    pub font_size: u32,
    /// `#RRGGBB`
    pub font_color: String,
    /// Background opacity in percent, 0-100.
    pub opacity: u8,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            font_family: "Monospace".to_string(),
            font_size: 12,
            font_color: "#FFFFFF".to_string(),
            opacity: 85,
        }
    }
}

/// The whole settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "Appearance")]
    pub appearance: Appearance,
}

impl Settings {
    /// Settings file path: `~/.glassterm.toml`.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".glassterm.toml")
    }

    /// Loads settings from `path`, creating the file with defaults first if
    /// it does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(path)?;
            info!("created settings file {}", path.display());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let mut settings: Self = toml::from_str(&contents).unwrap_or_else(|e| {
            warn!("settings file {} is malformed ({e}), using defaults", path.display());
            Self::default()
        });
        settings.appearance.opacity = settings.appearance.opacity.min(100);
        Ok(settings)
    }

    /// Writes the settings to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_environment_creates_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        assert!(!path.exists());

        let settings = Settings::load_or_create(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.appearance.font_family, "Monospace");
        assert_eq!(settings.appearance.font_size, 12);
        assert_eq!(settings.appearance.font_color, "#FFFFFF");
        assert_eq!(settings.appearance.opacity, 85);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let settings = Settings {
            appearance: Appearance {
                font_family: "Mono".to_string(),
                font_size: 14,
                font_color: "#00FF00".to_string(),
                opacity: 50,
            },
        };
        settings.save(&path).unwrap();

        let reloaded = Settings::load_or_create(&path).unwrap();
        assert_eq!(reloaded, settings);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[Appearance]\nfont_size = 16\n").unwrap();

        let settings = Settings::load_or_create(&path).unwrap();

        assert_eq!(settings.appearance.font_size, 16);
        assert_eq!(settings.appearance.font_family, "Monospace");
        assert_eq!(settings.appearance.font_color, "#FFFFFF");
        assert_eq!(settings.appearance.opacity, 85);
    }

    #[test]
    fn test_out_of_range_opacity_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[Appearance]\nopacity = 250\n").unwrap();

        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings.appearance.opacity, 100);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "not toml at all [[[").unwrap();

        let settings = Settings::load_or_create(&path).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
