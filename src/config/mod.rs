//! Configuration file support for dentmark.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/dentmark/config.toml`. Settings include the canvas display
//! bounds, the tool stroke width, and where submissions are stored.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

pub use enums::ColorSpec;
pub use types::{CanvasConfig, StorageConfig, ToolsConfig};

use crate::input::{CanvasSettings, ToolRegistry};
use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [canvas]
/// max_width = 1200
/// max_height = 800
/// background_color = "#F8F9FA"
///
/// [tools]
/// stroke_width = 2.0
///
/// [storage]
/// base_dir = "/srv/dentmark/submissions"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Canvas display bounds and backdrop
    #[serde(default)]
    pub canvas: CanvasConfig,

    /// Drawing tool defaults
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Local submission storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - `canvas.max_width` / `canvas.max_height`: 100 - 8192
    /// - `tools.stroke_width`: 1.0 - 20.0
    pub fn validate_and_clamp(&mut self) {
        // Display bounds: 100 - 8192
        if !(100..=8192).contains(&self.canvas.max_width) {
            log::warn!(
                "Invalid canvas max_width {}, clamping to 100-8192 range",
                self.canvas.max_width
            );
            self.canvas.max_width = self.canvas.max_width.clamp(100, 8192);
        }

        if !(100..=8192).contains(&self.canvas.max_height) {
            log::warn!(
                "Invalid canvas max_height {}, clamping to 100-8192 range",
                self.canvas.max_height
            );
            self.canvas.max_height = self.canvas.max_height.clamp(100, 8192);
        }

        // Stroke width: 1.0 - 20.0
        if !self.tools.stroke_width.is_finite() {
            log::warn!(
                "Invalid stroke_width {}, falling back to {:.1}",
                self.tools.stroke_width,
                crate::input::tool::DEFAULT_STROKE_WIDTH
            );
            self.tools.stroke_width = crate::input::tool::DEFAULT_STROKE_WIDTH;
        } else if !(1.0..=20.0).contains(&self.tools.stroke_width) {
            log::warn!(
                "Invalid stroke_width {:.1}, clamping to 1.0-20.0 range",
                self.tools.stroke_width
            );
            self.tools.stroke_width = self.tools.stroke_width.clamp(1.0, 20.0);
        }
    }

    /// Canvas settings derived from this configuration.
    pub fn canvas_settings(&self) -> CanvasSettings {
        CanvasSettings {
            max_width: self.canvas.max_width,
            max_height: self.canvas.max_height,
            backdrop: self.canvas.background_color.to_color(),
        }
    }

    /// Tool registry using the configured stroke width.
    pub fn tool_registry(&self) -> ToolRegistry {
        ToolRegistry::with_stroke_width(self.tools.stroke_width)
    }

    /// JSON schema describing the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/dentmark/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("dentmark");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// All loaded values are validated and clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the current configuration to `config_path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::CANVAS_GRAY;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.canvas.max_width, 1200);
        assert_eq!(config.canvas.max_height, 800);
        assert_eq!(config.canvas.background_color.to_color(), CANVAS_GRAY);
        assert_eq!(config.tools.stroke_width, 2.0);
        assert!(config.storage.base_dir.is_none());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("[tools]\nstroke_width = 4.0\n").unwrap();
        assert_eq!(config.tools.stroke_width, 4.0);
        assert_eq!(config.canvas.max_width, 1200);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut config: Config = toml::from_str(
            "[canvas]\nmax_width = 20\nmax_height = 100000\n[tools]\nstroke_width = 50.0\n",
        )
        .unwrap();
        config.validate_and_clamp();
        assert_eq!(config.canvas.max_width, 100);
        assert_eq!(config.canvas.max_height, 8192);
        assert_eq!(config.tools.stroke_width, 20.0);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.canvas.max_width = 640;
        config.storage.base_dir = Some(dir.path().join("store"));
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[canvas\nmax_width = ").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn schema_mentions_every_section() {
        let schema = serde_json::to_value(Config::json_schema()).unwrap();
        let properties = &schema["properties"];
        assert!(properties.get("canvas").is_some());
        assert!(properties.get("tools").is_some());
        assert!(properties.get("storage").is_some());
    }
}
