//! Configuration type definitions.

use super::enums::ColorSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canvas display settings.
///
/// Photos larger than the display area are scaled down to fit, preserving
/// their aspect ratio. Smaller photos are shown at their original size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanvasConfig {
    /// Maximum display width in pixels (valid range: 100 - 8192)
    #[serde(default = "default_max_width")]
    pub max_width: u32,

    /// Maximum display height in pixels (valid range: 100 - 8192)
    #[serde(default = "default_max_height")]
    pub max_height: u32,

    /// Color painted behind the photo - a name, `#RRGGBB`, or an RGB array
    #[serde(default = "default_background_color")]
    pub background_color: ColorSpec,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            background_color: default_background_color(),
        }
    }
}

/// Drawing tool settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolsConfig {
    /// Stroke width shared by all drawing tools in pixels (valid range: 1.0 - 20.0)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            stroke_width: default_stroke_width(),
        }
    }
}

/// Where the local submission store keeps its files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct StorageConfig {
    /// Base directory for saved submissions. Defaults to the platform data
    /// directory (e.g. `~/.local/share/dentmark/submissions`).
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolves the configured directory, falling back to the platform default.
    pub fn resolved_base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(default_base_dir)
    }
}

fn default_max_width() -> u32 {
    1200
}

fn default_max_height() -> u32 {
    800
}

fn default_background_color() -> ColorSpec {
    ColorSpec::Name("#F8F9FA".to_string())
}

fn default_stroke_width() -> f64 {
    crate::input::tool::DEFAULT_STROKE_WIDTH
}

fn default_base_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dentmark")
        .join("submissions")
}
