//! Configuration enum types.

use crate::draw::{Color, color::*};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Color specification - a name, a hex string, or RGB values.
///
/// # Examples
/// ```toml
/// # Named color
/// background_color = "white"
///
/// # Hex color
/// background_color = "#F8F9FA"
///
/// # Custom RGB color (0-255 per component)
/// background_color = [248, 249, 250]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Named color (gray, white, black, red, green, blue, yellow) or `#RRGGBB`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Converts the color specification to a [`Color`] struct.
    ///
    /// Unknown names and malformed hex strings fall back to the canvas gray
    /// with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => name_to_color(name)
                .or_else(|| name.parse().ok())
                .unwrap_or_else(|| {
                    warn!("Unknown color '{}', using canvas gray", name);
                    CANVAS_GRAY
                }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}

fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "gray" | "grey" => Some(CANVAS_GRAY),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_hex_and_rgb_resolve() {
        assert_eq!(ColorSpec::Name("White".into()).to_color(), WHITE);
        assert_eq!(
            ColorSpec::Name("#3B82F6".into()).to_color(),
            Color::from_rgb8(0x3B, 0x82, 0xF6)
        );
        assert_eq!(ColorSpec::Rgb([0, 0, 0]).to_color(), BLACK);
    }

    #[test]
    fn unknown_name_falls_back_to_gray() {
        assert_eq!(ColorSpec::Name("mauve".into()).to_color(), CANVAS_GRAY);
    }
}
