//! RGBA color type, hex notation, and predefined color constants.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Represents an RGBA color with floating-point components.
///
/// All components are in the range 0.0 (minimum) to 1.0 (maximum). On the wire
/// a color is written as `#RRGGBB`, or `#RRGGBBAA` when it is not fully opaque.
///
/// # Examples
///
/// ```
/// use dentmark::draw::Color;
/// let blue: Color = "#3B82F6".parse().unwrap();
/// assert_eq!(blue.to_hex(), "#3B82F6");
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red component (0.0 = no red, 1.0 = full red)
    pub r: f64,
    /// Green component (0.0 = no green, 1.0 = full green)
    pub g: f64,
    /// Blue component (0.0 = no blue, 1.0 = full blue)
    pub b: f64,
    /// Alpha/transparency (0.0 = fully transparent, 1.0 = fully opaque)
    pub a: f64,
}

/// Error returned when a color string is not valid hex notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}': expected #RGB, #RRGGBB, #RRGGBBAA or 'transparent'")]
pub struct ParseColorError(pub String);

impl Color {
    /// Creates a new color from RGBA components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba8(r, g, b, 255)
    }

    /// Creates a color from 8-bit channels including alpha.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }

    /// Returns the 8-bit channels `[r, g, b, a]`.
    pub fn to_rgba8(self) -> [u8; 4] {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [channel(self.r), channel(self.g), channel(self.b), channel(self.a)]
    }

    /// Formats the color as `#RRGGBB`, appending `AA` when alpha is below 1.0.
    pub fn to_hex(self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }

    /// Whether painting with this color has any visible effect.
    pub fn is_visible(self) -> bool {
        self.a > 0.0
    }

    /// Applies this color as the Cairo source.
    pub fn apply(self, ctx: &cairo::Context) {
        ctx.set_source_rgba(self.r, self.g, self.b, self.a);
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(TRANSPARENT);
        }

        let err = || ParseColorError(s.to_string());
        let digits = trimmed.strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        let nibble = |i: usize| {
            u8::from_str_radix(&digits[i..i + 1], 16)
                .map(|v| v * 17)
                .map_err(|_| err())
        };

        match digits.len() {
            3 => Ok(Color::from_rgb8(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Color::from_rgb8(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

/// Predefined red color (R=1.0, G=0.0, B=0.0)
pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);

/// Predefined green color (R=0.0, G=1.0, B=0.0)
pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);

/// Predefined blue color (R=0.0, G=0.0, B=1.0)
pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

/// Predefined yellow color (R=1.0, G=1.0, B=0.0)
pub const YELLOW: Color = Color::new(1.0, 1.0, 0.0, 1.0);

/// Predefined white color
pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);

/// Predefined black color
pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Fully transparent color, used as "no fill".
pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

/// Neutral canvas backdrop shown behind letterboxed or missing images.
pub const CANVAS_GRAY: Color = Color::new(248.0 / 255.0, 249.0 / 255.0, 250.0 / 255.0, 1.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let color: Color = "#3B82F6".parse().unwrap();
        assert_eq!(color.to_rgba8(), [0x3B, 0x82, 0xF6, 0xFF]);
        assert_eq!(color.to_hex(), "#3B82F6");
    }

    #[test]
    fn parses_short_and_alpha_hex() {
        let short: Color = "#f00".parse().unwrap();
        assert_eq!(short, RED);

        let translucent: Color = "#DC262640".parse().unwrap();
        assert_eq!(translucent.to_rgba8()[3], 0x40);
        assert_eq!(translucent.to_hex(), "#DC262640");
    }

    #[test]
    fn rejects_garbage() {
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn transparent_keyword_maps_to_zero_alpha() {
        let color: Color = "transparent".parse().unwrap();
        assert!(!color.is_visible());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&BLUE).unwrap();
        assert_eq!(json, "\"#0000FF\"");
        let back: Color = serde_json::from_str("\"#10B981\"").unwrap();
        assert_eq!(back.to_hex(), "#10B981");
    }
}
