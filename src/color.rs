//! Hex colors and the brightness adjustment used to build gradients.

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// HexColor
// ============================================================================

/// An opaque sRGB color that renders as `#rrggbb`.
///
/// Catalog records carry colors as free strings; they are parsed into
/// `HexColor` once, at the catalog boundary, so everything downstream works
/// with a value that is known to be well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(Srgb<u8>);

impl HexColor {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Srgb::new(r, g, b))
    }

    pub fn red(&self) -> u8 {
        self.0.red
    }

    pub fn green(&self) -> u8 {
        self.0.green
    }

    pub fn blue(&self) -> u8 {
        self.0.blue
    }

    /// Parses a color, falling back to `fallback` when the input is not hex.
    pub fn parse_or(input: &str, fallback: HexColor) -> HexColor {
        input.parse().unwrap_or_else(|_| {
            tracing::warn!(color = input, fallback = %fallback, "unparseable color, using fallback");
            fallback
        })
    }

    /// Returns this color with every channel shifted by `percent` of full scale.
    pub fn adjust_brightness(self, percent: i32) -> HexColor {
        adjust_brightness(self, percent)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            self.0.red, self.0.green, self.0.blue
        )
    }
}

impl FromStr for HexColor {
    type Err = Error;

    /// Accepts `#rrggbb`, `rrggbb`, `#rgb` and `rgb`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Srgb::<u8>::from_str(trimmed)
            .map(HexColor)
            .map_err(|_| Error::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for HexColor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

// ============================================================================
// Brightness
// ============================================================================

/// Shifts each channel by `round(2.55 * percent)`, saturating at 0 and 255.
///
/// Channels are adjusted independently, so hue is not preserved for large
/// shifts; this matches the gradient look the previews are tuned for.
pub fn adjust_brightness(color: HexColor, percent: i32) -> HexColor {
    let amount = js_round(2.55 * percent as f64) as i32;
    let shift = |channel: u8| (channel as i32 + amount).clamp(0, 255) as u8;
    HexColor::rgb(shift(color.red()), shift(color.green()), shift(color.blue()))
}

/// Rounds half-way cases toward positive infinity.
pub(crate) fn js_round(value: f64) -> f64 {
    (value + 0.5).floor()
}

// ============================================================================
// Tests
// ============================================================================
