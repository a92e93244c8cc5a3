//! Engine-wide settings.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! {
//!   "priceFloor": "zero",
//!   "rasterTimeoutMs": 2000,
//!   "rasterSize": 512,
//!   "textLimits": { "namePlateLine": 50, "namePlateLines": 3, "metalLetters": 20, "neonSign": 30 }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::pricing::{PriceCalculator, PriceFloor};

/// Maximum text length per category, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct TextLimits {
    /// Per line, for name plates.
    pub name_plate_line: usize,
    pub name_plate_lines: usize,
    pub metal_letters: usize,
    pub neon_sign: usize,
}

impl Default for TextLimits {
    fn default() -> Self {
        Self {
            name_plate_line: 50,
            name_plate_lines: 3,
            metal_letters: 20,
            neon_sign: 30,
        }
    }
}

impl TextLimits {
    /// Characters allowed on one line of `category`.
    pub fn line_length(&self, category: Category) -> usize {
        match category {
            Category::NamePlate => self.name_plate_line,
            Category::MetalLetters => self.metal_letters,
            Category::NeonSign => self.neon_sign,
        }
    }

    /// Number of editable lines; only name plates have more than one.
    pub fn line_count(&self, category: Category) -> usize {
        match category {
            Category::NamePlate => self.name_plate_lines.max(1),
            Category::MetalLetters | Category::NeonSign => 1,
        }
    }
}

/// Settings shared by every session created from one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub price_floor: PriceFloor,
    /// Budget for producing a bitmap of the preview, in milliseconds.
    pub raster_timeout_ms: u64,
    /// Longest edge of the bitmap, in pixels.
    pub raster_size: u32,
    pub text_limits: TextLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            price_floor: PriceFloor::default(),
            raster_timeout_ms: 2000,
            raster_size: 512,
            text_limits: TextLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price_floor(mut self, floor: PriceFloor) -> Self {
        self.price_floor = floor;
        self
    }

    pub fn with_raster_timeout(mut self, timeout: Duration) -> Self {
        self.raster_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn raster_timeout(&self) -> Duration {
        Duration::from_millis(self.raster_timeout_ms)
    }

    pub fn calculator(&self) -> PriceCalculator {
        PriceCalculator::new(self.price_floor)
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.price_floor, PriceFloor::Zero);
        assert_eq!(config.raster_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn partial_limits_keep_other_defaults() {
        let json = r#"{ "priceFloor": "unbounded", "textLimits": { "neonSign": 12 } }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.price_floor, PriceFloor::Unbounded);
        assert_eq!(config.text_limits.line_length(Category::NeonSign), 12);
        assert_eq!(config.text_limits.line_length(Category::NamePlate), 50);
        assert_eq!(config.text_limits.line_count(Category::NamePlate), 3);
        assert_eq!(config.text_limits.line_count(Category::MetalLetters), 1);
    }

    #[test]
    fn json_uses_camel_case() {
        let json = EngineConfig::new()
            .with_raster_timeout(Duration::from_millis(250))
            .to_json()
            .unwrap();
        assert!(json.contains("\"rasterTimeoutMs\":250"));
        assert!(json.contains("\"priceFloor\":\"zero\""));
        assert!(json.contains("\"namePlateLine\":50"));
    }
}
