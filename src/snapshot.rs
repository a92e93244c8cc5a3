//! Immutable records handed to the cart collaborator.
//!
//! A [`CustomizationSnapshot`] is the price of record for one design. It is
//! built by the session at add-to-cart time and exposes no way to change it
//! afterwards; later edits in the session produce new snapshots.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "category": "MetalLetters",
//!   "productId": "ml-001",
//!   "text": ["ACME"],
//!   "selectedOptions": [
//!     { "id": "ml-material-brass", "type": "material", "name": "Brass", "value": "brass" }
//!   ],
//!   "previewSvg": "<svg ...>...</svg>",
//!   "previewWidth": 540.0,
//!   "previewHeight": 180.0,
//!   "price": 2199,
//!   "quantity": 1,
//!   "instructions": ""
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{Category, CustomizationOption, OptionType};
use crate::error::Result;
use crate::render::RenderedPreview;

// ============================================================================
// OptionRef
// ============================================================================

/// A selected option, stored by reference rather than as the full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct OptionRef {
    pub id: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub name: String,
    pub value: String,
}

impl From<&CustomizationOption> for OptionRef {
    fn from(option: &CustomizationOption) -> Self {
        Self {
            id: option.id.clone(),
            option_type: option.option_type,
            name: option.name.clone(),
            value: option.value.clone(),
        }
    }
}

// ============================================================================
// CustomizationSnapshot
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CustomizationSnapshot {
    category: Category,
    #[serde(default)]
    product_id: String,
    text: Vec<String>,
    selected_options: Vec<OptionRef>,
    preview_svg: String,
    preview_width: f64,
    preview_height: f64,
    price: i64,
    quantity: u32,
    #[serde(default)]
    instructions: String,
    #[serde(skip)]
    preview_png: Option<Vec<u8>>,
}

/// Everything a snapshot captures, gathered by the session.
pub(crate) struct SnapshotParts<'a> {
    pub category: Category,
    pub product_id: &'a str,
    pub text: &'a [String],
    pub selected: Vec<OptionRef>,
    pub preview: &'a RenderedPreview,
    pub price: i64,
    pub quantity: u32,
    pub instructions: &'a str,
}

impl CustomizationSnapshot {
    pub(crate) fn capture(parts: SnapshotParts<'_>) -> Self {
        Self {
            category: parts.category,
            product_id: parts.product_id.to_string(),
            text: parts.text.to_vec(),
            selected_options: parts.selected,
            preview_svg: parts.preview.markup.clone(),
            preview_width: parts.preview.width,
            preview_height: parts.preview.height,
            price: parts.price,
            quantity: parts.quantity,
            instructions: parts.instructions.to_string(),
            preview_png: None,
        }
    }

    pub(crate) fn with_preview_png(mut self, png: Vec<u8>) -> Self {
        self.preview_png = Some(png);
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Text lines as entered, after normalization.
    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub fn selected_options(&self) -> &[OptionRef] {
        &self.selected_options
    }

    pub fn selected(&self, option_type: OptionType) -> Option<&OptionRef> {
        self.selected_options
            .iter()
            .find(|o| o.option_type == option_type)
    }

    pub fn preview_svg(&self) -> &str {
        &self.preview_svg
    }

    pub fn preview_size(&self) -> (f64, f64) {
        (self.preview_width, self.preview_height)
    }

    /// PNG thumbnail, when rasterization finished in time.
    pub fn preview_png(&self) -> Option<&[u8]> {
        self.preview_png.as_deref()
    }

    /// Unit price of record.
    pub fn price(&self) -> i64 {
        self.price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Serializes the snapshot to a JSON string. The PNG thumbnail is not included.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Cart
// ============================================================================

/// One cart entry: a snapshot and how many units of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub snapshot: CustomizationSnapshot,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(snapshot: CustomizationSnapshot) -> Self {
        let quantity = snapshot.quantity().max(1);
        Self { snapshot, quantity }
    }

    pub fn line_total(&self) -> i64 {
        self.snapshot.price() * i64::from(self.quantity)
    }
}

/// The cart collaborator.
pub trait CartSink {
    /// Accepts a line. Errors should be [`Error::Submission`](crate::Error::Submission).
    fn submit(&mut self, line: CartLine) -> Result<()>;
}

/// An in-memory cart.
impl CartSink for Vec<CartLine> {
    fn submit(&mut self, line: CartLine) -> Result<()> {
        self.push(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::IdSuffix;
    use crate::render::{NamePlateParams, PreviewRenderer};

    fn sample() -> CustomizationSnapshot {
        let preview = NamePlateParams::default().render_with(&IdSuffix::fixed("snap"));
        let size = CustomizationOption::new(OptionType::Size, "Medium (12x6 inches)", "12x6")
            .with_id("np-size-12x6");
        CustomizationSnapshot::capture(SnapshotParts {
            category: Category::NamePlate,
            product_id: "np-001",
            text: &["Your Name".to_string()],
            selected: vec![OptionRef::from(&size)],
            preview: &preview,
            price: 1199,
            quantity: 3,
            instructions: "Deliver after 5pm",
        })
    }

    #[test]
    fn json_roundtrip_drops_png() {
        let snapshot = sample().with_preview_png(vec![1, 2, 3]);
        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"previewSvg\""));
        assert!(json.contains("\"selectedOptions\":[{\"id\":\"np-size-12x6\",\"type\":\"size\""));
        assert!(!json.contains("previewPng"));

        let restored = CustomizationSnapshot::from_json(&json).unwrap();
        assert_eq!(restored.price(), 1199);
        assert_eq!(restored.preview_svg(), snapshot.preview_svg());
        assert_eq!(restored.selected(OptionType::Size).unwrap().value, "12x6");
        assert!(restored.preview_png().is_none());
    }

    #[test]
    fn line_total_multiplies_quantity() {
        let line = CartLine::new(sample());
        assert_eq!(line.quantity, 3);
        assert_eq!(line.line_total(), 3597);
    }

    #[test]
    fn vec_cart_accepts_lines() {
        let mut cart: Vec<CartLine> = Vec::new();
        cart.submit(CartLine::new(sample())).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart[0].snapshot.instructions(), "Deliver after 5pm");
    }
}
