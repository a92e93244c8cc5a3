//! Catalog records consumed from the admin/catalog collaborator.
//!
//! The engine only reads these. [`CatalogSource`] is the seam: a database
//! backed implementation lives outside this crate, while [`BuiltinCatalog`]
//! ships the stock options every category starts with.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::render::neon_sign::NEON_PALETTE;

// ============================================================================
// Category
// ============================================================================

/// The product families the editor knows how to preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum Category {
    #[serde(rename = "NamePlates")]
    NamePlate,
    #[serde(rename = "MetalLetters")]
    MetalLetters,
    #[serde(rename = "NeonSigns", alias = "NeonLightsSign")]
    NeonSign,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::NamePlate, Category::MetalLetters, Category::NeonSign];

    /// Parses a category tag, returning `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Category> {
        match tag.trim() {
            "NamePlates" => Some(Category::NamePlate),
            "MetalLetters" => Some(Category::MetalLetters),
            "NeonSigns" | "NeonLightsSign" => Some(Category::NeonSign),
            _ => None,
        }
    }

    /// Parses a category tag, degrading unknown tags to [`Category::NamePlate`].
    pub fn from_tag(tag: &str) -> Category {
        Self::parse(tag).unwrap_or_else(|| {
            tracing::warn!(tag, "unknown category, falling back to name plate");
            Category::NamePlate
        })
    }

    /// The canonical tag used by the catalog and cart.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::NamePlate => "NamePlates",
            Category::MetalLetters => "MetalLetters",
            Category::NeonSign => "NeonSigns",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ============================================================================
// Option records
// ============================================================================

/// The customization axis an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Font,
    Color,
    Size,
    Material,
    Finish,
    Backing,
    Mounting,
}

/// How an option's `price_modifier` is applied to the base price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    /// Adds `price_modifier` currency units.
    #[default]
    Fixed,
    /// Adds `price_modifier` percent of the base price.
    Percentage,
}

/// A read-only catalog record describing one selectable option.
///
/// # JSON Format
///
/// ```json
/// {
///   "id": "ml-material-brass",
///   "type": "material",
///   "name": "Brass",
///   "value": "brass",
///   "priceModifier": 300,
///   "modifierType": "fixed",
///   "previewData": { "color": "#D4AF37" },
///   "applicableCategories": ["MetalLetters"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CustomizationOption {
    #[serde(default)]
    pub id: String,

    #[serde(rename = "type")]
    pub option_type: OptionType,

    /// Display label.
    pub name: String,

    /// Raw value: a font family, a hex code, a dimension string, a material key.
    pub value: String,

    /// Signed; negative values are discounts.
    #[serde(default)]
    pub price_modifier: f64,

    #[serde(default)]
    pub modifier_type: ModifierType,

    /// Free-form rendering hints (canvas size, swatch color, glow settings).
    #[serde(default)]
    pub preview_data: Value,

    /// Category tags this option applies to. Empty means every category.
    #[serde(default)]
    pub applicable_categories: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub display_order: i32,
}

fn default_true() -> bool {
    true
}

impl CustomizationOption {
    /// Creates an active, zero-priced option.
    pub fn new(option_type: OptionType, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            option_type,
            name: name.into(),
            value: value.into(),
            price_modifier: 0.0,
            modifier_type: ModifierType::Fixed,
            preview_data: Value::Null,
            applicable_categories: Vec::new(),
            is_active: true,
            display_order: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_price(mut self, modifier: f64, modifier_type: ModifierType) -> Self {
        self.price_modifier = modifier;
        self.modifier_type = modifier_type;
        self
    }

    pub fn with_preview(mut self, preview_data: Value) -> Self {
        self.preview_data = preview_data;
        self
    }

    pub fn for_category(mut self, category: Category) -> Self {
        self.applicable_categories.push(category.tag().to_string());
        self
    }

    pub fn with_order(mut self, display_order: i32) -> Self {
        self.display_order = display_order;
        self
    }

    /// Returns true if this option may be offered for `category`.
    pub fn applies_to(&self, category: Category) -> bool {
        self.applicable_categories.is_empty()
            || self
                .applicable_categories
                .iter()
                .any(|tag| Category::parse(tag) == Some(category))
    }

    /// Reads a finite numeric rendering hint, accepting numbers or numeric
    /// strings.
    pub fn preview_number(&self, key: &str) -> Option<f64> {
        let number = match self.preview_data.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        number.filter(|n: &f64| n.is_finite())
    }

    /// Reads a string rendering hint.
    pub fn preview_str(&self, key: &str) -> Option<&str> {
        self.preview_data.get(key)?.as_str()
    }
}

// ============================================================================
// Product
// ============================================================================

/// The slice of a product record the engine needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub base_price: f64,
    /// Category tag as stored by the catalog; may be unknown.
    pub category: String,
}

impl Product {
    pub fn new(base_price: f64, category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            base_price,
            category: category.into(),
        }
    }
}

// ============================================================================
// CatalogSource
// ============================================================================

/// Read access to the option catalog.
pub trait CatalogSource {
    /// Returns every option record, active or not.
    fn options(&self) -> Vec<CustomizationOption>;

    /// Returns the active options applicable to `category`, grouped by axis
    /// and ordered by display order within each axis.
    fn options_for(&self, category: Category) -> Vec<CustomizationOption> {
        let mut options: Vec<_> = self
            .options()
            .into_iter()
            .filter(|o| o.is_active && o.applies_to(category))
            .collect();
        options.sort_by_key(|o| (o.option_type, o.display_order));
        options
    }
}

impl CatalogSource for Vec<CustomizationOption> {
    fn options(&self) -> Vec<CustomizationOption> {
        self.clone()
    }
}

impl CatalogSource for [CustomizationOption] {
    fn options(&self) -> Vec<CustomizationOption> {
        self.to_vec()
    }
}

// ============================================================================
// BuiltinCatalog
// ============================================================================

/// The stock options offered before an admin curates the catalog.
#[derive(Debug, Clone, Default)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogSource for BuiltinCatalog {
    fn options(&self) -> Vec<CustomizationOption> {
        let mut options = Vec::new();
        options.extend(name_plate_options());
        options.extend(metal_letter_options());
        options.extend(neon_sign_options());
        options
    }
}

fn ordered(
    category: Category,
    prefix: &str,
    items: impl IntoIterator<Item = CustomizationOption>,
) -> impl Iterator<Item = CustomizationOption> {
    let prefix = prefix.to_string();
    items.into_iter().enumerate().map(move |(i, option)| {
        let id = format!("{}-{:?}-{}", prefix, option.option_type, option.value)
            .to_lowercase()
            .replace(' ', "-");
        option
            .with_id(id)
            .with_order(i as i32)
            .for_category(category)
    })
}

fn fixed(option: CustomizationOption, amount: f64) -> CustomizationOption {
    option.with_price(amount, ModifierType::Fixed)
}

fn name_plate_options() -> Vec<CustomizationOption> {
    use OptionType::*;
    let c = Category::NamePlate;
    let mut out = Vec::new();

    out.extend(ordered(
        c,
        "np",
        ["Arial", "Times New Roman", "Georgia", "Courier New"]
            .map(|f| CustomizationOption::new(Font, f, f)),
    ));
    out.extend(ordered(
        c,
        "np",
        [
            ("Black", "#000000"),
            ("Gold", "#D4AF37"),
            ("Silver", "#C0C0C0"),
            ("Bronze", "#CD7F32"),
        ]
        .map(|(name, hex)| CustomizationOption::new(Color, name, hex)),
    ));
    out.extend(ordered(
        c,
        "np",
        [
            ("Small (6x3 inches)", "6x3", 0.0, 300, 150),
            ("Medium (12x6 inches)", "12x6", 200.0, 400, 200),
            ("Large (18x9 inches)", "18x9", 500.0, 500, 250),
        ]
        .map(|(name, value, price, w, h)| {
            fixed(CustomizationOption::new(Size, name, value), price)
                .with_preview(json!({ "width": w, "height": h }))
        }),
    ));
    out.extend(ordered(
        c,
        "np",
        [
            ("Classic White", "white", 0.0, "#F5F5F5", "gradient"),
            ("Brushed Aluminum", "aluminum", 150.0, "#D9D9D9", "gradient"),
            ("Matte Black", "black", 200.0, "#2B2B2B", "solid"),
        ]
        .map(|(name, value, price, color, style)| {
            fixed(CustomizationOption::new(Backing, name, value), price)
                .with_preview(json!({ "color": color, "style": style }))
        }),
    ));
    out.extend(ordered(
        c,
        "np",
        [("Wall Mount", "wall"), ("Desk Stand", "stand")]
            .map(|(name, value)| CustomizationOption::new(Mounting, name, value)),
    ));
    out
}

fn metal_letter_options() -> Vec<CustomizationOption> {
    use OptionType::*;
    let c = Category::MetalLetters;
    let mut out = Vec::new();

    out.extend(ordered(
        c,
        "ml",
        [
            ("Arial Bold", "Arial"),
            ("Impact", "Impact"),
            ("Georgia Bold", "Georgia"),
            ("Courier Bold", "Courier New"),
        ]
        .map(|(name, value)| CustomizationOption::new(Font, name, value)),
    ));
    out.extend(ordered(
        c,
        "ml",
        [
            ("Stainless Steel", "steel", 0.0, "#C0C0C0"),
            ("Brass", "brass", 300.0, "#D4AF37"),
            ("Copper", "copper", 250.0, "#CD7F32"),
            ("Aluminum", "aluminum", -100.0, "#E8E8E8"),
        ]
        .map(|(name, value, price, swatch)| {
            fixed(CustomizationOption::new(Material, name, value), price)
                .with_preview(json!({ "color": swatch }))
        }),
    ));
    out.extend(ordered(
        c,
        "ml",
        [
            ("Brushed", "brushed", 0.0),
            ("Polished", "polished", 150.0),
            ("Matte", "matte", 50.0),
        ]
        .map(|(name, value, price)| fixed(CustomizationOption::new(Finish, name, value), price)),
    ));
    out.extend(ordered(
        c,
        "ml",
        [
            ("Small (4 inches)", "4in", 0.0, 80),
            ("Medium (8 inches)", "8in", 400.0, 120),
            ("Large (12 inches)", "12in", 800.0, 160),
        ]
        .map(|(name, value, price, glyph)| {
            fixed(CustomizationOption::new(Size, name, value), price)
                .with_preview(json!({ "fontSize": glyph }))
        }),
    ));
    out
}

fn neon_sign_options() -> Vec<CustomizationOption> {
    use OptionType::*;
    let c = Category::NeonSign;
    let mut out = Vec::new();

    out.extend(ordered(
        c,
        "ns",
        [
            ("Arial Bold", "Arial"),
            ("Impact", "Impact"),
            ("Courier Bold", "Courier New"),
        ]
        .map(|(name, value)| CustomizationOption::new(Font, name, value)),
    ));
    out.extend(ordered(
        c,
        "ns",
        NEON_PALETTE.iter().map(|entry| {
            CustomizationOption::new(Color, entry.name, entry.base.to_string()).with_preview(json!({
                "glowColor": entry.glow.to_string(),
                "glowIntensity": entry.intensity,
            }))
        }),
    ));
    out.extend(ordered(
        c,
        "ns",
        [
            ("Small (24x12 inches)", "24x12", 0.0, 500, 150),
            ("Medium (36x18 inches)", "36x18", 800.0, 600, 200),
            ("Large (48x24 inches)", "48x24", 1600.0, 700, 250),
        ]
        .map(|(name, value, price, w, h)| {
            fixed(CustomizationOption::new(Size, name, value), price)
                .with_preview(json!({ "width": w, "height": h }))
        }),
    ));
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_tags_and_fallback() {
        assert_eq!(Category::parse("NamePlates"), Some(Category::NamePlate));
        assert_eq!(Category::parse("NeonLightsSign"), Some(Category::NeonSign));
        assert_eq!(Category::parse("Trophies"), None);
        assert_eq!(Category::from_tag("Trophies"), Category::NamePlate);
        assert_eq!(Category::NeonSign.tag(), "NeonSigns");
    }

    #[test]
    fn category_serde_accepts_alias() {
        let c: Category = serde_json::from_str("\"NeonLightsSign\"").unwrap();
        assert_eq!(c, Category::NeonSign);
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"NeonSigns\"");
    }

    #[test]
    fn option_defaults_when_fields_missing() {
        let json = r#"{ "type": "finish", "name": "Matte", "value": "matte" }"#;
        let option: CustomizationOption = serde_json::from_str(json).unwrap();
        assert_eq!(option.price_modifier, 0.0);
        assert_eq!(option.modifier_type, ModifierType::Fixed);
        assert!(option.is_active);
        assert!(option.applies_to(Category::NeonSign));
        assert!(option.preview_data.is_null());
    }

    #[test]
    fn preview_hints_accept_numbers_and_strings() {
        let option = CustomizationOption::new(OptionType::Size, "S", "6x3")
            .with_preview(json!({ "width": 300, "height": "150", "unit": "in" }));
        assert_eq!(option.preview_number("width"), Some(300.0));
        assert_eq!(option.preview_number("height"), Some(150.0));
        assert_eq!(option.preview_number("unit"), None);
        assert_eq!(option.preview_str("unit"), Some("in"));

        let broken = CustomizationOption::new(OptionType::Size, "X", "x")
            .with_preview(json!({ "width": "inf", "height": "1e400", "fontSize": "NaN" }));
        assert_eq!(broken.preview_number("width"), None);
        assert_eq!(broken.preview_number("height"), None);
        assert_eq!(broken.preview_number("fontSize"), None);
    }

    #[test]
    fn options_for_filters_and_orders() {
        let catalog = vec![
            CustomizationOption::new(OptionType::Size, "L", "l")
                .with_order(2)
                .for_category(Category::NamePlate),
            CustomizationOption::new(OptionType::Size, "S", "s")
                .with_order(1)
                .for_category(Category::NamePlate),
            CustomizationOption::new(OptionType::Size, "Neon", "n").for_category(Category::NeonSign),
            CustomizationOption {
                is_active: false,
                ..CustomizationOption::new(OptionType::Font, "Old", "old")
            },
            CustomizationOption::new(OptionType::Font, "Any", "any"),
        ];

        let names: Vec<_> = catalog
            .options_for(Category::NamePlate)
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["Any", "S", "L"]);
    }

    #[test]
    fn builtin_catalog_covers_every_category() {
        let catalog = BuiltinCatalog::new();
        for category in Category::ALL {
            let options = catalog.options_for(category);
            assert!(options.iter().any(|o| o.option_type == OptionType::Size));
            assert!(options.iter().any(|o| o.option_type == OptionType::Font));
        }

        let brass = catalog
            .options_for(Category::MetalLetters)
            .into_iter()
            .find(|o| o.value == "brass")
            .unwrap();
        assert_eq!(brass.price_modifier, 300.0);
        assert_eq!(brass.preview_str("color"), Some("#D4AF37"));
        assert_eq!(brass.id, "ml-material-brass");
    }
}
