//! Editing sessions that keep a price and a preview in sync with user edits.
//!
//! A [`CustomizationSession`] owns one [`CustomizationState`]. Every mutation
//! goes through the same path: copy the state, apply the edit, run
//! [`recompute`] over the whole copy, then swap in the new state together
//! with its preview and price. Readers therefore never see a preview that
//! belongs to a different state than the price next to it.
//!
//! # Example
//!
//! ```
//! use signage_customizer::{BuiltinCatalog, CustomizationSession, EngineConfig, Product};
//!
//! let product = Product::new(999.0, "NamePlates");
//! let mut session = CustomizationSession::open(product, &BuiltinCatalog, EngineConfig::default());
//!
//! session.set_text("Dr. Ada Lovelace");
//! session.select_option("np-size-12x6").unwrap();
//! assert_eq!(session.price(), 1199);
//!
//! let snapshot = session.snapshot();
//! assert!(snapshot.preview_svg().contains("Dr. Ada Lovelace"));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, Category, CustomizationOption, OptionType, Product};
use crate::color::HexColor;
use crate::config::{EngineConfig, TextLimits};
use crate::error::{Error, Result};
use crate::markup::is_xml_char;
use crate::pricing::{Modifier, PriceCalculator, PricedCustomization};
use crate::raster;
use crate::render::metal_letters::DEFAULT_MATERIAL;
use crate::render::{
    NEON_PALETTE, PlateBackground, PreviewDispatcher, PreviewInputs, RenderedPreview,
};
use crate::snapshot::{CartLine, CartSink, CustomizationSnapshot, OptionRef, SnapshotParts};

// ============================================================================
// Text normalization
// ============================================================================

/// Applies the category's character rules and truncates to `limit` characters.
///
/// Characters XML cannot carry are dropped for every category. Metal letters
/// keep ASCII letters only; metal letters and neon signs are uppercased.
pub fn normalize_text(category: Category, input: &str, limit: usize) -> String {
    let input: String = input.chars().filter(|c| is_xml_char(*c)).collect();
    let text: String = match category {
        Category::NamePlate => input,
        Category::MetalLetters => input
            .chars()
            .filter(char::is_ascii_alphabetic)
            .collect::<String>()
            .to_ascii_uppercase(),
        Category::NeonSign => input.to_uppercase(),
    };
    text.chars().take(limit).collect()
}

fn normalize_lines<'a>(
    category: Category,
    lines: impl IntoIterator<Item = &'a str>,
    limits: &TextLimits,
) -> Vec<String> {
    lines
        .into_iter()
        .take(limits.line_count(category))
        .map(|line| normalize_text(category, line, limits.line_length(category)))
        .collect()
}

// ============================================================================
// CustomizationState
// ============================================================================

/// Everything the user has chosen so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationState {
    pub category: Category,
    #[serde(default)]
    pub product_id: String,
    pub base_price: f64,
    /// Normalized text lines; name plates may have several.
    pub lines: Vec<String>,
    /// At most one selected option per axis.
    pub selections: BTreeMap<OptionType, CustomizationOption>,
    pub quantity: u32,
    #[serde(default)]
    pub instructions: String,
    /// Name plates only: drop the backdrop so a product photo shows through.
    #[serde(default)]
    pub transparent_background: bool,
    /// Neon only.
    pub powered: bool,
    /// Neon only: overrides the palette's glow intensity.
    #[serde(default)]
    pub glow_intensity: Option<f64>,
}

impl CustomizationState {
    pub fn new(product: &Product) -> Self {
        Self {
            category: Category::from_tag(&product.category),
            product_id: product.id.clone(),
            base_price: product.base_price,
            lines: Vec::new(),
            selections: BTreeMap::new(),
            quantity: 1,
            instructions: String::new(),
            transparent_background: false,
            powered: true,
            glow_intensity: None,
        }
    }

    pub fn selected(&self, option_type: OptionType) -> Option<&CustomizationOption> {
        self.selections.get(&option_type)
    }

    pub fn modifiers(&self) -> Vec<Modifier> {
        self.selections.values().map(Modifier::from).collect()
    }

    /// Maps the selections onto renderer inputs for this category.
    pub fn preview_inputs(&self) -> PreviewInputs {
        let font = self.selected(OptionType::Font).map(|o| o.value.clone());
        let size = self.selected(OptionType::Size);
        let mut inputs = PreviewInputs {
            lines: self.lines.clone(),
            font,
            width: size.and_then(|o| o.preview_number("width")),
            height: size.and_then(|o| o.preview_number("height")),
            powered: self.powered,
            ..Default::default()
        };

        match self.category {
            Category::NamePlate => {
                inputs.color = self
                    .selected(OptionType::Color)
                    .map(|o| HexColor::parse_or(&o.value, HexColor::BLACK));
                inputs.background = if self.transparent_background {
                    Some(PlateBackground::Transparent)
                } else {
                    self.selected(OptionType::Backing).map(plate_backing)
                };
            }
            Category::MetalLetters => {
                // The material swatch wins over a plain color option
                let material = self
                    .selected(OptionType::Material)
                    .and_then(|o| o.preview_str("color"))
                    .or_else(|| self.selected(OptionType::Color).map(|o| o.value.as_str()));
                inputs.color = material.map(|c| HexColor::parse_or(c, DEFAULT_MATERIAL));
                inputs.glyph_size = size.and_then(|o| o.preview_number("fontSize"));
            }
            Category::NeonSign => {
                let color = self.selected(OptionType::Color);
                inputs.color = color.map(|o| HexColor::parse_or(&o.value, NEON_PALETTE[0].base));
                inputs.glow_color = color
                    .and_then(|o| o.preview_str("glowColor"))
                    .and_then(|c| c.parse().ok());
                inputs.glow_intensity = self
                    .glow_intensity
                    .or_else(|| color.and_then(|o| o.preview_number("glowIntensity")));
            }
        }

        inputs
    }
}

/// Reads a backing option's `color` and `style` hints.
fn plate_backing(option: &CustomizationOption) -> PlateBackground {
    let fallback = match PlateBackground::default() {
        PlateBackground::Gradient(color) | PlateBackground::Solid(color) => color,
        PlateBackground::Transparent => HexColor::WHITE,
    };
    let color = option
        .preview_str("color")
        .map_or(fallback, |c| HexColor::parse_or(c, fallback));
    match option.preview_str("style") {
        Some("solid") => PlateBackground::Solid(color),
        _ => PlateBackground::Gradient(color),
    }
}

// ============================================================================
// Recompute
// ============================================================================

/// Derives the preview and price from a complete state.
///
/// Pure apart from the random id suffix in the preview markup.
#[tracing::instrument(level = "debug", skip_all, fields(category = %state.category))]
pub fn recompute(
    state: &CustomizationState,
    calculator: &PriceCalculator,
) -> (RenderedPreview, PricedCustomization) {
    let preview = PreviewDispatcher.dispatch(state.category, &state.preview_inputs());
    let priced = calculator.final_price(state.base_price, &state.modifiers());
    tracing::debug!(
        price = priced.final_price,
        width = preview.width,
        height = preview.height,
        "recomputed customization"
    );
    (preview, priced)
}

// ============================================================================
// DesignProfile
// ============================================================================

/// The editable part of a state, by option id, for saving and restoring a
/// design.
///
/// # JSON Format
///
/// ```json
/// {
///   "lines": ["OPEN"],
///   "optionIds": ["ns-color-#00bfff", "ns-size-36x18"],
///   "quantity": 2,
///   "powered": false
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct DesignProfile {
    #[serde(default)]
    pub lines: Vec<String>,
    #[serde(default)]
    pub option_ids: Vec<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub transparent_background: bool,
    #[serde(default = "default_true")]
    pub powered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow_intensity: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl Default for DesignProfile {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            option_ids: Vec::new(),
            quantity: 1,
            instructions: String::new(),
            transparent_background: false,
            powered: true,
            glow_intensity: None,
        }
    }
}

impl DesignProfile {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Types whose editable settings can be exported and re-applied.
pub trait Configurable {
    /// Applies a profile's settings to this instance.
    fn apply_profile(&mut self, profile: &DesignProfile);

    /// Exports the current settings as a profile.
    fn export_profile(&self) -> DesignProfile;
}

// ============================================================================
// CustomizationSession
// ============================================================================

/// Session lifecycle. There is no blocked state: edits are accepted in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, catalog defaults not yet applied.
    Initializing,
    Ready,
}

/// One buyer editing one product.
#[derive(Debug, Clone)]
pub struct CustomizationSession {
    config: EngineConfig,
    calculator: PriceCalculator,
    options: Vec<CustomizationOption>,
    phase: SessionPhase,
    state: CustomizationState,
    preview: RenderedPreview,
    priced: PricedCustomization,
}

impl CustomizationSession {
    /// Creates a session with no options loaded yet.
    pub fn new(product: Product, config: EngineConfig) -> Self {
        let calculator = config.calculator();
        let state = CustomizationState::new(&product);
        let (preview, priced) = recompute(&state, &calculator);
        Self {
            config,
            calculator,
            options: Vec::new(),
            phase: SessionPhase::Initializing,
            state,
            preview,
            priced,
        }
    }

    /// Creates a session and loads its defaults from `catalog`.
    pub fn open(
        product: Product,
        catalog: &(impl CatalogSource + ?Sized),
        config: EngineConfig,
    ) -> Self {
        let mut session = Self::new(product, config);
        session.initialize(catalog);
        session
    }

    /// Loads the category's options and selects the first one on every axis.
    pub fn initialize(&mut self, catalog: &(impl CatalogSource + ?Sized)) {
        self.options = catalog.options_for(self.state.category);
        let mut defaults = BTreeMap::new();
        for option in &self.options {
            defaults
                .entry(option.option_type)
                .or_insert_with(|| option.clone());
        }
        tracing::debug!(
            category = %self.state.category,
            options = self.options.len(),
            axes = defaults.len(),
            "session initialized"
        );
        self.update(|state| state.selections = defaults);
        self.phase = SessionPhase::Ready;
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn category(&self) -> Category {
        self.state.category
    }

    pub fn state(&self) -> &CustomizationState {
        &self.state
    }

    pub fn preview(&self) -> &RenderedPreview {
        &self.preview
    }

    pub fn priced(&self) -> PricedCustomization {
        self.priced
    }

    pub fn price(&self) -> i64 {
        self.priced.final_price
    }

    /// Every option offered for this session's category.
    pub fn options(&self) -> &[CustomizationOption] {
        &self.options
    }

    /// The options offered on one axis, in display order.
    pub fn options_of(&self, option_type: OptionType) -> impl Iterator<Item = &CustomizationOption> {
        self.options
            .iter()
            .filter(move |o| o.option_type == option_type)
    }

    fn find_option(&self, id: &str) -> Option<&CustomizationOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// Applies an edit to a copy of the state and swaps in the result.
    fn update(&mut self, edit: impl FnOnce(&mut CustomizationState)) {
        let mut next = self.state.clone();
        edit(&mut next);
        let (preview, priced) = recompute(&next, &self.calculator);
        self.state = next;
        self.preview = preview;
        self.priced = priced;
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Replaces all text. Name plates split `text` on newlines.
    pub fn set_text(&mut self, text: &str) {
        let lines = normalize_lines(self.state.category, text.lines(), &self.config.text_limits);
        self.update(|state| state.lines = lines);
    }

    /// Replaces one line, returning false when `index` is past the category's
    /// line count.
    pub fn set_line(&mut self, index: usize, text: &str) -> bool {
        let limits = self.config.text_limits;
        let category = self.state.category;
        if index >= limits.line_count(category) {
            tracing::debug!(index, %category, "line index out of range");
            return false;
        }
        let line = normalize_text(category, text, limits.line_length(category));
        self.update(|state| {
            if state.lines.len() <= index {
                state.lines.resize(index + 1, String::new());
            }
            state.lines[index] = line;
        });
        true
    }

    /// Selects an option by id, replacing any selection on the same axis.
    pub fn select_option(&mut self, id: &str) -> Result<()> {
        let option = self
            .find_option(id)
            .cloned()
            .ok_or_else(|| Error::UnknownOption(id.to_string()))?;
        self.update(|state| {
            state.selections.insert(option.option_type, option);
        });
        Ok(())
    }

    pub fn clear_option(&mut self, option_type: OptionType) {
        self.update(|state| {
            state.selections.remove(&option_type);
        });
    }

    /// Sets the quantity, clamped to at least one.
    pub fn set_quantity(&mut self, quantity: u32) {
        self.update(|state| state.quantity = quantity.max(1));
    }

    pub fn set_instructions(&mut self, instructions: impl Into<String>) {
        let instructions = instructions.into();
        self.update(|state| state.instructions = instructions);
    }

    pub fn set_transparent_background(&mut self, transparent: bool) {
        self.update(|state| state.transparent_background = transparent);
    }

    pub fn set_powered(&mut self, powered: bool) {
        self.update(|state| state.powered = powered);
    }

    /// Overrides the neon glow intensity; `None` or a negative value restores
    /// the palette default.
    pub fn set_glow_intensity(&mut self, intensity: Option<f64>) {
        let intensity = intensity.filter(|i| i.is_finite() && *i >= 0.0);
        self.update(|state| state.glow_intensity = intensity);
    }

    // ------------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------------

    /// Captures the current design. The snapshot is independent of later edits.
    pub fn snapshot(&self) -> CustomizationSnapshot {
        let state = &self.state;
        CustomizationSnapshot::capture(SnapshotParts {
            category: state.category,
            product_id: &state.product_id,
            text: &state.lines,
            selected: state.selections.values().map(OptionRef::from).collect(),
            preview: &self.preview,
            price: self.priced.final_price,
            quantity: state.quantity,
            instructions: &state.instructions,
        })
    }

    /// Like [`snapshot`](Self::snapshot), with a PNG thumbnail when one can be
    /// produced within the configured timeout.
    pub fn snapshot_with_raster(&self) -> CustomizationSnapshot {
        let snapshot = self.snapshot();
        match raster::rasterize_with_timeout(
            self.preview.markup.clone(),
            self.config.raster_size,
            self.config.raster_timeout(),
        ) {
            Ok(png) => snapshot.with_preview_png(png),
            Err(err) => {
                tracing::warn!(error = %err, "continuing without preview bitmap");
                snapshot
            }
        }
    }

    /// Hands a snapshot of the current design to the cart.
    ///
    /// The session is left untouched whether or not the cart accepts it, so a
    /// retryable failure can simply be retried.
    #[tracing::instrument(level = "debug", skip_all, fields(category = %self.state.category, price = self.priced.final_price))]
    pub fn add_to_cart(&self, cart: &mut impl CartSink) -> Result<CartLine> {
        let line = CartLine::new(self.snapshot());
        match cart.submit(line.clone()) {
            Ok(()) => Ok(line),
            Err(err) => {
                tracing::warn!(error = %err, retryable = err.is_retryable(), "cart submission failed");
                Err(err)
            }
        }
    }
}

impl Configurable for CustomizationSession {
    /// Restores text, selections and toggles in one atomic update.
    ///
    /// Selections are rebuilt from the profile alone, so an axis the profile
    /// does not name ends up cleared. Unknown ids are skipped.
    fn apply_profile(&mut self, profile: &DesignProfile) {
        let category = self.state.category;
        let lines = normalize_lines(
            category,
            profile.lines.iter().map(String::as_str),
            &self.config.text_limits,
        );
        let mut selections = BTreeMap::new();
        for id in &profile.option_ids {
            match self.find_option(id) {
                Some(option) => {
                    selections.insert(option.option_type, option.clone());
                }
                None => tracing::warn!(id = id.as_str(), %category, "profile names unknown option"),
            }
        }
        let intensity = profile.glow_intensity.filter(|i| i.is_finite() && *i >= 0.0);

        self.update(|state| {
            state.lines = lines;
            state.selections = selections;
            state.quantity = profile.quantity.max(1);
            state.instructions = profile.instructions.clone();
            state.transparent_background = profile.transparent_background;
            state.powered = profile.powered;
            state.glow_intensity = intensity;
        });
    }

    fn export_profile(&self) -> DesignProfile {
        let state = &self.state;
        DesignProfile {
            lines: state.lines.clone(),
            option_ids: state.selections.values().map(|o| o.id.clone()).collect(),
            quantity: state.quantity,
            instructions: state.instructions.clone(),
            transparent_background: state.transparent_background,
            powered: state.powered,
            glow_intensity: state.glow_intensity,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
