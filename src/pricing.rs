//! Price reduction over a base price and a set of selected modifiers.

use serde::{Deserialize, Serialize};

use crate::catalog::{CustomizationOption, ModifierType};
use crate::color::js_round;

// ============================================================================
// Modifier
// ============================================================================

/// A priced effect taken from a selected option.
///
/// Both fields default when absent, so a partially-populated record simply
/// contributes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    #[serde(default, rename = "priceModifier")]
    pub value: f64,
    #[serde(default, rename = "modifierType")]
    pub kind: ModifierType,
}

impl Modifier {
    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            kind: ModifierType::Fixed,
        }
    }

    pub fn percentage(value: f64) -> Self {
        Self {
            value,
            kind: ModifierType::Percentage,
        }
    }

    /// The amount this modifier adds to `base_price`.
    pub fn delta(&self, base_price: f64) -> f64 {
        if !self.value.is_finite() {
            return 0.0;
        }
        match self.kind {
            ModifierType::Fixed => self.value,
            ModifierType::Percentage => base_price * self.value / 100.0,
        }
    }
}

impl From<&CustomizationOption> for Modifier {
    fn from(option: &CustomizationOption) -> Self {
        Self {
            value: option.price_modifier,
            kind: option.modifier_type,
        }
    }
}

// ============================================================================
// Reduction
// ============================================================================

/// Reduces a base price and modifiers to one rounded integer.
///
/// Deltas are summed in ascending order so the result never depends on the
/// order modifiers were supplied in. No floor is applied here; see
/// [`PriceCalculator`].
pub fn price<'a, I>(base_price: f64, modifiers: I) -> i64
where
    I: IntoIterator<Item = &'a Modifier>,
{
    let base = if base_price.is_finite() { base_price } else { 0.0 };
    let mut deltas: Vec<f64> = modifiers.into_iter().map(|m| m.delta(base)).collect();
    deltas.sort_by(f64::total_cmp);
    let total = deltas.into_iter().fold(base, |acc, d| acc + d);
    js_round(total) as i64
}

/// Lower bound applied to a computed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum PriceFloor {
    /// Stacked discounts may push the price below zero.
    Unbounded,
    /// Prices never drop below zero.
    #[default]
    Zero,
}

impl PriceFloor {
    pub fn apply(&self, price: i64) -> i64 {
        match self {
            PriceFloor::Unbounded => price,
            PriceFloor::Zero => price.max(0),
        }
    }
}

/// The outcome of pricing one customization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedCustomization {
    pub final_price: i64,
}

/// Applies [`price`] followed by a floor policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceCalculator {
    floor: PriceFloor,
}

impl PriceCalculator {
    pub fn new(floor: PriceFloor) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> PriceFloor {
        self.floor
    }

    /// Prices a set of selected catalog options.
    pub fn price_options<'a, I>(&self, base_price: f64, options: I) -> PricedCustomization
    where
        I: IntoIterator<Item = &'a CustomizationOption>,
    {
        let modifiers: Vec<Modifier> = options.into_iter().map(Modifier::from).collect();
        self.final_price(base_price, &modifiers)
    }

    pub fn final_price(&self, base_price: f64, modifiers: &[Modifier]) -> PricedCustomization {
        let raw = price(base_price, modifiers);
        let final_price = self.floor.apply(raw);
        if final_price != raw {
            tracing::debug!(raw, final_price, "price clamped by floor policy");
        }
        PricedCustomization { final_price }
    }
}

// ============================================================================
// Tests
// ============================================================================
