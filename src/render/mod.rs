//! Category renderers and the dispatcher that picks between them.
//!
//! Each renderer turns a category-specific parameter set into a
//! [`Document`](crate::markup::Document) and shares the text fitting helpers
//! defined here. [`PreviewDispatcher`] maps a category to its renderer and
//! never fails: unknown categories are drawn as name plates.

pub mod metal_letters;
pub mod name_plate;
pub mod neon_sign;

pub use metal_letters::MetalLettersParams;
pub use name_plate::{NamePlateParams, PlateBackground};
pub use neon_sign::{NEON_PALETTE, NeonPaletteEntry, NeonSignParams};

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::color::HexColor;
use crate::markup::{Document, IdSuffix};

// ============================================================================
// Text fitting
// ============================================================================

/// Picks a font size that keeps `char_count` glyphs inside `width x height`.
///
/// `k` scales the per-character width budget and `ratio` caps the size as a
/// fraction of the height. Empty text is treated as one character.
pub fn fit_font_size(width: f64, height: f64, char_count: usize, k: f64, ratio: f64) -> f64 {
    let count = char_count.max(1) as f64;
    (width / count * k).min(height * ratio)
}

/// Keeps a size hint only when it is a usable canvas dimension.
pub(crate) fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Baseline that optically centers a single run of `font_size` in `height`.
pub fn centered_baseline(height: f64, font_size: f64) -> f64 {
    height / 2.0 + font_size / 3.0
}

// ============================================================================
// RenderedPreview
// ============================================================================

/// Markup for one preview plus the canvas size it was drawn at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPreview {
    pub markup: String,
    pub width: f64,
    pub height: f64,
    /// Suffix shared by every element id in `markup`.
    pub id_suffix: String,
}

impl RenderedPreview {
    pub fn from_document(doc: &Document, suffix: &IdSuffix) -> Self {
        Self {
            markup: doc.write(suffix),
            width: doc.width,
            height: doc.height,
            id_suffix: suffix.as_str().to_string(),
        }
    }

    /// Markup with the id suffix replaced by a fixed placeholder.
    ///
    /// Only `id="…"` attributes and `url(#…)` references inside tags are
    /// rewritten; text content and other attributes are left as written.
    pub fn normalized_markup(&self) -> String {
        if self.id_suffix.is_empty() {
            return self.markup.clone();
        }
        let tail = format!("-{}", self.id_suffix);
        let mut out = String::with_capacity(self.markup.len());
        let mut rest = self.markup.as_str();
        // Escaped content never holds a raw '<' or '>'
        while let Some(open) = rest.find('<') {
            let close = rest[open..].find('>').map_or(rest.len(), |i| open + i + 1);
            out.push_str(&rest[..open]);
            out.push_str(&normalize_tag(&rest[open..close], &tail));
            rest = &rest[close..];
        }
        out.push_str(rest);
        out
    }

    /// True when both previews are identical apart from their id suffixes.
    pub fn is_equivalent(&self, other: &RenderedPreview) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.normalized_markup() == other.normalized_markup()
    }
}

fn normalize_tag(tag: &str, tail: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut rest = tag;
    while let Some((start, end)) = next_reference(rest) {
        out.push_str(&rest[..start]);
        let reference = &rest[start..end];
        match reference.strip_suffix(tail) {
            Some(name) => {
                out.push_str(name);
                out.push_str("-_");
            }
            None => out.push_str(reference),
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

/// Byte range of the next id value or `url(#…)` target in a tag.
fn next_reference(tag: &str) -> Option<(usize, usize)> {
    let id = tag.find(r#" id=""#).map(|i| (i + 5, '"'));
    let url = tag.find("url(#").map(|i| (i + 5, ')'));
    let (start, delimiter) = match (id, url) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };
    let end = start + tag[start..].find(delimiter)?;
    Some((start, end))
}

// ============================================================================
// Renderer trait
// ============================================================================

/// A parameter set that knows how to draw itself.
pub trait PreviewRenderer {
    /// Builds the preview document.
    fn document(&self) -> Document;

    /// Renders with a caller-chosen id suffix.
    fn render_with(&self, suffix: &IdSuffix) -> RenderedPreview {
        RenderedPreview::from_document(&self.document(), suffix)
    }

    /// Renders with a fresh random id suffix.
    fn render(&self) -> RenderedPreview {
        self.render_with(&IdSuffix::random())
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Category-neutral preview inputs gathered from an editing session.
///
/// Every field is optional; each renderer fills the gaps with its own
/// defaults, so any combination produces a preview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewInputs {
    /// Text lines, already normalized and length-limited by the caller.
    pub lines: Vec<String>,
    pub font: Option<String>,
    pub color: Option<HexColor>,
    pub glow_color: Option<HexColor>,
    pub glow_intensity: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub glyph_size: Option<f64>,
    pub background: Option<PlateBackground>,
    pub powered: bool,
}

impl PreviewInputs {
    /// All lines joined with a single space.
    pub fn joined_text(&self) -> String {
        self.lines.join(" ")
    }
}

/// Routes a category to its renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewDispatcher;

impl PreviewDispatcher {
    /// Renders `inputs` with the renderer for `category`.
    pub fn dispatch(&self, category: Category, inputs: &PreviewInputs) -> RenderedPreview {
        self.dispatch_with(category, inputs, &IdSuffix::random())
    }

    /// Renders for a raw category tag; unknown tags use the name plate renderer.
    pub fn dispatch_tag(&self, tag: &str, inputs: &PreviewInputs) -> RenderedPreview {
        self.dispatch(Category::from_tag(tag), inputs)
    }

    pub fn dispatch_with(
        &self,
        category: Category,
        inputs: &PreviewInputs,
        suffix: &IdSuffix,
    ) -> RenderedPreview {
        match category {
            Category::NamePlate => NamePlateParams::from_inputs(inputs).render_with(suffix),
            Category::MetalLetters => MetalLettersParams::from_inputs(inputs).render_with(suffix),
            Category::NeonSign => NeonSignParams::from_inputs(inputs).render_with(suffix),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_font_size_guards_empty_text() {
        let size = fit_font_size(400.0, 150.0, 0, 1.5, 0.5);
        assert!(size.is_finite());
        assert_eq!(size, 75.0);
    }

    #[test]
    fn fit_font_size_shrinks_long_text() {
        // 400 / 9 * 1.5 = 66.67 < 75
        let size = fit_font_size(400.0, 150.0, 9, 1.5, 0.5);
        assert!((size - 66.666_666).abs() < 1e-3);
        // Short text is capped by height
        assert_eq!(fit_font_size(400.0, 150.0, 2, 1.5, 0.5), 75.0);
    }

    #[test]
    fn baseline_sits_below_center() {
        assert_eq!(centered_baseline(150.0, 60.0), 95.0);
    }

    #[test]
    fn unknown_tag_falls_back_to_name_plate() {
        let inputs = PreviewInputs {
            lines: vec!["Hello".into()],
            ..Default::default()
        };
        let suffix = IdSuffix::fixed("fixed0001");
        let dispatcher = PreviewDispatcher;
        let fallback = dispatcher.dispatch_with(Category::from_tag("Trophies"), &inputs, &suffix);
        let plate = dispatcher.dispatch_with(Category::NamePlate, &inputs, &suffix);
        assert_eq!(fallback, plate);
        assert!(dispatcher.dispatch_tag("", &inputs).is_equivalent(&plate));
    }

    #[test]
    fn dispatch_picks_category_renderer() {
        let inputs = PreviewInputs {
            lines: vec!["ABC".into()],
            powered: true,
            ..Default::default()
        };
        let dispatcher = PreviewDispatcher;
        let neon = dispatcher.dispatch(Category::NeonSign, &inputs);
        assert!(neon.markup.contains("feGaussianBlur"));
        let metal = dispatcher.dispatch(Category::MetalLetters, &inputs);
        assert!(metal.markup.contains("metal-gradient"));
    }

    #[test]
    fn empty_text_renders_for_every_category() {
        let inputs = PreviewInputs::default();
        for category in Category::ALL {
            let preview = PreviewDispatcher.dispatch(category, &inputs);
            assert!(preview.width > 0.0 && preview.height > 0.0, "{category}");
            assert!(!preview.markup.is_empty());
            roxmltree::Document::parse(&preview.markup).unwrap();
        }
    }

    #[test]
    fn identical_inputs_differ_only_by_suffix() {
        let inputs = PreviewInputs {
            lines: vec!["Same <input>".into()],
            powered: true,
            ..Default::default()
        };
        for category in Category::ALL {
            let a = PreviewDispatcher.dispatch(category, &inputs);
            let b = PreviewDispatcher.dispatch(category, &inputs);
            assert!(a.is_equivalent(&b), "{category}");
        }
    }

    #[test]
    fn non_finite_sizes_fall_back_to_defaults() {
        let inputs = PreviewInputs {
            lines: vec!["Wide".into()],
            width: Some(f64::INFINITY),
            height: Some(f64::NAN),
            glyph_size: Some(f64::INFINITY),
            powered: true,
            ..Default::default()
        };
        let plate = PreviewDispatcher.dispatch(Category::NamePlate, &inputs);
        assert_eq!((plate.width, plate.height), (400.0, 150.0));
        assert!(!plate.markup.contains("inf") && !plate.markup.contains("NaN"));

        let letters = PreviewDispatcher.dispatch(Category::MetalLetters, &inputs);
        assert!(letters.width.is_finite() && letters.height.is_finite());
        let neon = PreviewDispatcher.dispatch(Category::NeonSign, &inputs);
        assert!(neon.width.is_finite() && neon.height.is_finite());
    }

    #[test]
    fn text_matching_the_suffix_is_not_normalized() {
        let plate = |text: &str| NamePlateParams {
            lines: vec![text.to_string()],
            ..Default::default()
        };
        let a = plate("Room q1").render_with(&IdSuffix::fixed("q1"));
        let b = plate("Room q2").render_with(&IdSuffix::fixed("q2"));
        assert!(!a.is_equivalent(&b));
        let normalized = a.normalized_markup();
        assert!(normalized.contains(">Room q1</text>"));
        assert!(normalized.contains(r#"id="plate-gradient-_""#));
        assert!(normalized.contains(r#"fill="url(#plate-gradient-_)""#));

        let c = plate("Room q1").render_with(&IdSuffix::fixed("q2"));
        assert!(a.is_equivalent(&c));
    }
}
