//! Individual metal letters renderer.
//!
//! The only renderer whose canvas is sized by its content: each glyph gets a
//! fixed cell and the cells are laid out left to right.

use super::{PreviewInputs, PreviewRenderer, centered_baseline, positive};
use crate::color::HexColor;
use crate::markup::{Definition, Document, GradientAxis, LinearGradient, Node, Paint, TextRun};

const GRADIENT_ID: &str = "metal-gradient";
/// Brightness shift of the light and dark sheen stops.
const SHEEN: i32 = 20;
pub const DEFAULT_GLYPH_SIZE: f64 = 120.0;
pub const DEFAULT_SPACING: f64 = 20.0;
pub const DEFAULT_MATERIAL: HexColor = HexColor::rgb(0xc0, 0xc0, 0xc0);

/// Parameters for a metal letters preview.
#[derive(Debug, Clone, PartialEq)]
pub struct MetalLettersParams {
    /// Letters to cut, already filtered and uppercased by the caller.
    pub text: String,
    pub font: String,
    /// Base color of the material.
    pub material: HexColor,
    pub glyph_size: f64,
    pub spacing: f64,
}

impl Default for MetalLettersParams {
    fn default() -> Self {
        Self {
            text: "ABC".to_string(),
            font: "Arial".to_string(),
            material: DEFAULT_MATERIAL,
            glyph_size: DEFAULT_GLYPH_SIZE,
            spacing: DEFAULT_SPACING,
        }
    }
}

impl MetalLettersParams {
    pub fn from_inputs(inputs: &PreviewInputs) -> Self {
        let defaults = Self::default();
        Self {
            text: inputs.joined_text(),
            font: inputs.font.clone().unwrap_or(defaults.font),
            material: inputs.color.unwrap_or(defaults.material),
            glyph_size: positive(inputs.glyph_size).unwrap_or(defaults.glyph_size),
            spacing: defaults.spacing,
        }
    }

    /// Canvas width and height for the current text.
    pub fn canvas_size(&self) -> (f64, f64) {
        let count = self.text.chars().count().max(1) as f64;
        let width = count * self.glyph_size + (count - 1.0) * self.spacing;
        (width, self.glyph_size * 1.5)
    }
}

impl PreviewRenderer for MetalLettersParams {
    fn document(&self) -> Document {
        let (width, height) = self.canvas_size();
        let mut doc = Document::new(width, height);

        doc.define(Definition::Gradient(
            LinearGradient::new(GRADIENT_ID, GradientAxis::Diagonal)
                .stop(0, self.material.adjust_brightness(SHEEN))
                .stop(50, self.material)
                .stop(100, self.material.adjust_brightness(-SHEEN)),
        ));

        let baseline = centered_baseline(height, self.glyph_size);
        let pitch = self.glyph_size + self.spacing;
        for (i, glyph) in self.text.chars().enumerate() {
            let mut run = TextRun::new(glyph.to_string(), self.font.as_str());
            run.x = self.glyph_size / 2.0 + pitch * i as f64;
            run.y = baseline;
            run.font_size = self.glyph_size;
            run.font_weight = "bold";
            run.fill = Paint::Gradient(GRADIENT_ID);
            doc.push(Node::Text(run));
        }

        doc
    }
}
