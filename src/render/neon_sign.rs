//! Neon sign renderer with a cascading glow.

use super::{PreviewInputs, PreviewRenderer, centered_baseline, fit_font_size, positive};
use crate::color::HexColor;
use crate::markup::{
    Blur, Definition, Document, GlowFilter, GradientAxis, LinearGradient, Node, Paint, Rect,
    Stroke, TextRun,
};

const WIDTH_FACTOR: f64 = 1.2;
const HEIGHT_RATIO: f64 = 0.6;
const BACKDROP: HexColor = HexColor::rgb(0x1a, 0x1a, 0x1a);
const GLOW_ID: &str = "neon-glow";
const GRADIENT_ID: &str = "neon-gradient";
/// Blur radius that defines the lit tube itself.
const TUBE_BLUR: f64 = 2.0;
/// Brightness offsets for an unlit tube.
const OFF_FILL_SHIFT: i32 = -50;
const OFF_STROKE_SHIFT: i32 = -30;
const OFF_OPACITY: f64 = 0.8;
pub const DEFAULT_INTENSITY: f64 = 20.0;

// ============================================================================
// Palette
// ============================================================================

/// A named neon tube color and the lighter hue its glow peaks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeonPaletteEntry {
    pub name: &'static str,
    pub base: HexColor,
    pub glow: HexColor,
    /// Default blur radius of the outer halo.
    pub intensity: f64,
}

const fn entry(name: &'static str, base: HexColor, glow: HexColor, intensity: f64) -> NeonPaletteEntry {
    NeonPaletteEntry {
        name,
        base,
        glow,
        intensity,
    }
}

pub const NEON_PALETTE: [NeonPaletteEntry; 8] = [
    entry("Hot Pink", HexColor::rgb(0xff, 0x14, 0x93), HexColor::rgb(0xff, 0x8a, 0xc9), 20.0),
    entry("Electric Blue", HexColor::rgb(0x00, 0xbf, 0xff), HexColor::rgb(0x99, 0xe5, 0xff), 20.0),
    entry("Lime Green", HexColor::rgb(0x00, 0xff, 0x00), HexColor::rgb(0xb3, 0xff, 0xb3), 20.0),
    entry("Purple", HexColor::rgb(0x9d, 0x00, 0xff), HexColor::rgb(0xd1, 0x99, 0xff), 20.0),
    entry("Orange", HexColor::rgb(0xff, 0x66, 0x00), HexColor::rgb(0xff, 0xb3, 0x80), 20.0),
    entry("Red", HexColor::rgb(0xff, 0x00, 0x00), HexColor::rgb(0xff, 0x80, 0x80), 20.0),
    entry("Yellow", HexColor::rgb(0xff, 0xff, 0x00), HexColor::rgb(0xff, 0xff, 0xb3), 20.0),
    entry("White", HexColor::WHITE, HexColor::WHITE, 15.0),
];

impl NeonPaletteEntry {
    /// Finds a palette entry by display name (case-insensitive) or base color.
    pub fn lookup(key: &str) -> Option<&'static NeonPaletteEntry> {
        let as_color = key.parse::<HexColor>().ok();
        NEON_PALETTE
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(key.trim()) || Some(e.base) == as_color)
    }

    pub fn by_color(color: HexColor) -> Option<&'static NeonPaletteEntry> {
        NEON_PALETTE.iter().find(|e| e.base == color)
    }
}

// ============================================================================
// Params
// ============================================================================

/// Parameters for a neon sign preview.
#[derive(Debug, Clone, PartialEq)]
pub struct NeonSignParams {
    pub text: String,
    pub font: String,
    /// Tube color, used for the stroke and the gradient midpoint.
    pub color: HexColor,
    /// Lighter hue at the brightest gradient stop.
    pub glow_color: HexColor,
    pub width: f64,
    pub height: f64,
    /// Blur radius of the widest halo layer.
    pub intensity: f64,
    pub powered: bool,
}

impl Default for NeonSignParams {
    fn default() -> Self {
        let pink = NEON_PALETTE[0];
        Self {
            text: "NEON".to_string(),
            font: "Arial".to_string(),
            color: pink.base,
            glow_color: pink.glow,
            width: 600.0,
            height: 200.0,
            intensity: pink.intensity,
            powered: true,
        }
    }
}

impl NeonSignParams {
    pub fn from_inputs(inputs: &PreviewInputs) -> Self {
        let defaults = Self::default();
        let color = inputs.color.unwrap_or(defaults.color);
        let palette = NeonPaletteEntry::by_color(color);
        Self {
            text: inputs.joined_text(),
            font: inputs.font.clone().unwrap_or(defaults.font),
            color,
            glow_color: inputs
                .glow_color
                .or(palette.map(|p| p.glow))
                .unwrap_or_else(|| color.adjust_brightness(40)),
            width: positive(inputs.width).unwrap_or(defaults.width),
            height: positive(inputs.height).unwrap_or(defaults.height),
            intensity: inputs
                .glow_intensity
                .or(palette.map(|p| p.intensity))
                .unwrap_or(DEFAULT_INTENSITY),
            powered: inputs.powered,
        }
    }

    fn glow_filter(&self) -> GlowFilter {
        let intensity = self.intensity.max(0.0);
        GlowFilter {
            prefix: GLOW_ID,
            blurs: vec![
                Blur {
                    std_deviation: intensity,
                    result: "halo-wide",
                },
                Blur {
                    std_deviation: intensity / 2.0,
                    result: "halo-mid",
                },
                Blur {
                    std_deviation: TUBE_BLUR,
                    result: "tube",
                },
            ],
        }
    }
}

impl PreviewRenderer for NeonSignParams {
    fn document(&self) -> Document {
        let mut doc = Document::new(self.width, self.height);

        doc.push(Node::Rect(Rect {
            width: self.width,
            height: self.height,
            corner_radius: 8.0,
            fill: Paint::Color(BACKDROP),
            stroke: None,
        }));

        let font_size = fit_font_size(
            self.width,
            self.height,
            self.text.chars().count(),
            WIDTH_FACTOR,
            HEIGHT_RATIO,
        );
        let mut run = TextRun::new(self.text.as_str(), self.font.as_str());
        run.x = self.width / 2.0;
        run.y = centered_baseline(self.height, font_size);
        run.font_size = font_size;
        run.font_weight = "bold";

        if self.powered {
            doc.define(Definition::Glow(self.glow_filter()));
            doc.define(Definition::Gradient(
                LinearGradient::new(GRADIENT_ID, GradientAxis::Vertical)
                    .stop(0, self.glow_color)
                    .stop(50, self.color)
                    .stop(100, self.color.adjust_brightness(-20)),
            ));
            run.fill = Paint::Gradient(GRADIENT_ID);
            run.stroke = Some(Stroke::new(Paint::Color(self.color), 3.0).with_round_joins());
            run.filter = Some(GLOW_ID);
        } else {
            run.fill = Paint::Color(self.color.adjust_brightness(OFF_FILL_SHIFT));
            run.stroke = Some(
                Stroke::new(
                    Paint::Color(self.color.adjust_brightness(OFF_STROKE_SHIFT)),
                    2.0,
                )
                .with_round_joins(),
            );
            run.opacity = Some(OFF_OPACITY);
        }

        doc.push(Node::Text(run));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::IdSuffix;

    #[test]
    fn powered_sign_references_glow_filter() {
        let params = NeonSignParams::default();
        let markup = params.render_with(&IdSuffix::fixed("n1")).markup;
        assert_eq!(markup.matches("<feGaussianBlur").count(), 3);
        assert!(markup.contains(r#"filter="url(#neon-glow-n1)""#));
        assert!(markup.contains(r#"stdDeviation="20""#));
        assert!(markup.contains(r#"stdDeviation="10""#));
        assert!(markup.contains(r#"stdDeviation="2""#));
        // The crisp copy is merged last, on top of the halo
        assert!(markup.contains(r#"<feMergeNode in="tube"/><feMergeNode in="SourceGraphic"/>"#));
        assert!(markup.contains(r##"fill="#1a1a1a""##));
    }

    #[test]
    fn unpowered_sign_has_no_blur() {
        let params = NeonSignParams {
            powered: false,
            ..Default::default()
        };
        let markup = params.render().markup;
        assert!(!markup.contains("feGaussianBlur"));
        assert!(!markup.contains("filter="));
        assert!(markup.contains(r#"opacity="0.8""#));
        // #ff1493 shifted by -50% (-127) for fill and -30% (-76) for stroke
        assert!(markup.contains(r##"fill="#800014""##));
        assert!(markup.contains(r##"stroke="#b30047""##));
    }

    #[test]
    fn gradient_peaks_at_glow_color() {
        let params = NeonSignParams {
            color: HexColor::rgb(0x00, 0xbf, 0xff),
            glow_color: HexColor::rgb(0x99, 0xe5, 0xff),
            ..Default::default()
        };
        let markup = params.render().markup;
        assert!(markup.contains(r##"offset="0%" stop-color="#99e5ff""##));
        assert!(markup.contains(r##"offset="50%" stop-color="#00bfff""##));
    }

    #[test]
    fn intensity_scales_outer_blurs() {
        let params = NeonSignParams {
            intensity: 30.0,
            ..Default::default()
        };
        let markup = params.render().markup;
        assert!(markup.contains(r#"stdDeviation="30""#));
        assert!(markup.contains(r#"stdDeviation="15""#));
    }

    #[test]
    fn inputs_pick_palette_glow() {
        let inputs = PreviewInputs {
            color: Some(NEON_PALETTE[7].base),
            powered: true,
            ..Default::default()
        };
        let params = NeonSignParams::from_inputs(&inputs);
        assert_eq!(params.intensity, 15.0);
        assert_eq!(params.glow_color, HexColor::WHITE);

        let custom = PreviewInputs {
            color: Some(HexColor::rgb(0x10, 0x10, 0x10)),
            ..Default::default()
        };
        let params = NeonSignParams::from_inputs(&custom);
        assert_eq!(params.glow_color, HexColor::rgb(0x76, 0x76, 0x76));
        assert_eq!(params.intensity, DEFAULT_INTENSITY);
        assert!(!params.powered);
    }

    #[test]
    fn palette_lookup_by_name_or_color() {
        assert_eq!(NeonPaletteEntry::lookup("hot pink").unwrap().name, "Hot Pink");
        assert_eq!(NeonPaletteEntry::lookup("#00FF00").unwrap().name, "Lime Green");
        assert!(NeonPaletteEntry::lookup("Teal").is_none());
    }
}
