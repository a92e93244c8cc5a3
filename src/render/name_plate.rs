//! Engraved name plate renderer.

use serde::{Deserialize, Serialize};

use super::{PreviewInputs, PreviewRenderer, centered_baseline, fit_font_size, positive};
use crate::color::HexColor;
use crate::markup::{
    Definition, Document, GradientAxis, LinearGradient, Node, Paint, Rect, Stroke, TextRun,
};

/// Per-character width factor for auto-fit.
const WIDTH_FACTOR: f64 = 1.5;
/// Maximum font size as a fraction of the line band height.
const HEIGHT_RATIO: f64 = 0.5;
const CORNER_RADIUS: f64 = 8.0;
const BORDER_COLOR: HexColor = HexColor::rgb(0xdd, 0xdd, 0xdd);
const GRADIENT_ID: &str = "plate-gradient";

/// How the plate backdrop is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "color")]
pub enum PlateBackground {
    /// No backdrop, so a product photo behind the preview shows through.
    Transparent,
    Solid(HexColor),
    /// Diagonal gradient from the color to 10% darker.
    Gradient(HexColor),
}

impl Default for PlateBackground {
    fn default() -> Self {
        PlateBackground::Gradient(HexColor::rgb(0xf5, 0xf5, 0xf5))
    }
}

/// Parameters for a name plate preview.
#[derive(Debug, Clone, PartialEq)]
pub struct NamePlateParams {
    /// One centered run per non-empty line.
    pub lines: Vec<String>,
    pub font: String,
    pub color: HexColor,
    pub width: f64,
    pub height: f64,
    pub background: PlateBackground,
}

impl Default for NamePlateParams {
    fn default() -> Self {
        Self {
            lines: vec!["Your Name".to_string()],
            font: "Arial".to_string(),
            color: HexColor::BLACK,
            width: 400.0,
            height: 150.0,
            background: PlateBackground::default(),
        }
    }
}

impl NamePlateParams {
    pub fn from_inputs(inputs: &PreviewInputs) -> Self {
        let defaults = Self::default();
        Self {
            lines: inputs.lines.clone(),
            font: inputs.font.clone().unwrap_or(defaults.font),
            color: inputs.color.unwrap_or(defaults.color),
            width: positive(inputs.width).unwrap_or(defaults.width),
            height: positive(inputs.height).unwrap_or(defaults.height),
            background: inputs.background.unwrap_or(defaults.background),
        }
    }

    fn visible_lines(&self) -> Vec<&str> {
        let lines: Vec<&str> = self
            .lines
            .iter()
            .map(|l| l.as_str())
            .filter(|l| !l.trim().is_empty())
            .collect();
        if lines.is_empty() { vec![""] } else { lines }
    }
}

impl PreviewRenderer for NamePlateParams {
    fn document(&self) -> Document {
        let mut doc = Document::new(self.width, self.height);

        let backdrop_fill = match self.background {
            PlateBackground::Transparent => None,
            PlateBackground::Solid(color) => Some(Paint::Color(color)),
            PlateBackground::Gradient(color) => {
                doc.define(Definition::Gradient(
                    LinearGradient::new(GRADIENT_ID, GradientAxis::Diagonal)
                        .stop(0, color)
                        .stop(100, color.adjust_brightness(-10)),
                ));
                Some(Paint::Gradient(GRADIENT_ID))
            }
        };
        if let Some(fill) = backdrop_fill {
            doc.push(Node::Rect(Rect {
                width: self.width,
                height: self.height,
                corner_radius: CORNER_RADIUS,
                fill,
                stroke: Some(Stroke::new(Paint::Color(BORDER_COLOR), 2.0)),
            }));
        }

        // Lines share the height equally; a single line uses the full plate.
        let lines = self.visible_lines();
        let band = self.height / lines.len() as f64;
        for (i, line) in lines.into_iter().enumerate() {
            let font_size = fit_font_size(
                self.width,
                band,
                line.chars().count(),
                WIDTH_FACTOR,
                HEIGHT_RATIO,
            );
            let mut run = TextRun::new(line, self.font.as_str());
            run.x = self.width / 2.0;
            run.y = band * i as f64 + centered_baseline(band, font_size);
            run.font_size = font_size;
            run.font_weight = "600";
            run.fill = Paint::Color(self.color);
            doc.push(Node::Text(run));
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::IdSuffix;

    fn texts(markup: &str) -> Vec<(String, String, String)> {
        let doc = roxmltree::Document::parse(markup).unwrap();
        doc.descendants()
            .filter(|n| n.has_tag_name("text"))
            .map(|n| {
                (
                    n.text().unwrap_or("").to_string(),
                    n.attribute("y").unwrap().to_string(),
                    n.attribute("font-size").unwrap().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn single_line_is_centered_and_fitted() {
        let params = NamePlateParams::default();
        let preview = params.render_with(&IdSuffix::fixed("s1"));
        assert_eq!(preview.width, 400.0);
        assert_eq!(preview.height, 150.0);

        // "Your Name": min(400 / 9 * 1.5, 75) = 66.67, y = 75 + 22.22
        let runs = texts(&preview.markup);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, "Your Name");
        assert_eq!(runs[0].2, "66.67");
        assert_eq!(runs[0].1, "97.22");
    }

    #[test]
    fn gradient_backdrop_darkens_by_ten_percent() {
        let params = NamePlateParams {
            background: PlateBackground::Gradient("#f5f5f5".parse().unwrap()),
            ..Default::default()
        };
        let markup = params.render_with(&IdSuffix::fixed("g1")).markup;
        assert!(markup.contains(r##"stop-color="#f5f5f5""##));
        // round(2.55 * -10) = -25 -> 0xf5 - 25 = 0xdc
        assert!(markup.contains(r##"stop-color="#dcdcdc""##));
        assert!(markup.contains(r#"fill="url(#plate-gradient-g1)""#));
        assert!(markup.contains(r#"rx="8""#));
    }

    #[test]
    fn solid_backdrop_has_no_gradient() {
        let params = NamePlateParams {
            background: PlateBackground::Solid(HexColor::WHITE),
            ..Default::default()
        };
        let markup = params.render_with(&IdSuffix::fixed("s2")).markup;
        assert!(!markup.contains("linearGradient"));
        assert!(markup.contains(r##"<rect width="400" height="150" rx="8" fill="#ffffff""##));
    }

    #[test]
    fn transparent_backdrop_draws_only_text() {
        let params = NamePlateParams {
            background: PlateBackground::Transparent,
            ..Default::default()
        };
        let markup = params.render().markup;
        assert!(!markup.contains("<rect"));
        assert!(!markup.contains("<defs>"));
        assert_eq!(texts(&markup).len(), 1);
    }

    #[test]
    fn multiple_lines_split_the_height() {
        let params = NamePlateParams {
            lines: vec!["Dr. A".into(), "".into(), "Room 12".into()],
            height: 200.0,
            ..Default::default()
        };
        let runs = texts(&params.render().markup);
        // The blank line is skipped, leaving two 100px bands
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "Dr. A");
        assert_eq!(runs[0].2, "50");
        assert_eq!(runs[0].1, "66.67");
        assert_eq!(runs[1].1, "166.67");
    }

    #[test]
    fn user_text_is_escaped() {
        let params = NamePlateParams {
            lines: vec!["<script>alert('x')</script>".into()],
            ..Default::default()
        };
        let markup = params.render().markup;
        assert!(!markup.contains("<script>"));
        assert_eq!(texts(&markup)[0].0, "<script>alert('x')</script>");
    }
}
