//! Typed SVG intermediate representation.
//!
//! Renderers describe a preview as a [`Document`] made of shapes, text runs,
//! gradients and filters. A single writer ([`Document::write`]) turns it into
//! markup, which is the only place user text is escaped and element ids are
//! generated.
//!
//! # Element ids
//!
//! Definitions are named by a short static prefix (`"plate-gradient"`,
//! `"neon-glow"`). At write time every prefix is combined with the document's
//! [`IdSuffix`], so several previews embedded in one page never collide while
//! two renders of the same input differ only by that suffix.

mod writer;

pub use writer::{escape_xml, format_number, is_xml_char};

use crate::color::HexColor;

// ============================================================================
// IdSuffix
// ============================================================================

/// The per-document suffix appended to every definition id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSuffix(String);

impl IdSuffix {
    /// Length of a generated suffix.
    pub const LEN: usize = 9;

    /// Generates a random suffix.
    pub fn random() -> Self {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        Self(uuid[..Self::LEN].to_string())
    }

    /// Uses a caller-provided suffix. Intended for deterministic output.
    pub fn fixed(suffix: impl Into<String>) -> Self {
        Self(suffix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolves a definition prefix into a full element id.
    pub fn id_for(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.0)
    }
}

// ============================================================================
// Paint
// ============================================================================

/// A fill or stroke value.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    None,
    Color(HexColor),
    /// Reference to a gradient definition by prefix.
    Gradient(&'static str),
}

/// Stroke settings for shapes and text.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
    pub round_joins: bool,
}

impl Stroke {
    pub fn new(paint: Paint, width: f64) -> Self {
        Self {
            paint,
            width,
            round_joins: false,
        }
    }

    pub fn with_round_joins(mut self) -> Self {
        self.round_joins = true;
        self
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Direction of a linear gradient across its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Top-left to bottom-right.
    Diagonal,
    /// Top to bottom.
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    /// Offset in percent (0-100).
    pub offset: u8,
    pub color: HexColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub prefix: &'static str,
    pub axis: GradientAxis,
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    pub fn new(prefix: &'static str, axis: GradientAxis) -> Self {
        Self {
            prefix,
            axis,
            stops: Vec::new(),
        }
    }

    pub fn stop(mut self, offset: u8, color: HexColor) -> Self {
        self.stops.push(GradientStop { offset, color });
        self
    }
}

/// One Gaussian blur of the source graphic.
#[derive(Debug, Clone, PartialEq)]
pub struct Blur {
    pub std_deviation: f64,
    pub result: &'static str,
}

/// A glow built from stacked blurs merged beneath the crisp source graphic.
///
/// Blurs are merged in the order listed, so list the widest first; the
/// source graphic is always merged last, on top.
#[derive(Debug, Clone, PartialEq)]
pub struct GlowFilter {
    pub prefix: &'static str,
    pub blurs: Vec<Blur>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Gradient(LinearGradient),
    Glow(GlowFilter),
}

// ============================================================================
// Nodes
// ============================================================================

/// A rectangle anchored at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Rect {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub fill: Paint,
    pub stroke: Option<Stroke>,
}

/// A single centered run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    /// Unescaped user text.
    pub content: String,
    /// Unescaped font family; `sans-serif` is appended as a fallback.
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: &'static str,
    pub fill: Paint,
    pub stroke: Option<Stroke>,
    /// Reference to a filter definition by prefix.
    pub filter: Option<&'static str>,
    pub opacity: Option<f64>,
}

impl TextRun {
    pub fn new(content: impl Into<String>, font_family: impl Into<String>) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            content: content.into(),
            font_family: font_family.into(),
            font_size: 16.0,
            font_weight: "normal",
            fill: Paint::Color(HexColor::BLACK),
            stroke: None,
            filter: None,
            opacity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rect(Rect),
    Text(TextRun),
}

// ============================================================================
// Document
// ============================================================================

/// A complete preview, ready to be written as standalone SVG markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub width: f64,
    pub height: f64,
    pub definitions: Vec<Definition>,
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            definitions: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn define(&mut self, definition: Definition) {
        self.definitions.push(definition);
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Serializes the document, resolving definition ids with `suffix`.
    pub fn write(&self, suffix: &IdSuffix) -> String {
        writer::write_document(self, suffix)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> Document {
        let mut doc = Document::new(200.0, 100.0);
        doc.define(Definition::Gradient(
            LinearGradient::new("test-gradient", GradientAxis::Vertical)
                .stop(0, HexColor::WHITE)
                .stop(100, HexColor::BLACK),
        ));
        doc.define(Definition::Glow(GlowFilter {
            prefix: "test-glow",
            blurs: vec![Blur {
                std_deviation: 4.0,
                result: "wide",
            }],
        }));
        let mut run = TextRun::new("Tom & \"Jerry\" <3 'ok'", "Comic <Sans>");
        run.fill = Paint::Gradient("test-gradient");
        run.filter = Some("test-glow");
        doc.push(Node::Text(run));
        doc
    }

    #[test]
    fn random_suffixes_are_distinct() {
        let a = IdSuffix::random();
        let b = IdSuffix::random();
        assert_eq!(a.as_str().len(), IdSuffix::LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn writer_escapes_text_and_font() {
        let markup = sample_document().write(&IdSuffix::fixed("abc"));
        assert!(markup.contains("Tom &amp; &quot;Jerry&quot; &lt;3 &apos;ok&apos;"));
        assert!(markup.contains("font-family=\"Comic &lt;Sans&gt;, sans-serif\""));
        assert!(!markup.contains("<Sans>"));
    }

    #[test]
    fn writer_resolves_references_with_suffix() {
        let markup = sample_document().write(&IdSuffix::fixed("abc"));
        assert!(markup.contains("id=\"test-gradient-abc\""));
        assert!(markup.contains("fill=\"url(#test-gradient-abc)\""));
        assert!(markup.contains("id=\"test-glow-abc\""));
        assert!(markup.contains("filter=\"url(#test-glow-abc)\""));
    }

    #[test]
    fn written_markup_is_well_formed() {
        let markup = sample_document().write(&IdSuffix::random());
        let parsed = roxmltree::Document::parse(&markup).unwrap();
        let root = parsed.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.attribute("width"), Some("200"));
        let text = parsed
            .descendants()
            .find(|n| n.has_tag_name("text"))
            .unwrap();
        assert_eq!(text.text(), Some("Tom & \"Jerry\" <3 'ok'"));
    }

    #[test]
    fn empty_defs_are_omitted() {
        let doc = Document::new(10.0, 10.0);
        let markup = doc.write(&IdSuffix::fixed("x"));
        assert!(!markup.contains("<defs>"));
        assert!(roxmltree::Document::parse(&markup).is_ok());
    }
}
