//! Markup writer for [`Document`].
//!
//! Pure string building. Every attribute and text node that can carry user
//! input passes through [`escape_xml`].

use super::{
    Definition, Document, GlowFilter, GradientAxis, IdSuffix, LinearGradient, Node, Paint, Rect,
    Stroke, TextRun,
};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

pub(super) fn write_document(doc: &Document, suffix: &IdSuffix) -> String {
    let mut parts: Vec<String> = Vec::new();

    let width = format_number(doc.width);
    let height = format_number(doc.height);
    parts.push(format!(
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="{SVG_NAMESPACE}">"#
    ));

    if !doc.definitions.is_empty() {
        parts.push("<defs>".to_string());
        for definition in &doc.definitions {
            parts.push(match definition {
                Definition::Gradient(gradient) => write_gradient(gradient, suffix),
                Definition::Glow(filter) => write_glow(filter, suffix),
            });
        }
        parts.push("</defs>".to_string());
    }

    for node in &doc.nodes {
        parts.push(match node {
            Node::Rect(rect) => write_rect(rect, suffix),
            Node::Text(run) => write_text(run, suffix),
        });
    }

    parts.push("</svg>".to_string());
    parts.join("\n")
}

// ============================================================================
// Definitions
// ============================================================================

fn write_gradient(gradient: &LinearGradient, suffix: &IdSuffix) -> String {
    let (x2, y2) = match gradient.axis {
        GradientAxis::Diagonal => ("100%", "100%"),
        GradientAxis::Vertical => ("0%", "100%"),
    };
    let mut out = format!(
        r#"<linearGradient id="{}" x1="0%" y1="0%" x2="{x2}" y2="{y2}">"#,
        suffix.id_for(gradient.prefix)
    );
    for stop in &gradient.stops {
        out.push_str(&format!(
            r#"<stop offset="{}%" stop-color="{}" stop-opacity="1"/>"#,
            stop.offset, stop.color
        ));
    }
    out.push_str("</linearGradient>");
    out
}

fn write_glow(filter: &GlowFilter, suffix: &IdSuffix) -> String {
    let mut out = format!(
        r#"<filter id="{}" x="-50%" y="-50%" width="200%" height="200%">"#,
        suffix.id_for(filter.prefix)
    );
    for blur in &filter.blurs {
        out.push_str(&format!(
            r#"<feGaussianBlur in="SourceGraphic" stdDeviation="{}" result="{}"/>"#,
            format_number(blur.std_deviation),
            blur.result
        ));
    }
    out.push_str("<feMerge>");
    for blur in &filter.blurs {
        out.push_str(&format!(r#"<feMergeNode in="{}"/>"#, blur.result));
    }
    out.push_str(r#"<feMergeNode in="SourceGraphic"/>"#);
    out.push_str("</feMerge></filter>");
    out
}

// ============================================================================
// Nodes
// ============================================================================

fn write_rect(rect: &Rect, suffix: &IdSuffix) -> String {
    format!(
        r#"<rect width="{}" height="{}" rx="{}" fill="{}"{}/>"#,
        format_number(rect.width),
        format_number(rect.height),
        format_number(rect.corner_radius),
        paint_value(&rect.fill, suffix),
        stroke_attrs(rect.stroke.as_ref(), suffix)
    )
}

fn write_text(run: &TextRun, suffix: &IdSuffix) -> String {
    let mut attrs = format!(
        r#"x="{}" y="{}" font-family="{}, sans-serif" font-size="{}" font-weight="{}" text-anchor="middle" fill="{}""#,
        format_number(run.x),
        format_number(run.y),
        escape_xml(&run.font_family),
        format_number(run.font_size),
        run.font_weight,
        paint_value(&run.fill, suffix)
    );
    attrs.push_str(&stroke_attrs(run.stroke.as_ref(), suffix));
    if let Some(filter) = run.filter {
        attrs.push_str(&format!(r#" filter="url(#{})""#, suffix.id_for(filter)));
    }
    if let Some(opacity) = run.opacity {
        attrs.push_str(&format!(r#" opacity="{}""#, format_number(opacity)));
    }
    format!("<text {}>{}</text>", attrs, escape_xml(&run.content))
}

fn stroke_attrs(stroke: Option<&Stroke>, suffix: &IdSuffix) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let mut out = format!(
        r#" stroke="{}" stroke-width="{}""#,
        paint_value(&stroke.paint, suffix),
        format_number(stroke.width)
    );
    if stroke.round_joins {
        out.push_str(r#" stroke-linejoin="round""#);
    }
    out
}

fn paint_value(paint: &Paint, suffix: &IdSuffix) -> String {
    match paint {
        Paint::None => "none".to_string(),
        Paint::Color(color) => color.to_string(),
        Paint::Gradient(prefix) => format!("url(#{})", suffix.id_for(prefix)),
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Escapes the five reserved XML characters and drops characters XML 1.0
/// cannot carry at all.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

/// True for characters allowed in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Formats a coordinate with at most two decimals and no trailing zeros.
pub fn format_number(n: f64) -> String {
    let s = format!("{:.2}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_ampersand_first() {
        assert_eq!(escape_xml("&lt;"), "&amp;lt;");
        assert_eq!(
            escape_xml(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&apos;&amp;&apos;&lt;/a&gt;"
        );
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn escape_drops_non_xml_characters() {
        assert_eq!(escape_xml("Ann\u{1}e"), "Anne");
        assert_eq!(escape_xml("a\u{0}b\u{1b}c\u{FFFE}\u{FFFF}"), "abc");
        assert_eq!(escape_xml("tab\there"), "tab\there");
        assert_eq!(escape_xml("\u{1F600}"), "\u{1F600}");
        assert!(!is_xml_char('\u{8}'));
        assert!(is_xml_char('\r'));
    }

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(format_number(200.0), "200");
        assert_eq!(format_number(66.666_666), "66.67");
        assert_eq!(format_number(7.5), "7.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.001), "0");
    }
}
