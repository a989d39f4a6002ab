//! Layered SVG draw primitives.
//!
//! Rendering never concatenates markup strings directly: every stage emits
//! typed `svg` crate nodes into a [`LayeredOutput`], and the document is
//! serialized once at the end. This keeps z-ordering explicit and makes the
//! renderer testable without string scraping.

mod layer;
mod stroke;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use stroke::{LinePattern, StrokeDefinition};

use svg::node::element as svg_element;

use crate::{color::Color, geometry::Point};

/// Escapes the characters SVG/XML reserves in text content and attributes.
///
/// All user-supplied text (labels, stereotypes, tooltips) must pass through
/// here exactly once before entering an SVG node.
pub fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Builds a centered SVG text element at `position`.
///
/// `content` is escaped here; callers pass raw user text.
pub fn text_span(
    content: &str,
    position: Point,
    font_family: &str,
    font_size: u16,
    color: Option<&Color>,
) -> svg_element::Text {
    let mut text = svg_element::Text::new(escape_text(content))
        .set("x", position.x())
        .set("y", position.y())
        .set("text-anchor", "middle")
        .set("dominant-baseline", "middle")
        .set("font-family", font_family)
        .set("font-size", font_size);

    if let Some(color) = color {
        text = text.set("fill", color);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_reserved_characters() {
        assert_eq!(
            escape_text(r#"<a href="x">&'y'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&apos;y&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(escape_text("Checkout Service"), "Checkout Service");
    }

    #[test]
    fn escaping_is_not_applied_twice() {
        // The chokepoint contract: callers escape exactly once.
        let once = escape_text("a & b");
        assert_eq!(once, "a &amp; b");
        assert_eq!(escape_text(&once), "a &amp;amp; b");
    }

    #[test]
    fn text_span_contains_escaped_content() {
        let span = text_span(
            "x < y",
            Point::new(10.0, 20.0),
            "sans-serif",
            14,
            None,
        );
        let rendered = span.to_string();
        assert!(rendered.contains("x &lt; y"));
        assert!(!rendered.contains("x < y"));
    }
}
