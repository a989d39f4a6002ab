//! Stroke and line-pattern definitions.
//!
//! Follows SVG terminology: a stroke is a color, a width, and a dash
//! pattern. The `Double` pattern is special: it is *not* expressed as a
//! dash array. The edge renderer draws two parallel offset paths from one
//! centerline, so a double stroke serializes like a solid one.

use svg::node::element::Path;

use crate::color::Color;

/// Line patterns for edges and shape outlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinePattern {
    #[default]
    Solid,
    Dashed,
    Dotted,
    /// Two parallel lines; geometry-level doubling happens at render time.
    Double,
}

impl LinePattern {
    /// The `stroke-dasharray` value for this pattern, if any.
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            Self::Solid | Self::Double => None,
            Self::Dashed => Some("6,4"),
            Self::Dotted => Some("2,3"),
        }
    }

    /// Whether this pattern renders as two parallel paths.
    pub fn is_double(self) -> bool {
        self == Self::Double
    }
}

/// A complete stroke description.
#[derive(Debug, Clone)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    pattern: LinePattern,
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.5,
            pattern: LinePattern::Solid,
        }
    }
}

impl StrokeDefinition {
    pub fn new(color: Color, width: f32, pattern: LinePattern) -> Self {
        Self {
            color,
            width,
            pattern,
        }
    }

    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width, LinePattern::Solid)
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn pattern(&self) -> LinePattern {
        self.pattern
    }

    pub fn set_pattern(&mut self, pattern: LinePattern) {
        self.pattern = pattern;
    }

    /// Applies stroke attributes to a path, leaving fill untouched.
    pub fn apply_to(&self, path: Path) -> Path {
        let mut path = path
            .set("stroke", &self.color)
            .set("stroke-width", self.width);
        if let Some(dash) = self.pattern.dash_array() {
            path = path.set("stroke-dasharray", dash);
        }
        path
    }
}
