//! Color handling built on the `color` crate's CSS parsing.

use std::{
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// Wrapper around [`DynamicColor`] with the conveniences the renderer needs.
#[derive(Clone, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Parses a CSS color string such as `"#ff0000"`, `"rgb(255, 0, 0)"`, or `"red"`.
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Color { color }),
            Err(err) => Err(format!("Invalid color '{color_str}': {err}")),
        }
    }

    /// Returns a sanitized string safe for use inside an SVG id attribute.
    pub fn to_id_safe_string(&self) -> String {
        let color_str = self.to_string();
        let mut sanitized = color_str
            .replace('#', "hex")
            .replace(['(', ')', ',', ' ', ';', '.', '%'], "_");

        // SVG ids must start with a letter.
        if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            sanitized = format!("c_{sanitized}");
        }

        sanitized
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        svg::node::Value::from(color.to_string())
    }
}
