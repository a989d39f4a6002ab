//! The shape capability contract and the built-in shape catalog.
//!
//! A shape is pluggable behavior behind the [`ShapeDefinition`] trait:
//! `bounds` and `render` are mandatory, `anchors` has a guaranteed default
//! that derives four box anchors from `bounds`. Downstream code never
//! branches on whether a shape supplies custom anchors.

use std::fmt;

use crate::{
    color::Color,
    draw::LayeredOutput,
    geometry::{Insets, Point, Size},
    text::TextMeasurer,
};

mod cylinder;
mod diamond;
mod ellipse;
mod hexagon;
mod rectangle;
mod rounded;

pub use cylinder::Cylinder;
pub use diamond::Diamond;
pub use ellipse::Ellipse;
pub use hexagon::Hexagon;
pub use rectangle::Rectangle;
pub use rounded::Rounded;

/// Resolved visual style for one node.
///
/// Produced by merging a diagram's named style entry over the defaults;
/// shapes read it through [`ShapeContext`].
#[derive(Debug, Clone)]
pub struct NodeStyle {
    pub font_family: String,
    pub font_size: u16,
    pub padding: Insets,
    pub fill: Option<Color>,
    pub stroke: Color,
    pub stroke_width: f32,
    pub text_color: Option<Color>,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            font_family: String::from("sans-serif"),
            font_size: 14,
            padding: Insets::uniform(12.0),
            fill: None,
            stroke: Color::default(),
            stroke_width: 1.5,
            text_color: None,
        }
    }
}

/// Everything a shape capability may inspect: label, style, the free-form
/// data payload, and a text-measurement handle.
pub struct ShapeContext<'a> {
    label: &'a str,
    style: &'a NodeStyle,
    data: &'a serde_json::Value,
    measurer: &'a TextMeasurer,
}

impl<'a> ShapeContext<'a> {
    pub fn new(
        label: &'a str,
        style: &'a NodeStyle,
        data: &'a serde_json::Value,
        measurer: &'a TextMeasurer,
    ) -> Self {
        Self {
            label,
            style,
            data,
            measurer,
        }
    }

    pub fn label(&self) -> &str {
        self.label
    }

    pub fn style(&self) -> &NodeStyle {
        self.style
    }

    pub fn data(&self) -> &serde_json::Value {
        self.data
    }

    pub fn measurer(&self) -> &TextMeasurer {
        self.measurer
    }

    /// Measures the label with the context's font settings.
    pub fn measure_label(&self) -> Size {
        self.measurer
            .measure(self.label, self.style.font_size, &self.style.font_family)
    }
}

/// A named boundary point on a shape, expressed as an offset from the
/// shape's center.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAnchor {
    name: String,
    offset: Point,
}

impl NamedAnchor {
    pub fn new(name: impl Into<String>, offset: Point) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    /// The anchor's absolute position for a shape centered at `center`.
    pub fn resolve(&self, center: Point) -> Point {
        center + self.offset
    }

    /// The default four-point anchor set derived from a bounds box:
    /// `top`, `right`, `bottom`, `left` at the edge midpoints.
    pub fn box_anchors(size: Size) -> Vec<NamedAnchor> {
        let half_width = size.width() / 2.0;
        let half_height = size.height() / 2.0;
        vec![
            NamedAnchor::new("top", Point::new(0.0, -half_height)),
            NamedAnchor::new("right", Point::new(half_width, 0.0)),
            NamedAnchor::new("bottom", Point::new(0.0, half_height)),
            NamedAnchor::new("left", Point::new(-half_width, 0.0)),
        ]
    }
}

/// Pluggable behavior for one shape kind.
///
/// Implementations are stateless: per-node variation comes entirely from the
/// [`ShapeContext`], which keeps anchor names and counts stable for a node
/// regardless of its mutable auxiliary data.
pub trait ShapeDefinition: fmt::Debug + Send + Sync {
    /// Canonical identifier of this shape kind.
    fn name(&self) -> &'static str;

    /// The documented minimum size for this shape. `bounds` results are
    /// clamped to this floor, including for empty labels.
    fn min_size(&self) -> Size {
        Size::new(40.0, 28.0)
    }

    /// Computes the shape's size for the given context.
    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size;

    /// Returns the shape's anchor points.
    ///
    /// The default derives `top`/`right`/`bottom`/`left` from `bounds`, so
    /// shapes without boundary-specific geometry need not override this.
    fn anchors(&self, ctx: &ShapeContext<'_>) -> Vec<NamedAnchor> {
        NamedAnchor::box_anchors(self.bounds(ctx))
    }

    /// Renders the shape (outline plus label) centered at `position` with
    /// the size the layout engine assigned.
    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput;
}

/// Shared sizing rule for label-carrying box shapes: measured label plus
/// style padding, clamped to the shape's minimum.
pub(crate) fn label_box_bounds(definition: &dyn ShapeDefinition, ctx: &ShapeContext<'_>) -> Size {
    ctx.measure_label()
        .add_padding(ctx.style().padding)
        .max(definition.min_size())
}
