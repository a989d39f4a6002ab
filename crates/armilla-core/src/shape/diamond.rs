use svg::node::element as svg_element;

use super::{ShapeContext, ShapeDefinition};
use crate::{
    draw::{self, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Diamond (rhombus), the conventional decision shape.
///
/// The default box anchors coincide with the four rhombus vertices, so the
/// anchor default applies unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diamond;

impl ShapeDefinition for Diamond {
    fn name(&self) -> &'static str {
        "diamond"
    }

    fn min_size(&self) -> Size {
        Size::new(60.0, 48.0)
    }

    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size {
        // A centered label box of (w, h) fits a rhombus of (2w, 2h); the
        // padding then keeps text off the sloped edges.
        let label = ctx.measure_label();
        Size::new(label.width() * 2.0, label.height() * 2.0)
            .add_padding(ctx.style().padding)
            .max(self.min_size())
    }

    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let style = ctx.style();
        let half_width = size.width() / 2.0;
        let half_height = size.height() / 2.0;

        let points = format!(
            "{},{} {},{} {},{} {},{}",
            position.x(),
            position.y() - half_height,
            position.x() + half_width,
            position.y(),
            position.x(),
            position.y() + half_height,
            position.x() - half_width,
            position.y(),
        );

        let mut polygon = svg_element::Polygon::new()
            .set("points", points)
            .set("stroke", &style.stroke)
            .set("stroke-width", style.stroke_width);
        polygon = match &style.fill {
            Some(fill) => polygon.set("fill", fill),
            None => polygon.set("fill", "white"),
        };
        output.add(RenderLayer::Node, polygon);

        if !ctx.label().is_empty() {
            output.add(
                RenderLayer::Node,
                draw::text_span(
                    ctx.label(),
                    position,
                    &style.font_family,
                    style.font_size,
                    style.text_color.as_ref(),
                ),
            );
        }

        output
    }
}
