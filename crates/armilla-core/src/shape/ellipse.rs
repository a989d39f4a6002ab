use svg::node::element as svg_element;

use super::{ShapeContext, ShapeDefinition};
use crate::{
    draw::{self, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Ellipse shape. The default box anchors fall exactly on the ellipse
/// boundary (the axis extremes), so no anchor override is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ellipse;

impl ShapeDefinition for Ellipse {
    fn name(&self) -> &'static str {
        "ellipse"
    }

    fn min_size(&self) -> Size {
        Size::new(48.0, 36.0)
    }

    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size {
        // The largest rectangle inscribed in an ellipse with semi-axes (a, b)
        // measures a*sqrt(2) by b*sqrt(2), so the label box scales up by
        // sqrt(2) to fit inside.
        let sqrt_2 = 2.0_f32.sqrt();
        ctx.measure_label()
            .scale(sqrt_2)
            .add_padding(ctx.style().padding)
            .max(self.min_size())
    }

    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let style = ctx.style();

        let mut ellipse = svg_element::Ellipse::new()
            .set("cx", position.x())
            .set("cy", position.y())
            .set("rx", size.width() / 2.0)
            .set("ry", size.height() / 2.0)
            .set("stroke", &style.stroke)
            .set("stroke-width", style.stroke_width);
        ellipse = match &style.fill {
            Some(fill) => ellipse.set("fill", fill),
            None => ellipse.set("fill", "white"),
        };
        output.add(RenderLayer::Node, ellipse);

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
