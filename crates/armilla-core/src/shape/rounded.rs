use svg::node::element as svg_element;

use super::{ShapeContext, ShapeDefinition, label_box_bounds};
use crate::{
    draw::{self, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Rectangle with rounded corners.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rounded;

const CORNER_RADIUS: f32 = 8.0;

impl ShapeDefinition for Rounded {
    fn name(&self) -> &'static str {
        "rounded"
    }

    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size {
        label_box_bounds(self, ctx)
    }

    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let style = ctx.style();
        let bounds = position.to_bounds(size);

        let mut rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", size.width())
            .set("height", size.height())
            .set("rx", CORNER_RADIUS)
            .set("stroke", &style.stroke)
            .set("stroke-width", style.stroke_width);
        rect = match &style.fill {
            Some(fill) => rect.set("fill", fill),
            None => rect.set("fill", "white"),
        };
        output.add(RenderLayer::Node, rect);

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
