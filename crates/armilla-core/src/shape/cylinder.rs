use svg::node::element as svg_element;

use super::{ShapeContext, ShapeDefinition};
use crate::{
    draw::{self, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Cylinder, the conventional data-store shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cylinder;

/// Vertical radius of the elliptical caps.
const CAP_HEIGHT: f32 = 8.0;

impl ShapeDefinition for Cylinder {
    fn name(&self) -> &'static str {
        "cylinder"
    }

    fn min_size(&self) -> Size {
        Size::new(56.0, 48.0)
    }

    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size {
        let label = ctx.measure_label().add_padding(ctx.style().padding);
        Size::new(label.width(), label.height() + 2.0 * CAP_HEIGHT).max(self.min_size())
    }

    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let style = ctx.style();
        let bounds = position.to_bounds(size);
        let rx = size.width() / 2.0;
        let top_cap_y = bounds.min_y() + CAP_HEIGHT;
        let bottom_cap_y = bounds.max_y() - CAP_HEIGHT;

        let fill_value = style
            .fill
            .as_ref()
            .map(|c| c.to_string())
            .unwrap_or_else(|| String::from("white"));

        // Body with a bulging bottom arc; the top cap is a separate ellipse
        // drawn over the body seam.
        let body = format!(
            "M {} {} L {} {} A {} {} 0 0 0 {} {} L {} {} Z",
            bounds.min_x(),
            top_cap_y,
            bounds.min_x(),
            bottom_cap_y,
            rx,
            CAP_HEIGHT,
            bounds.max_x(),
            bottom_cap_y,
            bounds.max_x(),
            top_cap_y,
        );
        output.add(
            RenderLayer::Node,
            svg_element::Path::new()
                .set("d", body)
                .set("fill", fill_value.clone())
                .set("stroke", &style.stroke)
                .set("stroke-width", style.stroke_width),
        );
        output.add(
            RenderLayer::Node,
            svg_element::Ellipse::new()
                .set("cx", position.x())
                .set("cy", top_cap_y)
                .set("rx", rx)
                .set("ry", CAP_HEIGHT)
                .set("fill", fill_value)
                .set("stroke", &style.stroke)
                .set("stroke-width", style.stroke_width),
        );

        if !ctx.label().is_empty() {
            // Label sits in the body, below the top cap.
            let label_center = Point::new(position.x(), position.y() + CAP_HEIGHT / 2.0);
            output.add(
                RenderLayer::Node,
                draw::text_span(
                    ctx.label(),
                    label_center,
                    &style.font_family,
                    style.font_size,
                    style.text_color.as_ref(),
                ),
            );
        }

        output
    }
}
