use svg::node::element as svg_element;

use super::{NamedAnchor, ShapeContext, ShapeDefinition};
use crate::{
    draw::{self, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Flat-top hexagon.
///
/// Overrides `anchors` to expose its six vertices in addition to the top and
/// bottom edge midpoints, giving eight named attachment points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hexagon;

/// Horizontal distance from a left/right tip to the adjacent corners, as a
/// fraction of the width.
const TIP_RATIO: f32 = 0.2;

impl Hexagon {
    fn corner_inset(size: Size) -> f32 {
        size.width() * TIP_RATIO
    }
}

impl ShapeDefinition for Hexagon {
    fn name(&self) -> &'static str {
        "hexagon"
    }

    fn min_size(&self) -> Size {
        Size::new(64.0, 36.0)
    }

    fn bounds(&self, ctx: &ShapeContext<'_>) -> Size {
        // Widen so the label clears the sloped tip regions on both sides.
        let label = ctx.measure_label();
        let widened = Size::new(label.width() / (1.0 - 2.0 * TIP_RATIO), label.height());
        widened.add_padding(ctx.style().padding).max(self.min_size())
    }

    fn anchors(&self, ctx: &ShapeContext<'_>) -> Vec<NamedAnchor> {
        let size = self.bounds(ctx);
        let half_width = size.width() / 2.0;
        let half_height = size.height() / 2.0;
        let corner_x = half_width - Self::corner_inset(size);

        vec![
            NamedAnchor::new("top", Point::new(0.0, -half_height)),
            NamedAnchor::new("top-right", Point::new(corner_x, -half_height)),
            NamedAnchor::new("right", Point::new(half_width, 0.0)),
            NamedAnchor::new("bottom-right", Point::new(corner_x, half_height)),
            NamedAnchor::new("bottom", Point::new(0.0, half_height)),
            NamedAnchor::new("bottom-left", Point::new(-corner_x, half_height)),
            NamedAnchor::new("left", Point::new(-half_width, 0.0)),
            NamedAnchor::new("top-left", Point::new(-corner_x, -half_height)),
        ]
    }

    fn render(&self, ctx: &ShapeContext<'_>, position: Point, size: Size) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let style = ctx.style();
        let half_width = size.width() / 2.0;
        let half_height = size.height() / 2.0;
        let corner_x = half_width - Self::corner_inset(size);

        let points = format!(
            "{},{} {},{} {},{} {},{} {},{} {},{}",
            position.x() - half_width,
            position.y(),
            position.x() - corner_x,
            position.y() - half_height,
            position.x() + corner_x,
            position.y() - half_height,
            position.x() + half_width,
            position.y(),
            position.x() + corner_x,
            position.y() + half_height,
            position.x() - corner_x,
            position.y() + half_height,
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

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::{shape::NodeStyle, text::TextMeasurer};

    #[test]
    fn exposes_eight_named_anchors() {
        let measurer = TextMeasurer::new();
        let style = NodeStyle::default();
        let data = Value::Null;
        let ctx = ShapeContext::new("hex", &style, &data, &measurer);

        let anchors = Hexagon.anchors(&ctx);
        assert_eq!(anchors.len(), 8);
        assert!(anchors.iter().any(|a| a.name() == "top-left"));
        assert!(anchors.iter().any(|a| a.name() == "right"));
    }
}
