//! Edge rendering: path construction, line-style transforms, and
//! annotation placement.
//!
//! The router hands over a centerline polyline; everything visual happens
//! here. Splines smooth the polyline's corners with quadratic segments.
//! Double lines become two parallel offset copies of the centerline, the
//! offset axis chosen by comparing the overall endpoint deltas. The label
//! and stereotype sit at the path's arc-length midpoint; source and target
//! multiplicity/role annotations sit at the 15% and 85% points, stacked so
//! coexisting annotations never overlap.

use svg::node::element as svg_element;

use armilla_core::{
    draw::{self, LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::{Point, point_along},
    text::TextMeasurer,
};

use crate::{
    ast::{EndAnnotation, LineStyle, RoutingStyle},
    route::RoutedEdge,
};

/// Corner radius for spline smoothing.
const SMOOTHING_RADIUS: f32 = 8.0;

/// Perpendicular offset of each line of a doubled edge.
const DOUBLE_OFFSET: f32 = 1.5;

/// Font size for all edge annotations.
const ANNOTATION_FONT_SIZE: u16 = 12;

/// Vertical step between stacked annotations at one path point.
const STACK_STEP: f32 = 14.0;

pub(super) struct EdgeRenderContext<'a> {
    pub stroke: StrokeDefinition,
    pub marker_start: Option<String>,
    pub marker_end: Option<String>,
    pub routing: RoutingStyle,
    pub strict: bool,
    pub measurer: &'a TextMeasurer,
}

/// Renders one routed edge into the Edge and Annotation layers.
pub(super) fn render_edge(routed: &RoutedEdge<'_>, ctx: &EdgeRenderContext<'_>) -> LayeredOutput {
    let mut output = LayeredOutput::new();
    let edge = routed.edge();
    let points = routed.points();

    let line_data: Vec<String> = if edge.line == LineStyle::Double {
        let offset = double_offset(points);
        vec![
            path_data(&offset_points(points, offset), ctx.routing),
            path_data(&offset_points(points, offset.scale(-1.0)), ctx.routing),
        ]
    } else {
        vec![path_data(points, ctx.routing)]
    };

    for (index, data) in line_data.iter().enumerate() {
        let mut path = svg_element::Path::new().set("d", data.clone()).set("fill", "none");
        path = ctx.stroke.apply_to(path);

        // Markers belong on the centerline; for doubled edges they go on
        // the first copy only so heads are not drawn twice.
        if index == 0 {
            if let Some(start) = &ctx.marker_start {
                path = path.set("marker-start", start.clone());
            }
            if let Some(end) = &ctx.marker_end {
                path = path.set("marker-end", end.clone());
            }
        }

        if !ctx.strict && index == 0 {
            path = path.set("data-edge-id", format!("{}->{}", edge.from, edge.to));
            if let Some(tooltip) = &edge.tooltip {
                path = path.set("data-edge-tooltip", draw::escape_text(tooltip));
            }
            if let Some(link) = &edge.link {
                path = path.set("data-edge-link", draw::escape_text(link));
            }
        }

        output.add(RenderLayer::Edge, path);
    }

    render_annotations(routed, ctx, &mut output);
    output
}

/// Label and stereotype at the midpoint; end annotations at 15% and 85%.
fn render_annotations(
    routed: &RoutedEdge<'_>,
    ctx: &EdgeRenderContext<'_>,
    output: &mut LayeredOutput,
) {
    let edge = routed.edge();
    let points = routed.points();

    let mut midpoint_stack = AnnotationStack::new(point_along(points, 0.5));
    if let Some(label) = &edge.label {
        let position = midpoint_stack.next();
        render_label_background(label, position, ctx, output);
        output.add(
            RenderLayer::Annotation,
            draw::text_span(label, position, "sans-serif", ANNOTATION_FONT_SIZE, None),
        );
    }
    if let Some(stereotype) = &edge.stereotype {
        let decorated = format!("\u{ab}{stereotype}\u{bb}");
        output.add(
            RenderLayer::Annotation,
            draw::text_span(
                &decorated,
                midpoint_stack.next(),
                "sans-serif",
                ANNOTATION_FONT_SIZE,
                None,
            ),
        );
    }

    render_end_annotation(&edge.source, point_along(points, 0.15), output);
    render_end_annotation(&edge.target, point_along(points, 0.85), output);
}

fn render_end_annotation(annotation: &EndAnnotation, at: Point, output: &mut LayeredOutput) {
    let mut stack = AnnotationStack::new(at);
    if let Some(multiplicity) = &annotation.multiplicity {
        output.add(
            RenderLayer::Annotation,
            draw::text_span(
                multiplicity,
                stack.next(),
                "sans-serif",
                ANNOTATION_FONT_SIZE,
                None,
            ),
        );
    }
    if let Some(role) = &annotation.role {
        output.add(
            RenderLayer::Annotation,
            draw::text_span(role, stack.next(), "sans-serif", ANNOTATION_FONT_SIZE, None),
        );
    }
}

/// Stacks annotations upward from a path point, one step apart.
struct AnnotationStack {
    base: Point,
    level: usize,
}

impl AnnotationStack {
    fn new(base: Point) -> Self {
        Self { base, level: 0 }
    }

    fn next(&mut self) -> Point {
        let position = Point::new(
            self.base.x(),
            self.base.y() - 8.0 - STACK_STEP * self.level as f32,
        );
        self.level += 1;
        position
    }
}

/// White halo behind the main label for readability over the path.
fn render_label_background(
    label: &str,
    position: Point,
    ctx: &EdgeRenderContext<'_>,
    output: &mut LayeredOutput,
) {
    let size = ctx
        .measurer
        .measure(label, ANNOTATION_FONT_SIZE, "sans-serif");
    output.add(
        RenderLayer::Annotation,
        svg_element::Rectangle::new()
            .set("x", position.x() - size.width() / 2.0 - 4.0)
            .set("y", position.y() - size.height() / 2.0 - 2.0)
            .set("width", size.width() + 8.0)
            .set("height", size.height() + 4.0)
            .set("fill", "white")
            .set("fill-opacity", 0.8)
            .set("rx", 3),
    );
}

/// SVG path data for a routed polyline under the given routing style.
pub(super) fn path_data(points: &[Point], routing: RoutingStyle) -> String {
    match routing {
        RoutingStyle::Splines => smoothed_path_data(points),
        RoutingStyle::Straight | RoutingStyle::Orthogonal | RoutingStyle::Polyline => {
            polyline_path_data(points)
        }
    }
}

fn polyline_path_data(points: &[Point]) -> String {
    let mut data = String::new();
    for (index, point) in points.iter().enumerate() {
        let command = if index == 0 { 'M' } else { 'L' };
        data.push_str(&format!("{command} {} {} ", point.x(), point.y()));
    }
    data.trim_end().to_string()
}

/// Quadratic corner smoothing: each interior point becomes a rounded
/// corner, entered and left `SMOOTHING_RADIUS` away along its segments.
fn smoothed_path_data(points: &[Point]) -> String {
    if points.len() < 3 {
        return polyline_path_data(points);
    }

    let first = points[0];
    let mut data = format!("M {} {} ", first.x(), first.y());

    for window in points.windows(3) {
        let (previous, corner, next) = (window[0], window[1], window[2]);
        let entry = point_towards(corner, previous, SMOOTHING_RADIUS);
        let exit = point_towards(corner, next, SMOOTHING_RADIUS);
        data.push_str(&format!(
            "L {} {} Q {} {} {} {} ",
            entry.x(),
            entry.y(),
            corner.x(),
            corner.y(),
            exit.x(),
            exit.y()
        ));
    }

    let last = points[points.len() - 1];
    data.push_str(&format!("L {} {}", last.x(), last.y()));
    data
}

/// A point `distance` from `origin` toward `toward`, clamped to half the
/// segment so short segments do not overshoot.
fn point_towards(origin: Point, toward: Point, distance: f32) -> Point {
    let length = origin.distance_to(toward);
    if length <= f32::EPSILON {
        return origin;
    }
    origin.lerp(toward, (distance / length).min(0.5))
}

/// The perpendicular offset vector for a doubled edge.
///
/// The axis comes from comparing only the two endpoints' deltas, ignoring
/// intermediate routed points; long multi-segment doubles inherit that
/// quirk deliberately.
fn double_offset(points: &[Point]) -> Point {
    let first = points[0];
    let last = points[points.len() - 1];
    let dx = (last.x() - first.x()).abs();
    let dy = (last.y() - first.y()).abs();

    if dx >= dy {
        Point::new(0.0, DOUBLE_OFFSET)
    } else {
        Point::new(DOUBLE_OFFSET, 0.0)
    }
}

fn offset_points(points: &[Point], offset: Point) -> Vec<Point> {
    points.iter().map(|&point| point + offset).collect()
}
