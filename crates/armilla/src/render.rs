//! The rendering orchestrator.
//!
//! Walks the laid-out model and produces the final SVG document. Z-order is
//! enforced by the layered draw system: container backgrounds first, then
//! nodes (delegated to each shape capability), then edges, then edge
//! annotations. All generated def identifiers carry the configured document
//! prefix, and all user text passes through the escape chokepoint inside
//! the draw helpers.

mod edge;
mod markers;

use log::debug;
use svg::{
    Document,
    node::element as svg_element,
};

use armilla_core::{
    draw::{self, LayeredOutput, LinePattern, RenderLayer, StrokeDefinition},
    geometry::{Bounds, Point},
    registry::ShapeRegistry,
    shape::ShapeContext,
    text::TextMeasurer,
};

use crate::{
    ast::{DiagramAst, LineStyle},
    collapse::{ContainerRender, Visibility},
    config::CompileConfig,
    error::ArmillaError,
    graph::DiagramGraph,
    layout::LayoutResult,
    route::RoutedEdge,
};

/// Font size for container header labels; mirrors the layout engine's
/// header sizing.
const HEADER_FONT_SIZE: u16 = 13;

pub struct SvgRenderer<'a> {
    registry: &'a ShapeRegistry,
    measurer: &'a TextMeasurer,
    config: &'a CompileConfig,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(
        registry: &'a ShapeRegistry,
        measurer: &'a TextMeasurer,
        config: &'a CompileConfig,
    ) -> Self {
        Self {
            registry,
            measurer,
            config,
        }
    }

    /// Produces the final SVG document string.
    pub fn render(
        &self,
        ast: &DiagramAst,
        graph: &DiagramGraph<'_>,
        layout: &LayoutResult,
        visibility: &Visibility,
        routed: &[RoutedEdge<'_>],
    ) -> Result<String, ArmillaError> {
        let render_config = self.config.render();
        let strict = render_config.strict();
        let margin = render_config.margin();

        let content_bounds = content_bounds(layout, routed);
        let width = content_bounds.width() + 2.0 * margin;
        let height = content_bounds.height() + 2.0 * margin;

        let mut document = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(title) = &ast.title {
            document = document.set("aria-label", draw::escape_text(title));
        }

        if let Some(background) = render_config.background() {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", background),
            );
        }

        // Per-edge marker definitions, disambiguated by document prefix and
        // edge index.
        let mut defs = svg_element::Definitions::new();
        let mut marker_refs: Vec<(Option<String>, Option<String>)> =
            Vec::with_capacity(routed.len());
        for (index, routed_edge) in routed.iter().enumerate() {
            let style = ast.resolved_style(routed_edge.edge().style.as_deref());
            let markers = markers::markers_for_edge(
                routed_edge.edge(),
                &style.stroke,
                render_config.document_id(),
                index,
            );
            marker_refs.push((
                markers.start_ref().map(String::from),
                markers.end_ref().map(String::from),
            ));
            for marker in markers.into_defs() {
                defs = defs.add(marker);
            }
        }
        document = document.add(defs);

        let mut output = LayeredOutput::new();
        self.render_containers(ast, graph, layout, visibility, strict, &mut output);
        self.render_nodes(ast, layout, visibility, strict, &mut output)?;
        self.render_edges(ast, routed, &marker_refs, strict, &mut output);

        // One translation moves content space into the margined viewport.
        let offset = Point::new(
            margin - content_bounds.min_x(),
            margin - content_bounds.min_y(),
        );
        let mut content_group = svg_element::Group::new()
            .set("transform", format!("translate({}, {})", offset.x(), offset.y()));
        for node in output.render() {
            content_group = content_group.add(node);
        }
        document = document.add(content_group);

        debug!(nodes = layout.node_count(), edges = routed.len(); "Rendered SVG document");
        Ok(document.to_string())
    }

    /// Containers render in pre-order, so outer backgrounds sit under
    /// nested ones.
    fn render_containers(
        &self,
        ast: &DiagramAst,
        graph: &DiagramGraph<'_>,
        layout: &LayoutResult,
        visibility: &Visibility,
        strict: bool,
        output: &mut LayeredOutput,
    ) {
        for (index, container) in graph.containers().iter().enumerate() {
            let mode = visibility.container_mode(index);
            if mode == ContainerRender::Hidden {
                continue;
            }
            let Some(bounds) = layout.container_bounds(container.id()) else {
                continue;
            };
            let decl = container.decl();
            let style = ast.resolved_style(decl.style.as_deref());

            let mut group = svg_element::Group::new();
            if !strict {
                group = group.set("data-container-id", decl.id.clone());
                group = group.set(
                    "data-collapse-state",
                    match mode {
                        ContainerRender::Unit => "collapsed",
                        _ => "expanded",
                    },
                );
                // Opaque presentation hints for animating consumers.
                if let Some(duration) = decl.collapse.animation.duration_ms {
                    group = group.set("data-collapse-duration", duration);
                }
                if let Some(easing) = &decl.collapse.animation.easing {
                    group = group.set("data-collapse-easing", draw::escape_text(easing));
                }
            }

            let mut rect = svg_element::Rectangle::new()
                .set("x", bounds.min_x())
                .set("y", bounds.min_y())
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("rx", 6)
                .set("stroke", &style.stroke)
                .set("stroke-width", 1);
            rect = match &style.fill {
                Some(fill) => rect.set("fill", fill).set("fill-opacity", 0.35),
                None => rect.set("fill", "#f5f5f5").set("fill-opacity", 0.6),
            };
            group = group.add(rect);

            // Header label along the top edge.
            let header_center = Point::new(bounds.center().x(), bounds.min_y() + 14.0);
            group = group.add(draw::text_span(
                decl.display_label(),
                header_center,
                &style.font_family,
                HEADER_FONT_SIZE,
                style.text_color.as_ref(),
            ));

            // Collapse badge on units.
            if mode == ContainerRender::Unit {
                group = group.add(
                    svg_element::Text::new("+")
                        .set("x", bounds.max_x() - 12.0)
                        .set("y", bounds.min_y() + 16.0)
                        .set("text-anchor", "middle")
                        .set("font-family", style.font_family.clone())
                        .set("font-size", HEADER_FONT_SIZE),
                );
            }

            output.add(RenderLayer::Container, group);
        }
    }

    /// Nodes render in the AST's array order.
    fn render_nodes(
        &self,
        ast: &DiagramAst,
        layout: &LayoutResult,
        visibility: &Visibility,
        strict: bool,
        output: &mut LayeredOutput,
    ) -> Result<(), ArmillaError> {
        for node in &ast.nodes {
            let id = armilla_core::identifier::Id::new(&node.id);
            if visibility.is_node_hidden(id) {
                continue;
            }
            let Some(node_box) = layout.node_box(id) else {
                continue;
            };

            let resolution = self.registry.resolve(&node.shape).map_err(|err| {
                ArmillaError::Internal(format!(
                    "unvalidated shape reached rendering for node '{}': {err}",
                    node.id
                ))
            })?;
            let style = ast.resolved_style(node.style.as_deref());
            let ctx = ShapeContext::new(node.display_label(), &style, &node.data, self.measurer);

            let shape_output =
                resolution
                    .definition()
                    .render(&ctx, node_box.position(), node_box.size());

            let mut group = svg_element::Group::new();
            if !strict {
                group = group.set("data-node-id", node.id.clone());
                if let Some(group_id) = group_of(ast, &node.id) {
                    group = group.set("data-group", group_id.to_string());
                }
            }
            for (_, shape_node) in shape_output.into_items() {
                group = group.add(shape_node);
            }
            output.add(RenderLayer::Node, group);
        }

        Ok(())
    }

    fn render_edges(
        &self,
        ast: &DiagramAst,
        routed: &[RoutedEdge<'_>],
        marker_refs: &[(Option<String>, Option<String>)],
        strict: bool,
        output: &mut LayeredOutput,
    ) {
        for (index, routed_edge) in routed.iter().enumerate() {
            let edge_ast = routed_edge.edge();
            let style = ast.resolved_style(edge_ast.style.as_deref());
            let (marker_start, marker_end) = marker_refs[index].clone();

            let pattern = match edge_ast.line {
                LineStyle::Solid => LinePattern::Solid,
                LineStyle::Dashed => LinePattern::Dashed,
                LineStyle::Dotted => LinePattern::Dotted,
                LineStyle::Double => LinePattern::Double,
            };
            let stroke = StrokeDefinition::new(style.stroke.clone(), style.stroke_width, pattern);

            let ctx = edge::EdgeRenderContext {
                stroke,
                marker_start,
                marker_end,
                routing: ast.routing,
                strict,
                measurer: self.measurer,
            };
            output.merge(edge::render_edge(routed_edge, &ctx));
        }
    }
}

/// The first group claiming a node, in declaration order.
fn group_of<'a>(ast: &'a DiagramAst, node_id: &str) -> Option<&'a str> {
    ast.groups
        .iter()
        .find(|group| group.members.iter().any(|member| member == node_id))
        .map(|group| group.id.as_str())
}

/// Everything drawn: node boxes, container boxes, and routed points.
fn content_bounds(layout: &LayoutResult, routed: &[RoutedEdge<'_>]) -> Bounds {
    let mut bounds = layout.overall_bounds();
    for routed_edge in routed {
        for &point in routed_edge.points() {
            bounds = bounds.include(point);
        }
    }
    bounds
}
