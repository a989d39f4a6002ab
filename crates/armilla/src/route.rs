//! Anchor resolution and edge routing.
//!
//! Turns each surviving logical edge into an ordered point sequence. Steps
//! per edge: resolve port addressing to a base node, substitute collapsed
//! container boundaries for hidden endpoints, pick anchors (the explicitly
//! named one, or the nearest pair), then shape the path per the routing
//! style. `polyline` and `splines` share the orthogonal geometry; smoothing
//! is a rendering concern, not a routing one.
//!
//! Edges that cannot produce at least two distinct points are dropped with
//! a warning, never rendered as degenerate paths.

use log::trace;

use armilla_core::{
    geometry::Point,
    identifier::Id,
    shape::NamedAnchor,
};

use crate::{
    ast::{EdgeAst, EndpointRef, RoutingStyle},
    collapse::Visibility,
    graph::DiagramGraph,
    layout::LayoutResult,
    validate::Diagnostic,
};

/// Geometric result of routing one edge.
pub struct RoutedEdge<'a> {
    edge: &'a EdgeAst,
    from: Id,
    to: Id,
    points: Vec<Point>,
}

impl<'a> RoutedEdge<'a> {
    pub fn edge(&self) -> &'a EdgeAst {
        self.edge
    }

    /// The resolved source element: the node, or the collapsed container
    /// boundary it was redirected to.
    pub fn from(&self) -> Id {
        self.from
    }

    pub fn to(&self) -> Id {
        self.to
    }

    /// At least two points; the first and last lie on the resolved anchors.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Everything the router produced for one diagram.
#[derive(Default)]
pub struct RouteOutcome<'a> {
    pub edges: Vec<RoutedEdge<'a>>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

/// One resolved endpoint: an element's center plus its anchor set.
struct EndpointTarget {
    id: Id,
    center: Point,
    anchors: Vec<NamedAnchor>,
    /// Set when the endpoint was redirected to a container boundary; the
    /// original port name no longer applies there.
    redirected: bool,
}

pub struct Router<'a> {
    layout: &'a LayoutResult,
    visibility: &'a Visibility,
    style: RoutingStyle,
}

impl<'a> Router<'a> {
    pub fn new(layout: &'a LayoutResult, visibility: &'a Visibility, style: RoutingStyle) -> Self {
        Self {
            layout,
            visibility,
            style,
        }
    }

    /// Routes every surviving edge; diagnostics accumulate instead of
    /// stopping at the first problem.
    pub fn route<'b>(&self, graph: &DiagramGraph<'b>) -> RouteOutcome<'b> {
        let mut outcome = RouteOutcome::default();

        for (_, _, _, edge) in graph.edges() {
            self.route_edge(edge, &mut outcome);
        }

        outcome
    }

    fn route_edge<'b>(&self, edge: &'b EdgeAst, outcome: &mut RouteOutcome<'b>) {
        let Some(source) = self.resolve_endpoint(edge, &edge.from, outcome) else {
            return;
        };
        let Some(target) = self.resolve_endpoint(edge, &edge.to, outcome) else {
            return;
        };

        // Both ends swallowed by the same collapsed container: the edge is
        // internal to the unit and vanishes with its content.
        if source.redirected && target.redirected && source.id == target.id {
            trace!(from = edge.from, to = edge.to; "Edge internal to a collapsed container");
            return;
        }

        let Some((start, end)) = self.pick_anchors(edge, &source, &target, outcome) else {
            return;
        };

        let points = self.apply_style(start, end);
        if points.len() < 2 || start.distance_to(end) < f32::EPSILON {
            outcome.warnings.push(Diagnostic::new(format!(
                "edge '{}' -> '{}' produced insufficient routed points; edge dropped",
                edge.from, edge.to
            )));
            return;
        }

        outcome.edges.push(RoutedEdge {
            edge,
            from: source.id,
            to: target.id,
            points,
        });
    }

    fn resolve_endpoint(
        &self,
        edge: &EdgeAst,
        raw: &str,
        outcome: &mut RouteOutcome<'_>,
    ) -> Option<EndpointTarget> {
        let endpoint = EndpointRef::parse(raw);
        let id = Id::new(endpoint.node());

        if self.visibility.is_node_hidden(id) {
            // A collapsed container absorbs the endpoint when redirection
            // is enabled; otherwise the edge cannot surface anywhere.
            let Some(container) = self.visibility.redirect_target(id) else {
                outcome.warnings.push(Diagnostic::new(format!(
                    "edge '{}' -> '{}' targets '{}' which is hidden by a collapsed container; edge dropped",
                    edge.from,
                    edge.to,
                    endpoint.node()
                )));
                return None;
            };
            let bounds = self.layout.container_bounds(container)?;
            return Some(EndpointTarget {
                id: container,
                center: bounds.center(),
                anchors: NamedAnchor::box_anchors(bounds.to_size()),
                redirected: true,
            });
        }

        let Some(node_box) = self.layout.node_box(id) else {
            outcome.warnings.push(Diagnostic::new(format!(
                "edge '{}' -> '{}' references non-existent node: {}",
                edge.from,
                edge.to,
                endpoint.node()
            )));
            return None;
        };

        let anchors = self
            .layout
            .anchors_for(id)
            .map(<[NamedAnchor]>::to_vec)
            .unwrap_or_else(|| NamedAnchor::box_anchors(node_box.size()));

        Some(EndpointTarget {
            id,
            center: node_box.position(),
            anchors,
            redirected: false,
        })
    }

    /// Picks the anchor on each endpoint: an explicitly named port is used
    /// exactly (missing names are errors), otherwise the pair minimizing
    /// the straight-line distance wins, ties resolved by anchor order.
    fn pick_anchors(
        &self,
        edge: &EdgeAst,
        source: &EndpointTarget,
        target: &EndpointTarget,
        outcome: &mut RouteOutcome<'_>,
    ) -> Option<(Point, Point)> {
        let source_port = EndpointRef::parse(&edge.from)
            .port()
            .filter(|_| !source.redirected);
        let target_port = EndpointRef::parse(&edge.to)
            .port()
            .filter(|_| !target.redirected);

        let source_fixed = match source_port {
            Some(port) => Some(self.named_anchor(edge, source, port, outcome)?),
            None => None,
        };
        let target_fixed = match target_port {
            Some(port) => Some(self.named_anchor(edge, target, port, outcome)?),
            None => None,
        };

        let source_candidates: Vec<Point> = match source_fixed {
            Some(point) => vec![point],
            None => source
                .anchors
                .iter()
                .map(|anchor| anchor.resolve(source.center))
                .collect(),
        };
        let target_candidates: Vec<Point> = match target_fixed {
            Some(point) => vec![point],
            None => target
                .anchors
                .iter()
                .map(|anchor| anchor.resolve(target.center))
                .collect(),
        };

        let mut best: Option<(f32, Point, Point)> = None;
        for &start in &source_candidates {
            for &end in &target_candidates {
                let distance = start.distance_to(end);
                if best.is_none_or(|(current, _, _)| distance < current) {
                    best = Some((distance, start, end));
                }
            }
        }

        best.map(|(_, start, end)| (start, end))
    }

    fn named_anchor(
        &self,
        edge: &EdgeAst,
        endpoint: &EndpointTarget,
        port: &str,
        outcome: &mut RouteOutcome<'_>,
    ) -> Option<Point> {
        match endpoint
            .anchors
            .iter()
            .find(|anchor| anchor.name() == port)
        {
            Some(anchor) => Some(anchor.resolve(endpoint.center)),
            None => {
                outcome.errors.push(Diagnostic::new(format!(
                    "edge '{}' -> '{}' names anchor '{port}' which does not exist on '{}'",
                    edge.from, edge.to, endpoint.id
                )));
                None
            }
        }
    }

    fn apply_style(&self, start: Point, end: Point) -> Vec<Point> {
        match self.style {
            RoutingStyle::Straight => vec![start, end],
            // Polyline and splines share the orthogonal skeleton; the
            // renderer smooths them.
            RoutingStyle::Orthogonal | RoutingStyle::Polyline | RoutingStyle::Splines => {
                orthogonal_points(start, end)
            }
        }
    }
}

/// The single-elbow orthogonal path: horizontal-first when the horizontal
/// displacement dominates, vertical-first otherwise (including ties).
fn orthogonal_points(start: Point, end: Point) -> Vec<Point> {
    let dx = end.x() - start.x();
    let dy = end.y() - start.y();

    if dx == 0.0 || dy == 0.0 {
        return vec![start, end];
    }

    let elbow = if dx.abs() > dy.abs() {
        Point::new(end.x(), start.y())
    } else {
        Point::new(start.x(), end.y())
    };
    vec![start, elbow, end]
}
