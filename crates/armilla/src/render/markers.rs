//! Arrow marker definitions.
//!
//! Marker placement follows the semantic edge type: diamond markers
//! (aggregation hollow, composition filled) sit at the *source* end;
//! triangle markers (standard filled, hollow outlined, open chevron) sit at
//! the *target* end; an arrow kind of `none` suppresses markers entirely.
//!
//! Every marker id carries the document prefix and the edge index, so
//! several diagrams sharing one rendering context never collide.

use svg::node::element::{Marker, Path};

use armilla_core::color::Color;

use crate::ast::{ArrowKind, EdgeAst, EdgeKind};

/// The marker references and definitions for one edge instance.
pub struct EdgeMarkers {
    start: Option<String>,
    end: Option<String>,
    defs: Vec<Marker>,
}

impl EdgeMarkers {
    /// `url(#...)` reference for the source end, if any.
    pub fn start_ref(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// `url(#...)` reference for the target end, if any.
    pub fn end_ref(&self) -> Option<&str> {
        self.end.as_deref()
    }

    /// The `<marker>` definitions to place in the document's `<defs>`.
    pub fn into_defs(self) -> Vec<Marker> {
        self.defs
    }
}

/// Builds the markers one edge needs.
pub fn markers_for_edge(
    edge: &EdgeAst,
    color: &Color,
    document_id: &str,
    edge_index: usize,
) -> EdgeMarkers {
    if edge.arrow == ArrowKind::None {
        return EdgeMarkers {
            start: None,
            end: None,
            defs: Vec::new(),
        };
    }

    let mut defs = Vec::new();

    let end = {
        let id = format!("{document_id}-e{edge_index}-head");
        let marker = match edge.arrow {
            ArrowKind::Standard => triangle_filled(&id, color),
            ArrowKind::Hollow => triangle_hollow(&id, color),
            ArrowKind::Open => chevron_open(&id, color),
            ArrowKind::None => unreachable!("handled above"),
        };
        defs.push(marker);
        Some(format!("url(#{id})"))
    };

    let start = match edge.kind {
        Some(EdgeKind::Aggregation) => {
            let id = format!("{document_id}-e{edge_index}-tail");
            defs.push(diamond(&id, color, false));
            Some(format!("url(#{id})"))
        }
        Some(EdgeKind::Composition) => {
            let id = format!("{document_id}-e{edge_index}-tail");
            defs.push(diamond(&id, color, true));
            Some(format!("url(#{id})"))
        }
        Some(EdgeKind::Dependency) | Some(EdgeKind::Association) | None => None,
    };

    EdgeMarkers { start, end, defs }
}

fn marker_base(id: &str, ref_x: f32) -> Marker {
    Marker::new()
        .set("id", id)
        .set("viewBox", "0 0 10 10")
        .set("refX", ref_x)
        .set("refY", 5)
        .set("markerWidth", 8)
        .set("markerHeight", 8)
        .set("orient", "auto")
}

/// Filled triangle for the `standard` arrow.
fn triangle_filled(id: &str, color: &Color) -> Marker {
    marker_base(id, 9.0).add(
        Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10 z")
            .set("fill", color),
    )
}

/// Outlined triangle for the `hollow` arrow.
fn triangle_hollow(id: &str, color: &Color) -> Marker {
    marker_base(id, 9.0).add(
        Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10 z")
            .set("fill", "white")
            .set("stroke", color)
            .set("stroke-width", 1),
    )
}

/// Unfilled chevron for the `open` arrow.
fn chevron_open(id: &str, color: &Color) -> Marker {
    marker_base(id, 9.0).add(
        Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10")
            .set("fill", "none")
            .set("stroke", color)
            .set("stroke-width", 1.5),
    )
}

/// Diamond for the aggregation/composition source end.
fn diamond(id: &str, color: &Color, filled: bool) -> Marker {
    let path = Path::new().set("d", "M 0 5 L 5 1 L 10 5 L 5 9 z");
    let path = if filled {
        path.set("fill", color)
    } else {
        path.set("fill", "white").set("stroke", color).set("stroke-width", 1)
    };
    marker_base(id, 1.0).add(path)
}
