//! Z-ordered collection of SVG nodes.
//!
//! The rendering orchestrator draws container backgrounds first, then nodes,
//! then edges, then edge annotations. Rather than relying on call order,
//! every producer states the layer its nodes belong to and the final sort
//! enforces the z-order.

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
///
/// The `Ord` derive uses declaration order: the first variant renders first
/// (bottom of the stack), the last renders last (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Container background boxes and their header labels.
    Container,
    /// Node shapes and node labels.
    Node,
    /// Edge paths and arrow markers.
    Edge,
    /// Edge labels, stereotypes, multiplicities, and roles.
    Annotation,
}

impl RenderLayer {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Node => "node",
            Self::Edge => "edge",
            Self::Annotation => "annotation",
        }
    }
}

/// SVG nodes grouped by rendering layer.
///
/// Nodes within one layer keep their insertion order; the sort across layers
/// is stable.
#[derive(Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single node to the specified layer.
    pub fn add(&mut self, layer: RenderLayer, node: impl svg::Node + 'static) {
        self.items.push((layer, Box::new(node)));
    }

    /// Adds an already-boxed node to the specified layer.
    pub fn add_boxed(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Appends all nodes from another output, preserving their layers.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consumes the output, yielding `(layer, node)` pairs in insertion order.
    ///
    /// Used by the orchestrator to wrap one element's nodes in a group
    /// carrying its identity attributes before re-layering.
    pub fn into_items(self) -> Vec<(RenderLayer, SvgNode)> {
        self.items
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes a `<g data-layer="...">` element; layers
    /// are emitted bottom to top.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        // Stable sort keeps insertion order within a layer.
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }
            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);
        result
    }
}
