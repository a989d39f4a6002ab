//! The layout engine: assigns a position and size to every visible node and
//! container.
//!
//! Containers are laid out bottom-up. Each scope (the diagram root or a
//! container body) sizes its members first: nodes ask their shape
//! capability for bounds, child containers recurse. The scope's placement
//! algorithm then positions the members in a local frame, the frame is
//! normalized to its bounding box, and the container is sized to that box
//! plus padding and header, becoming an opaque unit one level up. A final
//! top-down pass converts the nested frames into absolute coordinates.

pub mod engines;

use std::collections::HashMap;

use log::debug;
use petgraph::graph::NodeIndex;

use armilla_core::{
    geometry::{Bounds, Insets, Point, Size},
    identifier::Id,
    registry::ShapeRegistry,
    shape::{NamedAnchor, ShapeContext},
    text::TextMeasurer,
};

use crate::{
    ast::{DiagramAst, Direction, LayoutAlgorithm, LayoutOptions},
    collapse::{ContainerRender, Visibility},
    config::CompileConfig,
    error::ArmillaError,
    graph::DiagramGraph,
    layout::engines::{Item, PlacementOptions},
};

/// Font size used for container header labels.
const HEADER_FONT_SIZE: u16 = 13;

/// Gap between a container's header text and its content area.
const HEADER_GAP: f32 = 6.0;

/// Minimum size of a collapsed container unit.
const MIN_UNIT_SIZE: Size = Size::new(80.0, 44.0);

/// Geometry of one laid-out node; `position` is the center.
#[derive(Debug, Clone, Copy)]
pub struct NodeBox {
    position: Point,
    size: Size,
}

impl NodeBox {
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Left edge.
    pub fn x(&self) -> f32 {
        self.position.x() - self.size.width() / 2.0
    }

    /// Top edge.
    pub fn y(&self) -> f32 {
        self.position.y() - self.size.height() / 2.0
    }

    pub fn width(&self) -> f32 {
        self.size.width()
    }

    pub fn height(&self) -> f32 {
        self.size.height()
    }

    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }
}

/// Geometric output of the layout engine.
#[derive(Debug, Default)]
pub struct LayoutResult {
    nodes: HashMap<Id, NodeBox>,
    containers: HashMap<Id, Bounds>,
    anchors: HashMap<Id, Vec<NamedAnchor>>,
}

impl LayoutResult {
    pub fn node_box(&self, id: Id) -> Option<&NodeBox> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn container_bounds(&self, id: Id) -> Option<Bounds> {
        self.containers.get(&id).copied()
    }

    /// The node's anchor set, resolved once per layout pass.
    pub fn anchors_for(&self, id: Id) -> Option<&[NamedAnchor]> {
        self.anchors.get(&id).map(Vec::as_slice)
    }

    /// The bounding box of everything placed.
    pub fn overall_bounds(&self) -> Bounds {
        let mut bounds: Option<Bounds> = None;
        for node_box in self.nodes.values() {
            bounds = Some(match bounds {
                Some(current) => current.merge(node_box.bounds()),
                None => node_box.bounds(),
            });
        }
        for &container in self.containers.values() {
            bounds = Some(match bounds {
                Some(current) => current.merge(container),
                None => container,
            });
        }
        bounds.unwrap_or_default()
    }
}

/// Spacing and algorithm selection effective for one scope, after merging
/// container overrides over the inherited values.
#[derive(Debug, Clone, Copy)]
struct EffectiveOptions {
    algorithm: LayoutAlgorithm,
    direction: Direction,
    node_spacing: f32,
    layer_spacing: f32,
    edge_spacing: f32,
    padding: f32,
}

impl EffectiveOptions {
    fn from_config(ast: &DiagramAst, config: &CompileConfig) -> Self {
        let spacing = config.spacing();
        Self {
            algorithm: config.default_algorithm(),
            direction: ast.direction,
            node_spacing: spacing.node_spacing(),
            layer_spacing: spacing.layer_spacing(),
            edge_spacing: spacing.edge_spacing(),
            padding: spacing.container_padding(),
        }
    }

    fn apply(&self, options: &LayoutOptions) -> Self {
        Self {
            algorithm: options.algorithm.unwrap_or(self.algorithm),
            direction: options.direction.unwrap_or(self.direction),
            node_spacing: options.node_spacing.unwrap_or(self.node_spacing),
            layer_spacing: options.layer_spacing.unwrap_or(self.layer_spacing),
            edge_spacing: self.edge_spacing,
            padding: options.padding.unwrap_or(self.padding),
        }
    }
}

/// A member of one scope during placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Member {
    Node(NodeIndex),
    Container(usize),
}

/// A scope's members positioned in its local content frame.
struct ScopeFrame {
    members: Vec<(Member, Point)>,
    content_size: Size,
}

/// Box geometry of one laid-out container.
struct ContainerLayout {
    size: Size,
    /// Offset from the box's top-left corner to the content frame origin.
    content_offset: Point,
}

pub struct LayoutEngine<'a> {
    registry: &'a ShapeRegistry,
    measurer: &'a TextMeasurer,
    config: &'a CompileConfig,
}

impl<'a> LayoutEngine<'a> {
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

    /// Computes the full layout for one diagram.
    pub fn compute(
        &self,
        ast: &DiagramAst,
        graph: &DiagramGraph<'_>,
        visibility: &Visibility,
    ) -> Result<LayoutResult, ArmillaError> {
        let mut result = LayoutResult::default();
        let mut state = State {
            node_sizes: HashMap::new(),
            frames: (0..=graph.containers().len()).map(|_| None).collect(),
            container_layouts: (0..graph.containers().len()).map(|_| None).collect(),
        };

        self.size_nodes(ast, graph, visibility, &mut state, &mut result)?;

        let root_options = EffectiveOptions::from_config(ast, self.config);
        let content_size = self.layout_scope(graph, visibility, None, &root_options, &mut state);
        debug!(
            width = content_size.width(),
            height = content_size.height();
            "Root scope laid out"
        );

        self.absolutize(graph, visibility, &state, None, Point::default(), &mut result);
        Ok(result)
    }

    /// Resolves each visible node's shape bounds and anchors, once per pass.
    fn size_nodes(
        &self,
        ast: &DiagramAst,
        graph: &DiagramGraph<'_>,
        visibility: &Visibility,
        state: &mut State,
        result: &mut LayoutResult,
    ) -> Result<(), ArmillaError> {
        for index in graph.node_indices() {
            let node = graph.node(index);
            let id = graph.node_id(index);
            if visibility.is_node_hidden(id) {
                continue;
            }

            let resolution = self.registry.resolve(&node.shape).map_err(|err| {
                ArmillaError::Internal(format!(
                    "unvalidated shape reached layout for node '{}': {err}",
                    node.id
                ))
            })?;
            let definition = resolution.definition();

            let style = ast.resolved_style(node.style.as_deref());
            let ctx = ShapeContext::new(node.display_label(), &style, &node.data, self.measurer);
            let size = definition.bounds(&ctx).max(definition.min_size());
            if !size.is_positive() {
                return Err(ArmillaError::Internal(format!(
                    "shape '{}' returned non-positive bounds for node '{}'",
                    node.shape, node.id
                )));
            }

            state.node_sizes.insert(index, size);
            result.anchors.insert(id, definition.anchors(&ctx));
        }

        Ok(())
    }

    /// Lays out one scope's members in a local frame; returns the content
    /// size. Child containers are sized first (recursively), so this is the
    /// bottom-up half of the pass.
    fn layout_scope(
        &self,
        graph: &DiagramGraph<'_>,
        visibility: &Visibility,
        container: Option<usize>,
        options: &EffectiveOptions,
        state: &mut State,
    ) -> Size {
        let scope = graph.scope(container);

        let mut members: Vec<Member> = Vec::new();
        let mut items: Vec<Item> = Vec::new();

        for index in scope.node_indices() {
            if let Some(&size) = state.node_sizes.get(&index) {
                members.push(Member::Node(index));
                items.push(Item::new(size));
            }
        }

        for child in scope.child_containers() {
            let size = match visibility.container_mode(child) {
                ContainerRender::Hidden => continue,
                ContainerRender::Unit => {
                    let size = self.unit_size(graph, child);
                    state.container_layouts[child] = Some(ContainerLayout {
                        size,
                        content_offset: Point::default(),
                    });
                    size
                }
                ContainerRender::Body => {
                    let decl = graph.container(child).decl();
                    let child_options = options.apply(&decl.layout);
                    let content = self.layout_scope(
                        graph,
                        visibility,
                        Some(child),
                        &child_options,
                        state,
                    );
                    let layout = self.container_box(graph, child, content, &child_options);
                    let size = layout.size;
                    state.container_layouts[child] = Some(layout);
                    size
                }
            };
            members.push(Member::Container(child));
            items.push(Item::new(size));
        }

        let member_index: HashMap<Member, usize> = members
            .iter()
            .enumerate()
            .map(|(position, &member)| (member, position))
            .collect();

        let (edges, has_labeled_edge, max_label_height) =
            self.scope_adjacency(graph, container, &member_index);

        // Room for edge labels between ranks, the way label width widens
        // layer gaps in hierarchical layouts.
        let mut layer_spacing = options.layer_spacing;
        if has_labeled_edge {
            layer_spacing += max_label_height + options.edge_spacing;
        }

        let placement_options = PlacementOptions {
            node_spacing: options.node_spacing,
            layer_spacing,
            max_iterations: self.config.max_layout_iterations(),
        };
        let positions = engines::place(
            options.algorithm,
            options.direction,
            &items,
            &edges,
            &placement_options,
        );

        // Normalize the frame so its bounding box starts at the origin.
        let mut frame_bounds: Option<Bounds> = None;
        for (position, item) in positions.iter().zip(&items) {
            let bounds = position.to_bounds(item.size);
            frame_bounds = Some(match frame_bounds {
                Some(current) => current.merge(bounds),
                None => bounds,
            });
        }
        let frame_bounds = frame_bounds.unwrap_or_default();
        let shift = frame_bounds.min_point();

        let frame = ScopeFrame {
            members: members
                .into_iter()
                .zip(positions)
                .map(|(member, position)| (member, position - shift))
                .collect(),
            content_size: frame_bounds.to_size(),
        };
        let content_size = frame.content_size;
        state.frames[scope_slot(container)] = Some(frame);

        content_size
    }

    /// Projects graph edges onto scope members: an endpoint inside a child
    /// container maps to that container's box. Returns the adjacency plus
    /// what edge labels demand of the layer spacing.
    fn scope_adjacency(
        &self,
        graph: &DiagramGraph<'_>,
        container: Option<usize>,
        member_index: &HashMap<Member, usize>,
    ) -> (Vec<(usize, usize)>, bool, f32) {
        let mut edges = Vec::new();
        let mut has_labeled_edge = false;
        let mut max_label_height = 0.0f32;

        for (_, source, target, edge) in graph.edges() {
            let Some(source_member) = self.member_for(graph, container, source, member_index)
            else {
                continue;
            };
            let Some(target_member) = self.member_for(graph, container, target, member_index)
            else {
                continue;
            };
            if source_member == target_member {
                continue;
            }
            edges.push((source_member, target_member));

            if let Some(label) = &edge.label {
                has_labeled_edge = true;
                let height = self.measurer.measure(label, 12, "sans-serif").height();
                max_label_height = max_label_height.max(height);
            }
        }

        (edges, has_labeled_edge, max_label_height)
    }

    /// The scope member representing `node`: the node itself when it lives
    /// directly in this scope, or the child container whose subtree holds it.
    fn member_for(
        &self,
        graph: &DiagramGraph<'_>,
        container: Option<usize>,
        node: NodeIndex,
        member_index: &HashMap<Member, usize>,
    ) -> Option<usize> {
        let owner = graph.container_of_node(graph.node_id(node));
        if owner == container {
            return member_index.get(&Member::Node(node)).copied();
        }

        let owner = owner?;
        for ancestor in graph.ancestors(owner) {
            if graph.container(ancestor).parent() == container {
                return member_index.get(&Member::Container(ancestor)).copied();
            }
        }
        None
    }

    /// Sizes an expanded container's box around its content.
    fn container_box(
        &self,
        graph: &DiagramGraph<'_>,
        container: usize,
        content: Size,
        options: &EffectiveOptions,
    ) -> ContainerLayout {
        let decl = graph.container(container).decl();
        let header = self.header_height(decl.display_label());
        let insets = Insets::uniform(options.padding).with_top(options.padding + header);

        let mut size = content.add_padding(insets);
        let layout = &decl.layout;
        if let Some(min_width) = layout.min_width {
            size = size.max(Size::new(min_width, 0.0));
        }
        if let Some(min_height) = layout.min_height {
            size = size.max(Size::new(0.0, min_height));
        }
        if let Some(max_width) = layout.max_width {
            size = Size::new(size.width().min(max_width), size.height());
        }
        if let Some(max_height) = layout.max_height {
            size = Size::new(size.width(), size.height().min(max_height));
        }

        // Clamps can leave slack; center the content inside it.
        let padded = content.add_padding(insets);
        let content_offset = Point::new(
            insets.left() + (size.width() - padded.width()) / 2.0,
            insets.top() + (size.height() - padded.height()) / 2.0,
        );

        ContainerLayout {
            size,
            content_offset,
        }
    }

    /// The box of a collapsed container unit: header label only.
    fn unit_size(&self, graph: &DiagramGraph<'_>, container: usize) -> Size {
        let decl = graph.container(container).decl();
        self.measurer
            .measure(decl.display_label(), HEADER_FONT_SIZE, "sans-serif")
            .add_padding(Insets::uniform(12.0))
            .max(MIN_UNIT_SIZE)
    }

    fn header_height(&self, label: &str) -> f32 {
        self.measurer
            .measure(label, HEADER_FONT_SIZE, "sans-serif")
            .height()
            + HEADER_GAP
    }

    /// Top-down pass converting nested local frames into absolute geometry.
    fn absolutize(
        &self,
        graph: &DiagramGraph<'_>,
        visibility: &Visibility,
        state: &State,
        container: Option<usize>,
        origin: Point,
        result: &mut LayoutResult,
    ) {
        let Some(frame) = &state.frames[scope_slot(container)] else {
            return;
        };

        for &(member, relative) in &frame.members {
            let center = origin + relative;
            match member {
                Member::Node(index) => {
                    let size = state.node_sizes[&index];
                    result.nodes.insert(
                        graph.node_id(index),
                        NodeBox {
                            position: center,
                            size,
                        },
                    );
                }
                Member::Container(child) => {
                    let Some(layout) = &state.container_layouts[child] else {
                        continue;
                    };
                    let bounds = center.to_bounds(layout.size);
                    result
                        .containers
                        .insert(graph.container(child).id(), bounds);

                    if visibility.container_mode(child) == ContainerRender::Body {
                        let child_origin = bounds.min_point() + layout.content_offset;
                        self.absolutize(graph, visibility, state, Some(child), child_origin, result);
                    }
                }
            }
        }
    }
}

struct State {
    node_sizes: HashMap<NodeIndex, Size>,
    frames: Vec<Option<ScopeFrame>>,
    container_layouts: Vec<Option<ContainerLayout>>,
}

fn scope_slot(container: Option<usize>) -> usize {
    container.map(|index| index + 1).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ContainerDecl, EdgeAst, NodeAst};
    use crate::collapse::CollapseStore;

    fn node(id: &str) -> NodeAst {
        NodeAst {
            id: id.to_string(),
            ..NodeAst::default()
        }
    }

    fn edge(from: &str, to: &str) -> EdgeAst {
        EdgeAst {
            from: from.to_string(),
            to: to.to_string(),
            ..EdgeAst::default()
        }
    }

    fn compute(ast: &DiagramAst) -> LayoutResult {
        let registry = ShapeRegistry::with_builtins();
        let measurer = TextMeasurer::new();
        let config = CompileConfig::default();
        let graph = DiagramGraph::build(ast).unwrap();
        let visibility = Visibility::compute(&graph, &CollapseStore::new());
        LayoutEngine::new(&registry, &measurer, &config)
            .compute(ast, &graph, &visibility)
            .unwrap()
    }

    #[test]
    fn every_node_gets_a_box() {
        let ast = DiagramAst {
            nodes: vec![node("a"), node("b"), node("c")],
            edges: vec![edge("a", "b"), edge("b", "c")],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        assert_eq!(layout.node_count(), 3);
        for id in ["a", "b", "c"] {
            let node_box = layout.node_box(Id::new(id)).unwrap();
            assert!(node_box.width() > 0.0 && node_box.height() > 0.0);
        }
    }

    #[test]
    fn tb_chain_separates_ranks_by_layer_spacing() {
        let ast = DiagramAst {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("a", "b")],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        let a = layout.node_box(Id::new("a")).unwrap();
        let b = layout.node_box(Id::new("b")).unwrap();
        assert!(a.y() + a.height() + 80.0 <= b.y() + 0.01);
    }

    #[test]
    fn container_bounds_contain_member_boxes() {
        let ast = DiagramAst {
            nodes: vec![node("a"), node("b"), node("out")],
            containers: vec![ContainerDecl {
                id: String::from("group"),
                children: vec![String::from("a"), String::from("b")],
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        let bounds = layout.container_bounds(Id::new("group")).unwrap();
        for id in ["a", "b"] {
            let node_box = layout.node_box(Id::new(id)).unwrap();
            assert!(
                bounds.contains_bounds(node_box.bounds()),
                "{id} escapes its container"
            );
        }
        // Padding separates members from the boundary.
        let a = layout.node_box(Id::new("a")).unwrap();
        assert!(a.y() - bounds.min_y() >= 20.0);
    }

    #[test]
    fn nested_containers_nest_geometrically() {
        let ast = DiagramAst {
            nodes: vec![node("deep")],
            containers: vec![ContainerDecl {
                id: String::from("outer"),
                containers: vec![ContainerDecl {
                    id: String::from("inner"),
                    children: vec![String::from("deep")],
                    ..ContainerDecl::default()
                }],
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        let outer = layout.container_bounds(Id::new("outer")).unwrap();
        let inner = layout.container_bounds(Id::new("inner")).unwrap();
        assert!(outer.contains_bounds(inner));
        let deep = layout.node_box(Id::new("deep")).unwrap();
        assert!(inner.contains_bounds(deep.bounds()));
    }

    #[test]
    fn min_width_clamp_is_respected() {
        let ast = DiagramAst {
            nodes: vec![node("a")],
            containers: vec![ContainerDecl {
                id: String::from("wide"),
                children: vec![String::from("a")],
                layout: LayoutOptions {
                    min_width: Some(500.0),
                    ..LayoutOptions::default()
                },
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        let bounds = layout.container_bounds(Id::new("wide")).unwrap();
        assert!(bounds.width() >= 500.0);
    }

    #[test]
    fn anchors_are_recorded_per_node() {
        let ast = DiagramAst {
            nodes: vec![node("a")],
            ..DiagramAst::default()
        };
        let layout = compute(&ast);
        let anchors = layout.anchors_for(Id::new("a")).unwrap();
        assert_eq!(anchors.len(), 4);
    }

    #[test]
    fn empty_diagram_has_empty_bounds() {
        let layout = compute(&DiagramAst::default());
        assert_eq!(layout.node_count(), 0);
        assert_eq!(layout.overall_bounds().to_size(), Size::default());
    }

    #[test]
    fn collapsed_container_children_are_not_placed() {
        let mut store = CollapseStore::new();
        store.set("group", crate::collapse::CollapseState::Collapsed);

        let ast = DiagramAst {
            nodes: vec![node("a"), node("b")],
            containers: vec![ContainerDecl {
                id: String::from("group"),
                children: vec![String::from("a")],
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let registry = ShapeRegistry::with_builtins();
        let measurer = TextMeasurer::new();
        let config = CompileConfig::default();
        let graph = DiagramGraph::build(&ast).unwrap();
        let visibility = Visibility::compute(&graph, &store);
        let layout = LayoutEngine::new(&registry, &measurer, &config)
            .compute(&ast, &graph, &visibility)
            .unwrap();

        assert!(layout.node_box(Id::new("a")).is_none());
        assert!(layout.node_box(Id::new("b")).is_some());
        // The collapsed unit still has a box for edge redirection.
        assert!(layout.container_bounds(Id::new("group")).is_some());
    }
}
