//! Graph structure for one diagram.
//!
//! Builds a petgraph [`DiGraph`] over the AST's nodes and surviving edges,
//! plus the flattened container forest and the per-scope membership the
//! layout engine walks bottom-up. Edges whose endpoints do not resolve are
//! left out here; the validator has already warned about them.

use std::collections::HashMap;

use log::{debug, trace};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};

use armilla_core::identifier::Id;

use crate::{
    ast::{ContainerDecl, DiagramAst, EdgeAst, EndpointRef, NodeAst},
    error::ArmillaError,
    validate::MAX_CONTAINER_DEPTH,
};

/// One container in the flattened forest.
pub struct ContainerInfo<'a> {
    decl: &'a ContainerDecl,
    parent: Option<usize>,
    depth: usize,
}

impl<'a> ContainerInfo<'a> {
    pub fn decl(&self) -> &'a ContainerDecl {
        self.decl
    }

    pub fn id(&self) -> Id {
        Id::new(&self.decl.id)
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// The members of one layout scope: the diagram root or a container body.
pub struct Scope {
    container: Option<usize>,
    nodes: Vec<NodeIndex>,
    child_containers: Vec<usize>,
}

impl Scope {
    /// The owning container's index, or `None` for the diagram root.
    pub fn container(&self) -> Option<usize> {
        self.container
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes.iter().copied()
    }

    pub fn child_containers(&self) -> impl Iterator<Item = usize> + '_ {
        self.child_containers.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.child_containers.is_empty()
    }
}

/// Graph representation of a single diagram.
pub struct DiagramGraph<'a> {
    graph: DiGraph<&'a NodeAst, &'a EdgeAst>,
    node_index: HashMap<Id, NodeIndex>,
    containers: Vec<ContainerInfo<'a>>,
    /// `scopes[0]` is the diagram root; `scopes[i + 1]` belongs to
    /// `containers[i]`.
    scopes: Vec<Scope>,
    node_container: HashMap<Id, usize>,
}

impl<'a> DiagramGraph<'a> {
    pub fn build(ast: &'a DiagramAst) -> Result<Self, ArmillaError> {
        let mut graph = DiGraph::new();
        let mut node_index = HashMap::with_capacity(ast.nodes.len());

        for node in &ast.nodes {
            let id = Id::new(&node.id);
            // First declaration wins for duplicate ids; validation has
            // already rejected such diagrams before compilation.
            node_index.entry(id).or_insert_with(|| graph.add_node(node));
        }

        for edge in &ast.edges {
            let from = Id::new(EndpointRef::parse(&edge.from).node());
            let to = Id::new(EndpointRef::parse(&edge.to).node());
            if let (Some(&source), Some(&target)) = (node_index.get(&from), node_index.get(&to)) {
                graph.add_edge(source, target, edge);
            } else {
                trace!(from = edge.from, to = edge.to; "Skipping dangling edge");
            }
        }

        let mut containers = Vec::new();
        for container in &ast.containers {
            flatten_containers(container, None, 0, &mut containers)?;
        }

        let mut node_container: HashMap<Id, usize> = HashMap::new();
        for (index, container) in containers.iter().enumerate() {
            for child in &container.decl.children {
                let id = Id::new(child);
                if node_index.contains_key(&id) {
                    node_container.entry(id).or_insert(index);
                }
            }
        }

        let scopes = build_scopes(ast, &containers, &node_index, &node_container);

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            containers = containers.len();
            "Diagram graph built"
        );

        Ok(Self {
            graph,
            node_index,
            containers,
            scopes,
            node_container,
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node(&self, index: NodeIndex) -> &'a NodeAst {
        *self
            .graph
            .node_weight(index)
            .expect("Node index should exist")
    }

    pub fn node_id(&self, index: NodeIndex) -> Id {
        Id::new(&self.node(index).id)
    }

    pub fn index_of(&self, id: Id) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// All surviving edges with their endpoints.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &'a EdgeAst)> + '_ {
        self.graph.edge_indices().map(|edge_index| {
            let (source, target) = self
                .graph
                .edge_endpoints(edge_index)
                .expect("Edge index should exist");
            let edge = self
                .graph
                .edge_weight(edge_index)
                .expect("Edge index should exist");
            (edge_index, source, target, *edge)
        })
    }

    pub fn containers(&self) -> &[ContainerInfo<'a>] {
        &self.containers
    }

    pub fn container(&self, index: usize) -> &ContainerInfo<'a> {
        &self.containers[index]
    }

    /// The scope owned by `container`, or the root scope for `None`.
    pub fn scope(&self, container: Option<usize>) -> &Scope {
        match container {
            None => &self.scopes[0],
            Some(index) => &self.scopes[index + 1],
        }
    }

    pub fn root_scope(&self) -> &Scope {
        &self.scopes[0]
    }

    /// The container that directly owns `node`, if any.
    pub fn container_of_node(&self, node: Id) -> Option<usize> {
        self.node_container.get(&node).copied()
    }

    /// The chain of containers from `container` up to the root, inclusive.
    pub fn ancestors(&self, container: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(container), |&current| {
            self.containers[current].parent()
        })
    }
}

fn flatten_containers<'a>(
    container: &'a ContainerDecl,
    parent: Option<usize>,
    depth: usize,
    into: &mut Vec<ContainerInfo<'a>>,
) -> Result<(), ArmillaError> {
    if depth >= MAX_CONTAINER_DEPTH {
        // Validation reports this politely; reaching it here means the
        // input bypassed validation, which corrupts downstream geometry.
        return Err(ArmillaError::Internal(format!(
            "container '{}' exceeds the nesting depth limit",
            container.id
        )));
    }

    let index = into.len();
    into.push(ContainerInfo {
        decl: container,
        parent,
        depth,
    });

    for nested in &container.containers {
        flatten_containers(nested, Some(index), depth + 1, into)?;
    }

    Ok(())
}

fn build_scopes<'a>(
    ast: &'a DiagramAst,
    containers: &[ContainerInfo<'a>],
    node_index: &HashMap<Id, NodeIndex>,
    node_container: &HashMap<Id, usize>,
) -> Vec<Scope> {
    let mut scopes: Vec<Scope> = Vec::with_capacity(containers.len() + 1);
    scopes.push(Scope {
        container: None,
        nodes: Vec::new(),
        child_containers: Vec::new(),
    });
    for (index, _) in containers.iter().enumerate() {
        scopes.push(Scope {
            container: Some(index),
            nodes: Vec::new(),
            child_containers: Vec::new(),
        });
    }

    // Nodes keep AST order within their scope. Duplicate declarations map
    // to one graph node, so each index is pushed at most once.
    let mut placed: std::collections::HashSet<NodeIndex> = std::collections::HashSet::new();
    for node in &ast.nodes {
        let id = Id::new(&node.id);
        let Some(&index) = node_index.get(&id) else {
            continue;
        };
        if !placed.insert(index) {
            continue;
        }
        let scope_index = node_container.get(&id).map(|c| c + 1).unwrap_or(0);
        scopes[scope_index].nodes.push(index);
    }

    for (index, container) in containers.iter().enumerate() {
        let scope_index = container.parent().map(|p| p + 1).unwrap_or(0);
        scopes[scope_index].child_containers.push(index);
    }

    scopes
}
