//! Container collapse state and visibility computation.
//!
//! Collapse state is the one piece of cross-invocation state in the
//! pipeline. It arrives from an external store each compile, keyed by each
//! container's collapse key; the core reads it, transitions it on request,
//! and never owns it longer than one pass.
//!
//! Transitioning states (`Collapsing`, `Expanding`) use the *target* state
//! for visibility: geometry snaps to the destination and animation hints
//! pass through to the renderer opaquely.

use std::collections::{HashMap, HashSet};

use armilla_core::identifier::Id;

use crate::{
    ast::CollapseMode,
    graph::DiagramGraph,
};

/// Per-container collapse state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollapseState {
    #[default]
    Expanded,
    Collapsed,
    /// Transition toward `Collapsed`.
    Collapsing,
    /// Transition toward `Expanded`.
    Expanding,
}

impl CollapseState {
    /// The state after an external toggle request.
    pub fn toggle(self) -> Self {
        match self {
            Self::Expanded | Self::Expanding => Self::Collapsing,
            Self::Collapsed | Self::Collapsing => Self::Expanding,
        }
    }

    /// Resolves a transition to its stable destination.
    pub fn settle(self) -> Self {
        match self {
            Self::Collapsing => Self::Collapsed,
            Self::Expanding => Self::Expanded,
            stable => stable,
        }
    }

    /// Whether visibility treats this state as collapsed.
    pub fn is_effectively_collapsed(self) -> bool {
        matches!(self, Self::Collapsed | Self::Collapsing)
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, Self::Collapsing | Self::Expanding)
    }
}

/// In-memory view of the external collapse-state store for one compile.
#[derive(Debug, Clone, Default)]
pub struct CollapseStore {
    states: HashMap<String, CollapseState>,
}

impl CollapseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state for a key; unknown keys are expanded.
    pub fn get(&self, key: &str) -> CollapseState {
        self.states.get(key).copied().unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, state: CollapseState) {
        self.states.insert(key.into(), state);
    }

    /// Applies an external toggle request and returns the new state.
    pub fn toggle(&mut self, key: &str) -> CollapseState {
        let next = self.get(key).toggle();
        self.states.insert(key.to_string(), next);
        next
    }

    /// Settles one key's transition and returns the stable state.
    pub fn settle(&mut self, key: &str) -> CollapseState {
        let settled = self.get(key).settle();
        self.states.insert(key.to_string(), settled);
        settled
    }
}

/// How one container participates in a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRender {
    /// Laid out with its member scope.
    Body,
    /// Drawn as a header-only unit; its scope is skipped.
    Unit,
    /// Not drawn at all (hidden by an ancestor's collapse).
    Hidden,
}

/// The visibility outcome of applying collapse state to the container tree.
pub struct Visibility {
    container_modes: Vec<ContainerRender>,
    hidden_nodes: HashSet<Id>,
    redirects: HashMap<Id, Id>,
}

impl Visibility {
    /// Computes visibility for every container and node.
    pub fn compute(graph: &DiagramGraph<'_>, store: &CollapseStore) -> Self {
        #[derive(Clone, Copy)]
        enum ChildEffect {
            Visible,
            ForcedUnit,
            Hidden,
        }

        let containers = graph.containers();
        let mut modes = Vec::with_capacity(containers.len());
        // Effect each container imposes on its direct children.
        let mut child_effects: Vec<ChildEffect> = Vec::with_capacity(containers.len());

        // Containers are stored in pre-order, so parents are computed
        // before their children.
        for container in containers {
            let inherited = container
                .parent()
                .map(|parent| child_effects[parent])
                .unwrap_or(ChildEffect::Visible);

            let own_collapsed = store
                .get(container.decl().collapse_key())
                .is_effectively_collapsed();

            let (mode, effect) = match inherited {
                ChildEffect::Hidden => (ContainerRender::Hidden, ChildEffect::Hidden),
                ChildEffect::ForcedUnit => (ContainerRender::Unit, ChildEffect::Hidden),
                ChildEffect::Visible if !own_collapsed => {
                    (ContainerRender::Body, ChildEffect::Visible)
                }
                ChildEffect::Visible => match container.decl().collapse.mode {
                    CollapseMode::Full => (ContainerRender::Unit, ChildEffect::Hidden),
                    // Partial keeps the immediate child level: member nodes
                    // stay visible, member containers shrink to units.
                    CollapseMode::Partial => (ContainerRender::Body, ChildEffect::ForcedUnit),
                },
            };

            modes.push(mode);
            child_effects.push(effect);
        }

        let mut hidden_nodes = HashSet::new();
        let mut redirects = HashMap::new();

        for index in graph.node_indices() {
            let id = graph.node_id(index);
            let Some(owner) = graph.container_of_node(id) else {
                continue;
            };
            let node_hidden = match modes[owner] {
                ContainerRender::Body => false,
                ContainerRender::Unit | ContainerRender::Hidden => true,
            };
            if !node_hidden {
                continue;
            }
            hidden_nodes.insert(id);

            // The redirect target is the visible collapsed unit that
            // swallowed this node, provided it redirects edges.
            let target = graph
                .ancestors(owner)
                .find(|&ancestor| modes[ancestor] == ContainerRender::Unit);
            if let Some(ancestor) = target {
                let info = graph.container(ancestor);
                if info.decl().collapse.redirect_edges {
                    redirects.insert(id, info.id());
                }
            }
        }

        Self {
            container_modes: modes,
            hidden_nodes,
            redirects,
        }
    }

    /// Visibility with every container expanded.
    pub fn all_visible(graph: &DiagramGraph<'_>) -> Self {
        Self::compute(graph, &CollapseStore::new())
    }

    pub fn container_mode(&self, container: usize) -> ContainerRender {
        self.container_modes[container]
    }

    pub fn is_node_hidden(&self, node: Id) -> bool {
        self.hidden_nodes.contains(&node)
    }

    /// The container boundary that hidden-node edges are rewritten to, if
    /// edge redirection applies.
    pub fn redirect_target(&self, node: Id) -> Option<Id> {
        self.redirects.get(&node).copied()
    }
}
