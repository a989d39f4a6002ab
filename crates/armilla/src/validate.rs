//! Structural and semantic validation of a [`DiagramAst`].
//!
//! Validation is a single accumulating pass: every node, edge, container,
//! and style reference is inspected and all diagnostics are collected before
//! returning. Nothing short-circuits on the first failure, so one compile
//! surfaces the complete diagnostic set.
//!
//! Errors make the diagram structurally uncompilable; warnings describe
//! conditions the pipeline degrades around (most prominently edges that
//! reference nodes which do not exist: those edges are dropped, the diagram
//! still renders).

use std::collections::{HashMap, HashSet};

use log::debug;
use serde_json::Value;

use armilla_core::{
    registry::ShapeRegistry,
    shape::{NodeStyle, ShapeContext},
    text::TextMeasurer,
};

use crate::ast::{ContainerDecl, DiagramAst, EndpointRef, NodeAst};

/// Containers nested deeper than this indicate a malformed input; the walk
/// stops there rather than recursing unboundedly.
pub(crate) const MAX_CONTAINER_DEPTH: usize = 64;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    message: String,
    node_id: Option<String>,
    container_id: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            node_id: None,
            container_id: None,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The offending node, when the finding concerns one.
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    pub fn container_id(&self) -> Option<&str> {
        self.container_id.as_deref()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// The outcome of validating one diagram.
#[derive(Debug, Clone, Default)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Validation {
    fn error(&mut self, diagnostic: Diagnostic) {
        self.errors.push(diagnostic);
    }

    fn warning(&mut self, diagnostic: Diagnostic) {
        self.warnings.push(diagnostic);
    }
}

/// Shape identifiers permitted for a constrained diagram type.
///
/// `None` means the constraint name is unknown. The `generic` constraint
/// behaves like no constraint at all.
fn constraint_allow_list(diagram_type: &str) -> Option<&'static [&'static str]> {
    match diagram_type {
        "flowchart" => Some(&[
            "rectangle",
            "rounded",
            "ellipse",
            "diamond",
            "hexagon",
            "cylinder",
        ]),
        "sequence" => Some(&["rectangle", "rounded", "ellipse"]),
        "state" => Some(&["rounded", "ellipse", "diamond"]),
        _ => None,
    }
}

/// Read-only validator over a [`DiagramAst`].
pub struct Validator<'a> {
    registry: &'a ShapeRegistry,
    measurer: &'a TextMeasurer,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a ShapeRegistry, measurer: &'a TextMeasurer) -> Self {
        Self { registry, measurer }
    }

    /// Validates the diagram against an optional diagram-type constraint.
    pub fn validate(&self, ast: &DiagramAst, constraint: Option<&str>) -> Validation {
        let mut validation = Validation::default();

        let allow_list = match constraint {
            None => None,
            Some("generic") => None,
            Some(diagram_type) => match constraint_allow_list(diagram_type) {
                Some(list) => Some(list),
                None => {
                    validation.error(Diagnostic::new(format!(
                        "unknown diagram type constraint '{diagram_type}'"
                    )));
                    None
                }
            },
        };

        let node_ids = self.check_nodes(ast, allow_list, constraint, &mut validation);
        self.check_edges(ast, &node_ids, &mut validation);
        self.check_containers(ast, &node_ids, &mut validation);
        self.check_style_references(ast, &mut validation);

        validation.valid = validation.errors.is_empty();
        debug!(
            errors = validation.errors.len(),
            warnings = validation.warnings.len();
            "Validation finished"
        );
        validation
    }

    /// Checks node id uniqueness and shape resolvability; returns the set
    /// of declared node ids for the reference checks.
    fn check_nodes(
        &self,
        ast: &DiagramAst,
        allow_list: Option<&'static [&'static str]>,
        constraint: Option<&str>,
        validation: &mut Validation,
    ) -> HashSet<String> {
        let mut node_ids: HashSet<String> = HashSet::with_capacity(ast.nodes.len());

        for node in &ast.nodes {
            if !node_ids.insert(node.id.clone()) {
                validation.error(
                    Diagnostic::new(format!("Duplicate node id: {}", node.id))
                        .with_node(&node.id),
                );
            }

            if let Some(allowed) = allow_list {
                // With an active constraint the allow-list subsumes registry
                // resolution: a shape outside the list is reported once, as
                // disallowed, even when it is also unknown.
                let canonical = self.canonical_shape_id(&node.shape);
                if !allowed.contains(&canonical.as_str()) {
                    validation.error(
                        Diagnostic::new(format!(
                            "shape '{}' is not allowed for diagram type '{}'",
                            node.shape,
                            constraint.unwrap_or_default(),
                        ))
                        .with_node(&node.id),
                    );
                    continue;
                }
            }

            match self.registry.resolve(&node.shape) {
                Ok(resolution) => {
                    if let Some(alias) = resolution.via_alias() {
                        validation.warning(
                            Diagnostic::new(format!(
                                "shape alias '{alias}' on node '{}' resolves to '{}'",
                                node.id,
                                resolution.canonical(),
                            ))
                            .with_node(&node.id),
                        );
                    }
                }
                Err(err) => {
                    validation.error(Diagnostic::new(err.to_string()).with_node(&node.id));
                }
            }
        }

        node_ids
    }

    /// The canonical form of a shape identifier, aliases followed; unknown
    /// identifiers normalize to lowercase.
    fn canonical_shape_id(&self, shape: &str) -> String {
        match self.registry.resolve(shape) {
            Ok(resolution) => resolution.canonical().to_string(),
            Err(_) => shape.trim().to_ascii_lowercase(),
        }
    }

    fn check_edges(
        &self,
        ast: &DiagramAst,
        node_ids: &HashSet<String>,
        validation: &mut Validation,
    ) {
        let nodes_by_id: HashMap<&str, &NodeAst> =
            ast.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        for edge in &ast.edges {
            for raw in [&edge.from, &edge.to] {
                let endpoint = EndpointRef::parse(raw);

                if !node_ids.contains(endpoint.node()) {
                    // Dangling references degrade, never block: the router
                    // drops the edge and the diagram still renders.
                    validation.warning(Diagnostic::new(format!(
                        "edge '{}' -> '{}' references non-existent node: {}",
                        edge.from,
                        edge.to,
                        endpoint.node(),
                    )));
                    continue;
                }

                if let Some(port) = endpoint.port()
                    && let Some(node) = nodes_by_id.get(endpoint.node())
                {
                    self.check_named_port(ast, node, port, validation);
                }
            }
        }
    }

    /// An explicitly named port must exist on the node's shape; anchor
    /// names are stable per the capability contract, so checking here is
    /// reliable before any layout happens.
    fn check_named_port(
        &self,
        ast: &DiagramAst,
        node: &NodeAst,
        port: &str,
        validation: &mut Validation,
    ) {
        let Ok(resolution) = self.registry.resolve(&node.shape) else {
            // Already reported as an unresolvable shape.
            return;
        };

        let base = NodeStyle::default();
        let style = node
            .style
            .as_ref()
            .and_then(|name| ast.styles.get(name))
            .and_then(|def| def.resolve(&base).ok())
            .unwrap_or(base);
        let data = Value::Null;
        let ctx = ShapeContext::new(node.display_label(), &style, &data, self.measurer);

        let anchors = resolution.definition().anchors(&ctx);
        if !anchors.iter().any(|anchor| anchor.name() == port) {
            let known: Vec<&str> = anchors.iter().map(|a| a.name()).collect();
            validation.error(
                Diagnostic::new(format!(
                    "node '{}' has no anchor named '{port}' (known anchors: {})",
                    node.id,
                    known.join(", "),
                ))
                .with_node(&node.id),
            );
        }
    }

    fn check_containers(
        &self,
        ast: &DiagramAst,
        node_ids: &HashSet<String>,
        validation: &mut Validation,
    ) {
        let mut seen_containers: HashSet<&str> = HashSet::new();
        let mut assigned_nodes: HashSet<&str> = HashSet::new();

        for container in &ast.containers {
            self.check_container(
                container,
                node_ids,
                &mut seen_containers,
                &mut assigned_nodes,
                0,
                validation,
            );
        }
    }

    fn check_container<'b>(
        &self,
        container: &'b ContainerDecl,
        node_ids: &HashSet<String>,
        seen_containers: &mut HashSet<&'b str>,
        assigned_nodes: &mut HashSet<&'b str>,
        depth: usize,
        validation: &mut Validation,
    ) {
        if depth >= MAX_CONTAINER_DEPTH {
            validation.error(
                Diagnostic::new(format!(
                    "container '{}' exceeds the nesting depth limit of {MAX_CONTAINER_DEPTH}",
                    container.display_label(),
                ))
                .with_container(&container.id),
            );
            return;
        }

        if !seen_containers.insert(&container.id) {
            validation.error(
                Diagnostic::new(format!("Duplicate container id: {}", container.id))
                    .with_container(&container.id),
            );
        }

        for child in &container.children {
            if !node_ids.contains(child) {
                validation.error(
                    Diagnostic::new(format!(
                        "container '{}' references non-existent node: {child}",
                        container.display_label(),
                    ))
                    .with_container(&container.id),
                );
            } else if !assigned_nodes.insert(child) {
                validation.warning(
                    Diagnostic::new(format!(
                        "node '{child}' is claimed by more than one container; the first claim wins"
                    ))
                    .with_node(child),
                );
            }
        }

        for nested in &container.containers {
            self.check_container(
                nested,
                node_ids,
                seen_containers,
                assigned_nodes,
                depth + 1,
                validation,
            );
        }
    }

    fn check_style_references(&self, ast: &DiagramAst, validation: &mut Validation) {
        // Unparseable colors degrade to defaults downstream; warn here so
        // the author learns why their style did not apply.
        let base = NodeStyle::default();
        for (name, def) in &ast.styles {
            if let Err(err) = def.resolve(&base) {
                validation.warning(Diagnostic::new(format!("style '{name}' is invalid: {err}")));
            }
        }

        for node in &ast.nodes {
            if let Some(style) = &node.style
                && !ast.styles.contains_key(style)
            {
                validation.warning(
                    Diagnostic::new(format!(
                        "node '{}' references unknown style '{style}'",
                        node.id
                    ))
                    .with_node(&node.id),
                );
            }
        }
        for container in &ast.containers {
            if let Some(style) = &container.style
                && !ast.styles.contains_key(style)
            {
                validation.warning(
                    Diagnostic::new(format!(
                        "container '{}' references unknown style '{style}'",
                        container.id
                    ))
                    .with_container(&container.id),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::EdgeAst;

    fn validator_fixture() -> (ShapeRegistry, TextMeasurer) {
        (ShapeRegistry::with_builtins(), TextMeasurer::new())
    }

    fn node(id: &str, shape: &str) -> NodeAst {
        NodeAst {
            id: id.to_string(),
            shape: shape.to_string(),
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

    #[test]
    fn empty_diagram_is_valid() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let validation = validator.validate(&DiagramAst::default(), None);
        assert!(validation.valid);
        assert!(validation.errors.is_empty());
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn unknown_constraint_is_a_single_error() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let validation = validator.validate(&DiagramAst::default(), Some("mindmap"));
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(
            validation.errors[0]
                .message()
                .contains("unknown diagram type constraint 'mindmap'")
        );
    }

    #[test]
    fn generic_constraint_allows_everything() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "cylinder"), node("n2", "hexagon")],
            ..DiagramAst::default()
        };
        assert!(validator.validate(&ast, Some("generic")).valid);
    }

    #[test]
    fn disallowed_shape_is_one_error_naming_the_node() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "invalid-shape")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, Some("flowchart"));
        assert!(!validation.valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.errors[0].message().contains("not allowed"));
        assert_eq!(validation.errors[0].node_id(), Some("n1"));
    }

    #[test]
    fn duplicate_node_ids_are_errors() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangle"), node("n1", "ellipse")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(!validation.valid);
        assert!(
            validation
                .errors
                .iter()
                .any(|e| e.message().contains("Duplicate"))
        );
    }

    #[test]
    fn dangling_edge_is_a_warning_not_an_error() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangle")],
            edges: vec![edge("n1", "n2")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(validation.valid);
        assert_eq!(validation.warnings.len(), 1);
        assert!(
            validation.warnings[0]
                .message()
                .contains("non-existent node: n2")
        );
    }

    #[test]
    fn container_with_missing_child_is_an_error() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangle")],
            containers: vec![ContainerDecl {
                id: String::from("c1"),
                children: vec![String::from("n1"), String::from("n2")],
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(!validation.valid);
        assert!(
            validation
                .errors
                .iter()
                .any(|e| e.message().contains("references non-existent node: n2"))
        );
        assert_eq!(validation.errors[0].container_id(), Some("c1"));
    }

    #[test]
    fn unknown_shape_error_carries_suggestion() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangel")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(!validation.valid);
        assert!(validation.errors[0].message().contains("did you mean"));
        assert_eq!(validation.errors[0].node_id(), Some("n1"));
    }

    #[test]
    fn alias_use_is_an_informational_warning() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "db")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(validation.valid);
        assert!(
            validation
                .warnings
                .iter()
                .any(|w| w.message().contains("alias 'db'"))
        );
    }

    #[test]
    fn missing_named_port_is_an_error() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangle"), node("n2", "rectangle")],
            edges: vec![edge("n1.nonexistent", "n2")],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        assert!(!validation.valid);
        assert!(
            validation.errors[0]
                .message()
                .contains("no anchor named 'nonexistent'")
        );
    }

    #[test]
    fn valid_named_port_passes() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![node("n1", "rectangle"), node("n2", "rectangle")],
            edges: vec![edge("n1.right", "n2.left")],
            ..DiagramAst::default()
        };
        assert!(validator.validate(&ast, None).valid);
    }

    #[test]
    fn diagnostics_accumulate_across_checks() {
        let (registry, measurer) = validator_fixture();
        let validator = Validator::new(&registry, &measurer);
        let ast = DiagramAst {
            nodes: vec![
                node("n1", "rectangle"),
                node("n1", "nonsense-shape-name"),
            ],
            edges: vec![edge("n1", "ghost")],
            containers: vec![ContainerDecl {
                id: String::from("c1"),
                children: vec![String::from("missing")],
                ..ContainerDecl::default()
            }],
            ..DiagramAst::default()
        };
        let validation = validator.validate(&ast, None);
        // Duplicate id, unknown shape, missing container child all present.
        assert!(validation.errors.len() >= 3);
        assert_eq!(validation.warnings.len(), 1);
    }
}
