//! End-to-end scenarios through the public compile API.

use armilla::{
    ArmillaError, Compiler,
    ast::{CollapseConfig, ContainerDecl, DiagramAst, EdgeAst, NodeAst},
    collapse::{CollapseState, CollapseStore},
    identifier::Id,
};

fn node(id: &str) -> NodeAst {
    NodeAst {
        id: id.to_string(),
        ..NodeAst::default()
    }
}

fn shaped_node(id: &str, shape: &str) -> NodeAst {
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
fn two_nodes_stack_along_tb_with_layer_spacing() {
    let ast = DiagramAst {
        nodes: vec![node("A"), node("B")],
        edges: vec![edge("A", "B")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let plan = compiler.plan(&ast, &CollapseStore::new()).unwrap();

    assert_eq!(plan.layout().node_count(), 2);
    assert_eq!(plan.edges().len(), 1);

    let a = plan.layout().node_box(Id::new("A")).unwrap();
    let b = plan.layout().node_box(Id::new("B")).unwrap();
    let spacing = compiler.config().spacing().layer_spacing();
    assert!(
        a.y() + a.height() + spacing <= b.y() + 0.01,
        "A (bottom {}) must clear B (top {}) by {spacing}",
        a.y() + a.height(),
        b.y()
    );
}

#[test]
fn flowchart_constraint_rejects_unknown_shape_with_one_error() {
    let ast = DiagramAst {
        nodes: vec![shaped_node("n1", "invalid-shape")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let validation = compiler.validate(&ast, Some("flowchart"));

    assert!(!validation.valid);
    assert_eq!(validation.errors.len(), 1);
    assert!(validation.errors[0].message().contains("not allowed"));
    assert_eq!(validation.errors[0].node_id(), Some("n1"));
}

#[test]
fn duplicate_node_ids_fail_validation() {
    let ast = DiagramAst {
        nodes: vec![node("n1"), node("n1")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let validation = compiler.validate(&ast, None);

    assert!(!validation.valid);
    assert!(
        validation
            .errors
            .iter()
            .any(|error| error.message().contains("Duplicate"))
    );
}

#[test]
fn dangling_edge_warns_but_compiles() {
    let ast = DiagramAst {
        nodes: vec![node("n1")],
        edges: vec![edge("n1", "n2")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let validation = compiler.validate(&ast, None);
    assert!(validation.valid);
    assert_eq!(validation.warnings.len(), 1);
    assert!(
        validation.warnings[0]
            .message()
            .contains("non-existent node: n2")
    );

    // The diagram still renders, minus the dropped edge.
    let output = compiler.compile(&ast, &CollapseStore::new()).unwrap();
    assert!(output.svg.starts_with("<svg"));
    assert!(
        output
            .warnings
            .iter()
            .any(|warning| warning.contains("non-existent node: n2"))
    );
}

#[test]
fn container_referencing_missing_node_fails_validation() {
    let ast = DiagramAst {
        nodes: vec![node("n1")],
        containers: vec![ContainerDecl {
            id: String::from("c1"),
            children: vec![String::from("n1"), String::from("n2")],
            ..ContainerDecl::default()
        }],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let validation = compiler.validate(&ast, None);

    assert!(!validation.valid);
    assert!(
        validation
            .errors
            .iter()
            .any(|error| error.message().contains("references non-existent node: n2"))
    );
}

#[test]
fn invalid_diagram_never_renders_partially() {
    let ast = DiagramAst {
        nodes: vec![node("n1"), node("n1")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    match compiler.compile(&ast, &CollapseStore::new()) {
        Err(ArmillaError::Invalid(diagnostics)) => {
            assert!(!diagnostics.is_empty());
        }
        Err(other) => panic!("expected Invalid, got {other:?}"),
        Ok(_) => panic!("expected Invalid, got a rendered document"),
    }
}

#[test]
fn compilation_is_byte_identical_across_runs() {
    let ast = DiagramAst {
        nodes: vec![
            node("a"),
            node("b"),
            shaped_node("c", "diamond"),
            shaped_node("d", "cylinder"),
        ],
        edges: vec![edge("a", "b"), edge("b", "c"), edge("c", "d"), edge("a", "d")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let first = compiler.compile(&ast, &CollapseStore::new()).unwrap();
    let second = compiler.compile(&ast, &CollapseStore::new()).unwrap();
    assert_eq!(first.svg, second.svg);

    // A fresh compiler (fresh registry, fresh font system) agrees too.
    let third = Compiler::with_defaults()
        .compile(&ast, &CollapseStore::new())
        .unwrap();
    assert_eq!(first.svg, third.svg);
}

#[test]
fn every_routed_edge_has_at_least_two_points() {
    let ast = DiagramAst {
        nodes: vec![node("a"), node("b"), node("c")],
        edges: vec![edge("a", "b"), edge("b", "c"), edge("a", "a")],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    let plan = compiler.plan(&ast, &CollapseStore::new()).unwrap();

    for routed in plan.edges() {
        assert!(routed.points().len() >= 2);
    }
    // The self-loop was dropped with a warning, not rendered degenerately.
    assert_eq!(plan.edges().len(), 2);
    assert!(
        plan.warnings()
            .iter()
            .any(|warning| warning.contains("insufficient routed points"))
    );
}

#[test]
fn collapse_redirect_leaves_no_edge_on_hidden_nodes() {
    let ast = DiagramAst {
        nodes: vec![node("outside"), node("a"), node("b")],
        edges: vec![edge("outside", "a"), edge("a", "b")],
        containers: vec![ContainerDecl {
            id: String::from("group"),
            children: vec![String::from("a"), String::from("b")],
            collapse: CollapseConfig {
                redirect_edges: true,
                ..CollapseConfig::default()
            },
            ..ContainerDecl::default()
        }],
        ..DiagramAst::default()
    };

    let mut store = CollapseStore::new();
    store.toggle("group");
    assert_eq!(store.get("group"), CollapseState::Collapsing);

    let compiler = Compiler::with_defaults();
    let plan = compiler.plan(&ast, &store).unwrap();

    for routed in plan.edges() {
        assert!(!plan.visibility().is_node_hidden(routed.from()));
        assert!(!plan.visibility().is_node_hidden(routed.to()));
    }
    // The outside edge survived, redirected to the container boundary.
    assert_eq!(plan.edges().len(), 1);
    assert_eq!(plan.edges()[0].to(), Id::new("group"));
}

#[test]
fn collapsed_container_renders_as_unit_in_svg() {
    let ast = DiagramAst {
        nodes: vec![node("outside"), node("a")],
        edges: vec![edge("outside", "a")],
        containers: vec![ContainerDecl {
            id: String::from("group"),
            label: Some(String::from("Backend")),
            children: vec![String::from("a")],
            collapse: CollapseConfig {
                redirect_edges: true,
                ..CollapseConfig::default()
            },
            ..ContainerDecl::default()
        }],
        ..DiagramAst::default()
    };

    let mut store = CollapseStore::new();
    store.set("group", CollapseState::Collapsed);

    let output = Compiler::with_defaults().compile(&ast, &store).unwrap();
    assert!(output.svg.contains("data-collapse-state=\"collapsed\""));
    assert!(output.svg.contains("Backend"));
    // The hidden member is not drawn.
    assert!(!output.svg.contains("data-node-id=\"a\""));
}

#[test]
fn generic_validation_accepts_every_builtin_shape() {
    let ast = DiagramAst {
        nodes: vec![
            shaped_node("r", "rectangle"),
            shaped_node("o", "rounded"),
            shaped_node("e", "ellipse"),
            shaped_node("d", "diamond"),
            shaped_node("h", "hexagon"),
            shaped_node("c", "cylinder"),
        ],
        ..DiagramAst::default()
    };

    let compiler = Compiler::with_defaults();
    assert!(compiler.validate(&ast, Some("generic")).valid);
    assert!(compiler.validate(&ast, None).valid);
    let output = compiler.compile(&ast, &CollapseStore::new()).unwrap();
    assert!(output.svg.contains("<ellipse"));
    assert!(output.svg.contains("<polygon"));
}
