//! Armilla: a diagram compiler.
//!
//! Armilla turns a structured diagram description (nodes, edges, nested
//! containers, styles) into a laid-out, routed, rendered SVG document. The
//! pipeline is a pure synchronous transform:
//!
//! ```text
//! DiagramAst -> validation -> layout -> anchor resolution & routing
//!            -> collapse handling -> SVG rendering
//! ```
//!
//! The AST arrives from an external front-end (a DSL parser, an API, or a
//! JSON document; see [`ast::DiagramAst`]). Every stage is a pure function
//! of its inputs, so independent diagrams may be compiled in parallel; the
//! only shared resource is the read-only shape registry.
//!
//! # Example
//!
//! ```rust,no_run
//! use armilla::{Compiler, ast::DiagramAst, collapse::CollapseStore};
//!
//! let json = r#"{
//!     "astVersion": "1.0",
//!     "nodes": [
//!         { "id": "web", "label": "Web Tier" },
//!         { "id": "db", "shape": "cylinder", "label": "Database" }
//!     ],
//!     "edges": [{ "from": "web", "to": "db", "label": "reads" }]
//! }"#;
//! let ast: DiagramAst = serde_json::from_str(json).expect("valid diagram JSON");
//!
//! let compiler = Compiler::with_defaults();
//! let output = compiler
//!     .compile(&ast, &CollapseStore::new())
//!     .expect("diagram compiles");
//!
//! println!("{}", output.svg);
//! for warning in &output.warnings {
//!     eprintln!("warning: {warning}");
//! }
//! ```

pub mod ast;
pub mod collapse;
pub mod config;
mod error;
mod graph;
pub mod layout;
mod render;
pub mod route;
pub mod validate;

pub use armilla_core::{color, draw, geometry, identifier, registry, shape, text};

pub use error::ArmillaError;
pub use graph::DiagramGraph;

use std::sync::Arc;

use log::{debug, info};

use armilla_core::{registry::ShapeRegistry, text::TextMeasurer};

use crate::{
    ast::DiagramAst,
    collapse::{CollapseStore, Visibility},
    config::CompileConfig,
    layout::{LayoutEngine, LayoutResult},
    render::SvgRenderer,
    route::{RoutedEdge, Router},
    validate::{Validation, Validator},
};

/// A successful compile: the rendered document plus the non-blocking
/// findings collected along the way.
pub struct CompileOutput {
    pub svg: String,
    pub warnings: Vec<String>,
}

/// The geometric plan for one diagram: everything the renderer consumes,
/// exposed for callers that need geometry without markup (tests, editors,
/// exporters).
pub struct DiagramPlan<'a> {
    graph: DiagramGraph<'a>,
    visibility: Visibility,
    layout: LayoutResult,
    edges: Vec<RoutedEdge<'a>>,
    warnings: Vec<String>,
}

impl<'a> DiagramPlan<'a> {
    pub fn graph(&self) -> &DiagramGraph<'a> {
        &self.graph
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn edges(&self) -> &[RoutedEdge<'a>] {
        &self.edges
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

/// Compiles diagrams against one shape registry and configuration.
///
/// A `Compiler` is cheap to share and safe to use from multiple threads;
/// construct it once at startup, after shape registration is complete.
pub struct Compiler {
    registry: Arc<ShapeRegistry>,
    measurer: TextMeasurer,
    config: CompileConfig,
}

impl Compiler {
    pub fn new(registry: Arc<ShapeRegistry>, config: CompileConfig) -> Self {
        Self {
            registry,
            measurer: TextMeasurer::new(),
            config,
        }
    }

    /// A compiler over the built-in shape catalog with default settings.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ShapeRegistry::with_builtins()), CompileConfig::default())
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Validates a diagram against an explicit diagram-type constraint
    /// (overriding the configured one).
    pub fn validate(&self, ast: &DiagramAst, constraint: Option<&str>) -> Validation {
        Validator::new(&self.registry, &self.measurer).validate(ast, constraint)
    }

    /// Runs the pipeline up to routing, returning the geometric plan.
    ///
    /// # Errors
    ///
    /// [`ArmillaError::Invalid`] with the full diagnostic set when the
    /// diagram fails validation (or names a missing anchor during
    /// routing); [`ArmillaError::Internal`] for broken invariants such as
    /// shape plugins returning non-positive bounds.
    pub fn plan<'a>(
        &self,
        ast: &'a DiagramAst,
        collapse: &CollapseStore,
    ) -> Result<DiagramPlan<'a>, ArmillaError> {
        info!("Validating diagram");
        let validation =
            Validator::new(&self.registry, &self.measurer).validate(ast, self.config.diagram_type());
        if !validation.valid {
            return Err(ArmillaError::Invalid(validation.errors));
        }
        let mut warnings: Vec<String> =
            validation.warnings.iter().map(ToString::to_string).collect();

        info!("Building diagram graph");
        let graph = DiagramGraph::build(ast)?;
        let visibility = Visibility::compute(&graph, collapse);

        info!("Calculating layout");
        let layout = LayoutEngine::new(&self.registry, &self.measurer, &self.config)
            .compute(ast, &graph, &visibility)?;
        debug!(nodes = layout.node_count(); "Layout calculated");

        info!("Routing edges");
        let outcome = Router::new(&layout, &visibility, ast.routing).route(&graph);
        if !outcome.errors.is_empty() {
            return Err(ArmillaError::Invalid(outcome.errors));
        }
        warnings.extend(outcome.warnings.iter().map(ToString::to_string));
        debug!(edges = outcome.edges.len(), warnings = warnings.len(); "Edges routed");

        Ok(DiagramPlan {
            graph,
            visibility,
            layout,
            edges: outcome.edges,
            warnings,
        })
    }

    /// Compiles a diagram to SVG.
    ///
    /// Returns either a complete rendered document with an accompanying
    /// (possibly empty) warnings list, or the itemized structural errors;
    /// no partial rendering is attempted.
    pub fn compile(
        &self,
        ast: &DiagramAst,
        collapse: &CollapseStore,
    ) -> Result<CompileOutput, ArmillaError> {
        let plan = self.plan(ast, collapse)?;

        info!("Rendering SVG");
        let svg = SvgRenderer::new(&self.registry, &self.measurer, &self.config).render(
            ast,
            &plan.graph,
            &plan.layout,
            &plan.visibility,
            &plan.edges,
        )?;

        Ok(CompileOutput {
            svg,
            warnings: plan.warnings,
        })
    }
}
