//! Configuration for diagram compilation.
//!
//! All types implement [`serde::Deserialize`] so configuration can come from
//! TOML files or embedding applications; every field has a default, so an
//! empty configuration compiles diagrams sensibly.

use serde::Deserialize;

use crate::ast::LayoutAlgorithm;

/// Top-level compile configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Diagram-type constraint applied during validation (`"flowchart"`,
    /// `"sequence"`, `"state"`); `None` or `"generic"` allows every shape.
    diagram_type: Option<String>,

    /// Placement algorithm for scopes that specify none.
    default_algorithm: LayoutAlgorithm,

    /// Spacing parameters with per-container overrides.
    spacing: SpacingConfig,

    /// Rendering options.
    render: RenderConfig,

    /// Upper bound on iterative layout passes (force, stress). Callers
    /// wanting bounded compute lower this instead of cancelling.
    max_layout_iterations: Option<usize>,
}

impl CompileConfig {
    pub fn diagram_type(&self) -> Option<&str> {
        self.diagram_type.as_deref()
    }

    pub fn set_diagram_type(&mut self, diagram_type: Option<String>) {
        self.diagram_type = diagram_type;
    }

    pub fn default_algorithm(&self) -> LayoutAlgorithm {
        self.default_algorithm
    }

    pub fn set_default_algorithm(&mut self, algorithm: LayoutAlgorithm) {
        self.default_algorithm = algorithm;
    }

    pub fn spacing(&self) -> &SpacingConfig {
        &self.spacing
    }

    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderConfig {
        &mut self.render
    }

    pub fn max_layout_iterations(&self) -> usize {
        self.max_layout_iterations.unwrap_or(300)
    }
}

/// Named spacing parameters with system-wide defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    node_spacing: f32,
    edge_spacing: f32,
    layer_spacing: f32,
    container_padding: f32,
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self {
            node_spacing: 50.0,
            edge_spacing: 10.0,
            layer_spacing: 80.0,
            container_padding: 20.0,
        }
    }
}

impl SpacingConfig {
    pub fn node_spacing(&self) -> f32 {
        self.node_spacing
    }

    pub fn edge_spacing(&self) -> f32 {
        self.edge_spacing
    }

    pub fn layer_spacing(&self) -> f32 {
        self.layer_spacing
    }

    pub fn container_padding(&self) -> f32 {
        self.container_padding
    }
}

/// Rendering options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Strict output omits interaction-oriented `data-*` attributes for
    /// static embedding; the default keeps them for interactive consumers.
    strict: bool,

    /// Prefix for every generated def id (markers, clips). Embedders
    /// placing several diagrams in one rendering context supply distinct
    /// prefixes so ids never collide.
    document_id: String,

    /// Margin around the diagram content, in pixels.
    margin: f32,

    /// Optional background color for the whole document.
    background: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strict: false,
            document_id: String::from("armilla"),
            margin: 20.0,
            background: None,
        }
    }
}

impl RenderConfig {
    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn set_document_id(&mut self, document_id: impl Into<String>) {
        self.document_id = document_id.into();
    }

    pub fn margin(&self) -> f32 {
        self.margin
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }
}
