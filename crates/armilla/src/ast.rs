//! The diagram AST: the typed input contract of the compiler.
//!
//! A [`DiagramAst`] is produced by an external front-end (a DSL parser, an
//! API, a JSON document) and treated as immutable input here. Everything in
//! this module derives serde so the CLI can read diagrams from JSON, and so
//! callers can round-trip programmatically built diagrams.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use armilla_core::{
    color::Color,
    geometry::Insets,
    shape::NodeStyle,
};

/// Flow direction of the whole diagram or of one container scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    LR,
    RL,
    #[default]
    TB,
    BT,
}

/// How routed edges shape their intermediate geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingStyle {
    Straight,
    #[default]
    Orthogonal,
    Polyline,
    Splines,
}

/// Placement strategy for the nodes of one scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    #[default]
    Layered,
    Force,
    Stress,
    Radial,
    Mrtree,
    Circular,
}

/// Line style of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// Arrow head drawn at the target end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowKind {
    #[default]
    Standard,
    Hollow,
    Open,
    /// Suppresses markers at both ends.
    None,
}

/// Semantic edge type; diamonds at the source end derive from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Aggregation,
    Composition,
    Dependency,
    Association,
}

/// What a collapsed container hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseMode {
    /// Hide every descendant.
    #[default]
    Full,
    /// Show only the immediate child level.
    Partial,
}

/// One diagram document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagramAst {
    pub ast_version: String,
    pub title: Option<String>,
    pub nodes: Vec<NodeAst>,
    pub edges: Vec<EdgeAst>,
    pub containers: Vec<ContainerDecl>,
    pub groups: Vec<GroupDecl>,
    pub styles: IndexMap<String, StyleDef>,
    pub direction: Direction,
    pub routing: RoutingStyle,
}

/// A single shape instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeAst {
    pub id: String,
    pub shape: String,
    pub label: Option<String>,
    /// Free-form payload; shapes may read it, the core never interprets it.
    pub data: serde_json::Value,
    pub style: Option<String>,
}

impl Default for NodeAst {
    fn default() -> Self {
        Self {
            id: String::new(),
            shape: String::from("rectangle"),
            label: None,
            data: serde_json::Value::Null,
            style: None,
        }
    }
}

impl NodeAst {
    /// The text drawn for this node: the label, or the id when unlabeled.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Multiplicity and role annotations at one end of an edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndAnnotation {
    pub multiplicity: Option<String>,
    pub role: Option<String>,
}

impl EndAnnotation {
    pub fn is_empty(&self) -> bool {
        self.multiplicity.is_none() && self.role.is_none()
    }
}

/// A directed relation between two node references.
///
/// `from`/`to` accept plain ids plus the port addressing forms `id.port`
/// and `id#sub`; see [`EndpointRef::parse`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EdgeAst {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub stereotype: Option<String>,
    pub line: LineStyle,
    pub arrow: ArrowKind,
    pub kind: Option<EdgeKind>,
    pub source: EndAnnotation,
    pub target: EndAnnotation,
    pub tooltip: Option<String>,
    pub link: Option<String>,
    pub style: Option<String>,
}

impl DiagramAst {
    /// The effective visual style for an optional style reference.
    ///
    /// Unknown references and unparseable color values fall back to the
    /// defaults; the validator has already warned about both.
    pub fn resolved_style(&self, reference: Option<&str>) -> NodeStyle {
        let base = NodeStyle::default();
        reference
            .and_then(|name| self.styles.get(name))
            .and_then(|def| def.resolve(&base).ok())
            .unwrap_or(base)
    }
}

/// A parsed edge endpoint reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointRef<'a> {
    node: &'a str,
    port: Option<&'a str>,
}

impl<'a> EndpointRef<'a> {
    /// Splits an endpoint reference into its base node id and optional
    /// named sub-point.
    ///
    /// Supported forms: `id`, `id.portName`, `id#subId`. The first `.` or
    /// `#` separates; everything after it is the port name.
    pub fn parse(raw: &'a str) -> Self {
        match raw.find(['.', '#']) {
            Some(idx) => Self {
                node: &raw[..idx],
                port: Some(&raw[idx + 1..]).filter(|p| !p.is_empty()),
            },
            None => Self {
                node: raw,
                port: None,
            },
        }
    }

    pub fn node(&self) -> &'a str {
        self.node
    }

    pub fn port(&self) -> Option<&'a str> {
        self.port
    }
}

/// Presentation-layer animation hints, passed through opaquely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationHint {
    pub duration_ms: Option<u32>,
    pub easing: Option<String>,
}

/// Collapse behavior of one container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollapseConfig {
    pub mode: CollapseMode,
    pub redirect_edges: bool,
    pub state_key: Option<String>,
    pub animation: AnimationHint,
}

/// Per-container layout overrides; unset values fall back to the parent
/// scope and ultimately to the compile configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub algorithm: Option<LayoutAlgorithm>,
    pub direction: Option<Direction>,
    pub node_spacing: Option<f32>,
    pub layer_spacing: Option<f32>,
    pub padding: Option<f32>,
    pub min_width: Option<f32>,
    pub max_width: Option<f32>,
    pub min_height: Option<f32>,
    pub max_height: Option<f32>,
}

/// A hierarchical grouping of nodes and nested containers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerDecl {
    pub id: String,
    pub label: Option<String>,
    /// Ids of member nodes at this level.
    pub children: Vec<String>,
    pub containers: Vec<ContainerDecl>,
    pub layout: LayoutOptions,
    pub style: Option<String>,
    pub collapse: CollapseConfig,
}

impl ContainerDecl {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// The key under which collapse state is stored.
    pub fn collapse_key(&self) -> &str {
        self.collapse.state_key.as_deref().unwrap_or(&self.id)
    }
}

/// Non-geometric tagging of nodes; carried through to rendering as a
/// `data-group` attribute in default mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupDecl {
    pub id: String,
    pub members: Vec<String>,
}

/// A named visual style, referenced by nodes and containers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleDef {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<u16>,
    pub padding: Option<f32>,
    pub stroke_width: Option<f32>,
}

impl StyleDef {
    /// Merges this style over `base`, parsing color strings.
    ///
    /// Unparseable colors are reported as errors naming the offending value.
    pub fn resolve(&self, base: &NodeStyle) -> Result<NodeStyle, String> {
        let mut style = base.clone();
        if let Some(fill) = &self.fill {
            style.fill = Some(Color::new(fill)?);
        }
        if let Some(stroke) = &self.stroke {
            style.stroke = Color::new(stroke)?;
        }
        if let Some(text_color) = &self.text_color {
            style.text_color = Some(Color::new(text_color)?);
        }
        if let Some(font_family) = &self.font_family {
            style.font_family = font_family.clone();
        }
        if let Some(font_size) = self.font_size {
            style.font_size = font_size;
        }
        if let Some(padding) = self.padding {
            style.padding = Insets::uniform(padding);
        }
        if let Some(stroke_width) = self.stroke_width {
            style.stroke_width = stroke_width;
        }
        Ok(style)
    }
}
