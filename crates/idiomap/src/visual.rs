//! Idiom-to-visual mapping and the diagram output contract.
//!
//! The mapper turns idiom records into an unpositioned visual graph; the
//! layout engine then assigns positions, and [`build_diagram`] hands the
//! rendering collaborator a complete [`DiagramGraph`]. An empty input yields
//! an empty diagram with default layout options, never an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use idiomap_syntax::Span;

use crate::idiom::{IdiomConnectionKind, IdiomKind, IdiomNode, IdiomNodeKind, IdiomRecord};
use crate::layout::LayoutEngine;

/// Label substrings suggesting a trigger role inside a counter idiom.
const TRIGGER_HINTS: &[&str] = &["click", "handler", "press", "tap", "submit"];

/// Label substrings suggesting a counter role.
const COUNTER_HINTS: &[&str] = &["count", "counter", "num", "total", "tally", "score", "step"];

/// Label substrings suggesting a person/actor role inside a network idiom.
const PERSON_HINTS: &[&str] = &["user", "person", "account", "profile"];

/// Label substrings suggesting a fault role.
const FAULT_HINTS: &[&str] = &["error", "fail", "fault", "reject"];

// ============================================================================
// Visual graph types
// ============================================================================

/// A 2D diagram position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Presentation kind of a visual edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualEdgeKind {
    Success,
    Error,
    Action,
    DataFlow,
}

impl VisualEdgeKind {
    /// Fixed presentation color per kind.
    pub fn color(&self) -> &'static str {
        match self {
            VisualEdgeKind::Success => "#22c55e",
            VisualEdgeKind::Error => "#ef4444",
            VisualEdgeKind::Action => "#3b82f6",
            VisualEdgeKind::DataFlow => "#94a3b8",
        }
    }

    /// Only action and data-flow edges animate.
    pub fn animated(&self) -> bool {
        matches!(self, VisualEdgeKind::Action | VisualEdgeKind::DataFlow)
    }
}

/// Back-reference from a visual node to the idiom node it renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualMetadata {
    pub idiom_node_id: String,
    pub idiom_kind: IdiomKind,
    pub source_span: Span,
    pub context_snippet: String,
}

/// A positioned, renderable node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    pub kind: IdiomNodeKind,
    pub position: Position,
    pub label: String,
    pub metadata: VisualMetadata,
    /// Open style overrides for the renderer.
    pub style: Map<String, Value>,
}

/// A renderable edge between two visual nodes of the same diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub label: Option<String>,
    pub kind: VisualEdgeKind,
    pub color: String,
    pub animated: bool,
    pub style: Map<String, Value>,
}

/// Layout parameters handed through to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub direction: String,
    pub node_spacing: f64,
    pub level_spacing: f64,
    pub auto_fit: bool,
    pub padding: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            direction: "vertical".to_string(),
            node_spacing: 150.0,
            level_spacing: 200.0,
            auto_fit: true,
            padding: 40.0,
        }
    }
}

/// The complete output contract to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramGraph {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
    pub layout: LayoutOptions,
}

// ============================================================================
// Mapping
// ============================================================================

/// Map idiom records to an unpositioned visual graph.
pub fn map_records(records: &[IdiomRecord]) -> (Vec<VisualNode>, Vec<VisualEdge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for record in records {
        for node in &record.nodes {
            nodes.push(VisualNode {
                id: node.id.clone(),
                kind: visual_node_kind(record.kind, node),
                position: Position::default(),
                label: node.label.clone(),
                metadata: VisualMetadata {
                    idiom_node_id: node.id.clone(),
                    idiom_kind: record.kind,
                    source_span: node.source_span,
                    context_snippet: record.metadata.context_snippet.clone(),
                },
                style: Map::new(),
            });
        }
        for conn in &record.connections {
            let kind = visual_edge_kind(conn.kind);
            edges.push(VisualEdge {
                id: conn.id.clone(),
                source_id: conn.source_id.clone(),
                target_id: conn.target_id.clone(),
                label: conn.label.clone(),
                kind,
                color: kind.color().to_string(),
                animated: kind.animated(),
                style: Map::new(),
            });
        }
    }
    (nodes, edges)
}

/// Map, position, and assemble the final diagram.
pub fn build_diagram(records: &[IdiomRecord]) -> DiagramGraph {
    let (nodes, edges) = map_records(records);
    let layout = LayoutOptions::default();
    let engine = LayoutEngine::new(layout.node_spacing, layout.level_spacing);
    let nodes = engine.position(nodes, &edges);
    DiagramGraph {
        nodes,
        edges,
        layout,
    }
}

/// Visual node kind from idiom-specific label heuristics, falling back to
/// the converter's structural kind (counter idiom) or a per-idiom default.
fn visual_node_kind(idiom: IdiomKind, node: &IdiomNode) -> IdiomNodeKind {
    let label = node.label.to_ascii_lowercase();
    let label_hits = |hints: &[&str]| hints.iter().any(|h| label.contains(h));
    match idiom {
        IdiomKind::Counter => {
            if label.starts_with("on") || label_hits(TRIGGER_HINTS) {
                IdiomNodeKind::Trigger
            } else if label_hits(COUNTER_HINTS) {
                IdiomNodeKind::Counter
            } else {
                node.kind
            }
        }
        IdiomKind::NetworkCall => {
            if label_hits(PERSON_HINTS) {
                IdiomNodeKind::Person
            } else if label_hits(FAULT_HINTS) {
                IdiomNodeKind::Fault
            } else {
                IdiomNodeKind::Network
            }
        }
        IdiomKind::Persistence => IdiomNodeKind::Store,
        IdiomKind::ErrorHandling => IdiomNodeKind::Fault,
        IdiomKind::ComponentDefinition => IdiomNodeKind::BuildingBlock,
    }
}

/// Connection kind → presentation kind.
fn visual_edge_kind(kind: IdiomConnectionKind) -> VisualEdgeKind {
    match kind {
        IdiomConnectionKind::SuccessPath => VisualEdgeKind::Success,
        IdiomConnectionKind::ErrorPath => VisualEdgeKind::Error,
        IdiomConnectionKind::Event | IdiomConnectionKind::ControlFlow => VisualEdgeKind::Action,
        IdiomConnectionKind::DataFlow => VisualEdgeKind::DataFlow,
    }
}
