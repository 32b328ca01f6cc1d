// 🕸️ Transaction Graph - layout projection and node detail lookup
//
// Turns the node/edge snapshot into drawable primitives. Lookups are total:
// an edge whose endpoint is unknown is skipped, an unknown node id yields
// NotFound, an empty selection yields NoSelection.

use crate::format::format_amount;
use crate::models::{Account, GraphEdge, GraphNode, Point, RiskLevel};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Vertical offset that keeps an edge label clear of its line
pub const LABEL_CLEARANCE: f64 = 8.0;

/// Outer ring radius of a drawn node
pub const NODE_RADIUS: f64 = 24.0;

// ============================================================================
// COLORS
// ============================================================================

/// Display color in HSL (hue degrees, saturation %, lightness %)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Hsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

impl Hsl {
    pub const fn new(h: u16, s: u8, l: u8) -> Self {
        Hsl { h, s, l }
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let h = (self.h % 360) as f64 / 60.0;
        let s = self.s.min(100) as f64 / 100.0;
        let l = self.l.min(100) as f64 / 100.0;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u8 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
    }
}

pub const HIGH_RISK_COLOR: Hsl = Hsl::new(0, 75, 55);
pub const MEDIUM_RISK_COLOR: Hsl = Hsl::new(38, 92, 50);
pub const LOW_RISK_COLOR: Hsl = Hsl::new(145, 65, 42);
pub const FALLBACK_COLOR: Hsl = Hsl::new(175, 70, 45);
pub const EDGE_COLOR: Hsl = Hsl::new(220, 15, 25);
pub const EDGE_LABEL_COLOR: Hsl = Hsl::new(215, 15, 55);

/// Risk → node color. `None` (unknown risk) gets the accent fallback.
pub fn color_for(risk: Option<RiskLevel>) -> Hsl {
    match risk {
        Some(RiskLevel::High) => HIGH_RISK_COLOR,
        Some(RiskLevel::Medium) => MEDIUM_RISK_COLOR,
        Some(RiskLevel::Low) => LOW_RISK_COLOR,
        None => FALLBACK_COLOR,
    }
}

// ============================================================================
// EDGES
// ============================================================================

pub type NodeIndex<'a> = HashMap<&'a str, &'a GraphNode>;

pub fn index_nodes(nodes: &[GraphNode]) -> NodeIndex<'_> {
    nodes.iter().map(|n| (n.id.as_str(), n)).collect()
}

/// Line geometry plus amount label for one resolved edge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeGeometry {
    pub from_id: String,
    pub to_id: String,
    pub from: Point,
    pub to: Point,
    pub midpoint: Point,
    pub label_position: Point,
    pub label: String,
    pub amount: f64,
}

/// Resolve both endpoints; `None` when either is missing from the index
pub fn resolve_edge(edge: &GraphEdge, nodes: &NodeIndex<'_>) -> Option<EdgeGeometry> {
    let from = nodes.get(edge.from.as_str())?.position();
    let to = nodes.get(edge.to.as_str())?.position();
    let midpoint = from.midpoint(&to);

    Some(EdgeGeometry {
        from_id: edge.from.clone(),
        to_id: edge.to.clone(),
        from,
        to,
        midpoint,
        label_position: Point::new(midpoint.x, midpoint.y - LABEL_CLEARANCE),
        label: format_amount(edge.amount),
        amount: edge.amount,
    })
}

// ============================================================================
// DEGREE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Degree {
    pub in_degree: usize,
    pub out_degree: usize,
}

/// Scan every edge: `to == id` counts in, `from == id` counts out. O(E).
pub fn node_degree(id: &str, edges: &[GraphEdge]) -> Degree {
    edges.iter().fold(Degree::default(), |mut degree, edge| {
        if edge.to == id {
            degree.in_degree += 1;
        }
        if edge.from == id {
            degree.out_degree += 1;
        }
        degree
    })
}

/// Per-node totals, precomputed once per edge set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FlowStats {
    pub degree: Degree,
    pub flow_in: f64,
    pub flow_out: f64,
}

fn build_flow_index(edges: &[GraphEdge]) -> HashMap<String, FlowStats> {
    let mut index: HashMap<String, FlowStats> = HashMap::new();
    for edge in edges {
        let out = index.entry(edge.from.clone()).or_default();
        out.degree.out_degree += 1;
        out.flow_out += edge.amount;

        let inbound = index.entry(edge.to.clone()).or_default();
        inbound.degree.in_degree += 1;
        inbound.flow_in += edge.amount;
    }
    index
}

// ============================================================================
// SCENE & DETAIL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeGlyph {
    pub id: String,
    pub label: String,
    pub position: Point,
    pub risk: Option<RiskLevel>,
    pub color: Hsl,
    pub selected: bool,
}

/// Everything needed to draw the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphScene {
    pub nodes: Vec<NodeGlyph>,
    pub edges: Vec<EdgeGeometry>,
    pub skipped_edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetail<'a> {
    pub node: &'a GraphNode,
    pub degree: Degree,
    pub flow_in: f64,
    pub flow_out: f64,

    /// Account record with the same identifier, when the snapshot has one
    pub account: Option<&'a Account>,
}

/// Result of a detail lookup for the side panel
#[derive(Debug, Clone, PartialEq)]
pub enum NodeLookup<'a> {
    /// Nothing selected: render the prompt state
    NoSelection,
    /// A selection exists but no such node is loaded
    NotFound(&'a str),
    Found(NodeDetail<'a>),
}

// ============================================================================
// PROJECTOR
// ============================================================================

#[derive(Debug, Clone)]
pub struct GraphLayoutProjector {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    positions: HashMap<String, usize>,
    flows: HashMap<String, FlowStats>,
    selected: Option<String>,
}

impl GraphLayoutProjector {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let positions = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        let flows = build_flow_index(&edges);

        GraphLayoutProjector {
            nodes,
            edges,
            positions,
            flows,
            selected: None,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.positions.get(id).map(|&i| &self.nodes[i])
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Record the selection, known node or not
    pub fn select_node(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Select the node after the current one, wrapping around
    pub fn select_next(&mut self) {
        self.select_offset(true);
    }

    /// Without a current selection this starts from the last node
    pub fn select_previous(&mut self) {
        self.select_offset(false);
    }

    fn select_offset(&mut self, forward: bool) {
        let len = self.nodes.len();
        if len == 0 {
            return;
        }
        let current = self.selected.as_deref().and_then(|id| self.positions.get(id)).copied();
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        self.selected = Some(self.nodes[next].id.clone());
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Degree from the precomputed index; agrees with `node_degree`
    pub fn degree(&self, id: &str) -> Degree {
        self.flows.get(id).map(|f| f.degree).unwrap_or_default()
    }

    pub fn flow(&self, id: &str) -> FlowStats {
        self.flows.get(id).copied().unwrap_or_default()
    }

    pub fn lookup<'a>(&'a self, id: &'a str, accounts: &'a [Account]) -> NodeLookup<'a> {
        match self.node(id) {
            None => NodeLookup::NotFound(id),
            Some(node) => {
                let flow = self.flow(id);
                NodeLookup::Found(NodeDetail {
                    node,
                    degree: flow.degree,
                    flow_in: flow.flow_in,
                    flow_out: flow.flow_out,
                    account: accounts.iter().find(|a| a.id == id),
                })
            }
        }
    }

    pub fn selected_detail<'a>(&'a self, accounts: &'a [Account]) -> NodeLookup<'a> {
        match self.selected.as_deref() {
            None => NodeLookup::NoSelection,
            Some(id) => self.lookup(id, accounts),
        }
    }

    /// Case-insensitive substring search on node id and label
    pub fn search(&self, query: &str) -> Vec<&GraphNode> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes
            .iter()
            .filter(|n| n.id.to_lowercase().contains(&needle) || n.label.to_lowercase().contains(&needle))
            .collect()
    }

    /// Top-left and bottom-right corners of the node layout
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.nodes.first()?.position();
        let (min, max) = self.nodes.iter().fold((first, first), |(min, max), n| {
            (
                Point::new(min.x.min(n.x), min.y.min(n.y)),
                Point::new(max.x.max(n.x), max.y.max(n.y)),
            )
        });
        Some((min, max))
    }

    // ------------------------------------------------------------------------
    // Projection
    // ------------------------------------------------------------------------

    pub fn project(&self) -> GraphScene {
        let index = index_nodes(&self.nodes);

        let mut edges = Vec::with_capacity(self.edges.len());
        let mut skipped_edges = 0;
        for edge in &self.edges {
            match resolve_edge(edge, &index) {
                Some(geometry) => edges.push(geometry),
                None => {
                    debug!(from = %edge.from, to = %edge.to, "edge skipped: endpoint not in node set");
                    skipped_edges += 1;
                }
            }
        }

        let nodes = self
            .nodes
            .iter()
            .map(|n| NodeGlyph {
                id: n.id.clone(),
                label: n.label.clone(),
                position: n.position(),
                risk: n.risk,
                color: color_for(n.risk),
                selected: self.selected.as_deref() == Some(n.id.as_str()),
            })
            .collect();

        GraphScene {
            nodes,
            edges,
            skipped_edges,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
