//! Heterogeneous undirected graph of genes, proteins and enrichment terms.
//!
//! Nodes are identified by (kind, label): adding a node that already exists
//! is a no-op that returns the existing id. Edges are undirected and stored
//! once per unordered pair.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use multiomix_common::TermCategory;

// ---------------------------------------------------------------------------
// Node kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    Gene,
    Protein,
    Pathway,
    Metabolite,
    Disease,
}

impl NodeKind {
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Gene,
        NodeKind::Protein,
        NodeKind::Pathway,
        NodeKind::Metabolite,
        NodeKind::Disease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Gene       => "Gene",
            NodeKind::Protein    => "Protein",
            NodeKind::Pathway    => "Pathway",
            NodeKind::Metabolite => "Metabolite",
            NodeKind::Disease    => "Disease",
        }
    }

    /// Display color used by the network renderer.
    pub fn color(&self) -> &'static str {
        match self {
            NodeKind::Gene       => "gray",
            NodeKind::Protein    => "gold",
            NodeKind::Pathway    => "skyblue",
            NodeKind::Metabolite => "green",
            NodeKind::Disease    => "red",
        }
    }
}

impl From<TermCategory> for NodeKind {
    fn from(category: TermCategory) -> Self {
        match category {
            TermCategory::Pathway    => NodeKind::Pathway,
            TermCategory::Metabolite => NodeKind::Metabolite,
            TermCategory::Disease    => NodeKind::Disease,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    /// A gene, protein or term, scoped by kind.
    Entity { kind: NodeKind, label: String },
    /// Decorative legend entry for a kind; never an edge endpoint.
    Legend(NodeKind),
}

impl NodeId {
    pub fn entity(kind: NodeKind, label: impl Into<String>) -> Self {
        NodeId::Entity { kind, label: label.into() }
    }

    pub fn gene(label: impl Into<String>) -> Self {
        Self::entity(NodeKind::Gene, label)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            NodeId::Entity { kind, .. } => *kind,
            NodeId::Legend(kind) => *kind,
        }
    }

    pub fn is_legend(&self) -> bool {
        matches!(self, NodeId::Legend(_))
    }
}

/// Stable string key, e.g. `Gene:TP53` or `Legend_Gene`.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Entity { kind, label } => write!(f, "{kind}:{label}"),
            NodeId::Legend(kind) => write!(f, "Legend_{kind}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Dot,
    Box,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub color: &'static str,
    /// Hover text, e.g. `Gene: TP53`. Legend nodes have none.
    pub title: Option<String>,
    pub shape: NodeShape,
    /// Whether the layout engine moves the node.
    pub physics: bool,
}

impl Node {
    pub fn is_legend(&self) -> bool {
        self.id.is_legend()
    }
}

/// Undirected edge; endpoints are stored in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
}

impl Edge {
    fn new(x: NodeId, y: NodeId) -> Self {
        if x <= y { Edge { a: x, b: y } } else { Edge { a: y, b: x } }
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.a == id || &self.b == id
    }

    /// The endpoint opposite `id`, if `id` is one of them.
    pub fn other(&self, id: &NodeId) -> Option<&NodeId> {
        if &self.a == id {
            Some(&self.b)
        } else if &self.b == id {
            Some(&self.a)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gene/protein/term node unless it already exists. Returns its id.
    pub fn add_node(&mut self, kind: NodeKind, label: &str) -> NodeId {
        let id = NodeId::entity(kind, label);
        if !self.index.contains_key(&id) {
            self.insert(Node {
                id: id.clone(),
                kind,
                label: label.to_string(),
                color: kind.color(),
                title: Some(format!("{kind}: {label}")),
                shape: NodeShape::Dot,
                physics: true,
            });
        }
        id
    }

    /// Add the legend node for `kind` unless it already exists.
    pub fn add_legend(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::Legend(kind);
        if !self.index.contains_key(&id) {
            self.insert(Node {
                id: id.clone(),
                kind,
                label: kind.as_str().to_string(),
                color: kind.color(),
                title: None,
                shape: NodeShape::Box,
                physics: false,
            });
        }
        id
    }

    fn insert(&mut self, node: Node) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Connect two existing non-legend nodes. Returns `true` when a new edge
    /// was recorded; repeated pairs are ignored.
    pub fn add_edge(&mut self, x: &NodeId, y: &NodeId) -> bool {
        if x.is_legend() || y.is_legend() {
            warn!(%x, %y, "Refusing edge to a legend node");
            return false;
        }
        if !self.contains(x) || !self.contains(y) {
            warn!(%x, %y, "Refusing edge with a missing endpoint");
            return false;
        }
        let edge = Edge::new(x.clone(), y.clone());
        if !self.edge_set.insert(edge.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn has_edge(&self, x: &NodeId, y: &NodeId) -> bool {
        self.edge_set.contains(&Edge::new(x.clone(), y.clone()))
    }

    /// All nodes in insertion order, legend included.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Non-legend nodes of one kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind == kind && !n.is_legend())
    }

    pub fn legend(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_legend())
    }

    pub fn neighbors<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.edges.iter().filter_map(move |e| e.other(id))
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.edges.iter().filter(|e| e.touches(id)).count()
    }
}
