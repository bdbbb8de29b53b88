//! Serialisation of the network and the association table.
//!
//! The network is exported as a flat `{nodes, edges, legend}` document that a
//! renderer (vis-network, Cytoscape) can load directly.

use std::io::Write;

use serde::{Serialize, Serializer};

use multiomix_common::Result;

use crate::association::{AssociationRow, ASSOCIATION_HEADERS};
use crate::graph::{Graph, Node, NodeKind, NodeShape};

#[derive(Debug, Serialize)]
pub struct NodeExport<'a> {
    pub id: String,
    pub label: &'a str,
    pub kind: NodeKind,
    pub color: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    pub shape: NodeShape,
    pub physics: bool,
}

impl<'a> From<&'a Node> for NodeExport<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            id: node.id.to_string(),
            label: &node.label,
            kind: node.kind,
            color: node.color,
            title: node.title.as_deref(),
            shape: node.shape,
            physics: node.physics,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EdgeExport {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: Vec<NodeExport<'a>>,
    pub edges: Vec<EdgeExport>,
    pub legend: Vec<NodeExport<'a>>,
}

impl Graph {
    pub fn to_export(&self) -> GraphExport<'_> {
        GraphExport {
            nodes: self.nodes().iter().filter(|n| !n.is_legend()).map(NodeExport::from).collect(),
            edges: self
                .edges()
                .iter()
                .map(|e| EdgeExport { from: e.a.to_string(), to: e.b.to_string() })
                .collect(),
            legend: self.legend().map(NodeExport::from).collect(),
        }
    }
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_export().serialize(serializer)
    }
}

/// Pretty-printed JSON document of the network.
pub fn graph_to_json(graph: &Graph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

/// Write the association table as CSV. The header row is written even when
/// there are no rows.
pub fn write_associations_csv<W: Write>(rows: &[AssociationRow], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(ASSOCIATION_HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn sample_graph() -> Graph {
        let mut g = Graph::new();
        let gene = g.add_node(NodeKind::Gene, "TP53");
        let protein = g.add_node(NodeKind::Protein, "P53_HUMAN");
        g.add_edge(&gene, &protein);
        for kind in NodeKind::ALL {
            g.add_legend(kind);
        }
        g
    }

    #[test]
    fn test_graph_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&graph_to_json(&sample_graph()).unwrap()).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["legend"].as_array().unwrap().len(), 5);
        assert_eq!(value["edges"].as_array().unwrap().len(), 1);
        assert_eq!(value["nodes"][0]["id"], "Gene:TP53");
        assert_eq!(value["nodes"][0]["color"], "gray");
        assert_eq!(value["nodes"][0]["title"], "Gene: TP53");
        assert_eq!(value["legend"][0]["id"], "Legend_Gene");
        assert_eq!(value["legend"][0]["shape"], "box");
        assert_eq!(value["legend"][0]["physics"], false);
    }

    #[test]
    fn test_edge_endpoints_reference_exported_nodes() {
        let graph = sample_graph();
        let export = graph.to_export();
        let ids: Vec<&str> = export.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &export.edges {
            assert!(ids.contains(&edge.from.as_str()));
            assert!(ids.contains(&edge.to.as_str()));
        }
        assert!(graph.has_edge(&NodeId::gene("TP53"), &NodeId::entity(NodeKind::Protein, "P53_HUMAN")));
    }

    #[test]
    fn test_associations_csv() {
        let rows = vec![AssociationRow {
            gene: "TP53".into(),
            proteins: "P53_HUMAN".into(),
            pathways: "Apoptosis; Cell Cycle".into(),
            metabolites: String::new(),
            diseases: String::new(),
        }];
        let mut buf = Vec::new();
        write_associations_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "Gene,Proteins,Pathways,Metabolites,Diseases\nTP53,P53_HUMAN,Apoptosis; Cell Cycle,,\n"
        );
    }

    #[test]
    fn test_empty_associations_csv_has_header() {
        let mut buf = Vec::new();
        write_associations_csv(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Gene,Proteins,Pathways,Metabolites,Diseases\n");
    }
}
