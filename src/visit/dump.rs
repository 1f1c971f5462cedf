//! Structured dump of a workflow graph

use super::Visitor;
use crate::graph::{Node, NodeId};
use serde::Serialize;

/// One dumped node: variant name, identifier and adjacency lists in edge
/// insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRecord {
    pub kind: String,
    pub id: NodeId,
    pub in_nodes: Vec<NodeId>,
    pub out_nodes: Vec<NodeId>,
}

/// Collects a [`NodeRecord`] per visited node, in visit order.
#[derive(Debug, Default)]
pub struct DumpVisitor {
    records: Vec<NodeRecord>,
}

impl DumpVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    /// Render the collected records as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.records)
    }
}

impl Visitor for DumpVisitor {
    fn visit(&mut self, node: &Node) {
        self.records.push(NodeRecord {
            kind: node.kind().name().to_string(),
            id: node.id(),
            in_nodes: node.in_edges().to_vec(),
            out_nodes: node.out_edges().to_vec(),
        });
    }
}
