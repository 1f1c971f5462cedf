//! Graphviz export of a workflow graph

use super::Visitor;
use crate::graph::{Node, NodeId, NodeKind};
use std::collections::HashSet;

/// Renders visited nodes as a Graphviz digraph.
///
/// Keeps its own visited set keyed by node identity, so a node reachable via
/// several paths is declared exactly once.
#[derive(Debug, Default)]
pub struct DotExporter {
    seen: HashSet<NodeId>,
    nodes: Vec<String>,
    edges: Vec<String>,
}

impl DotExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenate the collected statements into one dot document.
    pub fn render(&self) -> String {
        let mut doc = String::from("digraph workflow {\n");
        for statement in self.nodes.iter().chain(self.edges.iter()) {
            doc.push_str(statement);
        }
        doc.push('}');
        doc
    }

    fn label(node: &Node) -> String {
        let executed = if node.executed() { " (executed)" } else { "" };
        match node.kind() {
            NodeKind::Action(action) => {
                format!("{} - '{}'{}", node.kind().name(), action.description(), executed)
            }
            kind => format!("{}{}", kind.name(), executed),
        }
    }
}

impl Visitor for DotExporter {
    fn visit(&mut self, node: &Node) {
        if !self.seen.insert(node.id()) {
            return;
        }
        self.nodes
            .push(format!("node_{} [label = \"{}\"]\n", node.id(), Self::label(node)));
        for succ in node.out_edges() {
            self.edges.push(format!("node_{} -> node_{}\n", node.id(), succ));
        }
    }
}
