#![allow(dead_code)]

//! Node model and graph construction
//!
//! A workflow is a directed graph of typed nodes. The [`Graph`] arena owns
//! every node and hands out [`NodeId`] handles; edges are appended in
//! insertion order and checked against each variant's arity caps at wiring
//! time. Cycles and diamond shapes are permitted, so every traversal carries
//! a visited set.
//!
//! # Example
//!
//! ```ignore
//! use miniflow::graph::{Graph, NodeKind};
//!
//! let mut graph = Graph::new();
//! let start = graph.add_node(NodeKind::Start);
//! let end = graph.add_node(NodeKind::End);
//! graph.connect(start, end)?;
//! ```

mod error;
mod node;

pub use error::{EdgeDirection, GraphError};
pub use node::{Action, Arity, Node, NodeId, NodeKind};

use crate::visit::Visitor;
use std::collections::HashSet;

/// Arena that owns all nodes of one workflow graph.
///
/// Node identifiers are assigned in creation order, scoped to this instance.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node of the given kind and return its handle.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, kind));
        id
    }

    /// Borrow a node. Panics if `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append an incoming edge on `node` from `pred`.
    ///
    /// Fails without mutating anything when `node`'s in-degree cap would be
    /// exceeded. Duplicate edges are not rejected.
    pub fn add_in_edge(&mut self, node: NodeId, pred: NodeId) -> Result<(), GraphError> {
        self.check_node(node)?;
        self.check_node(pred)?;
        self.check_cap(node, EdgeDirection::In)?;
        self.node_mut(node).in_edges.push(pred);
        Ok(())
    }

    /// Append an outgoing edge on `node` to `succ`.
    ///
    /// Fails without mutating anything when `node`'s out-degree cap would be
    /// exceeded. Duplicate edges are not rejected.
    pub fn add_out_edge(&mut self, node: NodeId, succ: NodeId) -> Result<(), GraphError> {
        self.check_node(node)?;
        self.check_node(succ)?;
        self.check_cap(node, EdgeDirection::Out)?;
        self.node_mut(node).out_edges.push(succ);
        Ok(())
    }

    /// Wire a directed edge `from -> to`, updating both adjacency lists.
    ///
    /// Both caps are checked before either list is touched, so a failed
    /// connect leaves both degrees unchanged.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.check_node(from)?;
        self.check_node(to)?;
        self.check_cap(from, EdgeDirection::Out)?;
        self.check_cap(to, EdgeDirection::In)?;
        self.node_mut(from).out_edges.push(to);
        self.node_mut(to).in_edges.push(from);
        Ok(())
    }

    /// Visit every node reachable from `from`, depth-first following
    /// out-edges in insertion order.
    ///
    /// The traversal carries its own visited set keyed by node identity, so
    /// each reachable node is visited exactly once and cyclic or diamond
    /// graphs terminate.
    pub fn accept(&self, from: NodeId, visitor: &mut dyn Visitor) {
        let mut seen = HashSet::new();
        self.accept_inner(from, visitor, &mut seen);
    }

    fn accept_inner(&self, id: NodeId, visitor: &mut dyn Visitor, seen: &mut HashSet<NodeId>) {
        if !seen.insert(id) {
            return;
        }
        let node = self.node(id);
        visitor.visit(node);
        for &succ in &node.out_edges {
            self.accept_inner(succ, visitor, seen);
        }
    }

    fn check_node(&self, id: NodeId) -> Result<(), GraphError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(GraphError::UnknownNode { node: id })
        }
    }

    fn check_cap(&self, id: NodeId, direction: EdgeDirection) -> Result<(), GraphError> {
        let node = self.node(id);
        let (cap, degree) = match direction {
            EdgeDirection::In => (node.kind().max_in(), node.in_edges.len()),
            EdgeDirection::Out => (node.kind().max_out(), node.out_edges.len()),
        };
        match cap {
            Arity::Unbounded => Ok(()),
            Arity::Bounded(max) if degree < max => Ok(()),
            Arity::Bounded(max) => Err(GraphError::ArityViolation {
                node: id,
                kind: node.kind().name(),
                direction,
                max,
            }),
        }
    }
}
