//! Graph traversal visitors
//!
//! External representations of a workflow graph are built by walking it with
//! a [`Visitor`]: the structured dump and the Graphviz export both consume
//! the same traversal without touching the node model.

mod dot;
mod dump;

pub use dot::DotExporter;
pub use dump::{DumpVisitor, NodeRecord};

use crate::graph::Node;

/// Callback invoked once per node reached by a traversal.
pub trait Visitor {
    fn visit(&mut self, node: &Node);
}
