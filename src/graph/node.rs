#![allow(dead_code)]

//! Typed workflow nodes and their arity contracts

use serde::Serialize;
use std::fmt;

/// Handle to a node owned by a [`Graph`](super::Graph).
///
/// Identifiers are assigned by the owning graph in creation order and have no
/// meaning outside that graph instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit of work attached to an [`NodeKind::Action`] node.
///
/// A failure raised by `run` aborts the executing pass; there is no retry.
pub trait Action {
    /// Perform the work.
    fn run(&self) -> anyhow::Result<()>;

    /// Short human-readable description, embedded in graph exports.
    fn description(&self) -> String;
}

/// In/out-degree cap declared by a node variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Bounded(usize),
    Unbounded,
}

impl Arity {
    /// True if a list currently holding `degree` edges can take another.
    pub fn allows(self, degree: usize) -> bool {
        match self {
            Arity::Unbounded => true,
            Arity::Bounded(max) => degree < max,
        }
    }
}

/// The closed set of node variants.
pub enum NodeKind {
    /// Entry point; activates its single successor.
    Start,
    /// Terminal; executing it is a no-op side effect.
    End,
    /// Runs the attached action, then activates its first successor if one
    /// is wired.
    Action(Box<dyn Action>),
    /// Activates every successor (fan-out); no synchronizing join.
    ParallelSplit,
    /// Placeholder for nested workflows; base behavior only.
    SubWorkflow,
    /// Boundary to the external task/approval subsystem. Never runnable
    /// in-process: executing it always reports blocked, leaving it in the
    /// activation set.
    UserTask,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::End => "End",
            NodeKind::Action(_) => "Action",
            NodeKind::ParallelSplit => "ParallelSplit",
            NodeKind::SubWorkflow => "SubWorkflow",
            NodeKind::UserTask => "UserTask",
        }
    }

    /// Maximum permitted in-degree.
    pub fn max_in(&self) -> Arity {
        match self {
            NodeKind::Start => Arity::Bounded(0),
            NodeKind::End => Arity::Bounded(1),
            NodeKind::Action(_) => Arity::Unbounded,
            NodeKind::ParallelSplit => Arity::Bounded(1),
            NodeKind::SubWorkflow => Arity::Unbounded,
            NodeKind::UserTask => Arity::Bounded(1),
        }
    }

    /// Maximum permitted out-degree.
    pub fn max_out(&self) -> Arity {
        match self {
            NodeKind::Start => Arity::Bounded(1),
            NodeKind::End => Arity::Bounded(0),
            NodeKind::Action(_) => Arity::Unbounded,
            NodeKind::ParallelSplit => Arity::Unbounded,
            NodeKind::SubWorkflow => Arity::Unbounded,
            NodeKind::UserTask => Arity::Bounded(1),
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of a workflow: a variant plus its directed edges.
///
/// Edge lists preserve insertion order and permit duplicates; callers wire
/// edges through the owning [`Graph`](super::Graph), which enforces the
/// variant's arity caps.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    pub(crate) in_edges: Vec<NodeId>,
    pub(crate) out_edges: Vec<NodeId>,
    executed: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            executed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// False until the node first executes successfully.
    pub fn executed(&self) -> bool {
        self.executed
    }

    pub(crate) fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Predecessor identifiers, in edge insertion order.
    pub fn in_edges(&self) -> &[NodeId] {
        &self.in_edges
    }

    /// Successor identifiers, in edge insertion order.
    pub fn out_edges(&self) -> &[NodeId] {
        &self.out_edges
    }

    /// Attached action, if this is an Action node.
    pub fn action(&self) -> Option<&dyn Action> {
        match &self.kind {
            NodeKind::Action(action) => Some(action.as_ref()),
            _ => None,
        }
    }
}
