//! Error types for workflow execution

use crate::graph::NodeId;
use thiserror::Error;

/// Errors that abort an execution pass
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{kind} node {node} has no successor wired")]
    MissingSuccessor { node: NodeId, kind: &'static str },

    #[error("action on node {node} failed: {source}")]
    ActionFailed {
        node: NodeId,
        #[source]
        source: anyhow::Error,
    },

    #[error("start node is already assigned")]
    StartAlreadySet,

    #[error("no start node assigned")]
    NoStartNode,
}
