//! Error types for graph construction

use super::NodeId;
use std::fmt;
use thiserror::Error;

/// Which adjacency list an edge operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    In,
    Out,
}

impl fmt::Display for EdgeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeDirection::In => f.write_str("in"),
            EdgeDirection::Out => f.write_str("out"),
        }
    }
}

/// Errors during graph wiring
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("{kind} node {node} allows at most {max} {direction}-edge(s)")]
    ArityViolation {
        node: NodeId,
        kind: &'static str,
        direction: EdgeDirection,
        max: usize,
    },

    #[error("node {node} does not belong to this graph")]
    UnknownNode { node: NodeId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_violation_display() {
        let err = GraphError::ArityViolation {
            node: NodeId(3),
            kind: "Start",
            direction: EdgeDirection::Out,
            max: 1,
        };
        let display = format!("{}", err);
        assert!(display.contains("Start"));
        assert!(display.contains('3'));
        assert!(display.contains("out"));
    }
}
