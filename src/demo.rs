//! Sample workflow wiring used by the CLI.
//!
//! Throwaway glue around the engine: a small graph exercising fan-out,
//! naturally draining branches and an end node.

use crate::engine::WorkflowExecution;
use crate::graph::{Action, Graph, NodeKind};
use anyhow::Result;

/// Logs a fixed message when run.
struct Greet {
    message: String,
}

impl Action for Greet {
    fn run(&self) -> Result<()> {
        tracing::info!(message = %self.message, "greeting");
        Ok(())
    }

    fn description(&self) -> String {
        format!("prints {}", self.message)
    }
}

fn greet(message: &str) -> NodeKind {
    NodeKind::Action(Box::new(Greet {
        message: message.into(),
    }))
}

/// Start -> Action -> ParallelSplit -> { Action, Action -> End }.
pub fn sample_execution() -> Result<WorkflowExecution> {
    let mut graph = Graph::new();
    let start = graph.add_node(NodeKind::Start);
    let hola = graph.add_node(greet("hola"));
    let split = graph.add_node(NodeKind::ParallelSplit);
    let left = graph.add_node(greet("left branch"));
    let right = graph.add_node(greet("right branch"));
    let end = graph.add_node(NodeKind::End);

    graph.connect(start, hola)?;
    graph.connect(hola, split)?;
    graph.connect(split, left)?;
    graph.connect(split, right)?;
    graph.connect(right, end)?;

    let mut execution = WorkflowExecution::new(graph);
    execution.set_start(start)?;
    Ok(execution)
}
