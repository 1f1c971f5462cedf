#![allow(dead_code)]

//! Workflow execution state and the pass loop

use super::cancel::CancelToken;
use super::error::ExecutionError;
use crate::graph::{Graph, NodeId, NodeKind};
use crate::visit::Visitor;
use std::collections::HashMap;
use std::fmt;

/// Outcome of one node execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The node ran; deactivate it.
    Completed,
    /// The node is not yet runnable; leave it in the activation set.
    Blocked,
}

/// Terminal status reported by [`WorkflowExecution::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// The activation set drained; the workflow ran to completion.
    Ended,
    /// Activated nodes remain but a full pass made no progress.
    Suspended,
    /// Cancellation was observed between node attempts.
    Cancelled,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Ended => f.write_str("ended"),
            ExecutionStatus::Suspended => f.write_str("suspended"),
            ExecutionStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// How a variant hands activation to its successors.
enum FanOut {
    /// Activate the first successor; an empty edge list is a leaf and drains.
    First,
    /// Activate the first successor; an empty edge list is a wiring error.
    FirstRequired,
    /// Activate every successor.
    All,
    /// Activate nothing.
    None,
}

/// Runtime instance executing one graph.
///
/// Owns the graph, the activation set (insertion-ordered, no duplicates) and
/// the workflow-scoped variable state. Driving it with [`execute`] runs
/// passes over the activation set until the workflow ends, suspends or is
/// cancelled.
///
/// [`execute`]: WorkflowExecution::execute
pub struct WorkflowExecution {
    graph: Graph,
    start: Option<NodeId>,
    activated: Vec<NodeId>,
    state: HashMap<String, serde_json::Value>,
    executed_trace: Vec<NodeId>,
    cancel: CancelToken,
}

impl WorkflowExecution {
    pub fn new(graph: Graph) -> Self {
        Self::with_cancel_token(graph, CancelToken::new())
    }

    /// Create an execution observing an externally owned cancellation token.
    pub fn with_cancel_token(graph: Graph, cancel: CancelToken) -> Self {
        Self {
            graph,
            start: None,
            activated: Vec::new(),
            state: HashMap::new(),
            executed_trace: Vec::new(),
            cancel,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Assign the start node and activate it. The start node is assigned
    /// once; a second assignment is an error.
    pub fn set_start(&mut self, node: NodeId) -> Result<(), ExecutionError> {
        if self.start.is_some() {
            return Err(ExecutionError::StartAlreadySet);
        }
        self.start = Some(node);
        self.activate(node);
        Ok(())
    }

    /// Insert a node into the activation set. Idempotent: activating an
    /// already-present node has no effect.
    pub fn activate(&mut self, node: NodeId) {
        if !self.activated.contains(&node) {
            tracing::debug!(node = %node, kind = self.graph.node(node).kind().name(), "activated");
            self.activated.push(node);
        }
    }

    /// True once the activation set has drained.
    pub fn ended(&self) -> bool {
        self.activated.is_empty()
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token for requesting a cooperative stop from outside the pass loop.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Nodes currently eligible to attempt execution, in activation order.
    pub fn activated_nodes(&self) -> &[NodeId] {
        &self.activated
    }

    /// Identifiers of completed nodes, in completion order.
    pub fn executed_trace(&self) -> &[NodeId] {
        &self.executed_trace
    }

    /// Workflow-scoped variable state.
    pub fn state(&self) -> &HashMap<String, serde_json::Value> {
        &self.state
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.insert(key.into(), value);
    }

    /// Traverse the graph from the start node, handing each reachable node
    /// to the visitor exactly once.
    pub fn accept(&self, visitor: &mut dyn Visitor) -> Result<(), ExecutionError> {
        let start = self.start.ok_or(ExecutionError::NoStartNode)?;
        self.graph.accept(start, visitor);
        Ok(())
    }

    /// Drive the graph to completion or suspension.
    ///
    /// Each pass iterates a snapshot of the activation set in insertion
    /// order, so activations made during the pass join the next one. A
    /// completed node leaves the set; a blocked node stays. Passes repeat
    /// while at least one node completed; cancellation is polled between
    /// node attempts and stops the run immediately, leaving unattempted
    /// nodes activated.
    pub fn execute(&mut self) -> Result<ExecutionStatus, ExecutionError> {
        if self.start.is_none() {
            return Err(ExecutionError::NoStartNode);
        }
        loop {
            let mut progressed = false;
            let snapshot = self.activated.clone();
            for node in snapshot {
                if self.cancel.is_cancelled() {
                    tracing::info!(pending = self.activated.len(), "execution cancelled");
                    return Ok(ExecutionStatus::Cancelled);
                }
                if self.ended() {
                    break;
                }
                match self.execute_node(node)? {
                    Progress::Completed => {
                        self.deactivate(node);
                        self.executed_trace.push(node);
                        progressed = true;
                    }
                    Progress::Blocked => {
                        tracing::debug!(node = %node, "blocked, left activated");
                    }
                }
            }
            if self.ended() {
                tracing::info!(completed = self.executed_trace.len(), "workflow ended");
                return Ok(ExecutionStatus::Ended);
            }
            if !progressed {
                tracing::info!(pending = self.activated.len(), "workflow suspended");
                return Ok(ExecutionStatus::Suspended);
            }
        }
    }

    /// Execute one node: mark it executed, perform variant behavior, then
    /// activate successors according to the variant's fan-out.
    fn execute_node(&mut self, id: NodeId) -> Result<Progress, ExecutionError> {
        // UserTask completion belongs to the external task subsystem; there
        // is nothing to run in-process.
        if matches!(self.graph.node(id).kind(), NodeKind::UserTask) {
            return Ok(Progress::Blocked);
        }

        tracing::debug!(node = %id, kind = self.graph.node(id).kind().name(), "executing");
        self.graph.node_mut(id).mark_executed();

        let fan_out = match self.graph.node(id).kind() {
            NodeKind::Start => FanOut::FirstRequired,
            NodeKind::Action(action) => {
                action
                    .run()
                    .map_err(|source| ExecutionError::ActionFailed { node: id, source })?;
                FanOut::First
            }
            NodeKind::ParallelSplit => FanOut::All,
            NodeKind::End => {
                tracing::info!(node = %id, "reached end node");
                FanOut::None
            }
            NodeKind::SubWorkflow | NodeKind::UserTask => FanOut::None,
        };

        match fan_out {
            FanOut::FirstRequired => {
                let succ = self.first_successor(id)?;
                self.activate(succ);
            }
            FanOut::First => {
                let succ = self.graph.node(id).out_edges().first().copied();
                if let Some(succ) = succ {
                    self.activate(succ);
                }
            }
            FanOut::All => {
                let succs = self.graph.node(id).out_edges().to_vec();
                for succ in succs {
                    self.activate(succ);
                }
            }
            FanOut::None => {}
        }

        Ok(Progress::Completed)
    }

    fn first_successor(&self, id: NodeId) -> Result<NodeId, ExecutionError> {
        let node = self.graph.node(id);
        node.out_edges()
            .first()
            .copied()
            .ok_or(ExecutionError::MissingSuccessor {
                node: id,
                kind: node.kind().name(),
            })
    }

    fn deactivate(&mut self, id: NodeId) {
        self.activated.retain(|n| *n != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Action;
    use std::sync::{Arc, Mutex};

    /// Appends its label to a shared log on every run.
    struct RecordingAction {
        label: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Action for RecordingAction {
        fn run(&self) -> anyhow::Result<()> {
            self.log.lock().unwrap().push(self.label.clone());
            Ok(())
        }

        fn description(&self) -> String {
            format!("appends {}", self.label)
        }
    }

    struct FailingAction;

    impl Action for FailingAction {
        fn run(&self) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("boom"))
        }

        fn description(&self) -> String {
            "always fails".into()
        }
    }

    /// Cancels the shared token when run.
    struct CancellingAction {
        token: CancelToken,
    }

    impl Action for CancellingAction {
        fn run(&self) -> anyhow::Result<()> {
            self.token.cancel();
            Ok(())
        }

        fn description(&self) -> String {
            "requests cancellation".into()
        }
    }

    fn recording(label: &str, log: &Arc<Mutex<Vec<String>>>) -> NodeKind {
        NodeKind::Action(Box::new(RecordingAction {
            label: label.into(),
            log: log.clone(),
        }))
    }

    #[test]
    fn test_start_activates_its_successor() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let task = graph.add_node(NodeKind::UserTask);
        graph.connect(start, task).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        assert_eq!(execution.activated_nodes(), &[start]);

        let status = execution.execute().unwrap();

        // the start node completed and handed activation to the user task,
        // which blocks
        assert_eq!(status, ExecutionStatus::Suspended);
        assert_eq!(execution.activated_nodes(), &[task]);
        assert_eq!(execution.executed_trace(), &[start]);
        assert!(execution.graph().node(start).executed());
        assert!(!execution.graph().node(task).executed());
    }

    #[test]
    fn test_parallel_split_activates_all_successors() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let split = graph.add_node(NodeKind::ParallelSplit);
        let a = graph.add_node(NodeKind::UserTask);
        let b = graph.add_node(NodeKind::UserTask);
        graph.connect(start, split).unwrap();
        graph.connect(split, a).unwrap();
        graph.connect(split, b).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        let status = execution.execute().unwrap();

        assert_eq!(status, ExecutionStatus::Suspended);
        assert_eq!(execution.activated_nodes(), &[a, b]);
        assert!(execution.graph().node(split).executed());
    }

    #[test]
    fn test_ended_iff_activation_set_empty() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let end = graph.add_node(NodeKind::End);
        graph.connect(start, end).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        assert!(execution.ended());

        execution.set_start(start).unwrap();
        assert!(!execution.ended());

        execution.execute().unwrap();
        assert!(execution.ended());
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut graph = Graph::new();
        let a = graph.add_node(NodeKind::SubWorkflow);

        let mut execution = WorkflowExecution::new(graph);
        execution.activate(a);
        execution.activate(a);
        assert_eq!(execution.activated_nodes(), &[a]);
    }

    #[test]
    fn test_start_assigned_only_once() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let mut execution = WorkflowExecution::new(graph);

        execution.set_start(start).unwrap();
        assert!(matches!(
            execution.set_start(start),
            Err(ExecutionError::StartAlreadySet)
        ));
    }

    #[test]
    fn test_execute_without_start_is_an_error() {
        let mut execution = WorkflowExecution::new(Graph::new());
        assert!(matches!(
            execution.execute(),
            Err(ExecutionError::NoStartNode)
        ));
    }

    #[test]
    fn test_start_without_successor_is_fatal() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        assert!(matches!(
            execution.execute(),
            Err(ExecutionError::MissingSuccessor { .. })
        ));
    }

    #[test]
    fn test_linear_workflow_runs_to_completion() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let action = graph.add_node(recording("x", &log));
        let end = graph.add_node(NodeKind::End);
        graph.connect(start, action).unwrap();
        graph.connect(action, end).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        let status = execution.execute().unwrap();

        assert_eq!(status, ExecutionStatus::Ended);
        assert!(execution.ended());
        assert_eq!(*log.lock().unwrap(), vec!["x"]);
        assert_eq!(execution.executed_trace(), &[start, action, end]);
        for id in [start, action, end] {
            assert!(execution.graph().node(id).executed());
        }
    }

    #[test]
    fn test_fan_out_branches_drain_naturally() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let split = graph.add_node(NodeKind::ParallelSplit);
        let a = graph.add_node(recording("a", &log));
        let b = graph.add_node(recording("b", &log));
        graph.connect(start, split).unwrap();
        graph.connect(split, a).unwrap();
        graph.connect(split, b).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        let status = execution.execute().unwrap();

        // leaf actions have no successor and drain on completion
        assert_eq!(status, ExecutionStatus::Ended);
        assert!(execution.ended());
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_blocked_node_suspends_the_workflow() {
        let mut graph = Graph::new();
        let task = graph.add_node(NodeKind::UserTask);

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(task).unwrap();
        let status = execution.execute().unwrap();

        assert_eq!(status, ExecutionStatus::Suspended);
        assert!(!execution.ended());
        assert_eq!(execution.activated_nodes(), &[task]);
        assert!(execution.executed_trace().is_empty());
    }

    #[test]
    fn test_action_failure_aborts_the_pass() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let action = graph.add_node(NodeKind::Action(Box::new(FailingAction)));
        graph.connect(start, action).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        let err = execution.execute().unwrap_err();

        assert!(matches!(
            err,
            ExecutionError::ActionFailed { node, .. } if node == action
        ));
        // the failing node stays activated, marked executed before the run
        assert_eq!(execution.activated_nodes(), &[action]);
        assert!(execution.graph().node(action).executed());
    }

    #[test]
    fn test_cancellation_before_execute_short_circuits() {
        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let end = graph.add_node(NodeKind::End);
        graph.connect(start, end).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(start).unwrap();
        execution.cancel_token().cancel();

        let status = execution.execute().unwrap();
        assert_eq!(status, ExecutionStatus::Cancelled);
        assert!(execution.cancelled());
        // nothing was attempted
        assert_eq!(execution.activated_nodes(), &[start]);
        assert!(!execution.graph().node(start).executed());
    }

    #[test]
    fn test_cancellation_mid_run_retains_unattempted_nodes() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let token = CancelToken::new();

        let mut graph = Graph::new();
        let start = graph.add_node(NodeKind::Start);
        let canceller =
            graph.add_node(NodeKind::Action(Box::new(CancellingAction { token: token.clone() })));
        let after = graph.add_node(recording("never", &log));
        graph.connect(start, canceller).unwrap();
        graph.connect(canceller, after).unwrap();

        let mut execution = WorkflowExecution::with_cancel_token(graph, token);
        execution.set_start(start).unwrap();
        let status = execution.execute().unwrap();

        // the cancelling action completed; its successor was activated but
        // never attempted
        assert_eq!(status, ExecutionStatus::Cancelled);
        assert_eq!(execution.activated_nodes(), &[after]);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sub_workflow_completes_without_activating() {
        let mut graph = Graph::new();
        let sub = graph.add_node(NodeKind::SubWorkflow);
        let next = graph.add_node(NodeKind::SubWorkflow);
        graph.connect(sub, next).unwrap();

        let mut execution = WorkflowExecution::new(graph);
        execution.set_start(sub).unwrap();
        let status = execution.execute().unwrap();

        // base behavior only: mark executed, activate nothing
        assert_eq!(status, ExecutionStatus::Ended);
        assert!(execution.graph().node(sub).executed());
        assert!(!execution.graph().node(next).executed());
    }

    #[test]
    fn test_workflow_state_round_trips_values() {
        let mut execution = WorkflowExecution::new(Graph::new());
        assert!(execution.state().is_empty());

        execution.set_value("answer", serde_json::json!(42));
        execution.set_value("answer", serde_json::json!("forty-two"));

        assert_eq!(execution.state().len(), 1);
        assert_eq!(
            execution.state().get("answer"),
            Some(&serde_json::json!("forty-two"))
        );
    }
}
