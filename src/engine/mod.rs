//! Activation-based execution engine
//!
//! [`WorkflowExecution`] owns one graph and drives it in passes: every node
//! in the activation set attempts to execute; completing deactivates it and
//! may activate successors. The run ends when the activation set drains,
//! suspends when a full pass makes no progress, and stops early when the
//! cancellation token is observed between node attempts.
//!
//! # Example
//!
//! ```ignore
//! use miniflow::engine::{ExecutionStatus, WorkflowExecution};
//!
//! let mut execution = WorkflowExecution::new(graph);
//! execution.set_start(start)?;
//! match execution.execute()? {
//!     ExecutionStatus::Ended => println!("done"),
//!     status => println!("stopped: {status}"),
//! }
//! ```

mod cancel;
mod error;
mod execution;

pub use cancel::CancelToken;
pub use error::ExecutionError;
pub use execution::{ExecutionStatus, Progress, WorkflowExecution};
