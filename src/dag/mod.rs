// src/dag/mod.rs

//! Task graph representation and scheduling reads.
//!
//! - [`task`] holds the per-task record and its status transitions.
//! - [`graph`] builds the graph from input records, including the
//!   parent/child hierarchy rule.
//! - [`cycle`] is the acyclicity gate.
//! - [`tiers`] computes dependency depth and the aggregates derived from it.
//! - [`scheduler`] decides which tasks are ready and which are blocked.

pub mod cycle;
pub mod graph;
pub mod scheduler;
pub mod task;
pub mod tiers;

pub use graph::TaskGraph;
pub use scheduler::{blocked_tasks, ready_tasks};
pub use task::TaskNode;
