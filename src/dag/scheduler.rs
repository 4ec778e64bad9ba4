// src/dag/scheduler.rs

//! Ready-set and blocked-set computation.
//!
//! These are pure reads over a [`TaskGraph`]; the only place task status is
//! mutated is the session's assign/resolve path.

use std::cmp::Ordering;

use crate::dag::graph::TaskGraph;
use crate::dag::task::TaskNode;
use crate::engine::TaskId;
use crate::types::TaskStatus;

/// Whether every dependency of `node` is satisfied.
///
/// Ids missing from the graph are external references and count as
/// satisfied.
pub fn deps_satisfied(graph: &TaskGraph, node: &TaskNode) -> bool {
    node.dependencies.iter().all(|dep| match graph.get(dep) {
        Some(d) => d.status() == TaskStatus::Completed,
        None => true,
    })
}

/// Whether `node` has not started and waits on a failed task.
pub fn is_blocked(graph: &TaskGraph, node: &TaskNode) -> bool {
    node.status() == TaskStatus::NotStarted
        && node
            .dependencies
            .iter()
            .any(|dep| graph.get(dep).is_some_and(|d| d.status() == TaskStatus::Failed))
}

/// Status as reported to callers: the stored status, or `Blocked` for a
/// not-started task waiting on a failure.
pub fn effective_status(graph: &TaskGraph, id: &str) -> Option<TaskStatus> {
    let node = graph.get(id)?;
    if is_blocked(graph, node) {
        Some(TaskStatus::Blocked)
    } else {
        Some(node.status())
    }
}

/// Scheduling order: priority ascending, tier ascending, estimated duration
/// descending, then id.
fn ready_order(a: &TaskNode, b: &TaskNode) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| {
            a.tier
                .unwrap_or(u32::MAX)
                .cmp(&b.tier.unwrap_or(u32::MAX))
        })
        .then_with(|| b.estimated_duration.total_cmp(&a.estimated_duration))
        .then_with(|| a.id.cmp(&b.id))
}

/// Tasks that may start now, in scheduling order.
///
/// A task is ready iff it has not started and every dependency is
/// satisfied.
pub fn ready_tasks(graph: &TaskGraph) -> Vec<&TaskNode> {
    let mut ready: Vec<&TaskNode> = graph
        .nodes()
        .filter(|n| n.status() == TaskStatus::NotStarted && deps_satisfied(graph, n))
        .collect();

    ready.sort_by(|a, b| ready_order(a, b));
    ready
}

/// Ids of not-started tasks with at least one failed dependency.
pub fn blocked_tasks(graph: &TaskGraph) -> Vec<TaskId> {
    graph
        .nodes()
        .filter(|n| is_blocked(graph, n))
        .map(|n| n.id.clone())
        .collect()
}
