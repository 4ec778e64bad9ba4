// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::model::TaskRecord;
use crate::dag::task::{TaskNode, parent_id};
use crate::engine::TaskId;
use crate::types::TaskStatus;

/// In-memory task graph keyed by task id.
///
/// Edges live on the nodes themselves (`TaskNode::dependencies`). A
/// `BTreeMap` keeps every traversal in id order, which is what makes ready
/// ordering and log output reproducible between runs.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    nodes: BTreeMap<TaskId, TaskNode>,
}

impl TaskGraph {
    /// Build a graph from a flat, ordered list of task records.
    ///
    /// - First pass: one node per record. A task with a hierarchical id
    ///   (`"2.3"`) implicitly depends on its immediate parent (`"2"`), unioned
    ///   with whatever it declared.
    /// - Second pass: every task with at least one direct child in the graph
    ///   has its dependency set *replaced* by those children, and the children
    ///   drop their edge to it. A parent only starts once all its subtasks are
    ///   done.
    ///
    /// Declared dependencies on ids that are not in the list are kept as-is.
    pub fn from_records(records: &[TaskRecord]) -> Self {
        let mut nodes: BTreeMap<TaskId, TaskNode> = BTreeMap::new();

        for record in records {
            if nodes.contains_key(&record.id) {
                warn!(task = %record.id, "duplicate task id in input; keeping the first record");
                continue;
            }

            let mut node = TaskNode::from_record(record);
            if let Some(parent) = parent_id(&record.id) {
                node.dependencies.insert(parent.to_string());
            }
            nodes.insert(record.id.clone(), node);
        }

        let mut children: BTreeMap<TaskId, BTreeSet<TaskId>> = BTreeMap::new();
        for id in nodes.keys() {
            if let Some(parent) = parent_id(id) {
                if nodes.contains_key(parent) {
                    children
                        .entry(parent.to_string())
                        .or_default()
                        .insert(id.clone());
                }
            }
        }

        for (parent, kids) in children {
            for kid in kids.iter() {
                if let Some(child) = nodes.get_mut(kid) {
                    child.dependencies.remove(&parent);
                }
            }
            if let Some(node) = nodes.get_mut(&parent) {
                debug!(task = %parent, children = ?kids, "parent now waits on its subtasks");
                node.dependencies = kids;
            }
        }

        for node in nodes.values() {
            for dep in node.dependencies.iter() {
                if !nodes.contains_key(dep) {
                    debug!(
                        task = %node.id,
                        dep = %dep,
                        "dependency not in graph; treating as external and satisfied"
                    );
                }
            }
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut TaskNode> {
        self.nodes.get_mut(id)
    }

    /// All task ids, in id order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut TaskNode> {
        self.nodes.values_mut()
    }

    /// Dependencies of a task that are actually present in the graph.
    pub fn in_graph_dependencies<'a>(&'a self, id: &str) -> Vec<&'a str> {
        self.nodes
            .get(id)
            .map(|n| {
                n.dependencies
                    .iter()
                    .filter(|d| self.nodes.contains_key(d.as_str()))
                    .map(|d| d.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Tasks that list `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|n| n.dependencies.contains(id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Ids of tasks currently in the given stored status.
    pub fn ids_with_status(&self, status: TaskStatus) -> BTreeSet<TaskId> {
        self.nodes
            .values()
            .filter(|n| n.status() == status)
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.nodes.values().filter(|n| n.status() == status).count()
    }
}
