// src/dag/task.rs

//! Task identity plus mutable status record.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::model::TaskRecord;
use crate::engine::TaskId;
use crate::errors::{Result, SchedulerError};
use crate::types::TaskStatus;

/// Separator between levels of a hierarchical task id (`"2.3"`).
pub const ID_SEPARATOR: char = '.';

/// Immediate parent of a hierarchical id: `"2.3.1"` -> `"2.3"`, `"2"` -> `None`.
pub fn parent_id(id: &str) -> Option<&str> {
    id.rfind(ID_SEPARATOR).map(|idx| &id[..idx])
}

/// A node in the task graph.
#[derive(Debug, Clone, Serialize)]
pub struct TaskNode {
    pub id: TaskId,
    pub name: String,
    pub description: String,
    /// Ids that must be `Completed` before this task may start. May contain
    /// ids that are not in the graph.
    pub dependencies: BTreeSet<TaskId>,
    pub requirements: Vec<String>,
    /// Hours.
    pub estimated_duration: f64,
    /// 1 is the highest priority.
    pub priority: u32,
    pub cmd: Option<String>,
    status: TaskStatus,
    /// Dependency depth; `None` until the tier calculator has run.
    pub tier: Option<u32>,
}

impl TaskNode {
    /// Build a node from an input record. Declared dependencies are kept
    /// verbatim; hierarchy inference happens in the graph builder.
    pub fn from_record(record: &TaskRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            dependencies: record.dependencies.iter().cloned().collect(),
            requirements: record.requirements.clone(),
            estimated_duration: record.estimated_hours,
            priority: record.priority,
            cmd: record.cmd.clone(),
            status: TaskStatus::NotStarted,
            tier: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Apply a stored status transition, rejecting anything that is not
    /// `NotStarted -> InProgress -> {Completed, Failed}`.
    pub fn transition_to(&mut self, next: TaskStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(SchedulerError::InvalidTransition {
                task: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// The task's parent id, if it has one.
    pub fn parent(&self) -> Option<&str> {
        parent_id(&self.id)
    }
}
