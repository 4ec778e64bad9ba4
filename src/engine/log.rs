// src/engine/log.rs

//! Append-only audit trail of a session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::{AgentId, TaskId};
use crate::types::LogAction;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: LogAction,
    pub task_id: TaskId,
    pub agent_id: Option<AgentId>,
}

/// Entries are only ever appended; nothing hands out mutable access.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<ExecutionLogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, action: LogAction, task_id: &str, agent_id: Option<&str>) {
        self.entries.push(ExecutionLogEntry {
            timestamp: Utc::now(),
            action,
            task_id: task_id.to_string(),
            agent_id: agent_id.map(str::to_string),
        });
    }

    pub fn entries(&self) -> &[ExecutionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The log without timestamps, for comparing two runs.
    pub fn actions(&self) -> Vec<(LogAction, TaskId, Option<AgentId>)> {
        self.entries
            .iter()
            .map(|e| (e.action, e.task_id.clone(), e.agent_id.clone()))
            .collect()
    }
}
