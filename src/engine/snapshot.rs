// src/engine/snapshot.rs

//! Read-only structures handed to reporting collaborators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::log::ExecutionLogEntry;
use crate::engine::{TaskId, Termination};

/// Structural and progress view of the graph at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub total_tasks: usize,
    pub tier_count: usize,
    pub critical_path_length: u32,
    pub max_parallelism: usize,
    pub tiers: BTreeMap<u32, Vec<TaskId>>,
    pub ready_tasks: Vec<TaskId>,
    pub blocked_tasks: Vec<TaskId>,
    pub completion_rate_percent: f64,
    /// `false` when the cycle gate failed; tiers are empty in that case.
    pub healthy: bool,
}

/// Outcome of one run of the execution loop.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub iterations: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub completion_rate_percent: f64,
    pub termination: Termination,
    pub execution_log: Vec<ExecutionLogEntry>,
}

/// What the CLI prints: the final snapshot plus the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub snapshot: GraphSnapshot,
    pub summary: ExecutionSummary,
}
