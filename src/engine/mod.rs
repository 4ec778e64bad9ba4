// src/engine/mod.rs

//! Execution engine for tierflow.
//!
//! This module ties together:
//! - the scheduling session (graph + agent pool + execution log)
//! - the synchronous reference loop, driven by a [`crate::exec::Resolver`]
//! - the async runtime, driven by an [`crate::exec::ExecutionDelegate`] that
//!   reports completions over a channel
//!
//! The pure state machine lives in [`session`]; [`descent`] and [`runtime`]
//! are the two shells around it.

use serde::Serialize;
use tokio::sync::oneshot;

use crate::config::model::SessionSection;

/// Canonical task id type used throughout the engine.
pub type TaskId = String;

/// Canonical agent id type.
pub type AgentId = String;

/// How a dispatched task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl TaskOutcome {
    pub fn from_success(success: bool) -> Self {
        if success {
            TaskOutcome::Success
        } else {
            TaskOutcome::Failed
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Why a run of the execution loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No task is left not-started or in progress.
    AllComplete,
    /// Nothing is ready, nothing is in flight, but some tasks never started.
    Deadlock,
    /// The iteration ceiling was reached first.
    IterationExhausted,
    /// Ready tasks exist but no agent is free and nothing is in flight.
    /// The session can be driven again later.
    Paused,
    /// The caller cancelled the run while it was waiting.
    Cancelled,
}

/// Loop limits, taken from `[session]`.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Hard ceiling on loop iterations.
    pub max_iterations: usize,
    /// Synchronous mode: in-flight tasks resolved per wait.
    pub resolve_batch: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions::from(&SessionSection::default())
    }
}

impl From<&SessionSection> for SessionOptions {
    fn from(section: &SessionSection) -> Self {
        Self {
            max_iterations: section.max_iterations.max(1),
            resolve_batch: section.resolve_batch.max(1),
        }
    }
}

/// Events flowing into the async runtime from delegates and callers.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A dispatched task finished.
    TaskResolved {
        task: TaskId,
        outcome: TaskOutcome,
    },
    /// A caller wants a consistent snapshot of the session.
    SnapshotRequested {
        reply: oneshot::Sender<GraphSnapshot>,
    },
}

pub mod descent;
pub mod log;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod step;

pub use descent::run_to_completion;
pub use log::{ExecutionLog, ExecutionLogEntry};
pub use runtime::{Runtime, RuntimeHandle, runtime_channel};
pub use session::Session;
pub use snapshot::{ExecutionSummary, GraphSnapshot, RunReport};
pub use step::{Assignment, IterationStep, LoopDecision};
