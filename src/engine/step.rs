// src/engine/step.rs

//! Per-iteration result types for the session state machine.

use crate::engine::{AgentId, TaskId, Termination};

/// A task handed to an agent in this iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub task_id: TaskId,
    pub agent_id: AgentId,
    pub task_name: String,
    pub cmd: Option<String>,
    /// Iteration in which the assignment was made.
    pub iteration: usize,
}

/// What the driving loop should do after a step.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopDecision {
    /// These tasks were assigned and must be handed to the executor.
    Dispatched(Vec<Assignment>),
    /// Nothing could be assigned but tasks are in flight; wait for at least
    /// one of them to resolve.
    Wait,
    /// The run is over.
    Finish(Termination),
}

/// Structured result of a single loop iteration.
///
/// Tests use this to step the session by hand and assert on what changed.
#[derive(Debug, Clone)]
pub struct IterationStep {
    /// Iteration counter after this step.
    pub iteration: usize,
    pub decision: LoopDecision,
}

impl IterationStep {
    pub fn assignments(&self) -> &[Assignment] {
        match &self.decision {
            LoopDecision::Dispatched(a) => a,
            _ => &[],
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.decision {
            LoopDecision::Finish(t) => Some(t),
            _ => None,
        }
    }
}
