// src/engine/descent.rs

//! Synchronous "recursive descent" driver.
//!
//! Repeatedly steps the session and, whenever it has to wait, resolves up to
//! `resolve_batch` in-flight tasks (oldest assignment first) through a
//! [`Resolver`]. With a deterministic resolver two runs over the same input
//! produce the same execution log.

use chrono::Utc;
use tracing::{debug, info};

use crate::engine::TaskId;
use crate::engine::session::Session;
use crate::engine::snapshot::ExecutionSummary;
use crate::engine::step::LoopDecision;
use crate::errors::{Result, SchedulerError};
use crate::exec::Resolver;

/// Drive `session` until it finishes, deadlocks, pauses or runs out of
/// iterations.
///
/// Refuses to start on an unhealthy (cyclic) session. Task failures never
/// abort the loop; they are recorded and independent branches keep going.
pub fn run_to_completion<R>(session: &mut Session, resolver: &mut R) -> Result<ExecutionSummary>
where
    R: Resolver + ?Sized,
{
    session.ensure_healthy()?;

    let start_time = Utc::now();
    info!(
        tasks = session.graph().len(),
        max_iterations = session.options().max_iterations,
        "starting synchronous execution loop"
    );

    let termination = loop {
        let step = session.step()?;

        match step.decision {
            LoopDecision::Dispatched(assignments) => {
                debug!(
                    iteration = step.iteration,
                    assigned = assignments.len(),
                    "assignments made"
                );
            }
            LoopDecision::Wait => {
                resolve_batch(session, resolver)?;
            }
            LoopDecision::Finish(termination) => break termination,
        }
    };

    Ok(session.summary(start_time, termination))
}

/// Resolve up to `resolve_batch` in-flight tasks, oldest first.
fn resolve_batch<R>(session: &mut Session, resolver: &mut R) -> Result<()>
where
    R: Resolver + ?Sized,
{
    let batch: Vec<TaskId> = session
        .in_flight()
        .iter()
        .take(session.options().resolve_batch)
        .cloned()
        .collect();

    for task_id in batch {
        let outcome = {
            let node = session
                .graph()
                .get(&task_id)
                .ok_or_else(|| SchedulerError::TaskNotFound(task_id.clone()))?;
            resolver.resolve(node)
        };
        session.resolve(&task_id, outcome)?;
    }

    Ok(())
}
