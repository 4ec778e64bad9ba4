// src/exec/backend.rs

//! Pluggable execution collaborators.
//!
//! The engine never assumes how a task completes. It talks to one of two
//! seams:
//!
//! - [`ExecutionDelegate`] for the async runtime: receives assignments and
//!   eventually reports each outcome as a `RuntimeEvent::TaskResolved` on the
//!   runtime's channel. Production uses [`super::CommandDelegate`]; tests
//!   provide fakes that complete immediately or on demand.
//! - [`Resolver`] for the synchronous reference loop: asked for an outcome
//!   on the spot. [`super::SimulatedResolver`] is the randomized demo
//!   implementation; tests inject deterministic ones.

use std::future::Future;
use std::pin::Pin;

use crate::dag::task::TaskNode;
use crate::engine::TaskOutcome;
use crate::engine::step::Assignment;
use crate::errors::Result;

/// Trait abstracting how assigned tasks are executed in async mode.
pub trait ExecutionDelegate: Send {
    /// Start the given assignments.
    ///
    /// The implementation is free to:
    /// - spawn OS processes (production)
    /// - simulate completion and emit `RuntimeEvent`s (tests)
    ///
    /// It must not block until the tasks finish; completions travel over
    /// the runtime's event channel.
    fn dispatch(
        &mut self,
        assignments: Vec<Assignment>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Synchronous outcome provider used by [`crate::engine::run_to_completion`].
pub trait Resolver {
    fn resolve(&mut self, task: &TaskNode) -> TaskOutcome;
}

impl<F> Resolver for F
where
    F: FnMut(&TaskNode) -> TaskOutcome,
{
    fn resolve(&mut self, task: &TaskNode) -> TaskOutcome {
        self(task)
    }
}
