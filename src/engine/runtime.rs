// src/engine/runtime.rs

use std::fmt;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::session::Session;
use crate::engine::snapshot::{ExecutionSummary, GraphSnapshot};
use crate::engine::step::{Assignment, LoopDecision};
use crate::engine::{RuntimeEvent, TaskId, TaskOutcome, Termination};
use crate::errors::{Result, SchedulerError};
use crate::exec::ExecutionDelegate;

/// Create the completion channel shared by the runtime, its delegate and
/// any caller that wants snapshots.
pub fn runtime_channel(capacity: usize) -> (RuntimeHandle, mpsc::Receiver<RuntimeEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (RuntimeHandle { tx }, rx)
}

/// Cloneable sender side of the runtime's event channel.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<RuntimeEvent>,
}

impl RuntimeHandle {
    pub fn sender(&self) -> mpsc::Sender<RuntimeEvent> {
        self.tx.clone()
    }

    /// Report that a dispatched task finished.
    pub async fn report(&self, task: impl Into<TaskId>, outcome: TaskOutcome) -> Result<()> {
        self.tx
            .send(RuntimeEvent::TaskResolved {
                task: task.into(),
                outcome,
            })
            .await
            .map_err(|e| SchedulerError::Other(anyhow::anyhow!("runtime channel closed: {e}")))
    }

    /// Ask the runtime for a snapshot taken between two loop steps.
    pub async fn snapshot(&self) -> Result<GraphSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RuntimeEvent::SnapshotRequested { reply })
            .await
            .map_err(|e| SchedulerError::Other(anyhow::anyhow!("runtime channel closed: {e}")))?;
        rx.await
            .map_err(|e| SchedulerError::Other(anyhow::anyhow!("runtime stopped before replying: {e}")))
    }
}

/// Drives a [`Session`] and delegates actual task execution to an
/// [`ExecutionDelegate`].
///
/// The runtime is the session's only writer. Delegates never touch the
/// session; they report back through `RuntimeEvent::TaskResolved`, and the
/// runtime applies those events between steps. Snapshot requests are served
/// at the same boundary.
pub struct Runtime<D: ExecutionDelegate> {
    session: Session,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    delegate: D,
    cancel: CancellationToken,
}

impl<D: ExecutionDelegate> fmt::Debug for Runtime<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("session", &self.session)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<D: ExecutionDelegate> Runtime<D> {
    pub fn new(
        session: Session,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        delegate: D,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            event_rx,
            delegate,
            cancel,
        }
    }

    /// Main loop.
    ///
    /// - Applies any queued events.
    /// - Steps the session; dispatches assignments to the delegate.
    /// - When the session has to wait, blocks on the event channel, racing
    ///   the cancellation token.
    ///
    /// Returns the session (for inspection or resuming) together with the
    /// run summary. Cancellation leaves in-progress tasks and busy agents
    /// as they are.
    pub async fn run(mut self) -> Result<(Session, ExecutionSummary)> {
        self.session.ensure_healthy()?;

        let start_time = Utc::now();
        info!(
            tasks = self.session.graph().len(),
            agents = self.session.agents().len(),
            "tierflow runtime started"
        );

        let termination = loop {
            if self.cancel.is_cancelled() {
                break Termination::Cancelled;
            }

            self.drain_pending_events();

            let step = self.session.step()?;
            match step.decision {
                LoopDecision::Dispatched(assignments) => {
                    self.dispatch(assignments).await?;
                }
                LoopDecision::Wait => {
                    if let Some(termination) = self.wait_for_event().await? {
                        break termination;
                    }
                }
                LoopDecision::Finish(termination) => break termination,
            }
        };

        if termination == Termination::Cancelled {
            warn!(
                in_flight = ?self.session.in_flight(),
                "runtime cancelled; leaving in-progress tasks as they are"
            );
        }

        let summary = self.session.summary(start_time, termination);
        info!(?termination, "runtime exiting");
        Ok((self.session, summary))
    }

    async fn dispatch(&mut self, assignments: Vec<Assignment>) -> Result<()> {
        let tasks: Vec<_> = assignments.iter().map(|a| a.task_id.as_str()).collect();
        debug!(?tasks, "dispatching assignments");
        self.delegate.dispatch(assignments).await
    }

    /// Block until an in-flight task resolves or the run is cancelled.
    ///
    /// Snapshot requests and stale completions are served here without
    /// returning to the loop, so they never cost an iteration.
    ///
    /// Returns `Some(Cancelled)` on cancellation.
    async fn wait_for_event(&mut self) -> Result<Option<Termination>> {
        loop {
            let event = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => return Ok(Some(Termination::Cancelled)),

                event = self.event_rx.recv() => event,
            };

            let Some(event) = event else {
                return Err(SchedulerError::Other(anyhow::anyhow!(
                    "event channel closed with {} task(s) in flight",
                    self.session.in_flight().len()
                )));
            };

            if self.handle_event(event) {
                return Ok(None);
            }
        }
    }

    fn drain_pending_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Apply one event. Returns `true` if it resolved an in-flight task.
    fn handle_event(&mut self, event: RuntimeEvent) -> bool {
        match event {
            RuntimeEvent::TaskResolved { task, outcome } => {
                match self.session.resolve(&task, outcome) {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(task = %task, error = %err, "ignoring completion that does not match an in-progress task");
                        false
                    }
                }
            }
            RuntimeEvent::SnapshotRequested { reply } => {
                if reply.send(self.session.snapshot()).is_err() {
                    debug!("snapshot requester went away before the reply");
                }
                false
            }
        }
    }
}
