use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tierflow::dag::TaskNode;
use tierflow::engine::{Assignment, RuntimeEvent, TaskOutcome};
use tierflow::errors::Result;
use tierflow::exec::{ExecutionDelegate, Resolver};
use tokio::sync::mpsc;

/// A fake delegate that:
/// - records which tasks were dispatched (and to which agent), in order
/// - reports an outcome for each from a spawned task: `Failed` for ids in
///   `failing`, `Success` otherwise.
pub struct FakeDelegate {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    dispatched: Arc<Mutex<Vec<(String, String)>>>,
    failing: HashSet<String>,
}

impl FakeDelegate {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        dispatched: Arc<Mutex<Vec<(String, String)>>>,
    ) -> Self {
        Self {
            runtime_tx,
            dispatched,
            failing: HashSet::new(),
        }
    }

    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.failing = ids.iter().map(|s| s.to_string()).collect();
        self
    }
}

impl ExecutionDelegate for FakeDelegate {
    fn dispatch(
        &mut self,
        assignments: Vec<Assignment>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let dispatched = Arc::clone(&self.dispatched);
        let failing = self.failing.clone();

        Box::pin(async move {
            let mut outcomes = Vec::with_capacity(assignments.len());
            {
                let mut guard = dispatched.lock().unwrap();
                for a in assignments {
                    guard.push((a.task_id.clone(), a.agent_id.clone()));
                    let outcome = TaskOutcome::from_success(!failing.contains(&a.task_id));
                    outcomes.push((a.task_id, outcome));
                }
            }

            // The runtime does not read the channel until dispatch returns.
            tokio::spawn(async move {
                for (task, outcome) in outcomes {
                    if tx.send(RuntimeEvent::TaskResolved { task, outcome }).await.is_err() {
                        break;
                    }
                }
            });
            Ok(())
        })
    }
}

/// A delegate that only records dispatches and never reports back; the
/// test decides when (and whether) tasks resolve.
pub struct SilentDelegate {
    dispatched: Arc<Mutex<Vec<String>>>,
}

impl SilentDelegate {
    pub fn new(dispatched: Arc<Mutex<Vec<String>>>) -> Self {
        Self { dispatched }
    }
}

impl ExecutionDelegate for SilentDelegate {
    fn dispatch(
        &mut self,
        assignments: Vec<Assignment>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let dispatched = Arc::clone(&self.dispatched);
        Box::pin(async move {
            let mut guard = dispatched.lock().unwrap();
            guard.extend(assignments.into_iter().map(|a| a.task_id));
            Ok(())
        })
    }
}

/// Deterministic resolver for the synchronous loop: fails ids in
/// `failing`, succeeds everything else, and records the order it was asked.
#[derive(Debug, Default)]
pub struct ScriptedResolver {
    failing: HashSet<String>,
    pub resolved: Vec<String>,
}

impl ScriptedResolver {
    pub fn succeed_all() -> Self {
        Self::default()
    }

    pub fn failing(ids: &[&str]) -> Self {
        Self {
            failing: ids.iter().map(|s| s.to_string()).collect(),
            resolved: Vec::new(),
        }
    }
}

impl Resolver for ScriptedResolver {
    fn resolve(&mut self, task: &TaskNode) -> TaskOutcome {
        self.resolved.push(task.id.clone());
        TaskOutcome::from_success(!self.failing.contains(&task.id))
    }
}
