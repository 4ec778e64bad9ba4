// src/exec/command.rs

//! Shell-command execution delegate.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::step::Assignment;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::exec::backend::ExecutionDelegate;

/// Runs each assignment's `cmd` in its own Tokio task.
///
/// - exit status 0 reports `Success`, anything else `Failed`
/// - an assignment without a command succeeds immediately
/// - cancelling the token kills running processes and reports nothing, so
///   the session keeps them in progress
pub struct CommandDelegate {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    cancel: CancellationToken,
}

impl CommandDelegate {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, cancel: CancellationToken) -> Self {
        Self { runtime_tx, cancel }
    }
}

impl ExecutionDelegate for CommandDelegate {
    fn dispatch(
        &mut self,
        assignments: Vec<Assignment>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let cancel = self.cancel.clone();

        Box::pin(async move {
            for assignment in assignments {
                let tx = tx.clone();
                let cancel = cancel.child_token();
                tokio::spawn(async move {
                    run_assignment(assignment, tx, cancel).await;
                });
            }
            Ok(())
        })
    }
}

/// Run one assignment and report its outcome.
///
/// Spawn/wait errors are logged and reported as a failure.
async fn run_assignment(
    assignment: Assignment,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    cancel: CancellationToken,
) {
    let task_id = assignment.task_id.clone();

    let outcome = match run_assignment_inner(&assignment, &cancel).await {
        Ok(Some(outcome)) => outcome,
        Ok(None) => return,
        Err(err) => {
            error!(task = %task_id, error = %err, "task execution error");
            TaskOutcome::Failed
        }
    };

    if runtime_tx
        .send(RuntimeEvent::TaskResolved {
            task: task_id.clone(),
            outcome,
        })
        .await
        .is_err()
    {
        warn!(task = %task_id, "runtime gone before the task outcome could be reported");
    }
}

/// `Ok(None)` means the run was cancelled.
async fn run_assignment_inner(
    assignment: &Assignment,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<TaskOutcome>> {
    let Some(cmd_line) = assignment.cmd.as_deref() else {
        debug!(task = %assignment.task_id, "no command; treating task as done");
        return Ok(Some(TaskOutcome::Success));
    };

    info!(
        task = %assignment.task_id,
        agent = %assignment.agent_id,
        cmd = %cmd_line,
        "starting task process"
    );

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    };

    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", assignment.task_id))?;

    if let Some(stdout) = child.stdout.take() {
        forward_lines(assignment.task_id.clone(), "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(assignment.task_id.clone(), "stderr", stderr);
    }

    tokio::select! {
        status_res = child.wait() => {
            let status = status_res.with_context(|| {
                format!("waiting for process of task '{}'", assignment.task_id)
            })?;

            info!(
                task = %assignment.task_id,
                exit_code = status.code().unwrap_or(-1),
                success = status.success(),
                "task process exited"
            );

            Ok(Some(TaskOutcome::from_success(status.success())))
        }

        _ = cancel.cancelled() => {
            info!(task = %assignment.task_id, "run cancelled; killing task process");
            if let Err(e) = child.kill().await {
                warn!(task = %assignment.task_id, error = %e, "failed to kill task process");
            }
            Ok(None)
        }
    }
}

/// Consume a child pipe so buffers don't fill; log each line at debug.
fn forward_lines<R>(task: String, stream: &'static str, pipe: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(task = %task, stream, "{}", line);
        }
    });
}
