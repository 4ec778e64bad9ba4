// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pool;
pub mod types;

use anyhow::{Result, anyhow};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::model::SessionFile;
use crate::engine::{
    ExecutionSummary, RunReport, Runtime, Session, run_to_completion, runtime_channel,
};
use crate::exec::{CommandDelegate, SimulatedResolver};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - session file loading
/// - session construction (graph, cycle gate, tiers, agent pool)
/// - either the synchronous simulated loop or the async runtime with the
///   command delegate
/// - Ctrl-C handling (async mode)
pub async fn run(args: CliArgs) -> Result<()> {
    let mut file = load_and_validate(&args.tasks)?;
    apply_overrides(&mut file, &args)?;

    let mut session = Session::from_file(&file);

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
        debug!("dry-run complete (no execution)");
        session.ensure_healthy()?;
        return Ok(());
    }

    session.ensure_healthy()?;

    let (session, summary) = if args.simulate {
        let mut resolver =
            SimulatedResolver::new(file.session.seed, file.session.failure_rate);
        let summary = run_to_completion(&mut session, &mut resolver)?;
        (session, summary)
    } else {
        run_async(session).await?
    };

    let report = RunReport {
        snapshot: session.snapshot(),
        summary,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// CLI flags win over `[session]` values.
fn apply_overrides(file: &mut SessionFile, args: &CliArgs) -> Result<()> {
    if let Some(max) = args.max_iterations {
        if max == 0 {
            return Err(anyhow!("--max-iterations must be >= 1"));
        }
        file.session.max_iterations = max;
    }
    if let Some(seed) = args.seed {
        file.session.seed = Some(seed);
    }
    Ok(())
}

/// Run the session on the async runtime, executing task commands as
/// processes. Ctrl-C cancels the run.
async fn run_async(session: Session) -> Result<(Session, ExecutionSummary)> {
    let cancel = CancellationToken::new();
    let (handle, rx) = runtime_channel(64);
    let delegate = CommandDelegate::new(handle.sender(), cancel.clone());

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling run");
            cancel.cancel();
        });
    }

    let runtime = Runtime::new(session, rx, delegate, cancel);
    let result = runtime.run().await?;
    Ok(result)
}
