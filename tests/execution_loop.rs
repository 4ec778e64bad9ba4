// tests/execution_loop.rs

mod common;
use crate::common::builders::{SessionFileBuilder, plain_pool, session_with, task};
use crate::common::fake_delegate::ScriptedResolver;
use crate::common::init_tracing;

use tierflow::dag::TaskNode;
use tierflow::engine::{
    LoopDecision, Session, SessionOptions, TaskOutcome, Termination, run_to_completion,
};
use tierflow::errors::{Result, SchedulerError};
use tierflow::exec::SimulatedResolver;
use tierflow::pool::AgentPool;
use tierflow::types::{LogAction, TaskStatus};

fn entry(action: LogAction, task: &str, agent: &str) -> (LogAction, String, Option<String>) {
    (action, task.to_string(), Some(agent.to_string()))
}

fn hierarchy() -> Vec<tierflow::config::TaskRecord> {
    vec![
        task("1").build(),
        task("1.1").after("1").build(),
        task("1.2").after("1").build(),
    ]
}

#[test]
fn hierarchy_runs_children_then_parent() -> Result<()> {
    init_tracing();

    let mut session = session_with(&hierarchy(), 2);
    let mut resolver = ScriptedResolver::succeed_all();
    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::AllComplete);
    assert_eq!(summary.iterations, 4);
    assert_eq!(summary.completed_count, 3);
    assert_eq!(summary.failed_count, 0);
    assert_eq!(summary.completion_rate_percent, 100.0);
    assert_eq!(summary.execution_log.len(), 6);

    assert_eq!(
        session.log().actions(),
        vec![
            entry(LogAction::TaskAssigned, "1.1", "agent-1"),
            entry(LogAction::TaskAssigned, "1.2", "agent-2"),
            entry(LogAction::TaskCompleted, "1.1", "agent-1"),
            entry(LogAction::TaskCompleted, "1.2", "agent-2"),
            entry(LogAction::TaskAssigned, "1", "agent-1"),
            entry(LogAction::TaskCompleted, "1", "agent-1"),
        ]
    );
    assert_eq!(resolver.resolved, vec!["1.1", "1.2", "1"]);
    assert_eq!(session.agents().available_count(), 2);
    Ok(())
}

#[test]
fn longer_task_is_assigned_first_with_one_agent() -> Result<()> {
    let records = vec![task("a").hours(2.0).build(), task("b").hours(5.0).build()];
    let mut session = session_with(&records, 1);
    let mut resolver = ScriptedResolver::succeed_all();

    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::AllComplete);
    assert_eq!(
        session.log().actions(),
        vec![
            entry(LogAction::TaskAssigned, "b", "agent-1"),
            entry(LogAction::TaskCompleted, "b", "agent-1"),
            entry(LogAction::TaskAssigned, "a", "agent-1"),
            entry(LogAction::TaskCompleted, "a", "agent-1"),
        ]
    );
    Ok(())
}

#[test]
fn failure_blocks_dependents_and_ends_in_deadlock() -> Result<()> {
    init_tracing();

    let records = vec![
        task("a").build(),
        task("b").after("a").build(),
        task("c").build(),
    ];
    let mut session = session_with(&records, 2);
    let mut resolver = ScriptedResolver::failing(&["a"]);

    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::Deadlock);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.completed_count, 1);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(session.blocked_tasks(), vec!["b"]);
    assert!(session.completed().contains("c"));
    assert!(session.failed().contains("a"));

    let b = session.graph().get("b").unwrap();
    assert_eq!(b.status(), TaskStatus::NotStarted);
    assert_eq!(
        tierflow::dag::scheduler::effective_status(session.graph(), "b"),
        Some(TaskStatus::Blocked)
    );

    let failed_entry = session
        .log()
        .entries()
        .iter()
        .find(|e| e.action == LogAction::TaskFailed)
        .unwrap();
    assert_eq!(failed_entry.task_id, "a");
    Ok(())
}

#[test]
fn iteration_ceiling_stops_the_loop() -> Result<()> {
    let records = vec![
        task("a").build(),
        task("b").after("a").build(),
        task("c").after("b").build(),
    ];
    let options = SessionOptions {
        max_iterations: 2,
        resolve_batch: 3,
    };
    let mut session = Session::new(&records, plain_pool(1), options);
    let mut resolver = ScriptedResolver::succeed_all();

    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::IterationExhausted);
    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.completed_count, 1);
    Ok(())
}

#[test]
fn finished_graph_is_complete_even_at_the_ceiling() -> Result<()> {
    let options = SessionOptions {
        max_iterations: 2,
        resolve_batch: 1,
    };
    let mut session = Session::new(&[task("a").build()], plain_pool(1), options);
    let mut resolver = ScriptedResolver::succeed_all();

    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::AllComplete);
    assert_eq!(summary.iterations, 2);
    Ok(())
}

#[test]
fn no_agents_pauses_instead_of_spinning() -> Result<()> {
    let mut session = Session::new(
        &[task("a").build()],
        AgentPool::new(Vec::new()),
        SessionOptions::default(),
    );
    let mut resolver = ScriptedResolver::succeed_all();

    let summary = run_to_completion(&mut session, &mut resolver)?;

    assert_eq!(summary.termination, Termination::Paused);
    assert_eq!(summary.iterations, 1);
    assert!(session.log().is_empty());
    assert_eq!(session.ready_tasks(), vec!["a"]);
    Ok(())
}

#[test]
fn resolve_batch_limits_resolutions_per_wait() -> Result<()> {
    let options = SessionOptions {
        max_iterations: 100,
        resolve_batch: 1,
    };
    let records = vec![task("a").build(), task("b").build(), task("c").build()];
    let mut session = Session::new(&records, plain_pool(3), options);
    let mut resolver = ScriptedResolver::succeed_all();

    let summary = run_to_completion(&mut session, &mut resolver)?;

    // 1 dispatch, 3 waits resolving one task each.
    assert_eq!(summary.termination, Termination::AllComplete);
    assert_eq!(summary.iterations, 4);
    assert_eq!(resolver.resolved, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn manual_stepping_exposes_each_decision() -> Result<()> {
    let mut session = session_with(&hierarchy(), 2);

    let first = session.step()?;
    assert_eq!(first.iteration, 1);
    let assigned: Vec<&str> = first.assignments().iter().map(|a| a.task_id.as_str()).collect();
    assert_eq!(assigned, vec!["1.1", "1.2"]);
    assert_eq!(session.in_flight(), ["1.1", "1.2"]);
    assert_eq!(session.agents().available_count(), 0);

    let second = session.step()?;
    assert_eq!(second.decision, LoopDecision::Wait);

    session.resolve("1.2", TaskOutcome::Success)?;
    assert_eq!(session.in_flight(), ["1.1"]);

    // Parent still waits on 1.1; one agent is idle.
    let third = session.step()?;
    assert_eq!(third.decision, LoopDecision::Wait);

    session.resolve("1.1", TaskOutcome::Success)?;
    let fourth = session.step()?;
    assert_eq!(fourth.assignments()[0].task_id, "1");
    assert_eq!(fourth.iteration, 4);
    Ok(())
}

#[test]
fn resolving_a_task_twice_is_rejected() -> Result<()> {
    let mut session = session_with(&[task("a").build()], 1);
    session.step()?;
    session.resolve("a", TaskOutcome::Success)?;

    let err = session.resolve("a", TaskOutcome::Failed).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::InvalidTransition {
            from: TaskStatus::Completed,
            to: TaskStatus::Failed,
            ..
        }
    ));
    assert_eq!(session.completed().len(), 1);
    assert!(session.failed().is_empty());
    Ok(())
}

#[test]
fn resolving_an_unknown_task_is_an_error() {
    let mut session = session_with(&[task("a").build()], 1);
    let err = session.resolve("zzz", TaskOutcome::Success).unwrap_err();
    assert!(matches!(err, SchedulerError::TaskNotFound(id) if id == "zzz"));
}

#[test]
fn resolving_a_not_started_task_is_rejected() {
    let mut session = session_with(&[task("a").build()], 1);
    let err = session.resolve("a", TaskOutcome::Success).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidTransition { .. }));
}

#[test]
fn closure_resolver_works() -> Result<()> {
    let mut session = session_with(&hierarchy(), 2);
    let mut seen = Vec::new();
    let mut resolver = |node: &TaskNode| {
        seen.push(node.id.clone());
        TaskOutcome::Success
    };

    let summary = run_to_completion(&mut session, &mut resolver)?;
    assert_eq!(summary.termination, Termination::AllComplete);
    assert_eq!(seen.len(), 3);
    Ok(())
}

#[test]
fn seeded_simulation_is_reproducible() -> Result<()> {
    let records: Vec<_> = (1..=8)
        .map(|i| {
            let id = i.to_string();
            let b = task(&id);
            if i > 1 {
                b.after(&(i - 1).to_string()).build()
            } else {
                b.build()
            }
        })
        .collect();

    let run = |seed| -> Result<_> {
        let mut session = session_with(&records, 2);
        let mut resolver = SimulatedResolver::new(Some(seed), 0.3);
        run_to_completion(&mut session, &mut resolver)?;
        Ok(session.log().actions())
    };

    assert_eq!(run(42)?, run(42)?);
    Ok(())
}

#[test]
fn simulated_resolver_tolerates_out_of_range_rates() -> Result<()> {
    let records = vec![task("a").build(), task("b").after("a").build()];

    for rate in [f64::NAN, f64::INFINITY, -0.5] {
        let mut session = session_with(&records, 1);
        let mut resolver = SimulatedResolver::new(Some(1), rate);
        let summary = run_to_completion(&mut session, &mut resolver)?;
        assert_eq!(summary.termination, Termination::AllComplete);
        assert_eq!(summary.failed_count, 0);
    }

    let mut session = session_with(&records, 1);
    let mut resolver = SimulatedResolver::new(Some(1), 7.0);
    let summary = run_to_completion(&mut session, &mut resolver)?;
    assert_eq!(summary.termination, Termination::Deadlock);
    assert_eq!(session.failed().len(), 1);
    Ok(())
}

#[test]
fn session_from_file_uses_configured_limits_and_agents() -> Result<()> {
    let mut session = SessionFileBuilder::new()
        .with_task(task("a").name("Run testing").build())
        .with_agent("qa-bot", "QA", &["testing"])
        .max_iterations(7)
        .resolve_batch(2)
        .session();

    assert_eq!(session.options().max_iterations, 7);
    assert_eq!(session.options().resolve_batch, 2);
    assert_eq!(session.agents().len(), 1);

    let step = session.step()?;
    assert_eq!(step.assignments()[0].agent_id, "qa-bot");
    Ok(())
}

#[test]
fn summary_serializes_with_snake_case_termination() -> Result<()> {
    let mut session = session_with(&[task("a").build()], 1);
    let mut resolver = ScriptedResolver::succeed_all();
    let summary = run_to_completion(&mut session, &mut resolver)?;

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["termination"], "all_complete");
    assert_eq!(json["execution_log"][0]["action"], "task_assigned");
    assert_eq!(json["execution_log"][0]["agent_id"], "agent-1");
    Ok(())
}
