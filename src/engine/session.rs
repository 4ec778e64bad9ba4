// src/engine/session.rs

//! Single-owner scheduling session.
//!
//! A `Session` owns the task graph, the agent pool and the execution log for
//! one scheduling run. It is synchronous and deterministic: it never waits,
//! spawns or sleeps. The shells in [`crate::engine::descent`] and
//! [`crate::engine::runtime`] decide how in-flight tasks get resolved.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::config::model::{SessionFile, TaskRecord};
use crate::dag::graph::TaskGraph;
use crate::dag::{cycle, scheduler, tiers};
use crate::engine::log::ExecutionLog;
use crate::engine::snapshot::{ExecutionSummary, GraphSnapshot};
use crate::engine::step::{Assignment, IterationStep, LoopDecision};
use crate::engine::{SessionOptions, TaskId, TaskOutcome, Termination};
use crate::errors::{Result, SchedulerError};
use crate::pool::{AgentPool, match_agent};
use crate::types::{LogAction, TaskStatus};

#[derive(Debug)]
pub struct Session {
    graph: TaskGraph,
    agents: AgentPool,
    log: ExecutionLog,
    options: SessionOptions,
    /// A task on a dependency cycle, if the gate failed.
    cycle_at: Option<TaskId>,
    completed: BTreeSet<TaskId>,
    failed: BTreeSet<TaskId>,
    /// In-progress tasks, in assignment order.
    in_flight: Vec<TaskId>,
    iterations: usize,
}

impl Session {
    /// Build the graph, run the cycle gate and, if it passes, compute tiers.
    ///
    /// A cyclic graph still yields a session (so it can be inspected and
    /// snapshotted) but it is unhealthy and refuses to step.
    pub fn new(records: &[TaskRecord], agents: AgentPool, options: SessionOptions) -> Self {
        let mut graph = TaskGraph::from_records(records);

        let cycle_at = cycle::find_cycle(&graph);
        match &cycle_at {
            Some(task) => {
                error!(task = %task, "dependency cycle detected; session is unhealthy");
            }
            None => {
                tiers::compute_tiers(&mut graph);
            }
        }

        info!(
            tasks = graph.len(),
            agents = agents.len(),
            healthy = cycle_at.is_none(),
            "scheduling session created"
        );

        Self {
            graph,
            agents,
            log: ExecutionLog::new(),
            options,
            cycle_at,
            completed: BTreeSet::new(),
            failed: BTreeSet::new(),
            in_flight: Vec::new(),
            iterations: 0,
        }
    }

    /// Session from a validated session file, using its agents (or the
    /// default pool) and `[session]` limits.
    pub fn from_file(file: &SessionFile) -> Self {
        Self::new(
            &file.task,
            AgentPool::from_configs(&file.agent),
            SessionOptions::from(&file.session),
        )
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn agents(&self) -> &AgentPool {
        &self.agents
    }

    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn completed(&self) -> &BTreeSet<TaskId> {
        &self.completed
    }

    pub fn failed(&self) -> &BTreeSet<TaskId> {
        &self.failed
    }

    /// In-progress task ids, oldest assignment first.
    pub fn in_flight(&self) -> &[TaskId] {
        &self.in_flight
    }

    pub fn is_healthy(&self) -> bool {
        self.cycle_at.is_none()
    }

    /// Re-run the acyclicity check against the current graph.
    pub fn validate(&self) -> bool {
        cycle::validate(&self.graph)
    }

    /// Fail fast with a structural error if the graph has a cycle.
    pub fn ensure_healthy(&self) -> Result<()> {
        match &self.cycle_at {
            Some(task) => Err(SchedulerError::CycleDetected(format!(
                "task '{task}' is part of a dependency cycle"
            ))),
            None => Ok(()),
        }
    }

    /// Ready task ids, in scheduling order.
    pub fn ready_tasks(&self) -> Vec<TaskId> {
        scheduler::ready_tasks(&self.graph)
            .into_iter()
            .map(|n| n.id.clone())
            .collect()
    }

    pub fn blocked_tasks(&self) -> Vec<TaskId> {
        scheduler::blocked_tasks(&self.graph)
    }

    /// Run one loop iteration.
    ///
    /// - Nothing ready and nothing in flight: `AllComplete` if no task is
    ///   left not-started, otherwise `Deadlock`.
    /// - Nothing ready but tasks in flight: `Wait`.
    /// - Ready tasks: assign greedily in ready order until tasks or agents run
    ///   out. If nothing could be assigned the loop waits when tasks are in
    ///   flight and pauses otherwise.
    ///
    /// The iteration ceiling is checked after the completion check, so a
    /// finished graph is never reported as exhausted.
    pub fn step(&mut self) -> Result<IterationStep> {
        self.ensure_healthy()?;

        let not_started = self.graph.count_with_status(TaskStatus::NotStarted);
        if not_started == 0 && self.in_flight.is_empty() {
            return Ok(self.finish(Termination::AllComplete));
        }

        if self.iterations >= self.options.max_iterations {
            warn!(
                iterations = self.iterations,
                max_iterations = self.options.max_iterations,
                "iteration ceiling reached"
            );
            return Ok(self.finish(Termination::IterationExhausted));
        }

        self.iterations += 1;

        let ready = self.ready_tasks();
        if ready.is_empty() {
            if self.in_flight.is_empty() {
                warn!(
                    iteration = self.iterations,
                    not_started,
                    blocked = ?self.blocked_tasks(),
                    "no ready tasks and nothing in flight; deadlock"
                );
                return Ok(self.finish(Termination::Deadlock));
            }

            debug!(
                iteration = self.iterations,
                in_flight = self.in_flight.len(),
                "no ready tasks; waiting for in-flight tasks"
            );
            return Ok(self.decide(LoopDecision::Wait));
        }

        let assignments = self.assign(&ready)?;
        if assignments.is_empty() {
            if self.in_flight.is_empty() {
                warn!(
                    iteration = self.iterations,
                    ready = ready.len(),
                    "ready tasks but no available agents; pausing"
                );
                return Ok(self.finish(Termination::Paused));
            }
            debug!(
                iteration = self.iterations,
                ready = ready.len(),
                "all agents busy; waiting for in-flight tasks"
            );
            return Ok(self.decide(LoopDecision::Wait));
        }

        Ok(self.decide(LoopDecision::Dispatched(assignments)))
    }

    fn decide(&self, decision: LoopDecision) -> IterationStep {
        IterationStep {
            iteration: self.iterations,
            decision,
        }
    }

    fn finish(&self, termination: Termination) -> IterationStep {
        info!(
            iterations = self.iterations,
            completed = self.completed.len(),
            failed = self.failed.len(),
            ?termination,
            "execution loop finished"
        );
        self.decide(LoopDecision::Finish(termination))
    }

    /// Pair ready tasks with available agents, in ready order.
    fn assign(&mut self, ready: &[TaskId]) -> Result<Vec<Assignment>> {
        let mut assignments = Vec::new();

        for task_id in ready {
            let chosen = {
                let available = self.agents.available();
                if available.is_empty() {
                    break;
                }
                let node = self
                    .graph
                    .get(task_id)
                    .ok_or_else(|| SchedulerError::TaskNotFound(task_id.clone()))?;
                match_agent(node, &available).map(|a| a.id.clone())
            };

            let Some(agent_id) = chosen else {
                break;
            };

            assignments.push(self.assign_one(task_id, &agent_id)?);
        }

        Ok(assignments)
    }

    fn assign_one(&mut self, task_id: &str, agent_id: &str) -> Result<Assignment> {
        let node = self
            .graph
            .get_mut(task_id)
            .ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;

        node.transition_to(TaskStatus::InProgress)?;
        self.agents.occupy(agent_id, task_id)?;
        self.in_flight.push(task_id.to_string());
        self.log.append(LogAction::TaskAssigned, task_id, Some(agent_id));

        info!(
            task = %task_id,
            agent = %agent_id,
            iteration = self.iterations,
            tier = ?node.tier,
            priority = node.priority,
            "task assigned"
        );

        Ok(Assignment {
            task_id: task_id.to_string(),
            agent_id: agent_id.to_string(),
            task_name: node.name.clone(),
            cmd: node.cmd.clone(),
            iteration: self.iterations,
        })
    }

    /// Record the outcome of an in-progress task and free its agent.
    ///
    /// Failures are final: dependents of a failed task never become ready
    /// and show up in [`Session::blocked_tasks`].
    pub fn resolve(&mut self, task_id: &str, outcome: TaskOutcome) -> Result<()> {
        let node = self
            .graph
            .get_mut(task_id)
            .ok_or_else(|| SchedulerError::TaskNotFound(task_id.to_string()))?;

        let (status, action) = match outcome {
            TaskOutcome::Success => (TaskStatus::Completed, LogAction::TaskCompleted),
            TaskOutcome::Failed => (TaskStatus::Failed, LogAction::TaskFailed),
        };
        node.transition_to(status)?;

        match outcome {
            TaskOutcome::Success => {
                self.completed.insert(task_id.to_string());
            }
            TaskOutcome::Failed => {
                self.failed.insert(task_id.to_string());
            }
        }
        self.in_flight.retain(|id| id != task_id);

        let agent = self.agents.release_task(task_id);
        self.log.append(action, task_id, agent.as_deref());

        match outcome {
            TaskOutcome::Success => {
                info!(task = %task_id, agent = ?agent, "task completed");
            }
            TaskOutcome::Failed => {
                let dependents = self.graph.dependents_of(task_id);
                warn!(
                    task = %task_id,
                    agent = ?agent,
                    ?dependents,
                    "task failed; dependents are blocked"
                );
            }
        }

        Ok(())
    }

    /// Consistent read-only view for reporting.
    pub fn snapshot(&self) -> GraphSnapshot {
        let groups = tiers::tier_groups(&self.graph);

        GraphSnapshot {
            total_tasks: self.graph.len(),
            tier_count: groups.len(),
            critical_path_length: tiers::critical_path_length(&groups),
            max_parallelism: tiers::max_parallelism(&groups),
            ready_tasks: self.ready_tasks(),
            blocked_tasks: self.blocked_tasks(),
            completion_rate_percent: self.completion_rate_percent(),
            healthy: self.is_healthy(),
            tiers: groups,
        }
    }

    /// Summary of a run that started at `start_time` and just ended.
    pub fn summary(&self, start_time: DateTime<Utc>, termination: Termination) -> ExecutionSummary {
        let end_time = Utc::now();
        let duration_seconds = (end_time - start_time)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        ExecutionSummary {
            start_time,
            end_time,
            duration_seconds,
            iterations: self.iterations,
            completed_count: self.completed.len(),
            failed_count: self.failed.len(),
            completion_rate_percent: self.completion_rate_percent(),
            termination,
            execution_log: self.log.entries().to_vec(),
        }
    }

    pub fn completion_rate_percent(&self) -> f64 {
        if self.graph.is_empty() {
            return 0.0;
        }
        self.completed.len() as f64 / self.graph.len() as f64 * 100.0
    }
}
