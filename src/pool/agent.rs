// src/pool/agent.rs

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::config::model::AgentConfig;
use crate::engine::{AgentId, TaskId};
use crate::errors::{Result, SchedulerError};

/// A worker that can hold at most one in-progress task.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub capabilities: BTreeSet<String>,
    pub available: bool,
    pub current_task: Option<TaskId>,
}

impl Agent {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            available: true,
            current_task: None,
        }
    }

    pub fn from_config(cfg: &AgentConfig) -> Self {
        Self::new(cfg.id.clone(), cfg.name.clone(), cfg.capabilities.iter().cloned())
    }
}

/// Fixed-membership pool of agents, kept in configuration order.
///
/// Membership never changes after construction; only availability does.
#[derive(Debug, Clone)]
pub struct AgentPool {
    agents: Vec<Agent>,
}

impl AgentPool {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Pool from `[[agent]]` entries, or the default pool if there are none.
    pub fn from_configs(configs: &[AgentConfig]) -> Self {
        if configs.is_empty() {
            debug!("no agents configured; using default pool");
            return Self::default_pool();
        }
        Self::new(configs.iter().map(Agent::from_config).collect())
    }

    /// Four general-purpose agents covering the usual phases of a plan.
    pub fn default_pool() -> Self {
        Self::new(vec![
            Agent::new(
                "agent-1",
                "Developer",
                ["development", "implementation", "coding"],
            ),
            Agent::new("agent-2", "Tester", ["testing", "validation", "qa"]),
            Agent::new(
                "agent-3",
                "Deployer",
                ["deployment", "release", "infrastructure"],
            ),
            Agent::new(
                "agent-4",
                "Reviewer",
                ["review", "documentation", "analysis"],
            ),
        ])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Available agents, in pool order.
    pub fn available(&self) -> Vec<&Agent> {
        self.agents.iter().filter(|a| a.available).collect()
    }

    pub fn available_count(&self) -> usize {
        self.agents.iter().filter(|a| a.available).count()
    }

    /// Mark an available agent as busy with `task`.
    pub(crate) fn occupy(&mut self, agent_id: &str, task: &str) -> Result<()> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == agent_id)
            .ok_or_else(|| SchedulerError::Other(anyhow::anyhow!("unknown agent '{agent_id}'")))?;

        if !agent.available {
            return Err(SchedulerError::Other(anyhow::anyhow!(
                "agent '{}' is already working on {:?}",
                agent_id,
                agent.current_task
            )));
        }

        agent.available = false;
        agent.current_task = Some(task.to_string());
        Ok(())
    }

    /// Free whichever agent is holding `task`. Returns that agent's id.
    pub(crate) fn release_task(&mut self, task: &str) -> Option<AgentId> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.current_task.as_deref() == Some(task))?;

        agent.available = true;
        agent.current_task = None;
        Some(agent.id.clone())
    }
}
