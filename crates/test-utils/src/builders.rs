#![allow(dead_code)]

use tierflow::config::{AgentConfig, RawSessionFile, SessionFile, SessionSection, TaskRecord};
use tierflow::engine::{Session, SessionOptions};
use tierflow::pool::{Agent, AgentPool};

/// Builder for `SessionFile` to simplify test setup.
pub struct SessionFileBuilder {
    raw: RawSessionFile,
}

impl SessionFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawSessionFile {
                session: SessionSection::default(),
                task: Vec::new(),
                agent: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskRecord) -> Self {
        self.raw.task.push(task);
        self
    }

    pub fn with_agent(mut self, id: &str, name: &str, capabilities: &[&str]) -> Self {
        self.raw.agent.push(AgentConfig {
            id: id.to_string(),
            name: name.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    pub fn max_iterations(mut self, n: usize) -> Self {
        self.raw.session.max_iterations = n;
        self
    }

    pub fn resolve_batch(mut self, n: usize) -> Self {
        self.raw.session.resolve_batch = n;
        self
    }

    pub fn raw(self) -> RawSessionFile {
        self.raw
    }

    pub fn build(self) -> SessionFile {
        SessionFile::try_from(self.raw).expect("Failed to build valid session file from builder")
    }

    pub fn session(self) -> Session {
        Session::from_file(&self.build())
    }
}

impl Default for SessionFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskRecord`.
pub struct TaskRecordBuilder {
    task: TaskRecord,
}

impl TaskRecordBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: TaskRecord::new(id, format!("Task {id}")),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.task.name = name.to_string();
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn hours(mut self, hours: f64) -> Self {
        self.task.estimated_hours = hours;
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn requirement(mut self, req: &str) -> Self {
        self.task.requirements.push(req.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn build(self) -> TaskRecord {
        self.task
    }
}

/// Shorthand for a record with defaults.
pub fn task(id: &str) -> TaskRecordBuilder {
    TaskRecordBuilder::new(id)
}

/// Pool of `n` agents without capabilities, ids `agent-1..=agent-n`.
pub fn plain_pool(n: usize) -> AgentPool {
    AgentPool::new(
        (1..=n)
            .map(|i| Agent::new(format!("agent-{i}"), format!("Agent {i}"), Vec::<String>::new()))
            .collect(),
    )
}

/// Session over `records` with `agents` plain agents and default limits.
pub fn session_with(records: &[TaskRecord], agents: usize) -> Session {
    Session::new(records, plain_pool(agents), SessionOptions::default())
}
