// src/config/model.rs

use serde::Deserialize;

/// Top-level session file as read from TOML, before validation.
///
/// ```toml
/// [session]
/// max_iterations = 100
///
/// [[task]]
/// id = "1.1"
/// name = "Write unit tests"
/// dependencies = ["0"]
/// estimated_hours = 2.5
/// priority = 1
///
/// [[agent]]
/// id = "agent-1"
/// name = "Tester"
/// capabilities = ["testing"]
/// ```
///
/// All sections are optional at the TOML level; [`SessionFile`] enforces the
/// semantic rules.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSessionFile {
    /// Loop behaviour from `[session]`.
    #[serde(default)]
    pub session: SessionSection,

    /// Ordered task records from `[[task]]`.
    #[serde(default)]
    pub task: Vec<TaskRecord>,

    /// Agent pool from `[[agent]]`. Empty means "use the default pool".
    #[serde(default)]
    pub agent: Vec<AgentConfig>,
}

/// Validated session file.
///
/// Only constructible through `TryFrom<RawSessionFile>` (see
/// `config::validate`), so holding one means the task list passed the
/// config-level checks. Cycles are *not* a config error; they are detected
/// when a session is built.
#[derive(Debug, Clone)]
pub struct SessionFile {
    pub session: SessionSection,
    pub task: Vec<TaskRecord>,
    pub agent: Vec<AgentConfig>,
}

impl SessionFile {
    pub(crate) fn new_unchecked(
        session: SessionSection,
        task: Vec<TaskRecord>,
        agent: Vec<AgentConfig>,
    ) -> Self {
        Self {
            session,
            task,
            agent,
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Hard ceiling on loop iterations.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// In synchronous mode: how many in-flight tasks are resolved each time
    /// the loop has to wait.
    #[serde(default = "default_resolve_batch")]
    pub resolve_batch: usize,

    /// Probability that the simulated resolver fails a task.
    #[serde(default)]
    pub failure_rate: f64,

    /// Seed for the simulated resolver; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_max_iterations() -> usize {
    100
}

fn default_resolve_batch() -> usize {
    3
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            resolve_batch: default_resolve_batch(),
            failure_rate: 0.0,
            seed: None,
        }
    }
}

/// One `[[task]]` entry, as produced by the upstream task-list parser.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    /// Dot-separated hierarchical id, e.g. `"2.3"`.
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Declared dependencies. Ids missing from the task list are kept and
    /// treated as external, already-satisfied references.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Opaque labels, passed through for reporting.
    #[serde(default)]
    pub requirements: Vec<String>,

    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,

    /// 1 is the highest priority.
    #[serde(default = "default_priority")]
    pub priority: u32,

    /// Shell command run by the command delegate. Tasks without one succeed
    /// as soon as they are dispatched.
    #[serde(default)]
    pub cmd: Option<String>,
}

fn default_estimated_hours() -> f64 {
    1.0
}

fn default_priority() -> u32 {
    1
}

impl TaskRecord {
    /// Minimal record with defaults for everything but `id` and `name`.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            dependencies: Vec::new(),
            requirements: Vec::new(),
            estimated_hours: default_estimated_hours(),
            priority: default_priority(),
            cmd: None,
        }
    }
}

/// One `[[agent]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub capabilities: Vec<String>,
}
