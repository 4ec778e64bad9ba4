// src/pool/mod.rs

//! Agent pool and task-to-agent matching.

pub mod agent;
pub mod matcher;

pub use agent::{Agent, AgentPool};
pub use matcher::{capability_score, match_agent};
