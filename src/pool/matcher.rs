// src/pool/matcher.rs

//! Capability-overlap matching between a task and the available agents.

use crate::dag::task::TaskNode;
use crate::pool::agent::Agent;

/// Number of capabilities of `agent` that are substring-related (either
/// direction, case-insensitive) to at least one whitespace token of
/// `task_name`.
pub fn capability_score(task_name: &str, agent: &Agent) -> usize {
    let tokens: Vec<String> = task_name
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    agent
        .capabilities
        .iter()
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .filter(|c| {
            tokens
                .iter()
                .any(|t| c.contains(t.as_str()) || t.contains(c.as_str()))
        })
        .count()
}

/// Pick an agent for `task` among `available`.
///
/// Highest score wins, ties go to the smallest agent id. If nobody scores
/// above zero the first available agent is used, so a ready task never waits
/// on a label mismatch.
pub fn match_agent<'a>(task: &TaskNode, available: &[&'a Agent]) -> Option<&'a Agent> {
    let best = available
        .iter()
        .map(|agent| (capability_score(&task.name, agent), *agent))
        .filter(|(score, _)| *score > 0)
        .max_by(|(sa, a), (sb, b)| sa.cmp(sb).then_with(|| b.id.cmp(&a.id)));

    match best {
        Some((_, agent)) => Some(agent),
        None => available.first().copied(),
    }
}
