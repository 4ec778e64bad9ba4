// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{RawSessionFile, SessionFile};
use crate::dag::task::ID_SEPARATOR;
use crate::errors::{Result, SchedulerError};

impl TryFrom<RawSessionFile> for SessionFile {
    type Error = crate::errors::SchedulerError;

    fn try_from(raw: RawSessionFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_session(&raw)?;
        Ok(SessionFile::new_unchecked(raw.session, raw.task, raw.agent))
    }
}

fn validate_raw_session(cfg: &RawSessionFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_session_section(cfg)?;
    validate_task_records(cfg)?;
    validate_agents(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawSessionFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(SchedulerError::ConfigError(
            "session file must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_session_section(cfg: &RawSessionFile) -> Result<()> {
    let s = &cfg.session;

    if s.max_iterations == 0 {
        return Err(SchedulerError::ConfigError(
            "[session].max_iterations must be >= 1 (got 0)".to_string(),
        ));
    }

    if s.resolve_batch == 0 {
        return Err(SchedulerError::ConfigError(
            "[session].resolve_batch must be >= 1 (got 0)".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&s.failure_rate) {
        return Err(SchedulerError::ConfigError(format!(
            "[session].failure_rate must be within [0, 1] (got {})",
            s.failure_rate
        )));
    }

    Ok(())
}

fn validate_task_records(cfg: &RawSessionFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for task in cfg.task.iter() {
        let id = task.id.trim();
        if id.is_empty() {
            return Err(SchedulerError::ConfigError(format!(
                "task '{}' has an empty id",
                task.name
            )));
        }
        if id.split(ID_SEPARATOR).any(|segment| segment.is_empty()) {
            return Err(SchedulerError::ConfigError(format!(
                "task id '{}' contains an empty segment",
                task.id
            )));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(SchedulerError::ConfigError(format!(
                "duplicate task id '{}'",
                task.id
            )));
        }
        if !task.estimated_hours.is_finite() || task.estimated_hours < 0.0 {
            return Err(SchedulerError::ConfigError(format!(
                "task '{}' has invalid estimated_hours {}",
                task.id, task.estimated_hours
            )));
        }
        if task.priority == 0 {
            return Err(SchedulerError::ConfigError(format!(
                "task '{}' has priority 0 (1 is the highest priority)",
                task.id
            )));
        }
    }

    Ok(())
}

fn validate_agents(cfg: &RawSessionFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    for agent in cfg.agent.iter() {
        if agent.id.trim().is_empty() {
            return Err(SchedulerError::ConfigError(format!(
                "agent '{}' has an empty id",
                agent.name
            )));
        }
        if !seen.insert(agent.id.as_str()) {
            return Err(SchedulerError::ConfigError(format!(
                "duplicate agent id '{}'",
                agent.id
            )));
        }
    }

    Ok(())
}
