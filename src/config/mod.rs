// src/config/mod.rs

//! Session file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a session file from disk (`loader.rs`).
//! - Validate config-level invariants (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_and_validate};
pub use model::{AgentConfig, RawSessionFile, SessionFile, SessionSection, TaskRecord};
