// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawSessionFile, SessionFile};
use crate::errors::Result;

/// Load a session file from a given path and return the raw `RawSessionFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSessionFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSessionFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a session file from path and run config-level validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` default functions).
/// - Checks ids, priorities, durations and `[session]` bounds.
///
/// Dependency structure (dangling references, cycles) is left to the
/// session, which treats the former as satisfied and refuses to run on the
/// latter.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SessionFile> {
    let raw = load_from_path(&path)?;
    SessionFile::try_from(raw)
}

/// Parse and validate a session file from an in-memory TOML string.
pub fn parse_and_validate(contents: &str) -> Result<SessionFile> {
    let raw: RawSessionFile = toml::from_str(contents)?;
    SessionFile::try_from(raw)
}
