// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `tierflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tierflow",
    version,
    about = "Schedule a hierarchical task list across a pool of agents, tier by tier.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the session file (TOML) holding tasks and agents.
    ///
    /// Default: `tasks.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "tasks.toml")]
    pub tasks: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TIERFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate, print the graph snapshot, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Resolve tasks with the seeded random resolver instead of running
    /// their commands.
    #[arg(long)]
    pub simulate: bool,

    /// Seed for `--simulate` (overrides `[session].seed`).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Override `[session].max_iterations`.
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
