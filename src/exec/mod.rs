// src/exec/mod.rs

//! Task execution layer.
//!
//! The engine only tracks task state; the work itself happens here, behind
//! the seams defined in [`backend`].
//!
//! - [`backend`] defines the async `ExecutionDelegate` and synchronous
//!   `Resolver` traits.
//! - [`command`] runs task commands as OS processes.
//! - [`simulated`] resolves tasks with a seeded RNG for demos.

pub mod backend;
pub mod command;
pub mod simulated;

pub use backend::{ExecutionDelegate, Resolver};
pub use command::CommandDelegate;
pub use simulated::SimulatedResolver;
