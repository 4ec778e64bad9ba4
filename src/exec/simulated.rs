// src/exec/simulated.rs

//! Randomized resolver for demonstrations (`--simulate`).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::dag::task::TaskNode;
use crate::engine::TaskOutcome;
use crate::exec::backend::Resolver;

/// Fails each task independently with probability `failure_rate`.
///
/// With a seed the sequence of outcomes is reproducible.
#[derive(Debug)]
pub struct SimulatedResolver {
    rng: StdRng,
    failure_rate: f64,
}

impl SimulatedResolver {
    /// A non-finite `failure_rate` is treated as 0; anything else is clamped
    /// to `[0, 1]`.
    pub fn new(seed: Option<u64>, failure_rate: f64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            warn!(failure_rate, "non-finite failure rate; simulating without failures");
            0.0
        };
        Self { rng, failure_rate }
    }
}

impl Resolver for SimulatedResolver {
    fn resolve(&mut self, task: &TaskNode) -> TaskOutcome {
        let failed = self.rng.gen_bool(self.failure_rate);
        debug!(task = %task.id, failed, "simulated task resolution");
        TaskOutcome::from_success(!failed)
    }
}
