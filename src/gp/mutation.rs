//! Point mutation.
//!
//! Every position is independently resampled within its own kind: a
//! terminal becomes another terminal and an operator another operator, so
//! length and shape never change.

use crate::gp::generator::{random_operator, random_terminal};
use crate::gp::program::{FSET_START, Program};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for point mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability that each position is resampled.
    pub per_node_probability: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            per_node_probability: 0.05,
        }
    }
}

/// Return a mutated copy of `parent`.
#[must_use]
pub fn mutate<R: Rng>(
    parent: &Program,
    config: MutationConfig,
    terminal_count: usize,
    rng: &mut R,
) -> Program {
    let mut code = parent.as_slice().to_vec();
    for op in &mut code {
        if rng.gen_bool(config.per_node_probability) {
            *op = if *op < FSET_START {
                random_terminal(terminal_count, rng)
            } else {
                random_operator(rng)
            };
        }
    }
    Program::from_complete(code)
}
