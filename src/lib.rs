// Allow unwrap and exact float comparison in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! TinyGP: steady-state genetic programming for symbolic regression.
//!
//! A population of small arithmetic programs is evolved to fit a table of
//! sampled input/output pairs read from a case file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        tinygp CLI (main.rs)         │
//! ├─────────────────────────────────────┤
//! │     gp: evolution engine            │
//! ├─────────────────────────────────────┤
//! │     problem: case-file loader       │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod gp;
pub mod problem;

pub use error::{ConfigError, LoadResult, ProblemError};
pub use gp::{EvolutionConfig, EvolutionResult, Evolver, Outcome, Program};
pub use problem::{FitnessCase, Problem};
