//! Tournament selection.
//!
//! Winners of a tournament become parents; losers of a negative tournament
//! are the slots that offspring overwrite.

// Fitness statistics divide by the population size
#![allow(clippy::cast_precision_loss)]

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration for selection operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Number of draws in each tournament.
    pub tournament_size: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

/// Index of the fittest of `k` uniform draws (with replacement).
///
/// Only a strictly greater fitness displaces the current winner, so the
/// first drawn of equally fit candidates wins. `fitness` must not be empty.
pub fn tournament<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    run_tournament(fitness, k, rng, |candidate, best| candidate > best)
}

/// Index of the least fit of `k` uniform draws (with replacement).
pub fn negative_tournament<R: Rng>(fitness: &[f64], k: usize, rng: &mut R) -> usize {
    run_tournament(fitness, k, rng, |candidate, worst| candidate < worst)
}

fn run_tournament<R: Rng>(
    fitness: &[f64],
    k: usize,
    rng: &mut R,
    displaces: impl Fn(f64, f64) -> bool,
) -> usize {
    let pop_size = fitness.len();
    if pop_size == 0 {
        return 0;
    }

    let mut chosen = rng.gen_range(0..pop_size);
    let mut chosen_fitness = fitness[chosen];

    for _ in 1..k.max(1) {
        let idx = rng.gen_range(0..pop_size);
        if displaces(fitness[idx], chosen_fitness) {
            chosen = idx;
            chosen_fitness = fitness[idx];
        }
    }

    chosen
}

/// Summary of a fitness vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Worst fitness in the population.
    pub worst_fitness: f64,
    /// Index of the first individual with the best fitness.
    pub best_index: usize,
}

impl FitnessStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                best_index: 0,
            };
        }

        let mean = fitness.iter().sum::<f64>() / fitness.len() as f64;

        let mut best_index = 0;
        for (idx, &value) in fitness.iter().enumerate().skip(1) {
            if value > fitness[best_index] {
                best_index = idx;
            }
        }
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            mean_fitness: mean,
            best_fitness: fitness[best_index],
            worst_fitness: worst,
            best_index,
        }
    }
}
