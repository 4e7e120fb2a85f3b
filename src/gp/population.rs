//! Index-aligned program and fitness storage.

// Mean size divides by the population size
#![allow(clippy::cast_precision_loss)]

use crate::gp::program::Program;
use crate::gp::selection::FitnessStats;

/// Programs and their fitness, always the same length.
#[derive(Debug, Clone)]
pub struct Population {
    programs: Vec<Program>,
    fitness: Vec<f64>,
}

impl Population {
    /// Pair up programs with their precomputed fitness.
    ///
    /// Returns `None` if the lengths differ or the population is empty.
    #[must_use]
    pub fn new(programs: Vec<Program>, fitness: Vec<f64>) -> Option<Self> {
        if programs.is_empty() || programs.len() != fitness.len() {
            return None;
        }
        Some(Self { programs, fitness })
    }

    /// Number of individuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Always false once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// The programs.
    #[must_use]
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// The fitness values.
    #[must_use]
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Program at `index`.
    #[must_use]
    pub fn program(&self, index: usize) -> &Program {
        &self.programs[index]
    }

    /// Store a program and its fitness in slot `index` together.
    pub fn replace(&mut self, index: usize, program: Program, fitness: f64) {
        self.programs[index] = program;
        self.fitness[index] = fitness;
    }

    /// Index of the first individual with the highest fitness.
    #[must_use]
    pub fn best_index(&self) -> usize {
        FitnessStats::from_fitness(&self.fitness).best_index
    }

    /// Fitness summary.
    #[must_use]
    pub fn stats(&self) -> FitnessStats {
        FitnessStats::from_fitness(&self.fitness)
    }

    /// Mean node count across the population.
    #[must_use]
    pub fn mean_size(&self) -> f64 {
        let total: usize = self.programs.iter().map(Program::node_count).sum();
        total as f64 / self.programs.len() as f64
    }
}
