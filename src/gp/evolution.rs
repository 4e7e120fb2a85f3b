//! Steady-state evolution loop.
//!
//! The [`Evolver`] owns the population and the run's single random stream.
//! Each generation performs `population_size` steps: breed one child by
//! crossover or mutation, score it, and store it over the loser of a
//! negative tournament.
//!
//! ```text
//! Initializing ──► Running ──► Solved
//!                     │
//!                     └──────► Exhausted
//! ```

use crate::error::ConfigError;
use crate::gp::crossover::crossover;
use crate::gp::fitness::{Scorer, score_population};
use crate::gp::generator::ProgramGenerator;
use crate::gp::interpreter::Bindings;
use crate::gp::mutation::{MutationConfig, mutate};
use crate::gp::population::Population;
use crate::gp::program::Program;
use crate::gp::report::{GenerationReport, Reporter};
use crate::gp::selection::{SelectionConfig, negative_tournament, tournament};
use crate::problem::Problem;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Parameters of one run. Fixed once the [`Evolver`] is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// RNG seed; the whole run is a function of it.
    pub seed: u64,
    /// Capacity of the generation buffer and cap on crossover children.
    pub max_len: usize,
    /// Number of programs.
    pub population_size: usize,
    /// Depth budget for initial growth.
    pub depth: usize,
    /// Generation budget.
    pub generations: usize,
    /// Probability that a step uses crossover rather than mutation.
    pub crossover_probability: f64,
    /// Tournament configuration.
    pub selection: SelectionConfig,
    /// Point mutation configuration.
    pub mutation: MutationConfig,
    /// Never overwrite the best individual with a worse child.
    pub elitism: bool,
    /// Best fitness above this counts as solved.
    pub solved_threshold: f64,
    /// Score the initial population on the rayon pool.
    pub parallel_evaluation: bool,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_len: 10_000,
            population_size: 1000,
            depth: 5,
            generations: 100,
            crossover_probability: 0.9,
            selection: SelectionConfig::default(),
            mutation: MutationConfig::default(),
            elitism: false,
            solved_threshold: -1e-5,
            parallel_evaluation: true,
        }
    }
}

impl EvolutionConfig {
    /// Check every parameter range.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.selection.tournament_size == 0 {
            return Err(ConfigError::ZeroTournamentSize);
        }
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        if self.max_len < 3 {
            return Err(ConfigError::BufferTooSmall(self.max_len));
        }
        check_probability("crossover_probability", self.crossover_probability)?;
        check_probability("per_node_probability", self.mutation.per_node_probability)?;
        if self.solved_threshold.is_nan() || self.solved_threshold > 0.0 {
            return Err(ConfigError::Threshold(self.solved_threshold));
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

impl fmt::Display for EvolutionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SEED={}", self.seed)?;
        writeln!(f, "MAX_LEN={}", self.max_len)?;
        writeln!(f, "POPSIZE={}", self.population_size)?;
        writeln!(f, "DEPTH={}", self.depth)?;
        writeln!(f, "CROSSOVER_PROB={}", self.crossover_probability)?;
        writeln!(f, "PMUT_PER_NODE={}", self.mutation.per_node_probability)?;
        writeln!(f, "GENERATIONS={}", self.generations)?;
        writeln!(f, "TSIZE={}", self.selection.tournament_size)?;
        write!(f, "ELITISM={}", self.elitism)
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Worst fitness.
    pub worst_fitness: f64,
    /// Mean node count.
    pub mean_size: f64,
    /// Slot of the best program.
    pub best_index: usize,
}

/// Where the run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Population scored, no generation stepped yet.
    Initializing,
    /// Generations are being stepped.
    Running,
    /// Best fitness passed the solved threshold.
    Solved,
    /// Generation budget used up without solving.
    Exhausted,
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Best fitness passed the solved threshold.
    Solved,
    /// Generation budget used up without solving.
    Exhausted,
}

impl Outcome {
    /// Whether the run solved the problem.
    #[must_use]
    pub fn is_solved(self) -> bool {
        matches!(self, Self::Solved)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// How the run ended.
    pub outcome: Outcome,
    /// Generations stepped after the initial population.
    pub generations: usize,
    /// Fitness of the best program.
    pub best_fitness: f64,
    /// The best program.
    pub best: Program,
    /// Infix rendering of the best program.
    pub formula: String,
    /// Statistics for every generation, starting with generation 0.
    pub history: Vec<GenerationStats>,
}

/// Drives one steady-state run.
#[derive(Debug)]
pub struct Evolver<'p> {
    config: EvolutionConfig,
    problem: &'p Problem,
    bindings: Bindings,
    scorer: Scorer<'p>,
    population: Population,
    best: usize,
    rng: SmallRng,
    generation: usize,
    state: RunState,
    history: Vec<GenerationStats>,
}

impl<'p> Evolver<'p> {
    /// Validate the config, sample constants, then grow and score the
    /// initial population.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::Config`] if the config is invalid or the
    /// problem has no terminals.
    pub fn new(config: EvolutionConfig, problem: &'p Problem) -> Result<Self, EvolutionError> {
        config.validate()?;
        if problem.terminal_count() == 0 {
            return Err(ConfigError::NoTerminals.into());
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let bindings = Bindings::sample(problem, &mut rng);

        let mut generator =
            ProgramGenerator::new(config.max_len, problem.terminal_count(), config.depth);
        let programs: Vec<Program> = (0..config.population_size)
            .map(|_| generator.generate(&mut rng))
            .collect();
        let fitness = score_population(
            &programs,
            &problem.cases,
            &bindings,
            config.parallel_evaluation,
        );
        let population =
            Population::new(programs, fitness).ok_or(ConfigError::EmptyPopulation)?;

        let mut evolver = Self {
            config,
            problem,
            scorer: Scorer::new(&problem.cases, &bindings),
            bindings,
            best: population.best_index(),
            population,
            rng,
            generation: 0,
            state: RunState::Initializing,
            history: Vec::new(),
        };
        evolver.record();
        Ok(evolver)
    }

    /// The run configuration.
    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Terminal bindings, including the sampled constants.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// The current population.
    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Generations stepped so far.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Statistics recorded so far.
    #[must_use]
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Slot of the best program.
    #[must_use]
    pub fn best_index(&self) -> usize {
        self.best
    }

    /// Infix rendering of the program in `index`.
    #[must_use]
    pub fn formula(&self, index: usize) -> String {
        self.population
            .program(index)
            .formula(self.bindings.var_count(), self.bindings.constants())
            .to_string()
    }

    fn solved(&self) -> bool {
        self.population.fitness()[self.best] > self.config.solved_threshold
    }

    /// Step one generation.
    ///
    /// Returns `None` once the run is over: either the previous generation
    /// already passed the solved threshold or the budget is used up. The
    /// state is then [`RunState::Solved`] or [`RunState::Exhausted`].
    pub fn step_generation(&mut self) -> Option<GenerationStats> {
        match self.state {
            RunState::Solved | RunState::Exhausted => return None,
            RunState::Initializing => self.state = RunState::Running,
            RunState::Running => {}
        }
        if self.solved() {
            self.state = RunState::Solved;
            return None;
        }
        if self.generation >= self.config.generations {
            self.state = RunState::Exhausted;
            return None;
        }

        self.generation += 1;
        for _ in 0..self.config.population_size {
            self.step();
        }
        let stats = self.record();
        log::debug!(
            "generation {}: best {:.6} mean {:.6} size {:.2}",
            stats.generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.mean_size
        );
        Some(stats)
    }

    fn step(&mut self) {
        let k = self.config.selection.tournament_size;
        let fitness = self.population.fitness();

        let child = if self.rng.gen_bool(self.config.crossover_probability) {
            let parent1 = tournament(fitness, k, &mut self.rng);
            let parent2 = tournament(fitness, k, &mut self.rng);
            crossover(
                self.population.program(parent1),
                self.population.program(parent2),
                self.config.max_len,
                &mut self.rng,
            )
        } else {
            let parent = tournament(fitness, k, &mut self.rng);
            mutate(
                self.population.program(parent),
                self.config.mutation,
                self.problem.terminal_count(),
                &mut self.rng,
            )
        };
        let child_fitness = self.scorer.score(&child);
        let slot = negative_tournament(fitness, k, &mut self.rng);

        let best_fitness = fitness[self.best];
        if slot == self.best {
            if self.config.elitism && child_fitness < best_fitness {
                return;
            }
            self.population.replace(slot, child, child_fitness);
            if child_fitness < best_fitness {
                self.best = self.population.best_index();
            }
        } else {
            self.population.replace(slot, child, child_fitness);
            if child_fitness > best_fitness {
                self.best = slot;
            }
        }
    }

    fn record(&mut self) -> GenerationStats {
        let summary = self.population.stats();
        let stats = GenerationStats {
            generation: self.generation,
            best_fitness: summary.best_fitness,
            mean_fitness: summary.mean_fitness,
            worst_fitness: summary.worst_fitness,
            mean_size: self.population.mean_size(),
            best_index: self.best,
        };
        self.history.push(stats);
        stats
    }

    fn report(&self, stats: GenerationStats) -> GenerationReport {
        GenerationReport {
            stats,
            formula: self.formula(stats.best_index),
        }
    }

    /// Run to completion, streaming every generation to `reporter`.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::Io`] if the reporter fails to write.
    pub fn run<R: Reporter + ?Sized>(
        &mut self,
        reporter: &mut R,
    ) -> Result<EvolutionResult, EvolutionError> {
        log::info!(
            "evolving {} programs for up to {} generations (seed {})",
            self.config.population_size,
            self.config.generations,
            self.config.seed
        );
        reporter.begin(&self.config, self.problem)?;
        if let Some(&initial) = self.history.last() {
            reporter.generation(&self.report(initial))?;
        }
        while let Some(stats) = self.step_generation() {
            reporter.generation(&self.report(stats))?;
        }

        let result = self.result();
        log::info!(
            "run {:?} after {} generations, best fitness {}",
            result.outcome,
            result.generations,
            result.best_fitness
        );
        reporter.finish(&result)?;
        Ok(result)
    }

    /// Snapshot of the run so far.
    ///
    /// The outcome is [`Outcome::Solved`] whenever the current best passes
    /// the threshold, whatever the state.
    #[must_use]
    pub fn result(&self) -> EvolutionResult {
        let outcome = if self.solved() {
            Outcome::Solved
        } else {
            Outcome::Exhausted
        };
        EvolutionResult {
            outcome,
            generations: self.generation,
            best_fitness: self.population.fitness()[self.best],
            best: self.population.program(self.best).clone(),
            formula: self.formula(self.best),
            history: self.history.clone(),
        }
    }
}

/// Errors that can abort a run.
#[derive(Debug)]
pub enum EvolutionError {
    /// Invalid configuration.
    Config(ConfigError),
    /// The reporter failed to write.
    Io(std::io::Error),
}

impl fmt::Display for EvolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid configuration: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for EvolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for EvolutionError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<std::io::Error> for EvolutionError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::report::NullReporter;

    fn small_config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 50,
            generations: 5,
            max_len: 500,
            depth: 3,
            ..EvolutionConfig::default()
        }
    }

    fn quadratic() -> Problem {
        Problem::parse("1 2 -5 5 5\n-2 5\n-1 2\n0 1\n1 2\n2 5\n").unwrap()
    }

    #[test]
    fn test_evolution_config_default() {
        let config = EvolutionConfig::default();
        assert_eq!(config.population_size, 1000);
        assert_eq!(config.max_len, 10_000);
        assert_eq!(config.selection.tournament_size, 2);
        assert!(!config.elitism);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = EvolutionConfig {
            crossover_probability: 1.5,
            ..EvolutionConfig::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::Probability { name: "crossover_probability", .. })
        ));

        let bad = EvolutionConfig {
            population_size: 0,
            ..EvolutionConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::EmptyPopulation));

        let bad = EvolutionConfig {
            max_len: 2,
            ..EvolutionConfig::default()
        };
        assert_eq!(bad.validate(), Err(ConfigError::BufferTooSmall(2)));

        let bad = EvolutionConfig {
            solved_threshold: 0.5,
            ..EvolutionConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_deserializes_partial_json() {
        let config: EvolutionConfig =
            serde_json::from_str(r#"{"seed": 7, "selection": {"tournament_size": 4}}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.selection.tournament_size, 4);
        assert_eq!(config.population_size, 1000);
    }

    #[test]
    fn test_empty_json_config_equals_default() {
        let config: EvolutionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EvolutionConfig::default());

        let tuned: EvolutionConfig =
            serde_json::from_str(r#"{"mutation": {"per_node_probability": 0.2}}"#).unwrap();
        assert_ne!(tuned, EvolutionConfig::default());
        assert_eq!(tuned.selection, SelectionConfig::default());
    }

    #[test]
    fn test_banner() {
        let banner = EvolutionConfig::default().to_string();
        assert!(banner.starts_with("SEED=42\n"));
        assert!(banner.contains("POPSIZE=1000"));
        assert!(banner.contains("TSIZE=2"));
    }

    #[test]
    fn test_state_machine() {
        let problem = quadratic();
        let mut evolver = Evolver::new(small_config(), &problem).unwrap();
        assert_eq!(evolver.state(), RunState::Initializing);
        assert_eq!(evolver.history().len(), 1);

        let mut stepped = 0;
        while evolver.step_generation().is_some() {
            assert_eq!(evolver.state(), RunState::Running);
            stepped += 1;
        }
        assert!(stepped <= 5);
        assert!(matches!(
            evolver.state(),
            RunState::Solved | RunState::Exhausted
        ));
        assert!(evolver.step_generation().is_none());
        assert_eq!(evolver.history().len(), stepped + 1);
    }

    #[test]
    fn test_population_size_constant_and_complete() {
        let problem = quadratic();
        let mut evolver = Evolver::new(small_config(), &problem).unwrap();
        while evolver.step_generation().is_some() {
            assert_eq!(evolver.population().len(), 50);
            for program in evolver.population().programs() {
                assert_eq!(program.node_count(), program.len());
                assert!(program.len() <= 500);
            }
        }
    }

    #[test]
    fn test_best_index_tracks_population() {
        let problem = quadratic();
        let mut evolver = Evolver::new(small_config(), &problem).unwrap();
        while evolver.step_generation().is_some() {
            let fitness = evolver.population().fitness();
            let best = fitness[evolver.best_index()];
            assert!(fitness.iter().all(|&f| f <= best));
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let problem = quadratic();
        let a = Evolver::new(small_config(), &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        let b = Evolver::new(small_config(), &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        assert_eq!(a.formula, b.formula);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_parallel_scoring_does_not_change_run() {
        let problem = quadratic();
        let sequential = EvolutionConfig {
            parallel_evaluation: false,
            ..small_config()
        };
        let a = Evolver::new(sequential, &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        let b = Evolver::new(small_config(), &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        assert_eq!(a.history, b.history);
        assert_eq!(a.best, b.best);
    }

    #[test]
    fn test_elitism_best_never_decreases() {
        let problem = quadratic();
        let config = EvolutionConfig {
            elitism: true,
            generations: 10,
            ..small_config()
        };
        let result = Evolver::new(config, &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        for pair in result.history.windows(2) {
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
        }
    }

    #[test]
    fn test_zero_generations_exhausts_or_solves_immediately() {
        let problem = quadratic();
        let config = EvolutionConfig {
            generations: 0,
            ..small_config()
        };
        let result = Evolver::new(config, &problem)
            .unwrap()
            .run(&mut NullReporter)
            .unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.history.len(), 1);
    }
}
