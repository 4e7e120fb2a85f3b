//! Steady-state genetic programming over flat prefix programs.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      Evolver (state machine)        │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │   Fitness (case table scoring)      │
//! ├─────────────────────────────────────┤
//! │  Program │ Interpreter │ Generator  │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tinygp::gp::{EvolutionConfig, Evolver, TextReporter};
//! use tinygp::problem::Problem;
//!
//! let problem = Problem::load("problem.dat")?;
//! let mut evolver = Evolver::new(EvolutionConfig::default(), &problem)?;
//! let result = evolver.run(&mut TextReporter::new(std::io::stdout()))?;
//! println!("{}", result.formula);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod crossover;
mod evolution;
mod fitness;
mod generator;
mod interpreter;
mod mutation;
mod population;
mod program;
mod report;
mod selection;

pub use crossover::{CrossoverSites, choose_sites, crossover, splice};
pub use evolution::{
    EvolutionConfig, EvolutionError, EvolutionResult, Evolver, GenerationStats, Outcome, RunState,
};
pub use fitness::{Scorer, score_population};
pub use generator::{ProgramGenerator, random_operator, random_terminal};
pub use interpreter::{Bindings, Evaluator, evaluate};
pub use mutation::{MutationConfig, mutate};
pub use population::Population;
pub use program::{
    ADD, DIV, DIV_GUARD, FSET_START, Formula, MUL, Node, Opcode, Operator, Program, ProgramError,
    SUB, protected_div, subtree_end,
};
pub use report::{GenerationReport, JsonReporter, NullReporter, Reporter, TextReporter};
pub use selection::{FitnessStats, SelectionConfig, negative_tournament, tournament};
