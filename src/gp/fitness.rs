//! Fitness evaluation over the case table.
//!
//! Fitness is the negated sum of absolute errors, so 0 is perfect and
//! larger is better. Programs whose error is not finite score `-inf`.

use crate::gp::interpreter::{Bindings, Evaluator};
use crate::gp::program::Program;
use crate::problem::FitnessCase;
use rayon::prelude::*;

/// Scores programs against a case table.
///
/// Owns a private copy of the bindings and an evaluator, so one scorer per
/// thread can run in parallel.
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    cases: &'a [FitnessCase],
    bindings: Bindings,
    evaluator: Evaluator,
}

impl<'a> Scorer<'a> {
    /// Create a scorer over `cases` using the run's constants.
    #[must_use]
    pub fn new(cases: &'a [FitnessCase], bindings: &Bindings) -> Self {
        Self {
            cases,
            bindings: bindings.clone(),
            evaluator: Evaluator::new(),
        }
    }

    /// Fitness of one program.
    pub fn score(&mut self, program: &Program) -> f64 {
        let mut error = 0.0;
        for case in self.cases {
            self.bindings.bind_inputs(&case.inputs);
            let output = self.evaluator.evaluate(program, &self.bindings);
            error += (output - case.target).abs();
        }
        if error.is_finite() {
            -error
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// Score a whole population, index-aligned with `programs`.
///
/// Scoring draws no randomness, so the parallel path returns exactly what
/// the sequential one does.
#[must_use]
pub fn score_population(
    programs: &[Program],
    cases: &[FitnessCase],
    bindings: &Bindings,
    parallel: bool,
) -> Vec<f64> {
    if parallel {
        programs
            .par_iter()
            .map_init(|| Scorer::new(cases, bindings), |scorer, program| scorer.score(program))
            .collect()
    } else {
        let mut scorer = Scorer::new(cases, bindings);
        programs.iter().map(|program| scorer.score(program)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::generator::ProgramGenerator;
    use crate::gp::program::{ADD, DIV, MUL};
    use crate::problem::Problem;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_perfect_program_scores_zero() {
        let problem = Problem::parse("1 0 0 1 3\n0 0\n1 2\n2 4\n").unwrap();
        let bindings = Bindings::from_values(1, vec![0.0]);
        let mut scorer = Scorer::new(&problem.cases, &bindings);
        let double = Program::from_opcodes(vec![ADD, 0, 0]).unwrap();
        assert!(scorer.score(&double).abs() < f64::EPSILON);
    }

    #[test]
    fn test_score_is_negated_abs_error() {
        let problem = Problem::parse("1 0 0 1 2\n1 5\n3 0\n").unwrap();
        let bindings = Bindings::from_values(1, vec![0.0]);
        let mut scorer = Scorer::new(&problem.cases, &bindings);
        let square = Program::from_opcodes(vec![MUL, 0, 0]).unwrap();
        // |1 - 5| + |9 - 0|
        assert!((scorer.score(&square) + 13.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_finite_maps_to_neg_infinity() {
        let problem = Problem::parse("1 0 0 1 1\n1e300 0\n").unwrap();
        let bindings = Bindings::from_values(1, vec![0.0]);
        let mut scorer = Scorer::new(&problem.cases, &bindings);
        let square = Program::from_opcodes(vec![MUL, 0, MUL, 0, 0]).unwrap();
        assert_eq!(scorer.score(&square), f64::NEG_INFINITY);
        let ratio = Program::from_opcodes(vec![DIV, 0, 0]).unwrap();
        assert!(scorer.score(&ratio).is_finite());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let problem = Problem::parse("2 3 -5 5 4\n0 1 1\n1 2 3\n2 3 5\n3 5 8\n").unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let bindings = Bindings::sample(&problem, &mut rng);
        let mut generator = ProgramGenerator::new(1000, problem.terminal_count(), 4);
        let programs: Vec<Program> = (0..64).map(|_| generator.generate(&mut rng)).collect();

        let sequential = score_population(&programs, &problem.cases, &bindings, false);
        let parallel = score_population(&programs, &problem.cases, &bindings, true);
        assert_eq!(sequential.len(), 64);
        for (a, b) in sequential.iter().zip(&parallel) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
