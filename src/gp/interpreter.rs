//! Program evaluation.

use crate::gp::program::{Node, Opcode, Program};
use crate::problem::Problem;
use rand::Rng;

/// The run-wide terminal values: variables first, then constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings {
    values: Vec<f64>,
    var_count: usize,
}

impl Bindings {
    /// Zeroed variables followed by constants sampled uniformly from
    /// `[min_random, max_random)`.
    pub fn sample<R: Rng>(problem: &Problem, rng: &mut R) -> Self {
        let mut values = vec![0.0; problem.terminal_count()];
        let span = problem.max_random - problem.min_random;
        for slot in &mut values[problem.var_count..] {
            *slot = problem.min_random + span * rng.r#gen::<f64>();
        }
        Self {
            values,
            var_count: problem.var_count,
        }
    }

    /// Explicit layout, mainly for tests and benchmarks.
    #[must_use]
    pub fn from_values(var_count: usize, values: Vec<f64>) -> Self {
        debug_assert!(var_count <= values.len());
        Self { values, var_count }
    }

    /// Overwrite the variable slots with one case's inputs.
    pub fn bind_inputs(&mut self, inputs: &[f64]) {
        self.values[..self.var_count].copy_from_slice(inputs);
    }

    /// Number of variable slots.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// The constant slots.
    #[must_use]
    pub fn constants(&self) -> &[f64] {
        &self.values[self.var_count..]
    }

    /// All slots.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Reusable evaluation state.
///
/// Each evaluator owns its operand stack, so separate evaluators never
/// share a cursor and can run on different threads.
#[derive(Debug, Default, Clone)]
pub struct Evaluator {
    stack: Vec<f64>,
}

impl Evaluator {
    /// Create an evaluator with an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate a program against the current bindings.
    ///
    /// Walks the pre-order sequence back to front: terminals push their
    /// value, an operator pops its left operand then its right one. The walk
    /// needs no recursion, so program depth is bounded only by length.
    pub fn evaluate(&mut self, program: &Program, bindings: &Bindings) -> f64 {
        self.evaluate_code(program.as_slice(), &bindings.values)
    }

    fn evaluate_code(&mut self, code: &[Opcode], values: &[f64]) -> f64 {
        self.stack.clear();
        for &op in code.iter().rev() {
            match Node::decode(op) {
                Some(Node::Terminal(index)) => {
                    self.stack.push(values.get(index).copied().unwrap_or(0.0));
                }
                Some(Node::Operator(operator)) => {
                    let left = self.stack.pop().unwrap_or(0.0);
                    let right = self.stack.pop().unwrap_or(0.0);
                    self.stack.push(operator.apply(left, right));
                }
                None => {}
            }
        }
        self.stack.pop().unwrap_or(0.0)
    }
}

/// Evaluate with a throwaway [`Evaluator`].
#[must_use]
pub fn evaluate(program: &Program, bindings: &Bindings) -> f64 {
    Evaluator::new().evaluate(program, bindings)
}
