//! Random program growth.

// Terminal indices are bounded by FSET_START (110)
#![allow(clippy::cast_possible_truncation)]

use crate::gp::program::{FSET_START, Opcode, Operator, Program};
use rand::Rng;

/// Grows random complete programs inside a fixed-size buffer.
#[derive(Debug, Clone)]
pub struct ProgramGenerator {
    buffer: Vec<Opcode>,
    terminal_count: usize,
    depth: usize,
}

impl ProgramGenerator {
    /// Create a generator with a `max_len`-slot buffer.
    ///
    /// `terminal_count` must be in `1..=110`.
    #[must_use]
    pub fn new(max_len: usize, terminal_count: usize, depth: usize) -> Self {
        debug_assert!((1..=usize::from(FSET_START)).contains(&terminal_count));
        Self {
            buffer: vec![0; max_len],
            terminal_count,
            depth,
        }
    }

    /// Grow a subtree at `pos` with at most `depth` levels below it.
    ///
    /// Returns the offset one past the subtree, or `None` if it would not fit
    /// in the buffer. The root position always receives an operator.
    pub fn grow<R: Rng>(&mut self, pos: usize, depth: usize, rng: &mut R) -> Option<usize> {
        if pos >= self.buffer.len() {
            return None;
        }
        if pos == 0 || (depth > 0 && rng.gen_bool(0.5)) {
            self.buffer[pos] = random_operator(rng);
            let right = self.grow(pos + 1, depth.saturating_sub(1), rng)?;
            self.grow(right, depth.saturating_sub(1), rng)
        } else {
            self.buffer[pos] = random_terminal(self.terminal_count, rng);
            Some(pos + 1)
        }
    }

    /// Grow a complete program, retrying until one fits.
    pub fn generate<R: Rng>(&mut self, rng: &mut R) -> Program {
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            if let Some(len) = self.grow(0, self.depth, rng) {
                if attempts > 1 {
                    log::trace!("program fit after {attempts} attempts");
                }
                return Program::from_complete(self.buffer[..len].to_vec());
            }
        }
    }
}

/// A uniformly chosen operator opcode.
pub fn random_operator<R: Rng>(rng: &mut R) -> Opcode {
    Operator::ALL[rng.gen_range(0..Operator::ALL.len())].opcode()
}

/// A uniformly chosen terminal opcode in `0..terminal_count`.
pub fn random_terminal<R: Rng>(terminal_count: usize, rng: &mut R) -> Opcode {
    rng.gen_range(0..terminal_count) as Opcode
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::program::subtree_end;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_generated_programs_are_complete() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut generator = ProgramGenerator::new(10_000, 3, 5);
        for _ in 0..200 {
            let program = generator.generate(&mut rng);
            assert_eq!(subtree_end(program.as_slice(), 0), Some(program.len()));
            assert!(program.len() >= 3);
            assert!(program.as_slice()[0] >= FSET_START);
            assert!(
                program
                    .as_slice()
                    .iter()
                    .all(|&op| op < 3 || (FSET_START..=113).contains(&op))
            );
        }
    }

    #[test]
    fn test_depth_zero_root_still_operator() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut generator = ProgramGenerator::new(100, 1, 0);
        let program = generator.generate(&mut rng);
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_small_buffer_rejects_then_fits() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut generator = ProgramGenerator::new(5, 2, 6);
        for _ in 0..50 {
            assert!(generator.generate(&mut rng).len() <= 5);
        }
    }

    #[test]
    fn test_grow_overflow_returns_none() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut generator = ProgramGenerator::new(2, 1, 3);
        assert_eq!(generator.grow(0, 3, &mut rng), None);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let mut a = ProgramGenerator::new(1000, 4, 5);
        let mut b = ProgramGenerator::new(1000, 4, 5);
        let mut rng_a = SmallRng::seed_from_u64(99);
        let mut rng_b = SmallRng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(a.generate(&mut rng_a), b.generate(&mut rng_b));
        }
    }
}
