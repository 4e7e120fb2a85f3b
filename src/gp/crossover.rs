//! Subtree crossover on flat programs.
//!
//! A random subtree of the first parent is replaced by a random subtree of
//! the second. Subtree extents come from [`subtree_end`], so the child is
//! complete whenever both parents are.

use crate::gp::program::{Opcode, Program, subtree_end};
use rand::Rng;

/// The two subtrees exchanged by one crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossoverSites {
    /// Start of the replaced subtree in the first parent.
    pub start1: usize,
    /// End (exclusive) of the replaced subtree in the first parent.
    pub end1: usize,
    /// Start of the donated subtree in the second parent.
    pub start2: usize,
    /// End (exclusive) of the donated subtree in the second parent.
    pub end2: usize,
}

impl CrossoverSites {
    /// Length of the child these sites produce.
    #[must_use]
    pub fn child_len(&self, parent1_len: usize) -> usize {
        parent1_len - (self.end1 - self.start1) + (self.end2 - self.start2)
    }
}

/// Draw a uniform node in each parent and find its subtree extent.
pub fn choose_sites<R: Rng>(parent1: &Program, parent2: &Program, rng: &mut R) -> CrossoverSites {
    let start1 = rng.gen_range(0..parent1.len());
    let start2 = rng.gen_range(0..parent2.len());
    CrossoverSites {
        start1,
        end1: extent(parent1.as_slice(), start1),
        start2,
        end2: extent(parent2.as_slice(), start2),
    }
}

fn extent(code: &[Opcode], start: usize) -> usize {
    subtree_end(code, start).unwrap_or(code.len())
}

/// Build `parent1[..start1] ++ parent2[start2..end2] ++ parent1[end1..]`.
#[must_use]
pub fn splice(parent1: &Program, parent2: &Program, sites: CrossoverSites) -> Program {
    let p1 = parent1.as_slice();
    let p2 = parent2.as_slice();
    let mut child = Vec::with_capacity(sites.child_len(p1.len()));
    child.extend_from_slice(&p1[..sites.start1]);
    child.extend_from_slice(&p2[sites.start2..sites.end2]);
    child.extend_from_slice(&p1[sites.end1..]);
    Program::from_complete(child)
}

/// Cross two parents.
///
/// A child longer than `max_len` is discarded and a copy of `parent1`
/// returned instead; the random draws are the same either way.
#[must_use]
pub fn crossover<R: Rng>(
    parent1: &Program,
    parent2: &Program,
    max_len: usize,
    rng: &mut R,
) -> Program {
    let sites = choose_sites(parent1, parent2, rng);
    let len = sites.child_len(parent1.len());
    if len > max_len {
        log::debug!("crossover child of length {len} exceeds {max_len}, keeping parent");
        return parent1.clone();
    }
    splice(parent1, parent2, sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::generator::ProgramGenerator;
    use crate::gp::program::{ADD, MUL, SUB};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn program(code: Vec<Opcode>) -> Program {
        Program::from_opcodes(code).unwrap()
    }

    #[test]
    fn test_splice_known_sites() {
        // (X1 + X2) with its X2 replaced by (X3 * X1)
        let p1 = program(vec![ADD, 0, 1]);
        let p2 = program(vec![SUB, MUL, 2, 0, 1]);
        let sites = CrossoverSites {
            start1: 2,
            end1: 3,
            start2: 1,
            end2: 4,
        };
        let child = splice(&p1, &p2, sites);
        assert_eq!(child.as_slice(), &[ADD, 0, MUL, 2, 0]);
        assert_eq!(sites.child_len(p1.len()), child.len());
    }

    #[test]
    fn test_replace_root() {
        let p1 = program(vec![ADD, 0, 1]);
        let p2 = program(vec![SUB, MUL, 2, 0, 1]);
        let sites = CrossoverSites {
            start1: 0,
            end1: 3,
            start2: 0,
            end2: 5,
        };
        assert_eq!(splice(&p1, &p2, sites), p2);
    }

    #[test]
    fn test_children_complete_and_obey_length_law() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut generator = ProgramGenerator::new(10_000, 4, 5);
        for _ in 0..200 {
            let p1 = generator.generate(&mut rng);
            let p2 = generator.generate(&mut rng);
            let sites = choose_sites(&p1, &p2, &mut rng);
            let child = splice(&p1, &p2, sites);
            assert_eq!(subtree_end(child.as_slice(), 0), Some(child.len()));
            assert_eq!(
                child.len(),
                p1.len() - (sites.end1 - sites.start1) + (sites.end2 - sites.start2)
            );
        }
    }

    #[test]
    fn test_length_cap_keeps_parent() {
        let p1 = program(vec![ADD, 0, 1]);
        let p2 = program(vec![ADD, ADD, 0, 1, ADD, 0, 1]);
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..50 {
            let child = crossover(&p1, &p2, 3, &mut rng);
            assert!(child.len() <= 3);
        }
    }
}
