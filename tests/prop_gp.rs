//! Property-based tests for program operators.
//!
//! Run with: cargo test --release prop_gp

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use tinygp::gp::{
    Bindings, DIV, FSET_START, MutationConfig, Program, ProgramGenerator, choose_sites, crossover,
    evaluate, mutate, splice, subtree_end,
};

fn is_complete(program: &Program) -> bool {
    subtree_end(program.as_slice(), 0) == Some(program.len())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Generated programs are complete, fit the buffer and use only legal opcodes.
    #[test]
    fn prop_generated_programs_complete(
        seed in any::<u64>(),
        terminals in 1usize..=110,
        depth in 0usize..7,
        max_len in 3usize..400,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut generator = ProgramGenerator::new(max_len, terminals, depth);
        let program = generator.generate(&mut rng);

        prop_assert!(is_complete(&program));
        prop_assert!(program.len() <= max_len);
        prop_assert!(program.as_slice()[0] >= FSET_START);
        for &op in program.as_slice() {
            prop_assert!(usize::from(op) < terminals || (FSET_START..=DIV).contains(&op));
        }
    }

    /// Crossover children are complete and their length follows the splice sites.
    #[test]
    fn prop_crossover_length_law(seed in any::<u64>(), terminals in 1usize..20) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut generator = ProgramGenerator::new(2000, terminals, 5);
        let p1 = generator.generate(&mut rng);
        let p2 = generator.generate(&mut rng);

        let sites = choose_sites(&p1, &p2, &mut rng);
        let child = splice(&p1, &p2, sites);
        prop_assert!(is_complete(&child));
        prop_assert_eq!(
            child.len(),
            p1.len() - (sites.end1 - sites.start1) + (sites.end2 - sites.start2)
        );
        prop_assert_eq!(&child.as_slice()[..sites.start1], &p1.as_slice()[..sites.start1]);
    }

    /// Capped crossover never exceeds the cap.
    #[test]
    fn prop_crossover_respects_cap(seed in any::<u64>(), cap in 3usize..60) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut generator = ProgramGenerator::new(cap, 3, 4);
        let p1 = generator.generate(&mut rng);
        let p2 = generator.generate(&mut rng);
        let child = crossover(&p1, &p2, cap, &mut rng);
        prop_assert!(is_complete(&child));
        prop_assert!(child.len() <= cap);
    }

    /// Mutation preserves length and the kind of every position.
    #[test]
    fn prop_mutation_preserves_shape(
        seed in any::<u64>(),
        terminals in 1usize..=110,
        pmut in 0.0f64..=1.0,
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut generator = ProgramGenerator::new(1000, terminals, 5);
        let parent = generator.generate(&mut rng);
        let config = MutationConfig { per_node_probability: pmut };
        let child = mutate(&parent, config, terminals, &mut rng);

        prop_assert!(is_complete(&child));
        prop_assert_eq!(child.len(), parent.len());
        for (a, b) in parent.as_slice().iter().zip(child.as_slice()) {
            prop_assert_eq!(*a < FSET_START, *b < FSET_START);
            prop_assert!(usize::from(*b) < terminals || *b >= FSET_START);
        }
    }

    /// Division by a near-zero denominator returns the numerator unchanged.
    #[test]
    fn prop_protected_division(num in -1e6f64..1e6, den in -0.001f64..=0.001) {
        let program = Program::from_opcodes(vec![DIV, 0, 1]).unwrap();
        let bindings = Bindings::from_values(2, vec![num, den]);
        prop_assert_eq!(evaluate(&program, &bindings).to_bits(), num.to_bits());
    }

    /// Arbitrary byte strings are accepted exactly when they form one tree.
    #[test]
    fn prop_from_opcodes_matches_traversal(code in proptest::collection::vec(0u8..=115, 1..40)) {
        let accepted = Program::from_opcodes(code.clone()).is_ok();
        prop_assert_eq!(accepted, subtree_end(&code, 0) == Some(code.len()));
    }
}
