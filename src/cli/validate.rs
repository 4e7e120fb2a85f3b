//! Case-file validation command implementation.

#![allow(clippy::needless_pass_by_value)]

use super::CliError;
use std::path::PathBuf;
use tinygp::problem::Problem;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the case file cannot be read or is malformed.
pub(crate) fn execute(problem: PathBuf) -> Result<(), CliError> {
    println!("Validating: {}", problem.display());

    let loaded = Problem::load(&problem)?;
    let (min_target, max_target) = loaded
        .cases
        .iter()
        .map(|case| case.target)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), t| {
            (lo.min(t), hi.max(t))
        });

    println!();
    println!("Summary:");
    println!("  Variables:      {}", loaded.var_count);
    println!("  Constants:      {}", loaded.const_count);
    println!(
        "  Constant range: [{}, {})",
        loaded.min_random, loaded.max_random
    );
    println!("  Fitness cases:  {}", loaded.cases.len());
    println!("  Target range:   [{min_target}, {max_target}]");
    println!();
    println!("Validation successful!");

    Ok(())
}
