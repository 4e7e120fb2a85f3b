//! tinygp CLI - evolve formulas that fit a fitness-case file.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::process::ExitCode;
use tinygp::Outcome;

/// tinygp - steady-state genetic programming for symbolic regression
#[derive(Parser, Debug)]
#[command(name = "tinygp")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evolve a formula for a fitness-case file
    Evolve(cli::evolve::EvolveArgs),

    /// Check a fitness-case file and print its summary
    Validate {
        /// Fitness-case file
        #[arg(required = true)]
        problem: std::path::PathBuf,
    },
}

/// Exit code when the generation budget ran out without a solution.
const EXIT_NOT_SOLVED: u8 = 1;
/// Exit code for any fatal error.
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Evolve(evolve) => cli::evolve::execute(evolve).map(|outcome| match outcome {
            Outcome::Solved => ExitCode::SUCCESS,
            Outcome::Exhausted => ExitCode::from(EXIT_NOT_SOLVED),
        }),
        Commands::Validate { problem } => {
            cli::validate::execute(problem).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
