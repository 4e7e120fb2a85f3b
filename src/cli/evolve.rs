//! CLI command for running an evolution.

#![allow(clippy::needless_pass_by_value)]

use crate::cli::{CliError, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io;
use std::path::PathBuf;
use tinygp::gp::{
    EvolutionConfig, EvolutionResult, Evolver, GenerationReport, JsonReporter, Outcome, Reporter,
    TextReporter,
};
use tinygp::problem::Problem;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}";

/// Arguments of the `evolve` command.
#[derive(clap::Args, Debug)]
pub(crate) struct EvolveArgs {
    /// Fitness-case file
    #[arg(default_value = "problem.dat")]
    problem: PathBuf,

    /// Random seed (default: 42, or the config file's)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Generation budget
    #[arg(short, long)]
    generations: Option<usize>,

    /// Population size
    #[arg(short, long)]
    population: Option<usize>,

    /// JSON file with any subset of the run parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Never replace the best program with a worse one
    #[arg(long)]
    elitism: bool,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Write the best formula to this file when the run ends
    #[arg(long)]
    solution: Option<PathBuf>,

    /// Show a progress bar on stderr
    #[arg(long)]
    progress: bool,

    /// Threads for scoring the initial population (default: CPU count)
    #[arg(short = 'j', long)]
    threads: Option<usize>,
}

/// Execute the evolve command.
///
/// # Errors
///
/// Returns an error if the case file or config cannot be loaded, the config
/// is invalid, or output cannot be written.
pub(crate) fn execute(args: EvolveArgs) -> Result<Outcome, CliError> {
    let config = build_config(&args)?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::new(format!("Failed to configure thread pool: {e}")))?;
    }

    let problem = Problem::load(&args.problem)?;
    let mut evolver = Evolver::new(config, &problem)?;

    let stdout = io::stdout().lock();
    let result = match args.format {
        OutputFormat::Text => run(&mut evolver, TextReporter::new(stdout), &config, args.progress)?,
        OutputFormat::Json => run(&mut evolver, JsonReporter::new(stdout), &config, args.progress)?,
    };

    if let Some(path) = &args.solution {
        fs::write(path, format!("{}\n", result.formula)).map_err(|e| {
            CliError::new(format!("Failed to write solution to {}: {e}", path.display()))
        })?;
    }

    Ok(result.outcome)
}

fn build_config(args: &EvolveArgs) -> Result<EvolutionConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                CliError::new(format!("Failed to read config {}: {e}", path.display()))
            })?;
            serde_json::from_str(&text).map_err(|e| {
                CliError::new(format!("Invalid config {}: {e}", path.display()))
            })?
        }
        None => EvolutionConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(population) = args.population {
        config.population_size = population;
    }
    if args.elitism {
        config.elitism = true;
    }
    Ok(config)
}

fn run<R: Reporter>(
    evolver: &mut Evolver<'_>,
    mut reporter: R,
    config: &EvolutionConfig,
    progress: bool,
) -> Result<EvolutionResult, CliError> {
    if !progress {
        return Ok(evolver.run(&mut reporter)?);
    }

    let bar = ProgressBar::new(config.generations as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-"),
    );
    let mut reporter = ProgressReporter { inner: reporter, bar };
    let result = evolver.run(&mut reporter)?;
    reporter.bar.finish_with_message(match result.outcome {
        Outcome::Solved => "solved",
        Outcome::Exhausted => "not solved",
    });
    Ok(result)
}

/// Forwards to another reporter and advances a progress bar.
struct ProgressReporter<R> {
    inner: R,
    bar: ProgressBar,
}

impl<R: Reporter> Reporter for ProgressReporter<R> {
    fn begin(&mut self, config: &EvolutionConfig, problem: &Problem) -> io::Result<()> {
        self.inner.begin(config, problem)
    }

    fn generation(&mut self, report: &GenerationReport) -> io::Result<()> {
        self.bar.set_position(report.stats.generation as u64);
        self.bar
            .set_message(format!("best {:.6}", report.stats.best_fitness));
        self.bar.suspend(|| self.inner.generation(report))
    }

    fn finish(&mut self, result: &EvolutionResult) -> io::Result<()> {
        self.bar.suspend(|| self.inner.finish(result))
    }
}
