//! Progress reporting.
//!
//! A [`Reporter`] receives the run banner, one record per generation and the
//! final outcome. Reporters write program output; diagnostics go through
//! `log` instead.

use crate::gp::evolution::{EvolutionConfig, EvolutionResult, GenerationStats, Outcome};
use crate::problem::Problem;
use serde::Serialize;
use std::io::{self, Write};

/// One generation's statistics plus its best program.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Fitness and size statistics.
    #[serde(flatten)]
    pub stats: GenerationStats,
    /// Infix rendering of the best program.
    pub formula: String,
}

/// Sink for run progress.
pub trait Reporter {
    /// Called once before the initial population is reported.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn begin(&mut self, config: &EvolutionConfig, problem: &Problem) -> io::Result<()>;

    /// Called for generation 0 and after every stepped generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn generation(&mut self, report: &GenerationReport) -> io::Result<()>;

    /// Called once with the final result.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn finish(&mut self, result: &EvolutionResult) -> io::Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn begin(&mut self, _config: &EvolutionConfig, _problem: &Problem) -> io::Result<()> {
        Ok(())
    }

    fn generation(&mut self, _report: &GenerationReport) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _result: &EvolutionResult) -> io::Result<()> {
        Ok(())
    }
}

/// Human-readable progress.
#[derive(Debug)]
pub struct TextReporter<W> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    /// Write progress to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn begin(&mut self, config: &EvolutionConfig, problem: &Problem) -> io::Result<()> {
        writeln!(self.out, "-- TINY GP --")?;
        writeln!(self.out, "{config}")?;
        writeln!(self.out, "NVAR={}", problem.var_count)?;
        writeln!(self.out, "NRAND={}", problem.const_count)?;
        writeln!(self.out, "MIN_RANDOM={}", problem.min_random)?;
        writeln!(self.out, "MAX_RANDOM={}", problem.max_random)?;
        writeln!(self.out, "FITNESS_CASES={}", problem.cases.len())?;
        writeln!(self.out, "----------------------------------")
    }

    fn generation(&mut self, report: &GenerationReport) -> io::Result<()> {
        let stats = &report.stats;
        writeln!(
            self.out,
            "Generation={} Avg Fitness={} Best Fitness={} Avg Size={}",
            stats.generation, stats.mean_fitness, stats.best_fitness, stats.mean_size
        )?;
        writeln!(self.out, "Best Individual: {}", report.formula)?;
        self.out.flush()
    }

    fn finish(&mut self, result: &EvolutionResult) -> io::Result<()> {
        match result.outcome {
            Outcome::Solved => writeln!(self.out, "PROBLEM SOLVED")?,
            Outcome::Exhausted => writeln!(self.out, "PROBLEM *NOT* SOLVED")?,
        }
        self.out.flush()
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Begin {
        config: &'a EvolutionConfig,
        var_count: usize,
        const_count: usize,
        min_random: f64,
        max_random: f64,
        case_count: usize,
    },
    Generation(&'a GenerationReport),
    Finish {
        outcome: Outcome,
        generations: usize,
        best_fitness: f64,
        formula: &'a str,
    },
}

/// One JSON object per line.
///
/// JSON has no infinities or NaN, so a non-finite fitness (such as the
/// `-inf` of a program that overflows on some case) is written as `null`.
#[derive(Debug)]
pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    /// Write records to `out`.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn begin(&mut self, config: &EvolutionConfig, problem: &Problem) -> io::Result<()> {
        self.write_record(&Record::Begin {
            config,
            var_count: problem.var_count,
            const_count: problem.const_count,
            min_random: problem.min_random,
            max_random: problem.max_random,
            case_count: problem.cases.len(),
        })
    }

    fn generation(&mut self, report: &GenerationReport) -> io::Result<()> {
        self.write_record(&Record::Generation(report))
    }

    fn finish(&mut self, result: &EvolutionResult) -> io::Result<()> {
        self.write_record(&Record::Finish {
            outcome: result.outcome,
            generations: result.generations,
            best_fitness: result.best_fitness,
            formula: &result.formula,
        })
    }
}
