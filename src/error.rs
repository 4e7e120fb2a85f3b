//! Error types for loading problems and validating run configuration.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Failure while reading or parsing a fitness-case file.
#[derive(Debug)]
pub enum ProblemError {
    /// The case file could not be read.
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The header line is missing, has the wrong token count, or is not numeric.
    MalformedHeader(String),
    /// A case row has the wrong token count or a non-numeric token.
    MalformedRow {
        /// 1-based line number in the case file.
        line: usize,
        /// What was wrong with the row.
        reason: String,
    },
    /// The file ends before the declared number of cases.
    MissingCases {
        /// Number of cases declared in the header.
        expected: usize,
        /// Number of case rows actually present.
        found: usize,
    },
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read case file {}: {source}", path.display())
            }
            Self::MalformedHeader(reason) => write!(f, "incorrect data format in header: {reason}"),
            Self::MalformedRow { line, reason } => {
                write!(f, "incorrect data format on line {line}: {reason}")
            }
            Self::MissingCases { expected, found } => {
                write!(f, "header declares {expected} fitness cases but only {found} found")
            }
        }
    }
}

impl std::error::Error for ProblemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for problem loading.
pub type LoadResult<T> = Result<T, ProblemError>;

/// An evolution parameter outside its legal range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Population must hold at least one program.
    EmptyPopulation,
    /// Tournaments need at least one competitor.
    ZeroTournamentSize,
    /// Initial growth needs at least one level below the root.
    ZeroDepth,
    /// The generation buffer cannot hold the smallest complete program (3 opcodes).
    BufferTooSmall(usize),
    /// A probability parameter is outside `[0, 1]`.
    Probability {
        /// Parameter name as it appears in the config file.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The solved threshold must be a non-positive fitness.
    Threshold(f64),
    /// The problem defines no terminals to grow programs from.
    NoTerminals,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "population_size must be at least 1"),
            Self::ZeroTournamentSize => write!(f, "tournament_size must be at least 1"),
            Self::ZeroDepth => write!(f, "depth must be at least 1"),
            Self::BufferTooSmall(len) => {
                write!(f, "max_len {len} cannot hold a program (minimum 3)")
            }
            Self::Probability { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            Self::Threshold(value) => {
                write!(f, "solved_threshold must not be positive, got {value}")
            }
            Self::NoTerminals => write!(f, "problem has no variables or constants"),
        }
    }
}

impl std::error::Error for ConfigError {}
