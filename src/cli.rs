//! CLI command implementations for tinygp.

pub(crate) mod evolve;
pub(crate) mod validate;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Output format for the `evolve` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// One JSON object per line.
    Json,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<tinygp::ProblemError> for CliError {
    fn from(e: tinygp::ProblemError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<tinygp::gp::EvolutionError> for CliError {
    fn from(e: tinygp::gp::EvolutionError) -> Self {
        Self::new(e.to_string())
    }
}
