//! Fitness-case files.
//!
//! A case file has a five-token header followed by one row per case:
//!
//! ```text
//! <var_count> <const_count> <min_random> <max_random> <case_count>
//! <x_1> ... <x_var_count> <target>
//! ```
//!
//! Blank lines are skipped anywhere in the file.

use crate::error::{LoadResult, ProblemError};
use crate::gp::FSET_START;
use std::path::Path;

/// One sampled input/output pair.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessCase {
    /// Input values, one per variable.
    pub inputs: Vec<f64>,
    /// Expected output.
    pub target: f64,
}

/// The regression problem: variables, constant slots and the case table.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Number of input variables per case.
    pub var_count: usize,
    /// Number of random constant slots.
    pub const_count: usize,
    /// Lower bound for random constants (inclusive).
    pub min_random: f64,
    /// Upper bound for random constants.
    pub max_random: f64,
    /// The fitness cases, in file order.
    pub cases: Vec<FitnessCase>,
}

impl Problem {
    /// Read and parse a case file.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::Io`] if the file cannot be read, otherwise any
    /// error from [`Problem::parse`].
    pub fn load(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ProblemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let problem = Self::parse(&text)?;
        log::info!(
            "loaded {} cases ({} vars, {} consts) from {}",
            problem.cases.len(),
            problem.var_count,
            problem.const_count,
            path.display()
        );
        Ok(problem)
    }

    /// Parse case-file text.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError::MalformedHeader`] for a bad header or
    /// inconsistent header values, [`ProblemError::MalformedRow`] for a bad
    /// case row, and [`ProblemError::MissingCases`] if the text ends early.
    pub fn parse(text: &str) -> LoadResult<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| ProblemError::MalformedHeader("file is empty".to_string()))?;
        let header = Header::parse(header)?;

        let mut cases = Vec::new();
        for (line_no, line) in lines.by_ref() {
            cases.push(parse_row(line_no, line, header.var_count)?);
            if cases.len() == header.case_count {
                break;
            }
        }

        if cases.len() < header.case_count {
            return Err(ProblemError::MissingCases {
                expected: header.case_count,
                found: cases.len(),
            });
        }

        let trailing = lines.count();
        if trailing > 0 {
            log::warn!(
                "ignoring {trailing} line(s) after the declared {} cases",
                header.case_count
            );
        }

        Ok(Self {
            var_count: header.var_count,
            const_count: header.const_count,
            min_random: header.min_random,
            max_random: header.max_random,
            cases,
        })
    }

    /// Size of the terminal alphabet: variables followed by constants.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.var_count + self.const_count
    }
}

struct Header {
    var_count: usize,
    const_count: usize,
    min_random: f64,
    max_random: f64,
    case_count: usize,
}

impl Header {
    fn parse(line: &str) -> LoadResult<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [vars, consts, min, max, count] = tokens.as_slice() else {
            return Err(ProblemError::MalformedHeader(format!(
                "expected 5 tokens, found {}",
                tokens.len()
            )));
        };

        let header = Self {
            var_count: header_int(vars, "var_count")?,
            const_count: header_int(consts, "const_count")?,
            min_random: header_float(min, "min_random")?,
            max_random: header_float(max, "max_random")?,
            case_count: header_int(count, "case_count")?,
        };

        let terminals = header
            .var_count
            .checked_add(header.const_count)
            .ok_or_else(|| {
                ProblemError::MalformedHeader("terminal count overflows".to_string())
            })?;
        if terminals == 0 {
            return Err(ProblemError::MalformedHeader(
                "at least one variable or constant is required".to_string(),
            ));
        }
        if terminals > usize::from(FSET_START) {
            return Err(ProblemError::MalformedHeader(format!(
                "{terminals} terminals exceed the limit of {FSET_START}"
            )));
        }
        if header.max_random < header.min_random {
            return Err(ProblemError::MalformedHeader(format!(
                "max_random {} is below min_random {}",
                header.max_random, header.min_random
            )));
        }
        if !(header.max_random - header.min_random).is_finite() {
            return Err(ProblemError::MalformedHeader(format!(
                "constant range [{}, {}) is too wide",
                header.min_random, header.max_random
            )));
        }
        if header.case_count == 0 {
            return Err(ProblemError::MalformedHeader(
                "case_count must be at least 1".to_string(),
            ));
        }
        Ok(header)
    }
}

fn header_int(token: &str, name: &str) -> LoadResult<usize> {
    token
        .parse()
        .map_err(|_| ProblemError::MalformedHeader(format!("{name} `{token}` is not a count")))
}

fn header_float(token: &str, name: &str) -> LoadResult<f64> {
    match token.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ProblemError::MalformedHeader(format!(
            "{name} `{token}` is not a finite number"
        ))),
    }
}

fn parse_row(line: usize, text: &str, var_count: usize) -> LoadResult<FitnessCase> {
    let mut values = Vec::with_capacity(var_count + 1);
    for token in text.split_whitespace() {
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => values.push(value),
            _ => {
                return Err(ProblemError::MalformedRow {
                    line,
                    reason: format!("`{token}` is not a finite number"),
                });
            }
        }
    }
    if values.len() != var_count + 1 {
        return Err(ProblemError::MalformedRow {
            line,
            reason: format!("expected {} tokens, found {}", var_count + 1, values.len()),
        });
    }
    let target = values.pop().unwrap_or_default();
    Ok(FitnessCase {
        inputs: values,
        target,
    })
}
