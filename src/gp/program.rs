//! Flat prefix-order program representation.
//!
//! A program is a sequence of opcodes in pre-order. Opcodes below
//! [`FSET_START`] are terminals indexing the binding vector; the four
//! operator opcodes follow. Every structural question (length, subtree
//! extent, node count) goes through [`subtree_end`].

use std::fmt;

/// One program slot.
pub type Opcode = u8;

/// First operator opcode; every smaller value is a terminal index.
pub const FSET_START: Opcode = 110;
/// Addition opcode.
pub const ADD: Opcode = 110;
/// Subtraction opcode.
pub const SUB: Opcode = 111;
/// Multiplication opcode.
pub const MUL: Opcode = 112;
/// Protected division opcode.
pub const DIV: Opcode = 113;

/// Denominators with magnitude at or below this make division return the numerator.
pub const DIV_GUARD: f64 = 0.001;

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// Protected `a / b`.
    Div,
}

impl Operator {
    /// All operators in opcode order.
    pub const ALL: [Self; 4] = [Self::Add, Self::Sub, Self::Mul, Self::Div];

    /// Decode an operator opcode.
    #[must_use]
    pub fn from_opcode(op: Opcode) -> Option<Self> {
        match op {
            ADD => Some(Self::Add),
            SUB => Some(Self::Sub),
            MUL => Some(Self::Mul),
            DIV => Some(Self::Div),
            _ => None,
        }
    }

    /// Encode as an opcode.
    #[must_use]
    pub fn opcode(self) -> Opcode {
        match self {
            Self::Add => ADD,
            Self::Sub => SUB,
            Self::Mul => MUL,
            Self::Div => DIV,
        }
    }

    /// Combine two operand values.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => protected_div(left, right),
        }
    }

    /// Infix symbol.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }
}

/// Division that returns `num` unchanged when `|den| <= DIV_GUARD`.
#[must_use]
pub fn protected_div(num: f64, den: f64) -> f64 {
    if den.abs() <= DIV_GUARD {
        num
    } else {
        num / den
    }
}

/// A decoded opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// Index into the binding vector.
    Terminal(usize),
    /// Binary operator with two following subtrees.
    Operator(Operator),
}

impl Node {
    /// Decode an opcode, or `None` for values outside both ranges.
    #[must_use]
    pub fn decode(op: Opcode) -> Option<Self> {
        if op < FSET_START {
            Some(Self::Terminal(usize::from(op)))
        } else {
            Operator::from_opcode(op).map(Self::Operator)
        }
    }
}

/// Offset one past the subtree that starts at `start`.
///
/// Returns `None` if the subtree runs off the end of `code` or contains an
/// invalid opcode. For a complete program `subtree_end(code, 0)` is
/// `Some(code.len())`.
#[must_use]
pub fn subtree_end(code: &[Opcode], start: usize) -> Option<usize> {
    // Number of subtrees still owed before the one at `start` is closed.
    let mut open = 1usize;
    let mut pos = start;
    while open > 0 {
        match Node::decode(*code.get(pos)?)? {
            Node::Terminal(_) => open -= 1,
            Node::Operator(_) => open += 1,
        }
        pos += 1;
    }
    Some(pos)
}

/// Error returned when an opcode sequence is not exactly one complete tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    /// The sequence is empty.
    Empty,
    /// An opcode outside the terminal and operator ranges.
    InvalidOpcode {
        /// Offset of the opcode.
        offset: usize,
        /// The opcode value.
        opcode: Opcode,
    },
    /// The tree needs more opcodes than the sequence holds.
    Truncated,
    /// The tree ends before the sequence does.
    TrailingOpcodes {
        /// Offset where the tree ends.
        end: usize,
    },
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty program"),
            Self::InvalidOpcode { offset, opcode } => {
                write!(f, "invalid opcode {opcode} at offset {offset}")
            }
            Self::Truncated => write!(f, "program is truncated"),
            Self::TrailingOpcodes { end } => {
                write!(f, "program ends at offset {end} with opcodes left over")
            }
        }
    }
}

impl std::error::Error for ProgramError {}

/// A complete program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program(Vec<Opcode>);

impl Program {
    /// Validate and wrap an opcode sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`ProgramError`] unless `code` is exactly one complete tree.
    pub fn from_opcodes(code: Vec<Opcode>) -> Result<Self, ProgramError> {
        if code.is_empty() {
            return Err(ProgramError::Empty);
        }
        if let Some(offset) = code.iter().position(|&op| Node::decode(op).is_none()) {
            return Err(ProgramError::InvalidOpcode {
                offset,
                opcode: code[offset],
            });
        }
        match subtree_end(&code, 0) {
            None => Err(ProgramError::Truncated),
            Some(end) if end < code.len() => Err(ProgramError::TrailingOpcodes { end }),
            Some(_) => Ok(Self(code)),
        }
    }

    /// Wrap a sequence the caller built as a complete tree.
    pub(crate) fn from_complete(code: Vec<Opcode>) -> Self {
        debug_assert_eq!(subtree_end(&code, 0), Some(code.len()));
        Self(code)
    }

    /// Number of opcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a complete program holds at least one terminal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The opcode sequence.
    #[must_use]
    pub fn as_slice(&self) -> &[Opcode] {
        &self.0
    }

    /// Node count as measured by structural traversal.
    #[must_use]
    pub fn node_count(&self) -> usize {
        subtree_end(&self.0, 0).unwrap_or(self.0.len())
    }

    /// Infix rendering against the given binding layout.
    #[must_use]
    pub fn formula<'a>(&'a self, var_count: usize, constants: &'a [f64]) -> Formula<'a> {
        Formula {
            code: &self.0,
            var_count,
            constants,
        }
    }
}

impl AsRef<[Opcode]> for Program {
    fn as_ref(&self) -> &[Opcode] {
        &self.0
    }
}

/// Fully parenthesised infix view of a program.
///
/// Variable slot `i` renders as `X<i+1>`; constant slots render as their
/// value.
#[derive(Debug, Clone, Copy)]
pub struct Formula<'a> {
    code: &'a [Opcode],
    var_count: usize,
    constants: &'a [f64],
}

impl Formula<'_> {
    fn write_terminal(&self, f: &mut fmt::Formatter<'_>, index: usize) -> fmt::Result {
        if index < self.var_count {
            write!(f, "X{}", index + 1)
        } else {
            match self.constants.get(index - self.var_count) {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "C{}", index - self.var_count + 1),
            }
        }
    }
}

impl fmt::Display for Formula<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Each frame is an operator whose left (0) or right (1) operand is pending.
        let mut frames: Vec<(Operator, u8)> = Vec::new();
        for &op in self.code {
            match Node::decode(op) {
                Some(Node::Operator(operator)) => {
                    f.write_str("(")?;
                    frames.push((operator, 0));
                    continue;
                }
                Some(Node::Terminal(index)) => self.write_terminal(f, index)?,
                None => write!(f, "?{op}")?,
            }
            // A finished operand closes every frame whose right side it completes.
            loop {
                match frames.last_mut() {
                    Some((operator, side @ 0)) => {
                        *side = 1;
                        write!(f, " {} ", operator.symbol())?;
                        break;
                    }
                    Some(_) => {
                        frames.pop();
                        f.write_str(")")?;
                    }
                    None => break,
                }
            }
        }
        Ok(())
    }
}
