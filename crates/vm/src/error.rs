//! Runtime errors for the IPPcode23 VM.
//!
//! Every error that comes from a specific instruction carries its 1-based
//! position (`at`). [`RuntimeError::kind`] classifies each variant into the
//! shared [`ErrorKind`] taxonomy.

use ippcode_common::{ErrorKind, FrameKind, Opcode, TypeTag};
use thiserror::Error;

use crate::frames::FrameError;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Operand count differs from the opcode's fixed arity.
    #[error("{opcode} expects {expected} operand(s), got {found} at instruction {at}")]
    ArgumentCount {
        at: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// Operand of the wrong static kind (e.g. a literal where a variable is required).
    #[error("operand {position} of {opcode} must be {expected}, got {found} at instruction {at}")]
    ArgumentKind {
        at: usize,
        opcode: Opcode,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// Jump or call to a label that the program does not define.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// DEFVAR of a name already declared in the same frame.
    #[error("variable {name} redeclared at instruction {at}")]
    Redeclared { at: usize, name: String },

    /// Operands of the wrong dynamic type.
    #[error("{opcode} cannot operate on {found} at instruction {at}")]
    OperandType {
        at: usize,
        opcode: Opcode,
        found: String,
    },

    /// Access to a variable not declared in its frame.
    #[error("undeclared variable {name} at instruction {at}")]
    UndeclaredVariable { at: usize, name: String },

    /// Access to a local or temporary frame that does not exist.
    #[error("{frame} frame does not exist at instruction {at}")]
    MissingFrame { at: usize, frame: FrameKind },

    /// Read of a declared variable that was never assigned.
    #[error("variable {name} has no value at instruction {at}")]
    UnsetVariable { at: usize, name: String },

    /// POPS on an empty operand stack.
    #[error("pop from empty data stack at instruction {at}")]
    EmptyDataStack { at: usize },

    /// RETURN with no pending CALL.
    #[error("RETURN with empty call stack at instruction {at}")]
    EmptyCallStack { at: usize },

    /// IDIV with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// EXIT with a code outside 0..=49.
    #[error("exit code {code} out of range 0..=49 at instruction {at}")]
    InvalidExitCode { at: usize, code: i64 },

    /// READ asked for a type that cannot be read.
    #[error("cannot READ a value of type {ty} at instruction {at}")]
    InvalidReadType { at: usize, ty: TypeTag },

    /// String index outside the string.
    #[error("string index {index} out of range (length {length}) at instruction {at}")]
    StringIndex {
        at: usize,
        index: i64,
        length: usize,
    },

    /// SETCHAR with an empty replacement string.
    #[error("SETCHAR with empty replacement string at instruction {at}")]
    EmptyReplacement { at: usize },

    /// INT2CHAR with a value that is not a supported code point.
    #[error("code point {value} out of range 0..=256 at instruction {at}")]
    InvalidCodePoint { at: usize, value: i64 },

    /// The READ input source failed.
    #[error("cannot read input: {message}")]
    Input { message: String },

    /// Standard output or the diagnostic stream failed.
    #[error("cannot write output: {message}")]
    Output { message: String },
}

impl RuntimeError {
    /// Failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::ArgumentCount { .. } | RuntimeError::ArgumentKind { .. } => {
                ErrorKind::Structure
            }
            RuntimeError::UndefinedLabel { .. } | RuntimeError::Redeclared { .. } => {
                ErrorKind::Semantic
            }
            RuntimeError::OperandType { .. } => ErrorKind::OperandType,
            RuntimeError::UndeclaredVariable { .. } => ErrorKind::UndeclaredVariable,
            RuntimeError::MissingFrame { .. } => ErrorKind::Frame,
            RuntimeError::UnsetVariable { .. }
            | RuntimeError::EmptyDataStack { .. }
            | RuntimeError::EmptyCallStack { .. } => ErrorKind::MissingValue,
            RuntimeError::DivisionByZero { .. }
            | RuntimeError::InvalidExitCode { .. }
            | RuntimeError::InvalidReadType { .. } => ErrorKind::WrongValue,
            RuntimeError::StringIndex { .. }
            | RuntimeError::EmptyReplacement { .. }
            | RuntimeError::InvalidCodePoint { .. } => ErrorKind::String,
            RuntimeError::Input { .. } => ErrorKind::Input,
            RuntimeError::Output { .. } => ErrorKind::Output,
        }
    }

    /// Attach an instruction position to a frame manager failure.
    pub(crate) fn frame(err: FrameError, at: usize) -> Self {
        match err {
            FrameError::Missing(frame) => RuntimeError::MissingFrame { at, frame },
            FrameError::Undeclared(var) => RuntimeError::UndeclaredVariable {
                at,
                name: var.to_string(),
            },
            FrameError::Redeclared(var) => RuntimeError::Redeclared {
                at,
                name: var.to_string(),
            },
            FrameError::Unset(var) => RuntimeError::UnsetVariable {
                at,
                name: var.to_string(),
            },
        }
    }

    pub(crate) fn output(err: std::io::Error) -> Self {
        RuntimeError::Output {
            message: err.to_string(),
        }
    }
}
