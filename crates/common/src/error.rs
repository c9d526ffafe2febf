//! Failure taxonomy shared by the loader, the VM and the CLI.

use thiserror::Error;

/// The closed set of failure kinds an interpreter run can end with.
///
/// Each kind maps to a fixed process exit code. Crates report their own
/// error enums and classify them through a `kind()` method; only the CLI
/// turns a kind into an actual exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing command-line parameters.
    Parameter,
    /// An input file could not be opened or read.
    Input,
    /// An output sink could not be written.
    Output,
    /// The structured listing is not well-formed.
    Format,
    /// Missing, duplicate or invalid attributes, wrong arity, unknown opcode.
    Structure,
    /// Duplicate label, undefined label, duplicate variable declaration.
    Semantic,
    /// Operand of the wrong dynamic type.
    OperandType,
    /// Access to a variable that is not declared in its frame.
    UndeclaredVariable,
    /// Access to a local or temporary frame that does not exist.
    Frame,
    /// Read of an unset variable, or pop/return on an empty stack.
    MissingValue,
    /// Operand value outside the range an instruction mandates.
    WrongValue,
    /// Bad string index or character conversion.
    String,
}

/// All failure kinds, in exit-code order.
pub const ALL_ERROR_KINDS: [ErrorKind; 12] = [
    ErrorKind::Parameter,
    ErrorKind::Input,
    ErrorKind::Output,
    ErrorKind::Format,
    ErrorKind::Structure,
    ErrorKind::Semantic,
    ErrorKind::OperandType,
    ErrorKind::UndeclaredVariable,
    ErrorKind::Frame,
    ErrorKind::MissingValue,
    ErrorKind::WrongValue,
    ErrorKind::String,
];

impl ErrorKind {
    /// Process exit code for this kind of failure.
    pub const fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Parameter => 10,
            ErrorKind::Input => 11,
            ErrorKind::Output => 12,
            ErrorKind::Format => 31,
            ErrorKind::Structure => 32,
            ErrorKind::Semantic => 52,
            ErrorKind::OperandType => 53,
            ErrorKind::UndeclaredVariable => 54,
            ErrorKind::Frame => 55,
            ErrorKind::MissingValue => 56,
            ErrorKind::WrongValue => 57,
            ErrorKind::String => 58,
        }
    }
}

/// Errors raised while assembling a [`Program`](crate::Program) from
/// already-parsed instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    /// Two `LABEL` instructions define the same name.
    #[error("label '{label}' redefined at instruction {at}")]
    DuplicateLabel { label: String, at: usize },

    /// A `LABEL` instruction without a single label operand.
    #[error("LABEL at instruction {at} must have exactly one label operand")]
    MalformedLabel { at: usize },
}

impl ProgramError {
    /// Failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProgramError::DuplicateLabel { .. } => ErrorKind::Semantic,
            ProgramError::MalformedLabel { .. } => ErrorKind::Structure,
        }
    }
}
