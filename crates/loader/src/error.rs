//! Error types for the IPPcode23 loader.

use ippcode_common::{ErrorKind, ProgramError};
use thiserror::Error;

/// Errors produced while turning an XML listing into a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The listing is not well-formed XML.
    #[error("malformed XML: {0}")]
    Xml(String),

    /// The listing is not valid UTF-8.
    #[error("listing is not valid UTF-8")]
    NotUtf8,

    /// The document element is not `program`.
    #[error("root element must be 'program', found '{0}'")]
    UnexpectedRoot(String),

    /// `program` has no `language` attribute.
    #[error("'program' is missing the 'language' attribute")]
    MissingLanguage,

    /// `language` names something other than IPPcode23.
    #[error("unsupported language '{0}', expected 'IPPcode23'")]
    WrongLanguage(String),

    /// `program` carries an attribute outside language/name/description.
    #[error("unexpected attribute '{0}' on 'program'")]
    UnexpectedAttribute(String),

    /// An element appeared where it is not allowed.
    #[error("unexpected element '{name}' inside '{parent}'")]
    UnexpectedElement { parent: String, name: String },

    /// An element is missing a required attribute.
    #[error("'{element}' element is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// `order` is not a positive decimal integer.
    #[error("invalid instruction order '{0}'")]
    InvalidOrder(String),

    /// Two instructions share an `order`.
    #[error("duplicate instruction order {0}")]
    DuplicateOrder(u64),

    /// `order` is larger than the number of instructions.
    #[error("instruction order {order} exceeds instruction count {count}")]
    OrderOutOfRange { order: u64, count: usize },

    /// The opcode is not one of the 35 known operations.
    #[error("unknown opcode '{opcode}' in instruction {order}")]
    UnknownOpcode { order: u64, opcode: String },

    /// An instruction has more than three argument elements.
    #[error("instruction {order} has {found} arguments, at most 3 are allowed")]
    TooManyArguments { order: u64, found: usize },

    /// The same `argN` appears twice.
    #[error("duplicate arg{position} in instruction {order}")]
    DuplicateArgument { order: u64, position: usize },

    /// Argument positions have a gap.
    #[error("missing arg{position} in instruction {order}")]
    MissingArgument { order: u64, position: usize },

    /// An argument `type` attribute outside the known kinds.
    #[error("unknown argument type '{kind}' in instruction {order}")]
    UnknownArgumentType { order: u64, kind: String },

    /// Literal text that does not fit its declared kind.
    #[error("invalid {kind} literal '{text}' in instruction {order}")]
    InvalidLiteral {
        order: u64,
        kind: &'static str,
        text: String,
    },

    /// The instructions do not form a valid program (label table).
    #[error(transparent)]
    Program(#[from] ProgramError),
}

impl LoadError {
    /// Failure kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Xml(_) | LoadError::NotUtf8 => ErrorKind::Format,
            LoadError::Program(err) => err.kind(),
            _ => ErrorKind::Structure,
        }
    }
}
