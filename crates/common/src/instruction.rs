//! Instructions and their operands.
//!
//! An instruction is an opcode plus up to three [`Argument`]s. Arguments
//! are either frame-qualified variable references or literal [`Value`]s.

use std::fmt;

use crate::opcode::Opcode;
use crate::value::Value;

/// The role of the frame a variable lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// `GF`: the single global frame.
    Global,
    /// `LF`: the top of the local frame stack.
    Local,
    /// `TF`: the pending temporary frame.
    Temporary,
}

impl FrameKind {
    /// Two-letter prefix used in variable references.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Local => "LF",
            FrameKind::Temporary => "TF",
        }
    }

    /// Parse a frame prefix. Prefixes are case-sensitive.
    pub fn from_prefix(prefix: &str) -> Option<FrameKind> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "LF" => Some(FrameKind::Local),
            "TF" => Some(FrameKind::Temporary),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A frame-qualified variable reference, `GF@name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub frame: FrameKind,
    pub name: String,
}

impl Variable {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    /// Parse `FRAME@name`. Returns `None` on an unknown frame or empty name.
    pub fn parse(text: &str) -> Option<Variable> {
        let (prefix, name) = text.split_once('@')?;
        let frame = FrameKind::from_prefix(prefix)?;
        if name.is_empty() {
            return None;
        }
        Some(Variable::new(frame, name))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A static instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Reference to a variable, resolved through the frames at run time.
    Var(Variable),
    /// A literal whose kind is known statically.
    Const(Value),
}

impl Argument {
    /// Kind name as written in listings (`var`, `int`, `label`, ...).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Argument::Var(_) => "var",
            Argument::Const(value) => value.kind_name(),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Var(var) => var.fmt(f),
            Argument::Const(value) => value.fmt(f),
        }
    }
}

/// A single instruction in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operands, in position order (`arg1` first).
    pub args: Vec<Argument>,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, args: Vec<Argument>) -> Self {
        Self { opcode, args }
    }

    /// Operand at a 1-based position, if present.
    pub fn arg(&self, position: usize) -> Option<&Argument> {
        position.checked_sub(1).and_then(|i| self.args.get(i))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
