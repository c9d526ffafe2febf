//! Opcode definitions for the IPPcode23 instruction set.

/// Identifies the operation to perform.
///
/// The set is closed: the loader rejects any other mnemonic, and the VM
/// dispatches with an exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames, calls
    /// Copy a symbol into a variable.
    Move,
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary slot.
    PopFrame,
    /// Declare an unset variable.
    DefVar,
    /// Push the return position and jump to a label.
    Call,
    /// Jump to the most recently pushed return position.
    Return,

    // Operand stack
    /// Push a symbol onto the operand stack.
    PushS,
    /// Pop the operand stack into a variable.
    PopS,

    // Arithmetic, relational, boolean, conversion
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division truncating toward zero.
    IDiv,
    /// Less-than over int, bool or string.
    Lt,
    /// Greater-than over int, bool or string.
    Gt,
    /// Equality, also defined for nil.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,
    /// Code point to one-character string.
    Int2Char,
    /// Code point of the character at an index.
    Stri2Int,

    // Input/output
    /// Read one line of input as the requested type.
    Read,
    /// Print a symbol to standard output.
    Write,

    // Strings
    /// String concatenation.
    Concat,
    /// String length in characters.
    StrLen,
    /// Character at an index.
    GetChar,
    /// Replace the character at an index.
    SetChar,

    // Types
    /// Dynamic type name of a symbol.
    Type,

    // Control flow
    /// Jump target. No-op at run time.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if the operands are equal.
    JumpIfEq,
    /// Jump if the operands differ.
    JumpIfNeq,
    /// Halt with an exit code in 0..=49.
    Exit,

    // Debugging
    /// Print a symbol to the diagnostic stream.
    DPrint,
    /// Dump interpreter state to the diagnostic stream.
    Break,
}

/// All valid opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the canonical (uppercase) mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
            .copied()
    }

    /// Number of operands this opcode takes.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => 0,

            Opcode::DefVar
            | Opcode::Call
            | Opcode::PushS
            | Opcode::PopS
            | Opcode::Write
            | Opcode::Label
            | Opcode::Jump
            | Opcode::Exit
            | Opcode::DPrint => 1,

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::Read
            | Opcode::StrLen
            | Opcode::Type => 2,

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar
            | Opcode::JumpIfEq
            | Opcode::JumpIfNeq => 3,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
