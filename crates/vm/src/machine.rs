//! VM state management: frames, operand stack, call stack, program counter
//! and the I/O streams bound to one run.

use std::io::{BufRead, Write};

use ippcode_common::{Argument, Instruction, Program, Value, Variable};

use crate::error::RuntimeError;
use crate::frames::Frames;

/// Streams an execution reads from and writes to.
///
/// `input` feeds `READ`, `output` receives `WRITE`, `diagnostics` receives
/// `DPRINT` and `BREAK`.
pub struct Io<'a> {
    pub(crate) input: Box<dyn BufRead + 'a>,
    pub(crate) output: Box<dyn Write + 'a>,
    pub(crate) diagnostics: Box<dyn Write + 'a>,
}

impl<'a> Io<'a> {
    pub fn new(
        input: impl BufRead + 'a,
        output: impl Write + 'a,
        diagnostics: impl Write + 'a,
    ) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            diagnostics: Box::new(diagnostics),
        }
    }

    pub(crate) fn flush(&mut self) -> Result<(), RuntimeError> {
        self.output.flush().map_err(RuntimeError::output)?;
        self.diagnostics.flush().map_err(RuntimeError::output)
    }
}

/// How a run ended without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The program counter ran past the last instruction.
    Finished,
    /// `EXIT` halted the run with the given code (0..=49).
    Exited(u8),
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Finished => 0,
            Outcome::Exited(code) => i32::from(code),
        }
    }
}

/// The IPPcode23 virtual machine.
pub struct Machine<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    /// Global, local and temporary frames.
    pub(crate) frames: Frames,
    /// Operand stack for PUSHS/POPS.
    pub(crate) data_stack: Vec<Value>,
    /// Return positions pushed by CALL.
    pub(crate) call_stack: Vec<usize>,
    /// Index of the next instruction to execute.
    pub(crate) pc: usize,
    /// Index of the instruction being executed.
    pub(crate) current: usize,
    /// Instructions executed so far, including the current one.
    pub(crate) executed: u64,
    pub(crate) io: Io<'a>,
}

impl<'a> Machine<'a> {
    /// Create a new VM for the given program.
    pub fn new(program: &'a Program, io: Io<'a>) -> Self {
        Self {
            program,
            frames: Frames::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            current: 0,
            executed: 0,
            io,
        }
    }

    /// The frames, for inspection after a run.
    pub fn frames(&self) -> &Frames {
        &self.frames
    }

    /// Number of instructions executed so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// 1-based position of the current instruction, for error reports.
    pub(crate) fn at(&self) -> usize {
        self.current + 1
    }

    /// Reject an instruction whose operand count differs from its arity.
    pub(crate) fn check_arity(&self, instr: &Instruction) -> Result<(), RuntimeError> {
        let expected = instr.opcode.arity();
        if instr.args.len() != expected {
            return Err(RuntimeError::ArgumentCount {
                at: self.at(),
                opcode: instr.opcode,
                expected,
                found: instr.args.len(),
            });
        }
        Ok(())
    }

    /// Operand at a 1-based position.
    pub(crate) fn operand<'i>(
        &self,
        instr: &'i Instruction,
        position: usize,
    ) -> Result<&'i Argument, RuntimeError> {
        instr.arg(position).ok_or(RuntimeError::ArgumentCount {
            at: self.at(),
            opcode: instr.opcode,
            expected: instr.opcode.arity(),
            found: instr.args.len(),
        })
    }

    pub(crate) fn kind_error(
        &self,
        instr: &Instruction,
        position: usize,
        expected: &'static str,
        found: &Argument,
    ) -> RuntimeError {
        RuntimeError::ArgumentKind {
            at: self.at(),
            opcode: instr.opcode,
            position,
            expected,
            found: found.kind_name(),
        }
    }

    /// A destination operand, which must statically be a variable.
    pub(crate) fn target<'i>(
        &self,
        instr: &'i Instruction,
        position: usize,
    ) -> Result<&'i Variable, RuntimeError> {
        match self.operand(instr, position)? {
            Argument::Var(var) => Ok(var),
            other => Err(self.kind_error(instr, position, "var", other)),
        }
    }

    /// Resolve a symbol operand (variable or literal) to its value.
    pub(crate) fn symbol(&self, instr: &Instruction, position: usize) -> Result<Value, RuntimeError> {
        match self.operand(instr, position)? {
            Argument::Var(var) => self
                .frames
                .read(var)
                .cloned()
                .map_err(|e| RuntimeError::frame(e, self.at())),
            Argument::Const(value) if value.is_storable() => Ok(value.clone()),
            other => Err(self.kind_error(instr, position, "a symbol", other)),
        }
    }

    /// Execution index of the label named by a `label` operand.
    pub(crate) fn jump_target(
        &self,
        instr: &Instruction,
        position: usize,
    ) -> Result<usize, RuntimeError> {
        let name = match self.operand(instr, position)? {
            Argument::Const(Value::Label(name)) => name,
            other => return Err(self.kind_error(instr, position, "label", other)),
        };
        self.program
            .label(name)
            .filter(|&index| index < self.program.len())
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                at: self.at(),
                label: name.clone(),
            })
    }

    /// Assign to a declared variable.
    pub(crate) fn store(&mut self, var: &Variable, value: Value) -> Result<(), RuntimeError> {
        let at = self.at();
        self.frames
            .write(var, value)
            .map_err(|e| RuntimeError::frame(e, at))
    }

    /// Error for operands of the wrong dynamic type.
    pub(crate) fn operand_type(&self, instr: &Instruction, values: &[&Value]) -> RuntimeError {
        let found = values
            .iter()
            .map(|v| v.kind_name())
            .collect::<Vec<_>>()
            .join(" and ");
        RuntimeError::OperandType {
            at: self.at(),
            opcode: instr.opcode,
            found,
        }
    }

    /// Read one line from the input stream, without its line terminator.
    ///
    /// Returns `None` at end of input.
    pub(crate) fn read_line(&mut self) -> Result<Option<String>, RuntimeError> {
        let mut line = String::new();
        let read = self
            .io
            .input
            .read_line(&mut line)
            .map_err(|e| RuntimeError::Input {
                message: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Interpreter state dump written by BREAK.
    pub(crate) fn snapshot(&self) -> String {
        format!(
            "BREAK at instruction {} ({} instructions executed)\n{}data stack: {}, call stack: {}\n",
            self.at(),
            self.executed,
            self.frames,
            self.data_stack.len(),
            self.call_stack.len(),
        )
    }
}
