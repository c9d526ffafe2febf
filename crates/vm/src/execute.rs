//! Main execution loop and opcode dispatch for the IPPcode23 VM.
//!
//! Control flow never re-enters the loop: jumps, calls and returns only
//! assign to the program counter, so call depth is bounded by memory, not
//! by the host stack.

use std::cmp::Ordering;
use std::io::Write;

use ippcode_common::{Argument, Instruction, Opcode, TypeTag, Value};
use tracing::{debug, trace};

use crate::error::RuntimeError;
use crate::machine::{Machine, Outcome};

/// Highest code point INT2CHAR accepts.
const MAX_CODE_POINT: i64 = 256;

/// Highest status EXIT accepts.
const MAX_EXIT_CODE: u8 = 49;

impl<'a> Machine<'a> {
    /// Execute the program until it runs off the end, exits, or fails.
    ///
    /// Output streams are flushed on every path, so anything written before
    /// a failure is kept.
    pub fn execute(&mut self) -> Result<Outcome, RuntimeError> {
        debug!(
            instructions = self.program.len(),
            labels = self.program.label_count(),
            "execution started"
        );

        let result = self.run_loop();
        let flushed = self.io.flush();
        let outcome = result?;
        flushed?;

        debug!(?outcome, executed = self.executed, "execution halted");
        Ok(outcome)
    }

    fn run_loop(&mut self) -> Result<Outcome, RuntimeError> {
        let program = self.program;

        while let Some(instr) = program.instructions.get(self.pc) {
            self.current = self.pc;
            self.pc += 1;
            self.executed += 1;
            trace!(at = self.current + 1, %instr, "dispatch");

            self.check_arity(instr)?;

            match instr.opcode {
                // Frames, calls
                Opcode::Move => self.exec_move(instr)?,
                Opcode::CreateFrame => self.frames.create_temporary(),
                Opcode::PushFrame => self.exec_push_frame()?,
                Opcode::PopFrame => self.exec_pop_frame()?,
                Opcode::DefVar => self.exec_defvar(instr)?,
                Opcode::Call => self.exec_call(instr)?,
                Opcode::Return => self.exec_return()?,

                // Operand stack
                Opcode::PushS => self.exec_pushs(instr)?,
                Opcode::PopS => self.exec_pops(instr)?,

                // Arithmetic
                Opcode::Add => self.exec_arith(instr, i64::wrapping_add)?,
                Opcode::Sub => self.exec_arith(instr, i64::wrapping_sub)?,
                Opcode::Mul => self.exec_arith(instr, i64::wrapping_mul)?,
                Opcode::IDiv => self.exec_idiv(instr)?,

                // Relational, boolean
                Opcode::Lt => self.exec_relational(instr, Ordering::Less)?,
                Opcode::Gt => self.exec_relational(instr, Ordering::Greater)?,
                Opcode::Eq => self.exec_eq(instr)?,
                Opcode::And => self.exec_logic(instr, |a, b| a && b)?,
                Opcode::Or => self.exec_logic(instr, |a, b| a || b)?,
                Opcode::Not => self.exec_not(instr)?,

                // Conversions
                Opcode::Int2Char => self.exec_int2char(instr)?,
                Opcode::Stri2Int => self.exec_stri2int(instr)?,

                // Input/output
                Opcode::Read => self.exec_read(instr)?,
                Opcode::Write => self.exec_write(instr)?,

                // Strings
                Opcode::Concat => self.exec_concat(instr)?,
                Opcode::StrLen => self.exec_strlen(instr)?,
                Opcode::GetChar => self.exec_getchar(instr)?,
                Opcode::SetChar => self.exec_setchar(instr)?,

                // Types
                Opcode::Type => self.exec_type(instr)?,

                // Control flow
                Opcode::Label => {} // resolved when the program was built
                Opcode::Jump => self.pc = self.jump_target(instr, 1)?,
                Opcode::JumpIfEq => self.exec_conditional_jump(instr, true)?,
                Opcode::JumpIfNeq => self.exec_conditional_jump(instr, false)?,
                Opcode::Exit => return self.exec_exit(instr),

                // Debugging
                Opcode::DPrint => self.exec_dprint(instr)?,
                Opcode::Break => self.exec_break()?,
            }
        }

        Ok(Outcome::Finished)
    }

    // ---- Frames, calls ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let value = self.symbol(instr, 2)?;
        self.store(dest, value)
    }

    fn exec_push_frame(&mut self) -> Result<(), RuntimeError> {
        let at = self.at();
        self.frames
            .push_temporary_to_local()
            .map_err(|e| RuntimeError::frame(e, at))?;
        debug!(depth = self.frames.local_depth(), "pushed local frame");
        Ok(())
    }

    fn exec_pop_frame(&mut self) -> Result<(), RuntimeError> {
        let at = self.at();
        self.frames
            .pop_local_to_temporary()
            .map_err(|e| RuntimeError::frame(e, at))?;
        debug!(depth = self.frames.local_depth(), "popped local frame");
        Ok(())
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let var = self.target(instr, 1)?;
        let at = self.at();
        self.frames
            .declare(var)
            .map_err(|e| RuntimeError::frame(e, at))
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let target = self.jump_target(instr, 1)?;
        self.call_stack.push(self.pc);
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        self.pc = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::EmptyCallStack { at: self.at() })?;
        Ok(())
    }

    // ---- Operand stack ----

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.data_stack.push(value);
        Ok(())
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let value = self
            .data_stack
            .pop()
            .ok_or(RuntimeError::EmptyDataStack { at: self.at() })?;
        self.store(dest, value)
    }

    // ---- Arithmetic ----

    /// Binary integer arithmetic: both operands must be `int`.
    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let result = match (&a, &b) {
            (Value::Int(x), Value::Int(y)) => Value::Int(op(*x, *y)),
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, result)
    }

    fn exec_idiv(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let result = match (&a, &b) {
            (Value::Int(_), Value::Int(0)) => {
                return Err(RuntimeError::DivisionByZero { at: self.at() });
            }
            // Rust's `/` truncates toward zero.
            (Value::Int(x), Value::Int(y)) => Value::Int(x.wrapping_div(*y)),
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, result)
    }

    // ---- Relational, boolean ----

    fn exec_relational(
        &mut self,
        instr: &Instruction,
        wanted: Ordering,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let ordering = a
            .compare(&b)
            .ok_or_else(|| self.operand_type(instr, &[&a, &b]))?;

        self.store(dest, Value::Bool(ordering == wanted))
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let equal = a
            .equals(&b)
            .ok_or_else(|| self.operand_type(instr, &[&a, &b]))?;

        self.store(dest, Value::Bool(equal))
    }

    fn exec_logic(
        &mut self,
        instr: &Instruction,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let result = match (&a, &b) {
            (Value::Bool(x), Value::Bool(y)) => Value::Bool(op(*x, *y)),
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, result)
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;

        match a {
            Value::Bool(x) => self.store(dest, Value::Bool(!x)),
            _ => Err(self.operand_type(instr, &[&a])),
        }
    }

    // ---- Conversions ----

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;

        let code = match a {
            Value::Int(n) => n,
            _ => return Err(self.operand_type(instr, &[&a])),
        };
        let invalid = RuntimeError::InvalidCodePoint {
            at: self.at(),
            value: code,
        };
        if !(0..=MAX_CODE_POINT).contains(&code) {
            return Err(invalid);
        }
        let ch = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(invalid)?;

        self.store(dest, Value::Str(ch.to_string()))
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let ch = match (&a, &b) {
            (Value::Str(s), Value::Int(index)) => self.char_at(s, *index)?,
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, Value::Int(i64::from(u32::from(ch))))
    }

    // ---- Input/output ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let ty = match self.operand(instr, 2)? {
            Argument::Const(Value::TypeName(ty)) => *ty,
            other => return Err(self.kind_error(instr, 2, "type", other)),
        };
        if ty == TypeTag::Nil {
            return Err(RuntimeError::InvalidReadType { at: self.at(), ty });
        }

        let value = match self.read_line()? {
            Some(line) => parse_input(ty, &line),
            None => Value::Nil,
        };

        self.store(dest, value)
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.io
            .output
            .write_all(value.render().as_bytes())
            .map_err(RuntimeError::output)
    }

    // ---- Strings ----

    fn exec_concat(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let result = match (&a, &b) {
            (Value::Str(x), Value::Str(y)) => Value::Str(format!("{x}{y}")),
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, result)
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;

        let length = match &a {
            Value::Str(s) => s.chars().count(),
            _ => return Err(self.operand_type(instr, &[&a])),
        };

        self.store(dest, Value::Int(length as i64))
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let ch = match (&a, &b) {
            (Value::Str(s), Value::Int(index)) => self.char_at(s, *index)?,
            _ => return Err(self.operand_type(instr, &[&a, &b])),
        };

        self.store(dest, Value::Str(ch.to_string()))
    }

    fn exec_setchar(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;
        let current = self.symbol(instr, 1)?;
        let index = self.symbol(instr, 2)?;
        let replacement = self.symbol(instr, 3)?;

        let (s, i, r) = match (&current, &index, &replacement) {
            (Value::Str(s), Value::Int(i), Value::Str(r)) => (s, *i, r),
            _ => return Err(self.operand_type(instr, &[&current, &index, &replacement])),
        };

        let mut chars: Vec<char> = s.chars().collect();
        let slot = usize::try_from(i)
            .ok()
            .filter(|&pos| pos < chars.len())
            .ok_or(RuntimeError::StringIndex {
                at: self.at(),
                index: i,
                length: chars.len(),
            })?;
        let ch = r
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: self.at() })?;
        chars[slot] = ch;

        self.store(dest, Value::Str(chars.into_iter().collect()))
    }

    /// Character at a 0-based index, counted in code points.
    fn char_at(&self, s: &str, index: i64) -> Result<char, RuntimeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .ok_or_else(|| RuntimeError::StringIndex {
                at: self.at(),
                index,
                length: s.chars().count(),
            })
    }

    // ---- Types ----

    fn exec_type(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let dest = self.target(instr, 1)?;

        // An unset variable yields the empty string instead of failing.
        let name = match self.operand(instr, 2)? {
            Argument::Var(var) => self
                .frames
                .slot(var)
                .map_err(|e| RuntimeError::frame(e, self.at()))?
                .and_then(Value::type_tag)
                .map(|tt| tt.name())
                .unwrap_or_default(),
            Argument::Const(value) if value.is_storable() => {
                value.type_tag().map(|tt| tt.name()).unwrap_or_default()
            }
            other => return Err(self.kind_error(instr, 2, "a symbol", other)),
        };

        self.store(dest, Value::Str(name.to_string()))
    }

    // ---- Control flow ----

    fn exec_conditional_jump(
        &mut self,
        instr: &Instruction,
        jump_if_equal: bool,
    ) -> Result<(), RuntimeError> {
        let target = self.jump_target(instr, 1)?;
        let a = self.symbol(instr, 2)?;
        let b = self.symbol(instr, 3)?;

        let equal = a
            .equals(&b)
            .ok_or_else(|| self.operand_type(instr, &[&a, &b]))?;

        if equal == jump_if_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Outcome, RuntimeError> {
        let value = self.symbol(instr, 1)?;

        let code = match value {
            Value::Int(code) => code,
            _ => return Err(self.operand_type(instr, &[&value])),
        };
        let status = u8::try_from(code)
            .ok()
            .filter(|&status| status <= MAX_EXIT_CODE)
            .ok_or(RuntimeError::InvalidExitCode { at: self.at(), code })?;

        Ok(Outcome::Exited(status))
    }

    // ---- Debugging ----

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.symbol(instr, 1)?;
        self.io
            .diagnostics
            .write_all(value.render().as_bytes())
            .map_err(RuntimeError::output)
    }

    fn exec_break(&mut self) -> Result<(), RuntimeError> {
        let snapshot = self.snapshot();
        self.io
            .diagnostics
            .write_all(snapshot.as_bytes())
            .map_err(RuntimeError::output)
    }
}

/// Convert one input line to the requested type.
///
/// Trailing whitespace is dropped. A line left empty reads as `nil`, the
/// same as end of input. `int` input that does not parse is `nil`; `bool`
/// input is `true` only for a case-insensitive `true`.
fn parse_input(ty: TypeTag, line: &str) -> Value {
    let line = line.trim_end();
    if line.is_empty() {
        return Value::Nil;
    }
    match ty {
        TypeTag::Int => line
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or(Value::Nil),
        TypeTag::Bool => Value::Bool(line.trim().eq_ignore_ascii_case("true")),
        TypeTag::String => Value::Str(line.to_string()),
        TypeTag::Nil => Value::Nil,
    }
}
