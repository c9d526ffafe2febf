//! IPPcode23 virtual machine: executes loaded programs.
//!
//! The VM is a register-free machine with:
//! - A global frame, a stack of local frames and an optional temporary frame
//! - An operand stack for PUSHS/POPS
//! - A call stack of return positions for CALL/RETURN
//!
//! # Usage
//!
//! ```
//! use ippcode_common::{Argument, FrameKind, Instruction, Opcode, Program, Value, Variable};
//! use ippcode_vm::{run, Io, Outcome};
//!
//! let x = Argument::Var(Variable::new(FrameKind::Global, "x"));
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::DefVar, vec![x.clone()]),
//!     Instruction::new(Opcode::Add, vec![
//!         x.clone(),
//!         Argument::Const(Value::Int(5)),
//!         Argument::Const(Value::Int(3)),
//!     ]),
//!     Instruction::new(Opcode::Write, vec![x]),
//! ])
//! .unwrap();
//!
//! let mut out = Vec::new();
//! let outcome = run(&program, Io::new(std::io::empty(), &mut out, std::io::sink())).unwrap();
//! assert_eq!(outcome, Outcome::Finished);
//! assert_eq!(out, b"8");
//! ```

pub mod error;
pub mod execute;
pub mod frames;
pub mod machine;

pub use error::RuntimeError;
pub use frames::{FrameError, Frames};
pub use machine::{Io, Machine, Outcome};

use ippcode_common::Program;

/// Execute a program against the given streams.
///
/// # Errors
///
/// Returns [`RuntimeError`] on the first failing instruction (type
/// mismatch, missing frame, division by zero, ...). Output written before
/// the failure has already been flushed.
pub fn run(program: &Program, io: Io<'_>) -> Result<Outcome, RuntimeError> {
    let mut vm = Machine::new(program, io);
    vm.execute()
}
