//! Program representation: instructions in execution order plus the label
//! table.

use std::collections::HashMap;

use crate::error::ProgramError;
use crate::instruction::{Argument, Instruction};
use crate::opcode::Opcode;
use crate::value::Value;

/// An IPPcode23 program ready for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream, in execution order.
    pub instructions: Vec<Instruction>,
    /// Label name → execution index of its `LABEL` instruction.
    labels: HashMap<String, usize>,
}

impl Program {
    /// Build a program and its label table.
    ///
    /// Every `LABEL` must carry exactly one label operand, and label names
    /// must be unique. References to labels are not checked here; the VM
    /// reports unknown targets when it reaches them.
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, ProgramError> {
        let mut labels = HashMap::new();

        for (index, instr) in instructions.iter().enumerate() {
            if instr.opcode != Opcode::Label {
                continue;
            }
            let name = match instr.args.as_slice() {
                [Argument::Const(Value::Label(name))] => name,
                _ => return Err(ProgramError::MalformedLabel { at: index + 1 }),
            };
            if labels.insert(name.clone(), index).is_some() {
                return Err(ProgramError::DuplicateLabel {
                    label: name.clone(),
                    at: index + 1,
                });
            }
        }

        Ok(Self {
            instructions,
            labels,
        })
    }

    /// Execution index of the `LABEL` instruction defining `name`.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    /// Number of labels defined by the program.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
