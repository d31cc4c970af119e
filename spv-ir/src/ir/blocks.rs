//! Basic Block Management
//! 
//! Defines basic blocks - label-identified sequences of instructions with
//! a single entry point.

use serde::{Deserialize, Serialize};
use spv_common::SpvId;
use std::fmt;
use crate::ir::{Instruction, OpCode, Value};

/// Basic Block - owns its instructions in program order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    label: SpvId,
    instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: SpvId) -> Self {
        Self {
            label,
            instructions: Vec::new(),
        }
    }

    pub fn label(&self) -> SpvId {
        self.label
    }

    /// The block as a label-kind value (`OpLabel`)
    pub fn value(&self) -> Value {
        Value::with_id(OpCode::Label.min_word_count(), OpCode::Label, self.label)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Append `instr`, binding it to this block
    pub fn add_instruction(&mut self, mut instr: Instruction) {
        instr.set_parent(self.label);
        self.instructions.push(instr);
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|instr| instr.is_terminator())
    }

    pub fn has_terminator(&self) -> bool {
        self.terminator().is_some()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())?;
        for instr in &self.instructions {
            write!(f, "\n  {instr}")?;
        }
        Ok(())
    }
}
