//! Function Definitions
//! 
//! Defines IR functions with their declared signature, parameters and blocks.

use serde::{Deserialize, Serialize};
use spv_common::SpvId;
use std::fmt;
use crate::ir::{BasicBlock, OpCode, Value};

/// Function parameter (`OpFunctionParameter`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionParameter {
    pub id: SpvId,
    pub ty: SpvId,
}

impl FunctionParameter {
    pub fn value(&self) -> Value {
        Value::new(OpCode::FunctionParameter.min_word_count(), OpCode::FunctionParameter, self.ty, self.id)
    }
}

/// Function in IR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    id: SpvId,
    /// Declared signature (an `OpTypeFunction` id)
    function_type: SpvId,
    return_type: SpvId,
    parameters: Vec<FunctionParameter>,
    blocks: Vec<BasicBlock>,
}

impl Function {
    pub(crate) fn new(id: SpvId, function_type: SpvId, return_type: SpvId, parameters: Vec<FunctionParameter>) -> Self {
        Self {
            id,
            function_type,
            return_type,
            parameters,
            blocks: Vec::new(),
        }
    }

    pub fn id(&self) -> SpvId {
        self.id
    }

    /// The `OpFunction` header; its result type is the return type
    pub fn value(&self) -> Value {
        Value::new(OpCode::Function.min_word_count(), OpCode::Function, self.return_type, self.id)
    }

    pub fn function_type(&self) -> SpvId {
        self.function_type
    }

    pub fn return_type(&self) -> SpvId {
        self.return_type
    }

    pub fn parameters(&self) -> &[FunctionParameter] {
        &self.parameters
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn get_block(&self, label: SpvId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.label() == label)
    }

    pub fn get_block_mut(&mut self, label: SpvId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.label() == label)
    }

    pub fn entry_block(&self) -> Option<&BasicBlock> {
        self.blocks.first()
    }

    pub(crate) fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    pub(crate) fn set_signature(&mut self, function_type: SpvId, return_type: SpvId, parameter_types: &[SpvId]) {
        self.function_type = function_type;
        self.return_type = return_type;
        for (param, ty) in self.parameters.iter_mut().zip(parameter_types) {
            param.ty = *ty;
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} %{}", self.value(), self.function_type)?;
        for param in &self.parameters {
            write!(f, "\n{}", param.value())?;
        }
        for block in &self.blocks {
            write!(f, "\n{block}")?;
        }
        write!(f, "\n{}", OpCode::FunctionEnd)
    }
}
