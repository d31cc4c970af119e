//! IR Value Representations
//!
//! Every module entry that can carry a result (types, constants, functions,
//! labels, instructions) shares the same header: opcode, word count and
//! optional result type and result id.

use serde::{Deserialize, Serialize};
use spv_common::{SpvId, SpvWord};
use std::fmt;
use crate::ir::OpCode;

/// Value header shared by all module entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    op_code: OpCode,
    word_count: SpvWord,
    ty: Option<SpvId>,
    id: Option<SpvId>,
}

impl Value {
    /// Value with both a result type and a result id
    pub fn new(word_count: SpvWord, op_code: OpCode, ty: SpvId, id: SpvId) -> Self {
        Self { op_code, word_count, ty: Some(ty), id: Some(id) }
    }

    /// Value with a result id but no result type
    pub fn with_id(word_count: SpvWord, op_code: OpCode, id: SpvId) -> Self {
        Self { op_code, word_count, ty: None, id: Some(id) }
    }

    /// Value with neither result type nor result id
    pub fn anonymous(word_count: SpvWord, op_code: OpCode) -> Self {
        Self { op_code, word_count, ty: None, id: None }
    }

    /// Value with a result type but no result id
    pub fn with_type(word_count: SpvWord, op_code: OpCode, ty: SpvId) -> Self {
        Self { op_code, word_count, ty: Some(ty), id: None }
    }

    pub(crate) fn from_parts(word_count: SpvWord, op_code: OpCode, ty: Option<SpvId>, id: Option<SpvId>) -> Self {
        Self { op_code, word_count, ty, id }
    }

    pub fn op_code(&self) -> OpCode {
        self.op_code
    }

    pub fn word_count(&self) -> SpvWord {
        self.word_count
    }

    pub fn ty(&self) -> Option<SpvId> {
        self.ty
    }

    pub fn id(&self) -> Option<SpvId> {
        self.id
    }

    pub fn has_type(&self) -> bool {
        self.ty.is_some()
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.id {
            write!(f, "%{id} = ")?;
        }
        write!(f, "{}", self.op_code)?;
        if let Some(ty) = self.ty {
            write!(f, " %{ty}")?;
        }
        Ok(())
    }
}

/// What the module's id table records for each registered id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueInfo {
    pub op_code: OpCode,
    pub ty: Option<SpvId>,
    /// Owning function, for parameters, labels and instruction results
    pub function: Option<SpvId>,
    /// Owning block, for instruction results
    pub block: Option<SpvId>,
}

impl ValueInfo {
    pub fn global(op_code: OpCode, ty: Option<SpvId>) -> Self {
        Self { op_code, ty, function: None, block: None }
    }

    pub fn is_label(&self) -> bool {
        self.op_code == OpCode::Label
    }

    pub fn is_function(&self) -> bool {
        self.op_code == OpCode::Function
    }

    /// Result of a block-level instruction, as opposed to a module-level entry
    pub fn is_instruction_result(&self) -> bool {
        let op = self.op_code;
        !(op.is_type()
            || op.is_constant()
            || matches!(op, OpCode::Function | OpCode::FunctionParameter | OpCode::Label))
    }
}
