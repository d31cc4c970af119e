//! Concrete instruction kinds
//!
//! Each kind knows its opcode, enumerates its operands in wire order and
//! checks its own shape. Function calls live in `call.rs`.

use serde::{Deserialize, Serialize};
use spv_common::{SpvError, SpvId, StorageClass};
use std::fmt;
use crate::ir::instructions::InstructionOps;
use crate::ir::validate::ValidationContext;
use crate::ir::{BinaryOp, OpCode, SpvType};

/// `OpUndef`: an undefined value of the result type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Undef;

impl InstructionOps for Undef {
    fn op_code(&self) -> OpCode {
        OpCode::Undef
    }

    fn operands(&self) -> Vec<SpvId> {
        Vec::new()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;
        ctx.result_type_id()?;
        Ok(())
    }
}

/// `OpVariable`: allocate storage, optionally initialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub storage_class: StorageClass,
    pub initializer: Option<SpvId>,
}

impl InstructionOps for Variable {
    fn op_code(&self) -> OpCode {
        OpCode::Variable
    }

    fn operands(&self) -> Vec<SpvId> {
        self.initializer.into_iter().collect()
    }

    fn operand_words(&self) -> u32 {
        // Storage class literal
        1 + self.initializer.is_some() as u32
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let (ty, result_type) = ctx.result_type()?;
        let SpvType::Pointer { storage_class, pointee } = result_type else {
            return Err(ctx.fail(format!("result type %{ty} is not a pointer")));
        };
        if *storage_class != self.storage_class {
            return Err(ctx.fail(format!(
                "storage class {} does not match pointer storage class {storage_class}",
                self.storage_class
            )));
        }
        if ctx.enclosing_function().is_some() && self.storage_class != StorageClass::Function {
            return Err(ctx.fail(format!(
                "variables inside a function must use the Function storage class, not {}",
                self.storage_class
            )));
        }
        if let Some(initializer) = self.initializer {
            ctx.expect_operand_type(initializer, *pointee)?;
        }
        Ok(())
    }

    fn fmt_operands(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " {}", self.storage_class)?;
        if let Some(initializer) = self.initializer {
            write!(f, " %{initializer}")?;
        }
        Ok(())
    }
}

/// `OpLoad`: read through a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Load {
    pub pointer: SpvId,
}

impl InstructionOps for Load {
    fn op_code(&self) -> OpCode {
        OpCode::Load
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.pointer]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let ty = ctx.result_type_id()?;
        let pointee = pointee_of(ctx, self.pointer)?;
        if pointee != ty {
            return Err(ctx.fail(format!(
                "result type %{ty} does not match pointee type %{pointee} of %{}",
                self.pointer
            )));
        }
        Ok(())
    }
}

/// `OpStore`: write through a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub pointer: SpvId,
    pub object: SpvId,
}

impl InstructionOps for Store {
    fn op_code(&self) -> OpCode {
        OpCode::Store
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.pointer, self.object]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let pointee = pointee_of(ctx, self.pointer)?;
        ctx.expect_operand_type(self.object, pointee)
    }
}

/// Integer arithmetic and comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: SpvId,
    pub rhs: SpvId,
}

impl InstructionOps for Binary {
    fn op_code(&self) -> OpCode {
        self.op.op_code()
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.lhs, self.rhs]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let (ty, result_type) = ctx.result_type()?;
        let lhs = ctx.typed_operand(self.lhs)?;
        let rhs = ctx.typed_operand(self.rhs)?;
        if lhs != rhs {
            return Err(ctx.fail(format!("operand types %{lhs} and %{rhs} differ")));
        }

        if self.op.is_comparison() {
            if !result_type.is_bool() {
                return Err(ctx.fail(format!("comparison result type %{ty} is not bool")));
            }
            if !ctx.type_of(lhs)?.is_integer() {
                return Err(ctx.fail(format!("operand type %{lhs} is not an integer")));
            }
        } else {
            if !result_type.is_integer() {
                return Err(ctx.fail(format!("result type %{ty} is not an integer")));
            }
            if lhs != ty {
                return Err(ctx.fail(format!("operand type %{lhs} does not match result type %{ty}")));
            }
        }
        Ok(())
    }
}

/// `OpBranch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub target: SpvId,
}

impl InstructionOps for Branch {
    fn op_code(&self) -> OpCode {
        OpCode::Branch
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.target]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;
        ctx.expect_label(self.target)
    }
}

/// `OpBranchConditional`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchConditional {
    pub condition: SpvId,
    pub true_label: SpvId,
    pub false_label: SpvId,
}

impl InstructionOps for BranchConditional {
    fn op_code(&self) -> OpCode {
        OpCode::BranchConditional
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.condition, self.true_label, self.false_label]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let condition = ctx.typed_operand(self.condition)?;
        if !ctx.type_of(condition)?.is_bool() {
            return Err(ctx.fail(format!("condition %{} is not a bool", self.condition)));
        }
        ctx.expect_label(self.true_label)?;
        ctx.expect_label(self.false_label)
    }
}

/// `OpReturn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Return;

impl InstructionOps for Return {
    fn op_code(&self) -> OpCode {
        OpCode::Return
    }

    fn operands(&self) -> Vec<SpvId> {
        Vec::new()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        if let Some(function) = ctx.enclosing_function() {
            let return_type = function.return_type();
            if !ctx.type_of(return_type)?.is_void() {
                return Err(ctx.fail(format!("function returning %{return_type} must return a value")));
            }
        }
        Ok(())
    }
}

/// `OpReturnValue`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnValue {
    pub value: SpvId,
}

impl InstructionOps for ReturnValue {
    fn op_code(&self) -> OpCode {
        OpCode::ReturnValue
    }

    fn operands(&self) -> Vec<SpvId> {
        vec![self.value]
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let ty = ctx.typed_operand(self.value)?;
        if let Some(function) = ctx.enclosing_function() {
            let return_type = function.return_type();
            if ty != return_type {
                return Err(ctx.fail(format!(
                    "returned value %{} has type %{ty}, function returns %{return_type}",
                    self.value
                )));
            }
        }
        Ok(())
    }
}

/// `OpUnreachable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Unreachable;

impl InstructionOps for Unreachable {
    fn op_code(&self) -> OpCode {
        OpCode::Unreachable
    }

    fn operands(&self) -> Vec<SpvId> {
        Vec::new()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())
    }
}

/// Pointee type of a pointer-typed operand
fn pointee_of(ctx: &ValidationContext<'_>, pointer: SpvId) -> Result<SpvId, SpvError> {
    let ty = ctx.typed_operand(pointer)?;
    ctx.type_of(ty)?
        .pointee()
        .ok_or_else(|| ctx.fail(format!("operand %{pointer} is not a pointer")))
}
