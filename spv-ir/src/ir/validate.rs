//! Instruction Validation
//!
//! Per-opcode `validate` implementations receive a `ValidationContext`
//! that bundles the instruction header, its owning block and the module,
//! and offers the shared checks they are built from.

use spv_common::{SpvError, SpvId};
use crate::ir::instructions::resolve_operand_type;
use crate::ir::{Function, Module, SpvType, Value};

/// Everything an opcode-specific check can look at
pub struct ValidationContext<'a> {
    module: &'a Module,
    value: &'a Value,
    parent: Option<SpvId>,
}

impl<'a> ValidationContext<'a> {
    pub fn new(module: &'a Module, value: &'a Value, parent: Option<SpvId>) -> Self {
        Self { module, value, parent }
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    /// Build an `InvalidModule` error located at this instruction
    pub fn fail(&self, message: impl Into<String>) -> SpvError {
        let mut error = SpvError::invalid_module(self.value.op_code(), self.value.id(), message);
        if let Some(label) = self.parent {
            error = error.in_block(label);
        }
        if let Some(function) = self.enclosing_function_id() {
            error = error.in_function(function);
        }
        error
    }

    pub fn enclosing_function_id(&self) -> Option<SpvId> {
        self.parent
            .and_then(|label| self.module.value_info(label))
            .and_then(|info| info.function)
    }

    /// Function owning the parent block; unknown while the instruction is detached
    pub fn enclosing_function(&self) -> Option<&'a Function> {
        self.enclosing_function_id()
            .and_then(|id| self.module.get_function(id))
    }

    /// Result type and result id must be present exactly when the opcode encodes them
    pub fn expect_result_shape(&self) -> Result<(), SpvError> {
        let op = self.value.op_code();
        match (op.has_result_type(), self.value.has_type()) {
            (true, false) => return Err(self.fail("missing result type")),
            (false, true) => return Err(self.fail("unexpected result type")),
            _ => {}
        }
        match (op.has_result_id(), self.value.has_id()) {
            (true, false) => Err(self.fail("missing result id")),
            (false, true) => Err(self.fail("unexpected result id")),
            _ => Ok(()),
        }
    }

    /// Word count must equal the encoded size: header word, result words, operand words
    pub fn expect_word_count(&self, operand_words: u32) -> Result<(), SpvError> {
        let actual = self.value.word_count();
        let minimum = self.value.op_code().min_word_count();
        if actual < minimum {
            return Err(self.fail(format!("word count {actual} is below the minimum of {minimum}")));
        }

        let expected = 1 + self.value.has_type() as u32 + self.value.has_id() as u32 + operand_words;
        if actual != expected {
            return Err(self.fail(format!("word count {actual} does not match encoded size {expected}")));
        }
        Ok(())
    }

    /// Look up a registered type
    pub fn type_of(&self, ty: SpvId) -> Result<&'a SpvType, SpvError> {
        self.module
            .get_type(ty)
            .ok_or_else(|| self.fail(format!("%{ty} is not a registered type")))
    }

    /// Result type id, which must name a registered type
    pub fn result_type_id(&self) -> Result<SpvId, SpvError> {
        self.result_type().map(|(ty, _)| ty)
    }

    /// Result type id together with its definition
    pub fn result_type(&self) -> Result<(SpvId, &'a SpvType), SpvError> {
        let ty = self.value.ty().ok_or_else(|| self.fail("missing result type"))?;
        Ok((ty, self.type_of(ty)?))
    }

    /// Type an operand contributes, with undefined operands reported here
    pub fn operand_type(&self, operand: SpvId) -> Result<Option<SpvId>, SpvError> {
        resolve_operand_type(self.module, operand)
            .map_err(|_| self.fail(format!("operand %{operand} is not defined")))
    }

    /// Operand type id, which must be present
    pub fn typed_operand(&self, operand: SpvId) -> Result<SpvId, SpvError> {
        self.operand_type(operand)?
            .ok_or_else(|| self.fail(format!("operand %{operand} has no type")))
    }

    pub fn expect_operand_type(&self, operand: SpvId, expected: SpvId) -> Result<(), SpvError> {
        let actual = self.typed_operand(operand)?;
        if actual != expected {
            return Err(self.fail(format!("operand %{operand} has type %{actual}, expected %{expected}")));
        }
        Ok(())
    }

    pub fn expect_label(&self, operand: SpvId) -> Result<(), SpvError> {
        if !self.module.is_label(operand) {
            return Err(self.fail(format!("%{operand} is not a label")));
        }
        Ok(())
    }
}

/// Checks shared by every call-like instruction: the result type is the
/// callee's return type, and arguments match the declared parameters in
/// count and type.
pub fn validate_call_generic(
    ctx: &ValidationContext<'_>,
    callee: SpvId,
    signature: &SpvType,
    arguments: &[SpvId],
) -> Result<(), SpvError> {
    let SpvType::Function { return_type, parameter_types } = signature else {
        return Err(ctx.fail(format!("callee %{callee} does not have a function type")));
    };

    let result_type = ctx.result_type_id()?;
    if result_type != *return_type {
        return Err(ctx.fail(format!(
            "result type %{result_type} does not match return type %{return_type} of %{callee}"
        )));
    }

    if arguments.len() != parameter_types.len() {
        return Err(ctx.fail(format!(
            "%{callee} expects {} argument(s), got {}",
            parameter_types.len(),
            arguments.len()
        )));
    }

    for (index, (argument, parameter)) in arguments.iter().zip(parameter_types).enumerate() {
        let actual = ctx.typed_operand(*argument)?;
        if actual != *parameter {
            return Err(ctx.fail(format!(
                "argument {index} (%{argument}) has type %{actual}, expected %{parameter}"
            )));
        }
    }
    Ok(())
}
