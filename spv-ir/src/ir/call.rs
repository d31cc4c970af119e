//! Function Calls
//!
//! A call stores its callee by id and resolves it through the module on
//! demand, so the call stays valid when function objects move around in
//! the module's function table. The result type is captured once, when
//! the call is constructed (see `Instruction::function_call`).

use serde::{Deserialize, Serialize};
use spv_common::{SpvError, SpvId};
use std::fmt;
use crate::ir::instructions::InstructionOps;
use crate::ir::validate::{validate_call_generic, ValidationContext};
use crate::ir::{Function, Module, OpCode};

/// `OpFunctionCall` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCall {
    function_id: SpvId,
    arguments: Vec<SpvId>,
}

impl FunctionCall {
    pub fn new(function_id: SpvId, arguments: Vec<SpvId>) -> Self {
        Self { function_id, arguments }
    }

    pub fn function_id(&self) -> SpvId {
        self.function_id
    }

    pub fn arguments(&self) -> &[SpvId] {
        &self.arguments
    }

    /// Resolve the callee in `module`
    pub fn function<'m>(&self, module: &'m Module) -> Option<&'m Function> {
        module.get_function(self.function_id)
    }
}

impl InstructionOps for FunctionCall {
    fn op_code(&self) -> OpCode {
        OpCode::FunctionCall
    }

    /// Arguments only; the callee is kept out of the operand list
    fn operands(&self) -> Vec<SpvId> {
        self.arguments.clone()
    }

    fn operand_words(&self) -> u32 {
        1 + self.arguments.len() as u32
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError> {
        ctx.expect_result_shape()?;
        ctx.expect_word_count(self.operand_words())?;

        let function = self
            .function(ctx.module())
            .ok_or_else(|| ctx.fail(format!("callee %{} is not a function", self.function_id)))?;
        let signature = ctx.type_of(function.function_type())?;
        validate_call_generic(ctx, self.function_id, signature, &self.arguments)
    }

    fn fmt_operands(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " %{}", self.function_id)?;
        for argument in &self.arguments {
            write!(f, " %{argument}")?;
        }
        Ok(())
    }
}
