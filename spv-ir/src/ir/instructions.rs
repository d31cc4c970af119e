//! IR Instructions
//!
//! An instruction is a value header bound to exactly one basic block plus
//! an opcode-specific payload. Every constructor validates the instruction
//! and registers its result id with the module before handing it out.

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use spv_common::{SpvError, SpvId, SpvWord};
use std::fmt;
use crate::ir::kinds::{
    Binary, Branch, BranchConditional, Load, Return, ReturnValue, Store, Undef, Unreachable, Variable,
};
use crate::ir::validate::ValidationContext;
use crate::ir::{FunctionCall, Module, OpCode, Value, ValueInfo};

/// Capabilities every concrete instruction kind provides
pub trait InstructionOps {
    fn op_code(&self) -> OpCode;

    /// Operand ids in wire order
    fn operands(&self) -> Vec<SpvId>;

    /// Words following the result id: operand ids and literals
    fn operand_words(&self) -> u32 {
        self.operands().len() as u32
    }

    /// Opcode-specific well-formedness checks
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<(), SpvError>;

    /// Write everything after the result type in assembly form
    fn fmt_operands(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for operand in self.operands() {
            write!(f, " %{operand}")?;
        }
        Ok(())
    }
}

/// Opcode-specific payload of an instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    Undef(Undef),
    Variable(Variable),
    Load(Load),
    Store(Store),
    Binary(Binary),
    FunctionCall(FunctionCall),
    Branch(Branch),
    BranchConditional(BranchConditional),
    Return(Return),
    ReturnValue(ReturnValue),
    Unreachable(Unreachable),
}

impl InstructionKind {
    pub fn ops(&self) -> &dyn InstructionOps {
        match self {
            InstructionKind::Undef(i) => i,
            InstructionKind::Variable(i) => i,
            InstructionKind::Load(i) => i,
            InstructionKind::Store(i) => i,
            InstructionKind::Binary(i) => i,
            InstructionKind::FunctionCall(i) => i,
            InstructionKind::Branch(i) => i,
            InstructionKind::BranchConditional(i) => i,
            InstructionKind::Return(i) => i,
            InstructionKind::ReturnValue(i) => i,
            InstructionKind::Unreachable(i) => i,
        }
    }

    pub fn op_code(&self) -> OpCode {
        self.ops().op_code()
    }

    /// Encoded size for the given result shape
    pub fn word_count(&self, has_type: bool, has_id: bool) -> SpvWord {
        1 + has_type as u32 + has_id as u32 + self.ops().operand_words()
    }
}

macro_rules! impl_from_kind {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for InstructionKind {
                fn from(kind: $variant) -> Self {
                    InstructionKind::$variant(kind)
                }
            }
        )*
    };
}

impl_from_kind!(
    Undef, Variable, Load, Store, Binary, FunctionCall,
    Branch, BranchConditional, Return, ReturnValue, Unreachable,
);

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    value: Value,
    /// Label of the owning block; set at most once
    parent: Option<SpvId>,
    kind: InstructionKind,
}

impl Instruction {
    /// Instruction with result type and result id
    pub fn new(
        module: &mut Module,
        word_count: SpvWord,
        kind: impl Into<InstructionKind>,
        ty: SpvId,
        id: SpvId,
        block: SpvId,
    ) -> Result<Self, SpvError> {
        let kind = kind.into();
        let value = Value::new(word_count, kind.op_code(), ty, id);
        Self::construct(module, value, kind, Some(block))
    }

    /// Instruction with a result id and an implicit void type
    pub fn with_id(
        module: &mut Module,
        word_count: SpvWord,
        kind: impl Into<InstructionKind>,
        id: SpvId,
        block: SpvId,
    ) -> Result<Self, SpvError> {
        let kind = kind.into();
        let value = Value::with_id(word_count, kind.op_code(), id);
        Self::construct(module, value, kind, Some(block))
    }

    /// Instruction without result type or result id
    pub fn anonymous(
        module: &mut Module,
        word_count: SpvWord,
        kind: impl Into<InstructionKind>,
        block: SpvId,
    ) -> Result<Self, SpvError> {
        let kind = kind.into();
        let value = Value::anonymous(word_count, kind.op_code());
        Self::construct(module, value, kind, Some(block))
    }

    /// Instruction with a result type but no result id
    pub fn with_type(
        module: &mut Module,
        word_count: SpvWord,
        kind: impl Into<InstructionKind>,
        ty: SpvId,
        block: SpvId,
    ) -> Result<Self, SpvError> {
        let kind = kind.into();
        let value = Value::with_type(word_count, kind.op_code(), ty);
        Self::construct(module, value, kind, Some(block))
    }

    /// Instruction whose block is not known yet; bind it later with
    /// `set_parent`, `set_scope` or `Module::append_instruction`
    pub fn detached(
        module: &mut Module,
        word_count: SpvWord,
        kind: impl Into<InstructionKind>,
        ty: Option<SpvId>,
        id: Option<SpvId>,
    ) -> Result<Self, SpvError> {
        let kind = kind.into();
        let value = Value::from_parts(word_count, kind.op_code(), ty, id);
        Self::construct(module, value, kind, None)
    }

    /// Call to a function known at construction time. The result type is
    /// fixed to the callee's declared return type.
    pub fn function_call(
        module: &mut Module,
        id: SpvId,
        callee: SpvId,
        arguments: Vec<SpvId>,
        block: SpvId,
    ) -> Result<Self, SpvError> {
        let return_type = module
            .get_function(callee)
            .and_then(|function| module.get_type(function.function_type()))
            .and_then(|signature| signature.return_type())
            .ok_or_else(|| {
                SpvError::invalid_module(OpCode::FunctionCall, Some(id), format!("callee %{callee} is not a function"))
                    .in_block(block)
            })?;

        let kind = InstructionKind::from(FunctionCall::new(callee, arguments));
        let word_count = kind.word_count(true, true);
        Self::new(module, word_count, kind, return_type, id, block)
    }

    fn construct(
        module: &mut Module,
        value: Value,
        kind: InstructionKind,
        parent: Option<SpvId>,
    ) -> Result<Self, SpvError> {
        if let Some(block) = parent {
            assert!(module.is_label(block), "Invalid BB: %{block} is not a label");
        }

        let instruction = Self { value, parent, kind };
        instruction.validate(module)?;

        if let Some(id) = instruction.value.id() {
            let function = parent
                .and_then(|block| module.value_info(block))
                .and_then(|info| info.function);
            module.register_value(id, ValueInfo {
                op_code: instruction.value.op_code(),
                ty: instruction.value.ty(),
                function,
                block: parent,
            })?;
        }

        debug!("Constructed `{instruction}` in block {parent:?}");
        Ok(instruction)
    }

    /// Run the opcode-specific checks against `module`
    pub fn validate(&self, module: &Module) -> Result<(), SpvError> {
        let ctx = ValidationContext::new(module, &self.value, self.parent);
        self.kind.ops().validate(&ctx)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn op_code(&self) -> OpCode {
        self.value.op_code()
    }

    pub fn word_count(&self) -> SpvWord {
        self.value.word_count()
    }

    pub fn ty(&self) -> Option<SpvId> {
        self.value.ty()
    }

    pub fn id(&self) -> Option<SpvId> {
        self.value.id()
    }

    pub fn parent(&self) -> Option<SpvId> {
        self.parent
    }

    pub fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    pub fn as_function_call(&self) -> Option<&FunctionCall> {
        match &self.kind {
            InstructionKind::FunctionCall(call) => Some(call),
            _ => None,
        }
    }

    pub fn is_terminator(&self) -> bool {
        self.op_code().is_terminator()
    }

    /// Bind this instruction to its block. Rebinding to the same block is a
    /// no-op; moving an instruction to a different block is a bug.
    pub fn set_parent(&mut self, block: SpvId) {
        assert!(block != 0, "Invalid BB");
        if self.parent == Some(block) {
            return;
        }
        assert!(
            self.parent.is_none(),
            "BB cannot change parent: {} is bound to {:?}, not %{block}",
            self.op_code(),
            self.parent
        );
        debug!("Binding {} {:?} to block %{block}", self.op_code(), self.id());
        self.parent = Some(block);
    }

    /// Bind to the block whose label is `scope`
    pub fn set_scope(&mut self, module: &Module, scope: SpvId) {
        assert!(module.is_label(scope), "Invalid scope: %{scope} is not a label");
        self.set_parent(scope);
    }

    /// Operand ids in wire order. The callee of a function call is not an
    /// operand; see `FunctionCall::function_id`.
    pub fn operands(&self) -> Vec<SpvId> {
        self.kind.ops().operands()
    }

    /// Types of `operands()`, position by position
    pub fn operand_types(&self, module: &Module) -> Result<Vec<Option<SpvId>>, SpvError> {
        let types = self
            .operands()
            .into_iter()
            .map(|operand| resolve_operand_type(module, operand))
            .collect::<Result<Vec<_>, _>>()?;
        trace!("operand_types({}) = {:?}", self.op_code(), types);
        Ok(types)
    }
}

/// Type an operand contributes: a function's declared signature, or the
/// operand's own result type for everything else
pub fn resolve_operand_type(module: &Module, operand: SpvId) -> Result<Option<SpvId>, SpvError> {
    let info = module.value_info(operand).ok_or(SpvError::UnknownId(operand))?;
    if info.is_function() {
        let function = module.get_function(operand).ok_or(SpvError::UnknownId(operand))?;
        return Ok(Some(function.function_type()));
    }
    Ok(info.ty)
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        self.kind.ops().fmt_operands(f)
    }
}
