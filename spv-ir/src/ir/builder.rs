//! IR Builder
//!
//! Provides utilities for constructing modules programmatically. The
//! builder computes word counts, allocates result ids and appends every
//! instruction to the current block.

use log::{debug, info};
use spv_common::{SpvError, SpvId, StorageClass};
use crate::ir::kinds::{
    Binary, Branch, BranchConditional, Load, Return, ReturnValue, Store, Undef, Unreachable, Variable,
};
use crate::ir::{BinaryOp, Instruction, InstructionKind, Module, SpvType};

/// Builder for constructing IR
pub struct ModuleBuilder {
    module: Module,
    current_function: Option<SpvId>,
    current_block: Option<SpvId>,
}

impl ModuleBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: Module::new(name.into()),
            current_function: None,
            current_block: None,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut Module {
        &mut self.module
    }

    /// Define a function and make it current
    pub fn create_function(&mut self, return_type: SpvId, parameter_types: Vec<SpvId>) -> Result<SpvId, SpvError> {
        let function_type = self.module.type_function(return_type, parameter_types)?;
        let function = self.module.add_function(function_type)?;
        info!("Creating function %{function} with signature %{function_type}");
        self.current_function = Some(function);
        self.current_block = None;
        Ok(function)
    }

    pub fn current_function(&self) -> Option<SpvId> {
        self.current_function
    }

    pub fn current_block(&self) -> Option<SpvId> {
        self.current_block
    }

    /// Id of the current function's parameter at `index`
    pub fn parameter(&self, index: usize) -> Option<SpvId> {
        let function = self.module.get_function(self.current_function?)?;
        function.parameters().get(index).map(|param| param.id)
    }

    /// Append a block to the current function and make it current
    pub fn create_block(&mut self) -> Result<SpvId, SpvError> {
        let function = self
            .current_function
            .ok_or_else(|| SpvError::from("No current function".to_string()))?;
        let label = self.module.add_block(function)?;
        debug!("Created block %{label} in function %{function}");
        self.current_block = Some(label);
        Ok(label)
    }

    /// Continue emitting into an existing block
    pub fn position_at(&mut self, label: SpvId) -> Result<(), SpvError> {
        let function = self
            .module
            .value_info(label)
            .filter(|info| info.is_label())
            .and_then(|info| info.function)
            .ok_or(SpvError::UnknownId(label))?;
        self.current_function = Some(function);
        self.current_block = Some(label);
        Ok(())
    }

    pub fn current_block_has_terminator(&self) -> bool {
        self.current_block
            .and_then(|label| self.module.get_block(label))
            .is_some_and(|block| block.has_terminator())
    }

    pub fn build_undef(&mut self, ty: SpvId) -> Result<SpvId, SpvError> {
        self.emit_typed(Undef.into(), ty)
    }

    /// Function-local variable; the storage class comes from `pointer_type`
    pub fn build_variable(&mut self, pointer_type: SpvId, initializer: Option<SpvId>) -> Result<SpvId, SpvError> {
        let storage_class = match self.module.get_type(pointer_type) {
            Some(SpvType::Pointer { storage_class, .. }) => *storage_class,
            _ => StorageClass::Function,
        };
        self.emit_typed(Variable { storage_class, initializer }.into(), pointer_type)
    }

    pub fn build_load(&mut self, ty: SpvId, pointer: SpvId) -> Result<SpvId, SpvError> {
        self.emit_typed(Load { pointer }.into(), ty)
    }

    pub fn build_store(&mut self, pointer: SpvId, object: SpvId) -> Result<(), SpvError> {
        self.emit_anonymous(Store { pointer, object }.into())
    }

    pub fn build_binary(&mut self, op: BinaryOp, ty: SpvId, lhs: SpvId, rhs: SpvId) -> Result<SpvId, SpvError> {
        self.emit_typed(Binary { op, lhs, rhs }.into(), ty)
    }

    /// Call `callee`; the result type is the callee's return type
    pub fn build_call(&mut self, callee: SpvId, arguments: Vec<SpvId>) -> Result<SpvId, SpvError> {
        let block = self.block()?;
        let id = self.module.allocate_id();
        let instr = Instruction::function_call(&mut self.module, id, callee, arguments, block)?;
        self.module.append_instruction(block, instr)?;
        Ok(id)
    }

    pub fn build_branch(&mut self, target: SpvId) -> Result<(), SpvError> {
        self.emit_anonymous(Branch { target }.into())
    }

    pub fn build_branch_cond(&mut self, condition: SpvId, true_label: SpvId, false_label: SpvId) -> Result<(), SpvError> {
        self.emit_anonymous(BranchConditional { condition, true_label, false_label }.into())
    }

    pub fn build_return(&mut self) -> Result<(), SpvError> {
        self.emit_anonymous(Return.into())
    }

    pub fn build_return_value(&mut self, value: SpvId) -> Result<(), SpvError> {
        self.emit_anonymous(ReturnValue { value }.into())
    }

    pub fn build_unreachable(&mut self) -> Result<(), SpvError> {
        self.emit_anonymous(Unreachable.into())
    }

    pub fn finish(self) -> Module {
        self.module
    }

    fn block(&self) -> Result<SpvId, SpvError> {
        self.current_block
            .ok_or_else(|| SpvError::from("No current block".to_string()))
    }

    fn emit_typed(&mut self, kind: InstructionKind, ty: SpvId) -> Result<SpvId, SpvError> {
        let block = self.block()?;
        let id = self.module.allocate_id();
        let word_count = kind.word_count(true, true);
        let instr = Instruction::new(&mut self.module, word_count, kind, ty, id, block)?;
        self.module.append_instruction(block, instr)?;
        Ok(id)
    }

    fn emit_anonymous(&mut self, kind: InstructionKind) -> Result<(), SpvError> {
        let block = self.block()?;
        let word_count = kind.word_count(false, false);
        let instr = Instruction::anonymous(&mut self.module, word_count, kind, block)?;
        self.module.append_instruction(block, instr)
    }
}
