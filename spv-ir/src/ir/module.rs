//! Module and Identifier Table
//!
//! Defines the top-level module: it allocates result ids, records every
//! registered id in its id table, and owns all types, constants and
//! functions.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use spv_common::{ErrorReporter, IdAllocator, SpvError, SpvId, SpvWord, StorageClass, ValidationConfig};
use std::collections::HashMap;
use std::fmt;
use crate::ir::{BasicBlock, Function, FunctionParameter, Instruction, OpCode, SpvType, Value, ValueInfo};

/// Constant payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstantValue {
    Bool(bool),
    /// Literal words, low-order word first
    Literal(Vec<SpvWord>),
}

/// Module-level constant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constant {
    pub id: SpvId,
    pub ty: SpvId,
    pub value: ConstantValue,
}

impl Constant {
    pub fn op_code(&self) -> OpCode {
        match self.value {
            ConstantValue::Bool(true) => OpCode::ConstantTrue,
            ConstantValue::Bool(false) => OpCode::ConstantFalse,
            ConstantValue::Literal(_) => OpCode::Constant,
        }
    }

    pub fn word_count(&self) -> u32 {
        match &self.value {
            ConstantValue::Bool(_) => 3,
            ConstantValue::Literal(words) => 3 + words.len() as u32,
        }
    }

    pub fn value(&self) -> Value {
        Value::new(self.word_count(), self.op_code(), self.ty, self.id)
    }
}

/// IR Module - a complete set of types, constants and functions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    name: String,
    ids: IdAllocator,
    id_table: HashMap<SpvId, ValueInfo>,
    types: Vec<(SpvId, SpvType)>,
    constants: Vec<Constant>,
    functions: Vec<Function>,
}

impl Module {
    pub fn new(name: String) -> Self {
        Self {
            name,
            ids: IdAllocator::new(),
            id_table: HashMap::new(),
            types: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One past the largest id in use
    pub fn id_bound(&self) -> SpvId {
        self.ids.bound()
    }

    pub fn allocate_id(&mut self) -> SpvId {
        self.ids.allocate()
    }

    /// Record `id` in the id table; ids are unique within a module
    pub(crate) fn register_value(&mut self, id: SpvId, info: ValueInfo) -> Result<(), SpvError> {
        if id == 0 {
            return Err(SpvError::invalid_module(info.op_code, None, "result id 0 is reserved"));
        }
        if id == SpvId::MAX {
            return Err(SpvError::invalid_module(info.op_code, Some(id), "result id leaves no representable id bound"));
        }
        if self.id_table.contains_key(&id) {
            return Err(SpvError::DuplicateId(id));
        }
        debug!("Registering %{id} as {} (type {:?})", info.op_code, info.ty);
        self.ids.reserve(id);
        self.id_table.insert(id, info);
        Ok(())
    }

    pub fn value_info(&self, id: SpvId) -> Option<&ValueInfo> {
        self.id_table.get(&id)
    }

    pub fn is_registered(&self, id: SpvId) -> bool {
        self.id_table.contains_key(&id)
    }

    /// Whether `id` names a basic block
    pub fn is_label(&self, id: SpvId) -> bool {
        self.value_info(id).is_some_and(ValueInfo::is_label)
    }

    /// Result type recorded for `id`
    pub fn result_type_of(&self, id: SpvId) -> Option<SpvId> {
        self.value_info(id).and_then(|info| info.ty)
    }

    // ---- Types ----

    /// Register `ty`, returning the id of a structurally equal type if one exists
    pub fn add_type(&mut self, ty: SpvType) -> Result<SpvId, SpvError> {
        if let Some((id, _)) = self.types.iter().find(|(_, existing)| *existing == ty) {
            return Ok(*id);
        }
        for referenced in ty.referenced_types() {
            if self.get_type(referenced).is_none() {
                return Err(SpvError::UnknownId(referenced));
            }
        }
        if let SpvType::Int { width: 0, .. } | SpvType::Float { width: 0 } = ty {
            return Err(SpvError::invalid_module(ty.op_code(), None, "width must be positive"));
        }

        let id = self.allocate_id();
        self.register_value(id, ValueInfo::global(ty.op_code(), None))?;
        debug!("Type %{id} = {ty}");
        self.types.push((id, ty));
        Ok(id)
    }

    pub fn type_void(&mut self) -> Result<SpvId, SpvError> {
        self.add_type(SpvType::Void)
    }

    pub fn type_bool(&mut self) -> Result<SpvId, SpvError> {
        self.add_type(SpvType::Bool)
    }

    pub fn type_int(&mut self, width: u32, signed: bool) -> Result<SpvId, SpvError> {
        self.add_type(SpvType::Int { width, signed })
    }

    pub fn type_pointer(&mut self, storage_class: StorageClass, pointee: SpvId) -> Result<SpvId, SpvError> {
        self.add_type(SpvType::Pointer { storage_class, pointee })
    }

    pub fn type_function(&mut self, return_type: SpvId, parameter_types: Vec<SpvId>) -> Result<SpvId, SpvError> {
        self.add_type(SpvType::Function { return_type, parameter_types })
    }

    pub fn get_type(&self, id: SpvId) -> Option<&SpvType> {
        self.types.iter().find(|(ty_id, _)| *ty_id == id).map(|(_, ty)| ty)
    }

    pub fn types(&self) -> &[(SpvId, SpvType)] {
        &self.types
    }

    // ---- Constants ----

    /// Register an integer or float constant of type `ty`
    pub fn add_constant(&mut self, ty: SpvId, value: u64) -> Result<SpvId, SpvError> {
        let words = self
            .get_type(ty)
            .ok_or(SpvError::UnknownId(ty))?
            .literal_words()
            .ok_or_else(|| SpvError::invalid_module(OpCode::Constant, None, format!("%{ty} is not a numeric type")))?;

        let literal = (0..words)
            .map(|i| value.checked_shr(32 * i).unwrap_or(0) as SpvWord)
            .collect();
        let id = self.allocate_id();
        self.register_value(id, ValueInfo::global(OpCode::Constant, Some(ty)))?;
        self.constants.push(Constant { id, ty, value: ConstantValue::Literal(literal) });
        Ok(id)
    }

    pub fn add_bool_constant(&mut self, value: bool) -> Result<SpvId, SpvError> {
        let ty = self.type_bool()?;
        let constant = Constant { id: self.allocate_id(), ty, value: ConstantValue::Bool(value) };
        self.register_value(constant.id, ValueInfo::global(constant.op_code(), Some(ty)))?;
        let id = constant.id;
        self.constants.push(constant);
        Ok(id)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    // ---- Functions and blocks ----

    /// Define a function with signature `function_type`; parameters get fresh ids
    pub fn add_function(&mut self, function_type: SpvId) -> Result<SpvId, SpvError> {
        let (return_type, parameter_types) = match self.get_type(function_type) {
            Some(SpvType::Function { return_type, parameter_types }) => (*return_type, parameter_types.clone()),
            Some(other) => {
                return Err(SpvError::invalid_module(
                    OpCode::Function,
                    None,
                    format!("%{function_type} ({other}) is not a function type"),
                ))
            }
            None => return Err(SpvError::UnknownId(function_type)),
        };

        let id = self.allocate_id();
        self.register_value(id, ValueInfo::global(OpCode::Function, Some(return_type)))?;

        let mut parameters = Vec::with_capacity(parameter_types.len());
        for ty in parameter_types {
            let param = FunctionParameter { id: self.allocate_id(), ty };
            self.register_value(param.id, ValueInfo {
                op_code: OpCode::FunctionParameter,
                ty: Some(ty),
                function: Some(id),
                block: None,
            })?;
            parameters.push(param);
        }

        debug!("Function %{id} with signature %{function_type}");
        self.functions.push(Function::new(id, function_type, return_type, parameters));
        Ok(id)
    }

    pub fn get_function(&self, id: SpvId) -> Option<&Function> {
        self.functions.iter().find(|f| f.id() == id)
    }

    pub fn get_function_mut(&mut self, id: SpvId) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.id() == id)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Replace a function's declared signature. Calls built earlier keep the
    /// result type they captured and must be rebuilt by the caller.
    pub fn set_function_type(&mut self, function: SpvId, function_type: SpvId) -> Result<(), SpvError> {
        let (return_type, parameter_types) = match self.get_type(function_type) {
            Some(SpvType::Function { return_type, parameter_types }) => (*return_type, parameter_types.clone()),
            _ => {
                return Err(SpvError::invalid_module(
                    OpCode::Function,
                    Some(function),
                    format!("%{function_type} is not a function type"),
                ))
            }
        };

        let target = self.get_function_mut(function).ok_or(SpvError::UnknownId(function))?;
        if target.parameters().len() != parameter_types.len() {
            return Err(SpvError::invalid_module(
                OpCode::Function,
                Some(function),
                format!(
                    "signature %{function_type} has {} parameter(s), function has {}",
                    parameter_types.len(),
                    target.parameters().len()
                ),
            ));
        }
        target.set_signature(function_type, return_type, &parameter_types);
        let params: Vec<FunctionParameter> = target.parameters().to_vec();

        if let Some(info) = self.id_table.get_mut(&function) {
            info.ty = Some(return_type);
        }
        for param in params {
            if let Some(info) = self.id_table.get_mut(&param.id) {
                info.ty = Some(param.ty);
            }
        }
        debug!("Function %{function} now has signature %{function_type}");
        Ok(())
    }

    /// Append a new, empty block to `function` and return its label
    pub fn add_block(&mut self, function: SpvId) -> Result<SpvId, SpvError> {
        if self.get_function(function).is_none() {
            return Err(SpvError::UnknownId(function));
        }
        let label = self.allocate_id();
        self.register_value(label, ValueInfo {
            op_code: OpCode::Label,
            ty: None,
            function: Some(function),
            block: None,
        })?;
        if let Some(f) = self.get_function_mut(function) {
            f.add_block(BasicBlock::new(label));
        }
        Ok(label)
    }

    pub fn get_block(&self, label: SpvId) -> Option<&BasicBlock> {
        let function = self.value_info(label).filter(|i| i.is_label())?.function?;
        self.get_function(function)?.get_block(label)
    }

    pub fn get_block_mut(&mut self, label: SpvId) -> Option<&mut BasicBlock> {
        let function = self.value_info(label).filter(|i| i.is_label())?.function?;
        self.get_function_mut(function)?.get_block_mut(label)
    }

    /// Append `instr` to the block labelled `label`, binding its parent
    pub fn append_instruction(&mut self, label: SpvId, instr: Instruction) -> Result<(), SpvError> {
        assert!(self.is_label(label), "Invalid BB: %{label} is not a label");
        let function = self.value_info(label).and_then(|info| info.function);

        if let Some(info) = instr.id().and_then(|id| self.id_table.get_mut(&id)) {
            info.block = Some(label);
            info.function = function;
        }

        let block = self.get_block_mut(label).ok_or(SpvError::UnknownId(label))?;
        block.add_instruction(instr);
        Ok(())
    }

    // ---- Validation ----

    /// Validate every instruction, block and instruction result. With
    /// `ValidationPolicy::FailFast` the reporter holds at most one error.
    pub fn validate(&self, config: &ValidationConfig) -> ErrorReporter {
        let mut reporter = ErrorReporter::new();

        if !self.validate_blocks(config, &mut reporter) {
            self.validate_results(config, &mut reporter);
        }

        if reporter.has_errors() {
            warn!("Module '{}' failed validation: {}", self.name, reporter.summary());
        }
        reporter
    }

    /// Per-block checks; returns true once the policy says to stop
    fn validate_blocks(&self, config: &ValidationConfig, reporter: &mut ErrorReporter) -> bool {
        for function in &self.functions {
            if function.blocks().is_empty() {
                reporter.warning(SpvError::invalid_module(
                    OpCode::Function,
                    Some(function.id()),
                    "function has no blocks",
                ));
            }

            for block in function.blocks() {
                let label = block.label();
                let count = block.instructions().len();

                for (index, instr) in block.instructions().iter().enumerate() {
                    let result = if instr.parent() != Some(label) {
                        Err(SpvError::invalid_module(
                            instr.op_code(),
                            instr.id(),
                            format!("held by block %{label} but bound to {:?}", instr.parent()),
                        )
                        .in_block(label)
                        .in_function(function.id()))
                    } else {
                        instr.validate(self)
                    };
                    if let Err(error) = result {
                        if report(reporter, config, error) {
                            return true;
                        }
                    }

                    if instr.is_terminator() && index + 1 != count {
                        let error = SpvError::invalid_module(
                            instr.op_code(),
                            instr.id(),
                            "terminator before the end of the block",
                        )
                        .in_block(label)
                        .in_function(function.id());
                        if report(reporter, config, error) {
                            return true;
                        }
                    }
                }

                if !block.has_terminator() {
                    let error =
                        SpvError::invalid_module(OpCode::Label, Some(label), "block does not end with a terminator")
                            .in_function(function.id());
                    if report(reporter, config, error) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Every instruction result in the id table must be held by the block it
    /// was registered for
    fn validate_results(&self, config: &ValidationConfig, reporter: &mut ErrorReporter) {
        let held: HashMap<SpvId, SpvId> = self
            .functions
            .iter()
            .flat_map(|function| function.blocks())
            .flat_map(|block| {
                block
                    .instructions()
                    .iter()
                    .filter_map(move |instr| instr.id().map(|id| (id, block.label())))
            })
            .collect();

        let mut results: Vec<(&SpvId, &ValueInfo)> = self
            .id_table
            .iter()
            .filter(|(_, info)| info.is_instruction_result())
            .collect();
        results.sort_by_key(|(id, _)| **id);

        for (id, info) in results {
            if info.block.is_some() && held.get(id) == info.block.as_ref() {
                continue;
            }
            let mut error = SpvError::invalid_module(
                info.op_code,
                Some(*id),
                format!("result %{id} is registered for block {:?} but no block holds it", info.block),
            );
            if let Some(label) = info.block {
                error = error.in_block(label);
            }
            if let Some(function) = info.function {
                error = error.in_function(function);
            }
            if report(reporter, config, error) {
                return;
            }
        }
    }

    /// Debug snapshot of the whole object model as JSON
    pub fn to_json(&self) -> Result<String, SpvError> {
        serde_json::to_string_pretty(self).map_err(|e| SpvError::InternalError {
            message: format!("failed to serialize module '{}': {e}", self.name),
        })
    }

    /// Validate and return the first error, if any
    pub fn check(&self) -> Result<(), SpvError> {
        match self.validate(&ValidationConfig::fail_fast()).into_first_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Record `error`; true once `config` says validation should stop
fn report(reporter: &mut ErrorReporter, config: &ValidationConfig, error: SpvError) -> bool {
    reporter.error(error);
    config.should_stop(reporter.error_count())
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "; module {} (bound {})", self.name, self.id_bound())?;
        for (id, ty) in &self.types {
            write!(f, "\n%{id} = {} ; {ty}", ty.op_code())?;
        }
        for constant in &self.constants {
            write!(f, "\n{}", constant.value())?;
            if let ConstantValue::Literal(words) = &constant.value {
                for word in words {
                    write!(f, " {word}")?;
                }
            }
        }
        for function in &self.functions {
            write!(f, "\n{function}")?;
        }
        Ok(())
    }
}
