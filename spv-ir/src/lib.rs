//! SPIR-V Object Model - Intermediate Representation
//! 
//! This crate defines the in-memory object model consumed by encoders,
//! decoders, printers and translators: instructions with opcodes, word
//! counts, optional result types and ids, owned by basic blocks,
//! functions and a module that allocates identifiers.

pub mod ir;

pub use ir::{
    BasicBlock, BinaryOp, Function, FunctionCall, Instruction, InstructionKind, Module,
    ModuleBuilder, OpCode, SpvType, Value,
};
pub use spv_common::{ErrorReporter, SpvError, SpvId, StorageClass, ValidationConfig, ValidationPolicy};
