//! In-memory object model for a SPIR-V style IR
//! 
//! Instructions are word-coded, typed and identified, and live inside
//! basic blocks, functions and a module.
//! 
//! ## Architecture
//! 
//! The module is structured as follows:
//! - `opcode` - Opcodes and their encoding properties
//! - `types` - Type system (SpvType)
//! - `values` - Value headers and id table entries
//! - `instructions` - Instruction construction, parent binding, operand types
//! - `kinds` - Concrete instruction kinds
//! - `call` - Function calls
//! - `validate` - Shared validation checks
//! - `blocks` - Basic block management
//! - `function` - Function definitions
//! - `module` - Module, id table, types and constants
//! - `builder` - IR construction utilities

// Public exports - clean API surface
pub use self::opcode::{OpCode, BinaryOp};
pub use self::types::SpvType;
pub use self::values::{Value, ValueInfo};
pub use self::instructions::{Instruction, InstructionKind, InstructionOps, resolve_operand_type};
pub use self::kinds::{
    Binary, Branch, BranchConditional, Load, Return, ReturnValue, Store, Undef, Unreachable, Variable,
};
pub use self::call::FunctionCall;
pub use self::validate::{ValidationContext, validate_call_generic};
pub use self::blocks::BasicBlock;
pub use self::function::{Function, FunctionParameter};
pub use self::module::{Module, Constant, ConstantValue};
pub use self::builder::ModuleBuilder;

// Internal modules
mod opcode;
mod types;
mod values;
mod instructions;
mod kinds;
mod call;
mod validate;
mod blocks;
mod function;
mod module;
mod builder;

#[cfg(test)]
mod tests;
