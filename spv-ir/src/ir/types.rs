//! IR Type System
//!
//! Types are module entries with their own result ids; composite types
//! refer to their component types by id.

use serde::{Deserialize, Serialize};
use spv_common::{SpvId, StorageClass};
use std::fmt;
use crate::ir::OpCode;

/// IR Type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpvType {
    /// Void type
    Void,

    /// Boolean type
    Bool,

    /// Integer type with bit width and signedness
    Int { width: u32, signed: bool },

    /// Floating point type with bit width
    Float { width: u32 },

    /// Vector of `count` components
    Vector { component: SpvId, count: u32 },

    /// Pointer into a storage class
    Pointer { storage_class: StorageClass, pointee: SpvId },

    /// Function signature
    Function {
        return_type: SpvId,
        parameter_types: Vec<SpvId>,
    },
}

impl SpvType {
    pub fn op_code(&self) -> OpCode {
        match self {
            SpvType::Void => OpCode::TypeVoid,
            SpvType::Bool => OpCode::TypeBool,
            SpvType::Int { .. } => OpCode::TypeInt,
            SpvType::Float { .. } => OpCode::TypeFloat,
            SpvType::Vector { .. } => OpCode::TypeVector,
            SpvType::Pointer { .. } => OpCode::TypePointer,
            SpvType::Function { .. } => OpCode::TypeFunction,
        }
    }

    /// Encoded size of the declaring instruction
    pub fn word_count(&self) -> u32 {
        match self {
            SpvType::Void | SpvType::Bool => 2,
            SpvType::Float { .. } => 3,
            SpvType::Int { .. } | SpvType::Vector { .. } | SpvType::Pointer { .. } => 4,
            SpvType::Function { parameter_types, .. } => 3 + parameter_types.len() as u32,
        }
    }

    /// Ids of the types this type is built from
    pub fn referenced_types(&self) -> Vec<SpvId> {
        match self {
            SpvType::Vector { component, .. } => vec![*component],
            SpvType::Pointer { pointee, .. } => vec![*pointee],
            SpvType::Function { return_type, parameter_types } => {
                let mut ids = vec![*return_type];
                ids.extend(parameter_types.iter().copied());
                ids
            }
            _ => Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, SpvType::Void)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, SpvType::Bool)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, SpvType::Int { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self, SpvType::Function { .. })
    }

    /// Pointee type for pointers
    pub fn pointee(&self) -> Option<SpvId> {
        match self {
            SpvType::Pointer { pointee, .. } => Some(*pointee),
            _ => None,
        }
    }

    /// Return type for function signatures
    pub fn return_type(&self) -> Option<SpvId> {
        match self {
            SpvType::Function { return_type, .. } => Some(*return_type),
            _ => None,
        }
    }

    /// Parameter types for function signatures
    pub fn parameter_types(&self) -> Option<&[SpvId]> {
        match self {
            SpvType::Function { parameter_types, .. } => Some(parameter_types),
            _ => None,
        }
    }

    /// Number of words an `OpConstant` literal of this type occupies
    pub fn literal_words(&self) -> Option<u32> {
        match self {
            SpvType::Int { width, .. } | SpvType::Float { width } => Some(width.div_ceil(32)),
            _ => None,
        }
    }
}

impl fmt::Display for SpvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpvType::Void => write!(f, "void"),
            SpvType::Bool => write!(f, "bool"),
            SpvType::Int { width, signed: true } => write!(f, "i{width}"),
            SpvType::Int { width, signed: false } => write!(f, "u{width}"),
            SpvType::Float { width } => write!(f, "f{width}"),
            SpvType::Vector { component, count } => write!(f, "<{count} x %{component}>"),
            SpvType::Pointer { storage_class, pointee } => write!(f, "%{pointee}* {storage_class}"),
            SpvType::Function { return_type, parameter_types } => {
                write!(f, "%{return_type} (")?;
                for (i, param) in parameter_types.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "%{param}")?;
                }
                write!(f, ")")
            }
        }
    }
}
