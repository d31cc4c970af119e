//! Common types used throughout the object model
//!
//! This module defines the identifier and word types shared by every
//! component, plus enumerations that are needed on both sides of the
//! IR crate boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result identifier (`<id>` in the binary format). Zero is never valid.
pub type SpvId = u32;

/// A single encoding unit of the binary format
pub type SpvWord = u32;

/// Storage classes for pointer types and variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageClass {
    UniformConstant,
    Input,
    Uniform,
    Output,
    Workgroup,
    CrossWorkgroup,
    Private,
    Function,
}

impl StorageClass {
    /// Numeric value as encoded in the binary format
    pub fn value(&self) -> SpvWord {
        match self {
            StorageClass::UniformConstant => 0,
            StorageClass::Input => 1,
            StorageClass::Uniform => 2,
            StorageClass::Output => 3,
            StorageClass::Workgroup => 4,
            StorageClass::CrossWorkgroup => 5,
            StorageClass::Private => 6,
            StorageClass::Function => 7,
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageClass::UniformConstant => write!(f, "UniformConstant"),
            StorageClass::Input => write!(f, "Input"),
            StorageClass::Uniform => write!(f, "Uniform"),
            StorageClass::Output => write!(f, "Output"),
            StorageClass::Workgroup => write!(f, "Workgroup"),
            StorageClass::CrossWorkgroup => write!(f, "CrossWorkgroup"),
            StorageClass::Private => write!(f, "Private"),
            StorageClass::Function => write!(f, "Function"),
        }
    }
}

/// Hands out module-unique result ids and tracks the id bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_id: SpvId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate a fresh id. Once the id space is exhausted this keeps
    /// returning `SpvId::MAX`, which modules refuse to register.
    pub fn allocate(&mut self) -> SpvId {
        let id = self.next_id;
        self.next_id = id.checked_add(1).unwrap_or(SpvId::MAX);
        id
    }

    /// Make sure ids handed out later never collide with `id`
    pub fn reserve(&mut self, id: SpvId) {
        if id >= self.next_id {
            self.next_id = id.checked_add(1).unwrap_or(SpvId::MAX);
        }
    }

    /// One past the largest id handed out or reserved so far
    pub fn bound(&self) -> SpvId {
        self.next_id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
