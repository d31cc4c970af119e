//! SPIR-V Object Model - Common Types and Utilities
//! 
//! This crate contains shared identifiers, error definitions, and the
//! validation configuration used across the SPIR-V object model.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ValidationConfig, ValidationPolicy};
pub use error::{Diagnostic, ErrorReporter, Severity, SpvError};
pub use types::*;
