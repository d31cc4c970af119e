//! Error handling for the SPIR-V object model
//!
//! This module defines the error type raised when a module is not
//! well-formed, and a reporter that collects diagnostics so a caller can
//! keep validating after the first violation.

use crate::types::SpvId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for model construction and validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpvError {
    #[error("Invalid module: {op_code}{}: {message}", location_suffix(.id, .block, .function))]
    InvalidModule {
        op_code: String,
        id: Option<SpvId>,
        block: Option<SpvId>,
        function: Option<SpvId>,
        message: String,
    },

    #[error("Duplicate id %{0}")]
    DuplicateId(SpvId),

    #[error("Unknown id %{0}")]
    UnknownId(SpvId),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

/// Renders the optional location of an `InvalidModule` error
fn location_suffix(id: &Option<SpvId>, block: &Option<SpvId>, function: &Option<SpvId>) -> String {
    let mut suffix = String::new();
    if let Some(id) = id {
        suffix.push_str(&format!(" %{id}"));
    }
    if let Some(block) = block {
        suffix.push_str(&format!(" in block %{block}"));
    }
    if let Some(function) = function {
        suffix.push_str(&format!(" of function %{function}"));
    }
    suffix
}

impl SpvError {
    /// Create a model-validity error for the given opcode and result id
    pub fn invalid_module(op_code: impl fmt::Display, id: Option<SpvId>, message: impl Into<String>) -> Self {
        SpvError::InvalidModule {
            op_code: op_code.to_string(),
            id,
            block: None,
            function: None,
            message: message.into(),
        }
    }

    /// Attach the owning block, keeping any location already recorded
    pub fn in_block(mut self, label: SpvId) -> Self {
        if let SpvError::InvalidModule { block, .. } = &mut self {
            block.get_or_insert(label);
        }
        self
    }

    /// Attach the owning function, keeping any location already recorded
    pub fn in_function(mut self, function_id: SpvId) -> Self {
        if let SpvError::InvalidModule { function, .. } = &mut self {
            function.get_or_insert(function_id);
        }
        self
    }

    pub fn is_invalid_module(&self) -> bool {
        matches!(self, SpvError::InvalidModule { .. })
    }
}

/// Convert from String (for simple error cases)
impl From<String> for SpvError {
    fn from(message: String) -> Self {
        SpvError::InternalError { message }
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A reported error together with its severity and free-form notes
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: SpvError,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(error: SpvError) -> Self {
        Self {
            severity: Severity::Error,
            error,
            notes: Vec::new(),
        }
    }

    pub fn warning(error: SpvError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.error)?;
        for note in &self.notes {
            write!(f, "\n  note: {note}")?;
        }
        Ok(())
    }
}

/// Collects diagnostics produced while validating a module
#[derive(Debug, Clone, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error diagnostic
    pub fn error(&mut self, error: SpvError) -> &mut Diagnostic {
        self.error_count += 1;
        self.push(Diagnostic::error(error))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, error: SpvError) -> &mut Diagnostic {
        self.warning_count += 1;
        self.push(Diagnostic::warning(error))
    }

    fn push(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        let index = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[index]
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Errors only, in reporting order
    pub fn errors(&self) -> impl Iterator<Item = &SpvError> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| &d.error)
    }

    /// First reported error, if any
    pub fn into_first_error(self) -> Option<SpvError> {
        self.diagnostics
            .into_iter()
            .find(|d| d.severity == Severity::Error)
            .map(|d| d.error)
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}
