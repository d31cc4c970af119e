//! Validation configuration
//!
//! Controls how whole-module validation reacts to model-validity errors.

use crate::error::SpvError;
use serde::{Deserialize, Serialize};

/// What to do after the first `InvalidModule` error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Stop at the first violation
    #[default]
    FailFast,
    /// Keep going and collect every violation
    Aggregate,
}

/// Configuration for module validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub policy: ValidationPolicy,
    /// Stop aggregating after this many errors
    pub max_errors: Option<usize>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::FailFast,
            max_errors: None,
        }
    }
}

impl ValidationConfig {
    pub fn fail_fast() -> Self {
        Self::default()
    }

    pub fn aggregate() -> Self {
        Self {
            policy: ValidationPolicy::Aggregate,
            ..Self::default()
        }
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(content: &str) -> Result<Self, SpvError> {
        serde_json::from_str(content).map_err(|e| SpvError::InternalError {
            message: format!("invalid validation config: {e}"),
        })
    }

    /// Whether validation should stop once `errors` errors were reported
    pub fn should_stop(&self, errors: usize) -> bool {
        if errors == 0 {
            return false;
        }
        match self.policy {
            ValidationPolicy::FailFast => true,
            ValidationPolicy::Aggregate => self.max_errors.is_some_and(|max| errors >= max),
        }
    }
}
