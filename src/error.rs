//! Error types for the Eunoia correction engine
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation.

use std::time::Duration;
use thiserror::Error;

/// Main error type for Eunoia operations
#[derive(Error, Debug)]
pub enum EunoiaError {
    /// Caller-supplied value is out of contract (negative, non-finite, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fixed-width feedback vector has the wrong number of samples
    #[error("Feature vector must have exactly {expected} samples, got {actual}")]
    FeatureVectorLength { expected: usize, actual: usize },

    /// External collaborator (verifier, regenerator, store) failed
    #[error("{dependency} failed: {message}")]
    DependencyFailure {
        dependency: &'static str,
        message: String,
    },

    /// External collaborator exceeded the caller's time budget
    #[error("{dependency} timed out after {budget:?}")]
    DependencyTimeout {
        dependency: &'static str,
        budget: Duration,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl EunoiaError {
    /// Shorthand for a failed collaborator call
    pub fn dependency(dependency: &'static str, message: impl Into<String>) -> Self {
        EunoiaError::DependencyFailure {
            dependency,
            message: message.into(),
        }
    }

    /// Attribute an error to a collaborator, keeping existing dependency errors
    pub fn into_dependency(self, dependency: &'static str) -> Self {
        if self.is_dependency_failure() {
            self
        } else {
            EunoiaError::dependency(dependency, self.to_string())
        }
    }

    /// True for failures and timeouts of external collaborators
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            EunoiaError::DependencyFailure { .. } | EunoiaError::DependencyTimeout { .. }
        )
    }

    /// True for out-of-contract caller input
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            EunoiaError::InvalidInput(_) | EunoiaError::FeatureVectorLength { .. }
        )
    }
}

/// Result type alias for Eunoia operations
pub type Result<T> = std::result::Result<T, EunoiaError>;

/// Convert anyhow::Error to EunoiaError
impl From<anyhow::Error> for EunoiaError {
    fn from(err: anyhow::Error) -> Self {
        EunoiaError::Other(err.to_string())
    }
}
