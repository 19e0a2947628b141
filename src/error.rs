//! Error types for appdeploy-core

use thiserror::Error;

/// Result type for configuration and templating operations
pub type DeployResult<T> = Result<T, DeployError>;

/// Errors that can occur while reading or validating deployment configuration
#[derive(Error, Debug)]
pub enum DeployError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration source (bad line, duplicate key, unterminated block)
    #[error("{source_name} line {line}: {message}")]
    Format {
        /// File name or other label of the source being read
        source_name: String,
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// A configuration field failed validation
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What went wrong
        message: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeployError {
    pub(crate) fn format(source_name: &str, line: usize, message: impl Into<String>) -> Self {
        DeployError::Format {
            source_name: source_name.to_string(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        DeployError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Name of the offending field for validation errors
    pub fn field(&self) -> Option<&str> {
        match self {
            DeployError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Line number for format errors
    pub fn line(&self) -> Option<usize> {
        match self {
            DeployError::Format { line, .. } => Some(*line),
            _ => None,
        }
    }
}
