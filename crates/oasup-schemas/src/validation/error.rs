//! Error types for schema loading and document validation

use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain or compile the OpenAPI JSON Schema
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to read schema file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to compile schema: {message}")]
    Compile { message: String },
}

/// A violation found by the semantic walk
///
/// `pointer` locates the offending node in the converted document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub pointer: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

/// Result type for the semantic walk
pub type ValidationResult<T> = Result<T, ValidationError>;
