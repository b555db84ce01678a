//! Error types and handling for the CLI
//!
//! Every fatal condition of a run ends up here: load, conversion and
//! rendering failures from the libraries, a failed validation pass, and
//! the CLI's own configuration and I/O problems.

use std::io;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (writing output, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Loading or converting the source failed
    #[error(transparent)]
    Core(#[from] oasup_core::Error),

    /// The validation schema could not be loaded
    #[error("Schema error: {0}")]
    Schema(#[from] oasup_schemas::SchemaError),

    /// The converted document failed validation
    #[error("{message}")]
    Validation { message: String, warnings: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    ///
    /// Every aborted run exits with the default failure code.
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_displays_message() {
        let err = Error::Validation {
            message: "Failed OpenAPI3 schema validation".to_string(),
            warnings: 1,
        };
        assert_eq!(err.to_string(), "Failed OpenAPI3 schema validation");
        assert_eq!(err.exit_code(), 1);
        assert!(!err.should_show_help());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: Error =
            oasup_core::Error::conversion("Unsupported swagger/OpenAPI version: 1.2").into();
        assert_eq!(
            err.to_string(),
            "Conversion failed: Unsupported swagger/OpenAPI version: 1.2"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_format_error_without_color() {
        let err = Error::config("unknown log format 'xml'");
        assert_eq!(
            format_error(&err, false),
            "Error: Configuration error: unknown log format 'xml'"
        );
        assert!(err.should_show_help());
    }
}
