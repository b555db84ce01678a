//! Error types for the oasup core library
//!
//! Every stage before validation (loading, parsing, reference resolution,
//! conversion) reports failures through [`Error`]. Validation failures are
//! not errors at this level; they are carried by the tagged outcome in
//! `oasup-schemas`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oasup core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A local source could not be read
    #[error("Cannot read source '{}': {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A remote source could not be fetched
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Source text is neither JSON nor YAML
    #[error("Cannot parse '{designator}' as JSON or YAML: {message}")]
    Parse { designator: String, message: String },

    /// The structural conversion could not proceed
    #[error("Conversion failed: {message}")]
    Conversion {
        message: String,
        pointer: Option<String>,
    },

    /// An external `$ref` could not be resolved
    #[error("Failed to resolve reference '{reference}': {message}")]
    Reference { reference: String, message: String },

    /// IO errors not tied to the source document
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML serialization errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a conversion error without a document location
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
            pointer: None,
        }
    }

    /// Create a conversion error located at a JSON pointer
    pub fn conversion_at(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
            pointer: Some(pointer.into()),
        }
    }

    /// Create a reference resolution error
    pub fn reference(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Reference {
            reference: reference.into(),
            message: message.into(),
        }
    }

    /// Whether the error happened while acquiring the source document
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Source { .. } | Self::Http { .. } | Self::Parse { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
