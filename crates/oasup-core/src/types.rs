//! Shared data types for the conversion pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Serialization format of the original source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Structured-data text (JSON)
    Json,
    /// Human-readable, line-oriented text (YAML)
    Yaml,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Json => write!(f, "json"),
            SourceFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// A single diagnostic found while validating a document
///
/// `pointer` is a JSON pointer into the converted document. Schema
/// violations also carry the violated `keyword` and the `schema_path`
/// of the rule; lint findings carry the `rule` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
    pub pointer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

impl Warning {
    /// Create a plain message/pointer warning
    pub fn new(message: impl Into<String>, pointer: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            pointer: pointer.into(),
            keyword: None,
            schema_path: None,
            rule: None,
        }
    }

    /// Create a warning for a JSON Schema violation
    pub fn schema_violation(
        message: impl Into<String>,
        pointer: impl Into<String>,
        keyword: impl Into<String>,
        schema_path: impl Into<String>,
    ) -> Self {
        Self {
            keyword: Some(keyword.into()),
            schema_path: Some(schema_path.into()),
            ..Self::new(message, pointer)
        }
    }

    /// Create a warning for a lint rule finding
    pub fn lint(
        rule: impl Into<String>,
        message: impl Into<String>,
        pointer: impl Into<String>,
    ) -> Self {
        Self {
            rule: Some(rule.into()),
            ..Self::new(message, pointer)
        }
    }

    /// Whether this warning came from the linter
    pub fn is_lint(&self) -> bool {
        self.rule.is_some()
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.message, self.pointer)
    }
}
