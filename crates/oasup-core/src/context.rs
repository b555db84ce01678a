//! The mutable carrier threaded through conversion and validation

use crate::types::{SourceFormat, Warning};
use serde_json::Value;

/// State produced by the converter and extended by the validator
///
/// One `ResultContext` exists per run. The converter creates it, the
/// validator receives it by `&mut` and appends diagnostics, and the
/// reporter only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultContext {
    /// The converted OpenAPI document
    pub openapi: Value,
    /// The parsed source document before conversion
    pub original: Value,
    /// JSON Schema the document was validated against
    pub schema: Option<Value>,
    /// Format of the original source text
    pub source_format: SourceFormat,
    /// Diagnostics in detection order
    pub warnings: Vec<Warning>,
    /// Breadcrumbs of document locations visited by the validator
    pub context: Vec<String>,
    /// Number of defects repaired in patch mode
    pub patches: usize,
    /// Designator the document was loaded from
    pub source: String,
}

impl ResultContext {
    pub fn new(
        openapi: Value,
        original: Value,
        source_format: SourceFormat,
        source: impl Into<String>,
    ) -> Self {
        Self {
            openapi,
            original,
            schema: None,
            source_format,
            warnings: Vec::new(),
            context: Vec::new(),
            patches: 0,
            source: source.into(),
        }
    }

    /// Record a diagnostic
    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Enter a document location
    pub fn push_context(&mut self, pointer: impl Into<String>) {
        self.context.push(pointer.into());
    }

    /// Leave the most recently entered document location
    pub fn pop_context(&mut self) -> Option<String> {
        self.context.pop()
    }

    /// The most specific location currently entered
    pub fn current_context(&self) -> Option<&str> {
        self.context.last().map(String::as_str)
    }

    /// Drop diagnostics from a previous validation pass
    pub fn clear_diagnostics(&mut self) {
        self.warnings.clear();
        self.context.clear();
    }
}
