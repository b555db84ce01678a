//! oasup schemas - validation and diagnostics for OpenAPI 3.0 documents
//!
//! This crate checks converted documents against the OpenAPI 3.0 JSON
//! Schema (draft-04, embedded at compile time), walks them for structural
//! rules the schema cannot express, optionally lints them, and renders the
//! resulting warnings with schema-aware detail.
//!
//! ## Quick Start
//!
//! ```rust
//! use oasup_core::{ResultContext, RunConfig, SourceFormat};
//! use oasup_schemas::{DocumentValidator, OpenApiValidator};
//! use serde_json::json;
//!
//! let validator = OpenApiValidator::new().unwrap();
//! let config = RunConfig::builder("petstore.json").build();
//! let document = json!({
//!     "openapi": "3.0.0",
//!     "info": {"title": "Petstore", "version": "1.0.0"},
//!     "paths": {}
//! });
//! let mut context = ResultContext::new(document, json!({}), SourceFormat::Json, "petstore.json");
//!
//! assert!(validator.validate(&config, &mut context).is_success());
//! ```

pub mod diagnostics;
pub mod lint;
pub mod validation;

pub use diagnostics::{DiagnosticRenderer, SchemaAwareRenderer};
pub use lint::{Linter, Rule, RULES};
pub use validation::{
    DocumentValidator, OpenApiSchema, OpenApiValidator, SchemaError, ValidationError,
    ValidationFailure, ValidationOutcome, SCHEMA_FAILURE_MESSAGE,
};
