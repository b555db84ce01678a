//! Validation of converted OpenAPI 3.0 documents
//!
//! A validation pass combines two checks over the document in a
//! [`ResultContext`]:
//!
//! - **Schema**: the embedded OpenAPI 3.0 JSON Schema, one warning per violation
//! - **Semantic**: a walk over the document for rules the schema cannot express,
//!   with optional lint rules evaluated along the way
//!
//! [`SchemaValidationTiming::First`] runs the schema check before the walk;
//! the default runs the walk first. Either way the first failing check ends
//! the pass with a [`ValidationOutcome::Failure`].

pub mod error;
pub mod schema;
pub mod semantic;

pub use error::{SchemaError, ValidationError, ValidationResult};
pub use schema::{OpenApiSchema, SCHEMA_PATH_ENV};
pub use semantic::{SemanticWalker, WalkReport};

use oasup_core::{ResultContext, RunConfig, SchemaValidationTiming, Warning};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, instrument};

/// Message of a failure caused by JSON Schema violations
pub const SCHEMA_FAILURE_MESSAGE: &str = "Failed OpenAPI3 schema validation";

/// A failed validation pass
///
/// The optional fields are snapshots of the [`ResultContext`] side channels
/// taken when the failure was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    pub message: String,
    pub stack: Option<String>,
    pub context: Option<Vec<String>>,
    pub warnings: Option<Vec<Warning>>,
}

impl ValidationFailure {
    /// Build a failure from the current state of a result context
    pub fn from_context(message: impl Into<String>, ctx: &ResultContext) -> Self {
        let message = message.into();
        let stack = render_stack(&message, ctx);
        Self {
            message,
            stack: Some(stack),
            context: (!ctx.context.is_empty()).then(|| ctx.context.clone()),
            warnings: (!ctx.warnings.is_empty()).then(|| ctx.warnings.clone()),
        }
    }

    /// Number of warnings carried by the failure
    pub fn warning_count(&self) -> usize {
        self.warnings.as_ref().map_or(0, Vec::len)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result of a validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Success,
    Failure(ValidationFailure),
}

impl ValidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationOutcome::Success)
    }

    /// The failure, if the pass failed
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            ValidationOutcome::Success => None,
            ValidationOutcome::Failure(failure) => Some(failure),
        }
    }
}

/// Validates the document held by a result context
pub trait DocumentValidator: Send + Sync {
    /// Validate `context.openapi`, recording diagnostics in `context`
    fn validate(&self, config: &RunConfig, context: &mut ResultContext) -> ValidationOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    Schema,
    Semantic,
}

/// Schema check plus semantic walk with optional linting
#[derive(Debug)]
pub struct OpenApiValidator {
    schema: OpenApiSchema,
}

impl OpenApiValidator {
    /// Create a validator using [`OpenApiSchema::new`]
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self::with_schema(OpenApiSchema::new()?))
    }

    pub fn with_schema(schema: OpenApiSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &OpenApiSchema {
        &self.schema
    }

    fn run_check(
        &self,
        check: Check,
        config: &RunConfig,
        ctx: &mut ResultContext,
    ) -> Option<String> {
        match check {
            Check::Schema => {
                let warnings = self.schema.check(&ctx.openapi, config.prettify);
                debug!(violations = warnings.len(), "schema check complete");
                if warnings.is_empty() {
                    return None;
                }
                ctx.warnings.extend(warnings);
                Some(SCHEMA_FAILURE_MESSAGE.to_string())
            }
            Check::Semantic => {
                let mut walker = SemanticWalker::new(&ctx.openapi, config);
                let result = walker.walk();
                let report = walker.finish();
                ctx.context = report.context;
                ctx.warnings.extend(report.warnings);
                result.err().map(|error| error.message)
            }
        }
    }
}

impl DocumentValidator for OpenApiValidator {
    #[instrument(skip_all, fields(source = %context.source))]
    fn validate(&self, config: &RunConfig, context: &mut ResultContext) -> ValidationOutcome {
        context.clear_diagnostics();
        context.schema = Some(self.schema.schema().clone());

        let order = match config.validate_schema {
            SchemaValidationTiming::First => [Check::Schema, Check::Semantic],
            SchemaValidationTiming::Default => [Check::Semantic, Check::Schema],
        };
        for check in order {
            if let Some(message) = self.run_check(check, config, context) {
                info!(?check, warnings = context.warnings.len(), "validation failed");
                let failure = ValidationFailure::from_context(message, context);
                return ValidationOutcome::Failure(failure);
            }
        }

        let findings = context.warnings.iter().filter(|w| w.is_lint()).count();
        if findings > 0 {
            let message = format!("Linting failed: {} rule violation(s)", findings);
            return ValidationOutcome::Failure(ValidationFailure::from_context(message, context));
        }
        ValidationOutcome::Success
    }
}

/// Render the breadcrumb chain, most specific location first
fn render_stack(message: &str, ctx: &ResultContext) -> String {
    let mut stack = format!("ValidationError: {}", message);
    for location in ctx.context.iter().rev() {
        stack.push_str("\n    at ");
        stack.push_str(if location.is_empty() { "#" } else { location });
    }
    for warning in &ctx.warnings {
        if let Some(schema_path) = &warning.schema_path {
            stack.push_str(&format!("\n    at {} (schema {})", warning.pointer, schema_path));
        }
    }
    stack
}
