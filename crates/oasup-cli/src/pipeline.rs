//! The load, convert, validate, report pipeline
//!
//! Stages run strictly one after another. Load and conversion failures
//! abort the run before validation; a failed validation pass is reported
//! in full and then returned as [`Error::Validation`].

use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use crate::report::Reporter;
use oasup_core::{Converter, RunConfig, SourceLoader, SwaggerConverter};
use oasup_schemas::{DocumentValidator, OpenApiValidator, ValidationOutcome};
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, instrument, Instrument};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Converting,
    Validating,
    ReportingSuccess,
    ReportingFailure,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Loading => "LOADING",
            Stage::Converting => "CONVERTING",
            Stage::Validating => "VALIDATING",
            Stage::ReportingSuccess => "REPORTING_SUCCESS",
            Stage::ReportingFailure => "REPORTING_FAILURE",
            Stage::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// One conversion run with injected collaborators
#[derive(Clone)]
pub struct Pipeline {
    loader: SourceLoader,
    converter: Arc<dyn Converter>,
    validator: Arc<dyn DocumentValidator>,
    reporter: Reporter,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("loader", &self.loader)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        loader: SourceLoader,
        converter: Arc<dyn Converter>,
        validator: Arc<dyn DocumentValidator>,
        reporter: Reporter,
    ) -> Self {
        Self {
            loader,
            converter,
            validator,
            reporter,
        }
    }

    /// Pipeline with the HTTP loader, Swagger converter, OpenAPI validator
    /// and schema-aware reporter
    pub fn with_defaults(config: &RunConfig, color: bool) -> Result<Self> {
        Ok(Self::new(
            SourceLoader::with_http(&config.http)?,
            Arc::new(SwaggerConverter::new()),
            Arc::new(OpenApiValidator::new()?),
            Reporter::for_config(config, color),
        ))
    }

    /// Run every stage for `config.source`
    ///
    /// On success the converted document is written to `stdout` and
    /// returned. Diagnostics for a failed validation go to `stderr`.
    #[instrument(skip_all, fields(source = %redaction::redact_url(&config.source)))]
    pub async fn run(
        &self,
        config: &RunConfig,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<Value> {
        enter(Stage::Loading);
        let source = {
            let timer = Timer::with_details("load", &redaction::redact_url(&config.source));
            self.loader
                .load(&config.source)
                .instrument(timer.span().clone())
                .await?
        };

        enter(Stage::Converting);
        let mut context = {
            let timer = Timer::new("convert");
            timer.in_scope(|| self.converter.convert(source, config))?
        };

        enter(Stage::Validating);
        let outcome = {
            let timer = Timer::new("validate");
            timer.in_scope(|| self.validator.validate(config, &mut context))
        };

        match outcome {
            ValidationOutcome::Success => {
                enter(Stage::ReportingSuccess);
                OutputWriter::new(stdout).document(&context.openapi, context.source_format)?;
                enter(Stage::Done);
                Ok(context.openapi)
            }
            ValidationOutcome::Failure(failure) => {
                enter(Stage::ReportingFailure);
                let warnings = self
                    .reporter
                    .report(&failure, &context, config.verbosity(), stderr)?;
                Err(Error::Validation {
                    message: failure.message,
                    warnings,
                })
            }
        }
    }
}

fn enter(stage: Stage) {
    info!(stage = %stage, "pipeline stage");
}
