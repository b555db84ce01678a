//! Diagnostic reporting for failed validation passes
//!
//! A failure is reported in a fixed order: the message, the trace (only
//! above the default verbosity), the most specific context entry, then one
//! rendering per warning. The [`ReportMode`] is chosen once per run.

use colored::Colorize;
use oasup_core::{ResultContext, RunConfig, Warning};
use oasup_schemas::{DiagnosticRenderer, SchemaAwareRenderer, ValidationFailure};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// How warnings are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    /// `{message} {pointer}` per warning
    Concise,
    /// Schema-aware multi-line block per warning
    Detailed,
}

impl ReportMode {
    pub fn for_config(config: &RunConfig) -> Self {
        if config.detailed_diagnostics {
            ReportMode::Detailed
        } else {
            ReportMode::Concise
        }
    }
}

/// Writes validation failures to the diagnostic stream
#[derive(Clone)]
pub struct Reporter {
    mode: ReportMode,
    renderer: Arc<dyn DiagnosticRenderer>,
    color: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("mode", &self.mode)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(mode: ReportMode, renderer: Arc<dyn DiagnosticRenderer>, color: bool) -> Self {
        Self { mode, renderer, color }
    }

    /// Reporter with the schema-aware renderer, in the mode the run asks for
    pub fn for_config(config: &RunConfig, color: bool) -> Self {
        Self::new(
            ReportMode::for_config(config),
            Arc::new(SchemaAwareRenderer::new(color)),
            color,
        )
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    /// Report a failure, returning the number of warnings rendered
    pub fn report(
        &self,
        failure: &ValidationFailure,
        context: &ResultContext,
        verbosity: u8,
        out: &mut dyn Write,
    ) -> io::Result<usize> {
        if self.color {
            writeln!(out, "{}", failure.message.red().bold())?;
        } else {
            writeln!(out, "{}", failure.message)?;
        }

        if verbosity > 1 {
            if let Some(stack) = &failure.stack {
                writeln!(out, "{}", stack)?;
            }
        }

        let mut breadcrumbs = failure.context.clone().unwrap_or_default();
        if let Some(location) = breadcrumbs.pop() {
            writeln!(out, "{}", if location.is_empty() { "#" } else { location.as_str() })?;
        }

        let warnings = failure.warnings.as_deref().unwrap_or_default();
        for entry in self.render_entries(warnings, context) {
            writeln!(out, "{}", entry)?;
        }
        out.flush()?;

        debug!(mode = ?self.mode, warnings = warnings.len(), "reported validation failure");
        Ok(warnings.len())
    }

    fn render_entries(&self, warnings: &[Warning], context: &ResultContext) -> Vec<String> {
        match (self.mode, &context.schema) {
            (ReportMode::Detailed, Some(schema)) if !warnings.is_empty() => self
                .renderer
                .render_all(schema, &context.openapi, warnings)
                .into_iter()
                .zip(warnings)
                .map(|(detailed, warning)| detailed.unwrap_or_else(|| concise(warning)))
                .collect(),
            _ => warnings.iter().map(concise).collect(),
        }
    }
}

fn concise(warning: &Warning) -> String {
    format!("{} {}", warning.message, warning.pointer)
}
