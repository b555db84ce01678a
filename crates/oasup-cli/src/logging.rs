//! Logging utilities for the oasup CLI
//!
//! This module provides:
//! - Run ID generation and tracking
//! - Redaction of credentials in source URLs
//! - Performance timing spans
//! - Structured logging setup (compact, full or JSON, always on stderr)

use crate::config;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Run ID for the current process
static RUN_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Emit ANSI colors
    pub ansi: bool,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for everyday use
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!("unknown log format '{}'", other))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_verbosity(1)
    }
}

impl LoggingConfig {
    /// Create logging config from the effective verbosity
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => "error",
            1 => "warn",
            2 => "info",
            3 => "debug",
            _ => "trace",
        };
        let detailed = verbosity >= 4;

        Self {
            level: level.to_string(),
            format: if detailed { LogFormat::Full } else { LogFormat::Compact },
            ansi: true,
            thread_ids: detailed,
            source_location: verbosity >= 3,
        }
    }

    /// Apply the `logging` section of the configuration file
    pub fn merge_with_config(&mut self, config: &config::LoggingConfig) -> Result<()> {
        if let Some(level) = &config.level {
            self.level = level.clone();
        }
        if let Some(format) = &config.format {
            self.format = format.parse()?;
        }
        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            self.level = rust_log;
        }

        if let Ok(format) = std::env::var("OASUP_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.format = format,
                Err(_) => eprintln!(
                    "Warning: invalid OASUP_LOG_FORMAT '{}', using {:?}",
                    format, self.format
                ),
            }
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("invalid log filter '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    // Each format has its own subscriber type
    let installed = match config.format {
        LogFormat::Compact => {
            let subscriber = builder.with_ansi(config.ansi).compact().finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_ansi(false).json().finish())
        }
        LogFormat::Full => {
            tracing::subscriber::set_global_default(builder.with_ansi(config.ansi).finish())
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let run_id = RUN_ID.get_or_init(generate_run_id);
    tracing::debug!(run_id = %run_id, config = ?config, "Logging system initialized");

    Ok(())
}

/// Generate a unique ID for this run
pub fn generate_run_id() -> String {
    format!("run_{}", Uuid::new_v4().simple())
}

/// Get the current run ID
pub fn current_run_id() -> Option<&'static str> {
    RUN_ID.get().map(|s| s.as_str())
}

/// Create a span with run ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        run_id = current_run_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Credential redaction for source designators
pub mod redaction {
    use regex::Regex;
    use std::sync::LazyLock;
    use url::Url;

    static SENSITIVE_PARAM: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)(token|key|secret|password|passwd|sig)").unwrap());

    const REDACTED: &str = "***";

    /// Strip userinfo and sensitive query values from a URL
    ///
    /// Anything that does not parse as a URL (a local path) is returned
    /// unchanged.
    pub fn redact_url(designator: &str) -> String {
        let Ok(mut url) = Url::parse(designator) else {
            return designator.to_string();
        };
        if url.cannot_be_a_base() {
            return designator.to_string();
        }

        if !url.username().is_empty() || url.password().is_some() {
            // Both setters only fail for cannot-be-a-base URLs
            let _ = url.set_username("");
            let _ = url.set_password(None);
        }

        if url.query().is_some() {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .map(|(key, value)| {
                    let value = if SENSITIVE_PARAM.is_match(&key) {
                        REDACTED.to_string()
                    } else {
                        value.into_owned()
                    };
                    (key.into_owned(), value)
                })
                .collect();
            url.query_pairs_mut().clear().extend_pairs(pairs);
        }

        url.to_string()
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
            }
        }

        /// The operation span, for instrumenting futures
        pub fn span(&self) -> &Span {
            &self.span
        }

        /// Run a synchronous stage inside the operation span
        pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
            self.span.in_scope(f)
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);
            let _entered = self.span.enter();

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis(),
                "Operation completed"
            );
        }
    }
}
