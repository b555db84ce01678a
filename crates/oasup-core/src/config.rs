//! Run configuration shared by every pipeline stage
//!
//! A [`RunConfig`] is built once from invocation arguments through
//! [`RunConfigBuilder`] and then only read. Stages that need to report
//! back write into the [`ResultContext`](crate::ResultContext) instead.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// When the JSON Schema check runs relative to the semantic walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaValidationTiming {
    /// Semantic checks first, schema check last
    #[default]
    Default,
    /// Schema check before anything else
    First,
}

/// Transport options for remote sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpOptions {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("oasup/{}", crate::VERSION),
        }
    }
}

impl HttpOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Options for a single conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source designator: a local path or an http(s) URL
    pub source: String,
    /// Inline external `$ref`s before converting
    pub resolve: bool,
    /// Repair minor defects instead of failing
    pub patch: bool,
    /// Schema validation timing
    pub validate_schema: SchemaValidationTiming,
    /// Compact offending values in schema warning text
    pub prettify: bool,
    /// Render warnings with schema-aware detail
    pub detailed_diagnostics: bool,
    /// Run lint rules during validation
    pub lint: bool,
    /// Lint rule names to skip
    pub lint_skip: Vec<String>,
    /// Verbosity level (1 is the default)
    pub verbose: u8,
    /// Quiet level, subtracted from verbosity
    pub quiet: u8,
    /// Transport options for remote sources
    pub http: HttpOptions,
}

impl RunConfig {
    /// Start building a configuration for a source designator
    pub fn builder(source: impl Into<String>) -> RunConfigBuilder {
        RunConfigBuilder::new(source)
    }

    /// Effective verbosity after applying the quiet level
    pub fn verbosity(&self) -> u8 {
        self.verbose.saturating_sub(self.quiet)
    }

    /// Whether a lint rule is enabled for this run
    pub fn lint_rule_enabled(&self, rule: &str) -> bool {
        self.lint && !self.lint_skip.iter().any(|skipped| skipped == rule)
    }
}

/// Builder for [`RunConfig`]
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Create a builder with defaults for the given source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            config: RunConfig {
                source: source.into(),
                resolve: false,
                patch: false,
                validate_schema: SchemaValidationTiming::Default,
                prettify: false,
                detailed_diagnostics: false,
                lint: false,
                lint_skip: Vec::new(),
                verbose: 1,
                quiet: 0,
                http: HttpOptions::default(),
            },
        }
    }

    pub fn resolve(mut self, resolve: bool) -> Self {
        self.config.resolve = resolve;
        self
    }

    pub fn patch(mut self, patch: bool) -> Self {
        self.config.patch = patch;
        self
    }

    pub fn validate_schema(mut self, timing: SchemaValidationTiming) -> Self {
        self.config.validate_schema = timing;
        self
    }

    pub fn prettify(mut self, prettify: bool) -> Self {
        self.config.prettify = prettify;
        self
    }

    /// Enable detailed diagnostics
    ///
    /// Detailed diagnostics imply schema-first validation and prettified
    /// warning text.
    pub fn detailed_diagnostics(mut self, enabled: bool) -> Self {
        self.config.detailed_diagnostics = enabled;
        self
    }

    pub fn lint(mut self, lint: bool) -> Self {
        self.config.lint = lint;
        self
    }

    /// Add rule names to skip, keeping first-seen order and dropping duplicates
    pub fn lint_skip<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for rule in rules {
            let rule = rule.into();
            if !self.config.lint_skip.contains(&rule) {
                self.config.lint_skip.push(rule);
            }
        }
        self
    }

    pub fn verbose(mut self, verbose: u8) -> Self {
        self.config.verbose = verbose;
        self
    }

    pub fn quiet(mut self, quiet: u8) -> Self {
        self.config.quiet = quiet;
        self
    }

    pub fn http(mut self, http: HttpOptions) -> Self {
        self.config.http = http;
        self
    }

    /// Build the configuration
    pub fn build(self) -> RunConfig {
        let mut config = self.config;
        if config.detailed_diagnostics {
            config.validate_schema = SchemaValidationTiming::First;
            config.prettify = true;
        }
        config
    }
}
