//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API. The
//! parsed [`Cli`] is turned into an immutable [`RunConfig`] once, after the
//! tool configuration file has been merged in.

use crate::config::Config;
use clap::{ArgAction, Parser};
use is_terminal::IsTerminal;
use oasup_core::RunConfig;
use std::path::PathBuf;

/// oasup - convert Swagger 2.0 to OpenAPI 3.0 and validate the result
///
/// Reads a Swagger 2.0 document from a local path or an http(s) URL,
/// upgrades it to OpenAPI 3.0, validates the converted document and
/// writes it to stdout. Diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(name = "oasup", version, author, about, long_about = None)]
pub struct Cli {
    /// Path or http(s) URL of the source document
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Show detailed, schema-aware diagnostics (implies schema-first validation)
    #[arg(short = 'b', long = "bae")]
    pub bae: bool,

    /// Lint the converted document
    #[arg(short = 'l', long = "lint")]
    pub lint: bool,

    /// Lint rules to skip
    #[arg(
        short = 's',
        long = "lintSkip",
        value_name = "RULE",
        num_args = 1..,
        action = ArgAction::Append
    )]
    pub lint_skip: Vec<String>,

    /// Reduce verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, env = "OASUP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Verbosity before any `-v` or `-q`
pub const DEFAULT_VERBOSITY: u8 = 1;

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Verbose level: the default plus one per `-v`
    pub fn verbose_level(&self) -> u8 {
        DEFAULT_VERBOSITY.saturating_add(self.verbose)
    }

    /// Effective verbosity after `-q`
    pub fn verbosity_level(&self) -> u8 {
        self.verbose_level().saturating_sub(self.quiet)
    }

    /// Check if colored diagnostics should be used
    ///
    /// Diagnostics are written to stderr, so that is the stream checked.
    pub fn use_color(&self, config: &Config) -> bool {
        !self.no_color && config.output.color && std::io::stderr().is_terminal()
    }

    /// Build the run configuration, merging the config file's lint skip list
    /// after the command-line one
    pub fn run_config(&self, config: &Config) -> RunConfig {
        RunConfig::builder(self.source.clone())
            .resolve(true)
            .patch(true)
            .detailed_diagnostics(self.bae)
            .lint(self.lint)
            .lint_skip(self.lint_skip.iter().cloned())
            .lint_skip(config.lint.skip.iter().cloned())
            .verbose(self.verbose_level())
            .quiet(self.quiet)
            .http(config.http.to_options())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use oasup_core::SchemaValidationTiming;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_source_is_required() {
        assert!(Cli::try_parse_from(["oasup"]).is_err());
        assert!(Cli::try_parse_from(["oasup", "petstore.yaml"]).is_ok());
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["oasup", "api.json"]);
        assert_eq!(cli.verbosity_level(), 1);

        let cli = Cli::parse_from(["oasup", "-vv", "api.json"]);
        assert_eq!(cli.verbosity_level(), 3);

        let cli = Cli::parse_from(["oasup", "-qq", "api.json"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["oasup", "-v", "--quiet", "api.json"]);
        assert_eq!(cli.verbosity_level(), 1);
    }

    #[test]
    fn test_lint_skip_takes_multiple_values() {
        let cli = Cli::parse_from([
            "oasup",
            "api.json",
            "--lint",
            "-s",
            "info-contact",
            "operation-tags",
            "--lintSkip",
            "tag-description",
        ]);
        assert!(cli.lint);
        assert_eq!(cli.lint_skip, vec!["info-contact", "operation-tags", "tag-description"]);
    }

    #[test]
    fn test_bae_flag_builds_detailed_config() {
        let cli = Cli::parse_from(["oasup", "-b", "broken.json"]);
        let config = cli.run_config(&Config::default());
        assert!(config.detailed_diagnostics);
        assert!(config.prettify);
        assert!(config.resolve);
        assert!(config.patch);
        assert_eq!(config.validate_schema, SchemaValidationTiming::First);
    }

    #[test]
    fn test_config_file_skip_list_is_merged_after_cli() {
        let mut file_config = Config::default();
        file_config.lint.skip = vec!["tag-description".to_string(), "info-contact".to_string()];

        let cli = Cli::parse_from(["oasup", "api.json", "-l", "-s", "info-contact"]);
        let config = cli.run_config(&file_config);
        assert_eq!(config.lint_skip, vec!["info-contact", "tag-description"]);
    }

    #[test]
    fn test_no_color_wins() {
        let cli = Cli::parse_from(["oasup", "--no-color", "api.json"]);
        assert!(!cli.use_color(&Config::default()));
    }
}
