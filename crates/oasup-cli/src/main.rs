//! oasup - convert Swagger 2.0 to OpenAPI 3.0 and validate the result
//!
//! The process exit code starts out as failure and is only flipped to
//! success once the whole pipeline has completed.

use colored::control;
use oasup_cli::cli::Cli;
use oasup_cli::config::{Config, SkippedFile};
use oasup_cli::error::{self, Result};
use oasup_cli::logging::{self, timing::Timer, LoggingConfig};
use oasup_cli::Pipeline;
use std::io;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    let mut exit_code = 1;

    let (config, skipped) = match Config::load_with_file(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, false));
            process::exit(e.exit_code());
        }
    };

    let use_color = cli.use_color(&config);
    control::set_override(use_color);

    if let Err(e) = init_logging(&cli, &config, use_color) {
        eprintln!("Failed to initialize logging: {}", e);
    }
    skipped.iter().for_each(SkippedFile::report);

    match run(&cli, &config, use_color).await {
        Ok(()) => exit_code = 0,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }
        }
    }

    process::exit(exit_code);
}

/// Main application logic
#[instrument(skip_all, fields(verbosity = cli.verbosity_level()))]
async fn run(cli: &Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let run_config = cli.run_config(config);
    tracing::debug!(
        source = %logging::redaction::redact_url(&run_config.source),
        bae = run_config.detailed_diagnostics,
        lint = run_config.lint,
        "starting run"
    );

    let pipeline = Pipeline::with_defaults(&run_config, use_color)?;
    pipeline
        .run(&run_config, &mut io::stdout(), &mut io::stderr())
        .await?;
    Ok(())
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config, use_color: bool) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.ansi = use_color;

    logging_config.merge_with_config(&config.logging)?;
    logging_config.merge_with_env();

    logging::init_logging(logging_config)
}
