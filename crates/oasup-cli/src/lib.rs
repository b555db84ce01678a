//! oasup CLI - convert Swagger 2.0 documents to OpenAPI 3.0 and validate them
//!
//! The binary is a thin shell around [`pipeline::Pipeline`]: arguments and
//! the optional configuration file become a [`oasup_core::RunConfig`], the
//! pipeline loads, converts and validates the source, and either the
//! converted document is written to stdout or the failure is reported on
//! stderr.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod report;

pub use error::{Error, Result};
pub use pipeline::{Pipeline, Stage};
pub use report::{ReportMode, Reporter};
