//! oasup core - Swagger 2.0 to OpenAPI 3.0 conversion engine
//!
//! This crate loads API descriptions from local files or URLs, upgrades
//! Swagger 2.0 documents to OpenAPI 3.0 and carries the result through a
//! [`ResultContext`] that later pipeline stages read and extend.
//!
//! # Main Components
//!
//! - **Run configuration**: immutable per-run options ([`RunConfig`])
//! - **Source loading**: designator classification and acquisition ([`SourceLoader`])
//! - **Conversion**: the [`Converter`] seam and [`SwaggerConverter`]
//! - **Serialization**: format detection and output ([`serialize_document`])
//!
//! # Example
//!
//! ```no_run
//! use oasup_core::{Converter, LoadedSource, RunConfig, SwaggerConverter};
//!
//! fn example() -> oasup_core::Result<()> {
//!     let text = std::fs::read_to_string("petstore.yaml")?;
//!     let config = RunConfig::builder("petstore.yaml").resolve(true).patch(true).build();
//!     let source = LoadedSource::from_text("petstore.yaml", text, ".");
//!     let context = SwaggerConverter::new().convert(source, &config)?;
//!     println!("{}", context.openapi["openapi"]);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod format;
pub mod pointer;
pub mod resolver;
pub mod source;
pub mod types;

pub use config::{HttpOptions, RunConfig, RunConfigBuilder, SchemaValidationTiming};
pub use context::ResultContext;
pub use convert::{Converter, SwaggerConverter, TARGET_VERSION};
pub use error::{Error, Result};
pub use format::{parse_document, serialize_document};
pub use source::{Fetch, HttpFetcher, LoadedSource, SourceBase, SourceKind, SourceLoader};
pub use types::{SourceFormat, Warning};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
