//! Swagger 2.0 to OpenAPI 3.0 conversion
//!
//! The [`Converter`] trait is the seam the pipeline depends on;
//! [`SwaggerConverter`] is the implementation used by the CLI. Documents
//! that already declare `openapi: 3.x` pass through unchanged, so running
//! the converter on its own output is a no-op.

mod parameters;
mod paths;
mod responses;
mod schema;
mod security;
mod servers;

pub use paths::HTTP_METHODS;
pub use schema::{is_valid_component_key, sanitize_component_key};

use crate::config::RunConfig;
use crate::context::ResultContext;
use crate::error::{Error, Result};
use crate::format::parse_document;
use crate::pointer;
use crate::resolver::ReferenceResolver;
use crate::source::{LoadedSource, SourceLoader};
use schema::{fix_schema, RefRewriter};
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument};

/// Version emitted for converted documents
pub const TARGET_VERSION: &str = "3.0.0";

/// Turns a loaded source into a converted document
pub trait Converter: Send + Sync {
    fn convert(&self, source: LoadedSource, config: &RunConfig) -> Result<ResultContext>;
}

/// Converter for Swagger 2.0 and OpenAPI 3.0 sources
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerConverter;

impl SwaggerConverter {
    pub fn new() -> Self {
        Self
    }

    /// Fetch a remote source and convert it
    pub async fn convert_url(
        &self,
        loader: &SourceLoader,
        url: &str,
        config: &RunConfig,
    ) -> Result<ResultContext> {
        let source = loader.load_remote(url).await?;
        self.convert(source, config)
    }

    /// Read a local source and convert it
    pub async fn convert_file(
        &self,
        loader: &SourceLoader,
        path: &str,
        config: &RunConfig,
    ) -> Result<ResultContext> {
        let source = loader.load_local(path).await?;
        self.convert(source, config)
    }
}

impl Converter for SwaggerConverter {
    #[instrument(skip_all, fields(source = %source.designator))]
    fn convert(&self, source: LoadedSource, config: &RunConfig) -> Result<ResultContext> {
        let (original, format) = parse_document(&source.text, &source.designator)?;

        let document = if config.resolve {
            ReferenceResolver::new().resolve(original.clone(), &source.base)?
        } else {
            original.clone()
        };

        let (openapi, patches) = upgrade(document, config.patch)?;
        if patches > 0 {
            info!(patches, "repaired minor defects in source document");
        }

        let mut context = ResultContext::new(openapi, original, format, source.designator);
        context.patches = patches;
        Ok(context)
    }
}

/// Upgrade a parsed document, returning it with the number of patches applied
pub fn upgrade(document: Value, patch: bool) -> Result<(Value, usize)> {
    let Value::Object(source) = document else {
        return Err(Error::conversion("Source document must be an object"));
    };

    let openapi_version = source.get("openapi").and_then(Value::as_str).map(str::to_string);
    if let Some(version) = openapi_version.filter(|v| v.starts_with("3.")) {
        debug!(version = %version, "document is already OpenAPI 3");
        return Ok((Value::Object(source), 0));
    }

    let is_swagger2 = match source.get("swagger") {
        Some(Value::String(version)) => version == "2.0",
        Some(Value::Number(version)) => version.as_f64() == Some(2.0),
        _ => false,
    };
    if !is_swagger2 {
        let version = source
            .get("openapi")
            .or_else(|| source.get("swagger"))
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .unwrap_or_else(|| "<missing>".to_string());
        return Err(Error::conversion(format!("Unsupported swagger/OpenAPI version: {}", version)));
    }

    let mut upgrade = Upgrade::new(&source, patch);
    let converted = upgrade.run(&source)?;
    Ok((converted, upgrade.patches))
}

/// String entries of an array value, skipping anything else
fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// State for a single Swagger 2.0 upgrade
#[derive(Debug, Default)]
pub(crate) struct Upgrade {
    patch: bool,
    patches: usize,
    consumes: Vec<String>,
    produces: Vec<String>,
    /// Global `parameters` of the source, by name
    parameters: Map<String, Value>,
    refs: RefRewriter,
}

impl Upgrade {
    fn new(source: &Map<String, Value>, patch: bool) -> Self {
        let parameters = source
            .get("parameters")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let mut refs = RefRewriter::default();
        for (name, param) in &parameters {
            if param.get("in").and_then(Value::as_str) == Some("body") {
                refs.body_parameters.insert(name.clone());
            }
        }

        Self {
            patch,
            patches: 0,
            consumes: string_list(source.get("consumes")),
            produces: string_list(source.get("produces")),
            parameters,
            refs,
        }
    }

    fn run(&mut self, source: &Map<String, Value>) -> Result<Value> {
        let components = self.convert_components(source)?;
        let mut servers = servers::servers(
            source.get("host").and_then(Value::as_str),
            source.get("basePath").and_then(Value::as_str),
            &string_list(source.get("schemes")),
        );
        let mut components = (!components.is_empty()).then_some(Value::Object(components));

        let mut out = Map::new();
        out.insert("openapi".to_string(), json!(TARGET_VERSION));
        out.insert("info".to_string(), self.fix_info(source.get("info"))?);

        for (key, value) in source {
            match key.as_str() {
                "swagger" | "info" | "consumes" | "produces" => {}
                "host" | "basePath" | "schemes" => {
                    if let Some(servers) = servers.take() {
                        out.insert("servers".to_string(), servers);
                    }
                }
                "paths" => {
                    let paths = match value.as_object() {
                        Some(paths) => self.convert_paths(paths)?,
                        None => value.clone(),
                    };
                    out.insert(key.clone(), paths);
                }
                "definitions" | "parameters" | "responses" | "securityDefinitions" => {
                    if let Some(components) = components.take() {
                        out.insert("components".to_string(), components);
                    }
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }

        let mut document = Value::Object(out);
        self.refs.rewrite_all(&mut document);
        Ok(document)
    }

    fn convert_components(&mut self, source: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut components = Map::new();

        if let Some(Value::Object(definitions)) = source.get("definitions") {
            let mut schemas = Map::new();
            for (name, schema) in definitions {
                let key = self.component_key(name);
                let mut schema = schema.clone();
                fix_schema(&mut schema);
                schemas.insert(key, schema);
            }
            components.insert("schemas".to_string(), Value::Object(schemas));
        }

        if let Some(Value::Object(responses)) = source.get("responses") {
            let produces = if self.produces.is_empty() {
                vec!["application/json".to_string()]
            } else {
                self.produces.clone()
            };
            let mut converted = Map::new();
            for (name, response) in responses {
                let at = pointer::join("/responses", name);
                converted.insert(name.clone(), self.convert_response(response, &produces, &at)?);
            }
            components.insert("responses".to_string(), Value::Object(converted));
        }

        let mut parameters = Map::new();
        let mut request_bodies = Map::new();
        let consumes = if self.consumes.is_empty() {
            vec!["application/json".to_string()]
        } else {
            self.consumes.clone()
        };
        for (name, param) in self.parameters.clone() {
            let at = pointer::join("/parameters", &name);
            let Value::Object(mut param) = param else {
                return Err(Error::conversion_at("Parameter must be an object", at));
            };
            match param.get("in").and_then(Value::as_str) {
                Some("body") => {
                    request_bodies.insert(name, parameters::request_body(&param, &consumes));
                }
                Some("formData") => {
                    debug!(parameter = %name, "form parameter is inlined where referenced")
                }
                _ => {
                    self.require_path_parameter(&mut param, &at)?;
                    parameters.insert(name, parameters::convert_parameter(&param));
                }
            }
        }
        if !parameters.is_empty() {
            components.insert("parameters".to_string(), Value::Object(parameters));
        }
        if !request_bodies.is_empty() {
            components.insert("requestBodies".to_string(), Value::Object(request_bodies));
        }

        if let Some(Value::Object(definitions)) = source.get("securityDefinitions") {
            let mut schemes = Map::new();
            for (name, definition) in definitions {
                schemes.insert(name.clone(), security::convert_security_scheme(name, definition)?);
            }
            components.insert("securitySchemes".to_string(), Value::Object(schemes));
        }

        Ok(components)
    }

    /// Component key for a definition name, sanitized in patch mode
    fn component_key(&mut self, name: &str) -> String {
        if !self.patch || is_valid_component_key(name) {
            return name.to_string();
        }
        let key = sanitize_component_key(name);
        debug!(from = name, to = %key, "renaming schema component");
        self.refs.renamed_schemas.insert(name.to_string(), key.clone());
        self.patches += 1;
        key
    }

    fn fix_info(&mut self, info: Option<&Value>) -> Result<Value> {
        let mut info = match info {
            Some(Value::Object(info)) => info.clone(),
            Some(_) | None => {
                if !self.patch {
                    return Err(Error::conversion_at("Missing or invalid info object", "/info"));
                }
                self.patches += 1;
                Map::new()
            }
        };

        for (field, default) in [("title", ""), ("version", "1.0.0")] {
            let fixed = match info.get(field) {
                Some(Value::String(_)) => continue,
                Some(Value::Null) | None => default.to_string(),
                Some(other) => other.to_string(),
            };
            if !self.patch {
                return Err(Error::conversion_at(
                    format!("info.{} must be a string", field),
                    pointer::join("/info", field),
                ));
            }
            debug!(field, value = %fixed, "patching info field");
            info.insert(field.to_string(), Value::String(fixed));
            self.patches += 1;
        }
        Ok(Value::Object(info))
    }
}
