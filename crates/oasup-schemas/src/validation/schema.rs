//! JSON Schema check against the OpenAPI 3.0 schema

use crate::validation::error::SchemaError;
use oasup_core::Warning;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

// Embed the schema at compile time for reliability
const OPENAPI_3_0_SCHEMA: &str = include_str!("../../schemas/openapi-3.0.schema.json");

/// Environment variable naming a schema file that replaces the embedded one
pub const SCHEMA_PATH_ENV: &str = "OASUP_SCHEMA_PATH";

/// The compiled OpenAPI 3.0 JSON Schema
pub struct OpenApiSchema {
    schema: Value,
    validator: jsonschema::Validator,
}

impl fmt::Debug for OpenApiSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiSchema")
            .field("description", &self.schema.get("description"))
            .finish_non_exhaustive()
    }
}

impl OpenApiSchema {
    /// Load the schema named by `OASUP_SCHEMA_PATH`, or the embedded one
    pub fn new() -> Result<Self, SchemaError> {
        if let Ok(schema_path) = std::env::var(SCHEMA_PATH_ENV) {
            let path = Path::new(&schema_path);
            if path.exists() {
                debug!(path = %path.display(), "loading OpenAPI schema override");
                return Self::from_path(path);
            }
            warn!(path = %path.display(), "schema override not found, using embedded schema");
        }
        Self::embedded()
    }

    /// The schema compiled into this crate
    pub fn embedded() -> Result<Self, SchemaError> {
        Self::from_value(serde_json::from_str(OPENAPI_3_0_SCHEMA)?)
    }

    /// Load a schema from a file (useful for testing)
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(serde_json::from_str(&content)?)
    }

    /// Compile a draft-04 schema value
    pub fn from_value(schema: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::draft4::new(&schema).map_err(|e| SchemaError::Compile {
            message: e.to_string(),
        })?;
        Ok(Self { schema, validator })
    }

    /// The raw schema document
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Validate a document, returning one warning per violation in detection order
    pub fn check(&self, document: &Value, prettify: bool) -> Vec<Warning> {
        self.validator
            .iter_errors(document)
            .map(|error| {
                let schema_path = error.schema_path.to_string();
                let keyword = schema_path.rsplit('/').next().unwrap_or_default().to_string();
                let mut message = error.to_string();
                if prettify {
                    message = prettify_message(&message, &error.instance);
                }
                let pointer = error.instance_path.to_string();
                Warning::schema_violation(message, pointer, keyword, schema_path)
            })
            .collect()
    }
}

/// Replace the echoed JSON of an offending value with a short summary
pub fn prettify_message(message: &str, instance: &Value) -> String {
    if !matches!(instance, Value::Object(_) | Value::Array(_) | Value::String(_)) {
        return message.to_string();
    }
    let echoed = instance.to_string();
    let summary = summarize(instance);
    if echoed == summary {
        return message.to_string();
    }
    message.replacen(&echoed, &summary, 1)
}

/// A compact, single-line description of a JSON value
pub fn summarize(value: &Value) -> String {
    const MAX_KEYS: usize = 3;
    const MAX_STRING: usize = 40;

    match value {
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let mut keys: Vec<&str> = map.keys().take(MAX_KEYS).map(String::as_str).collect();
            if map.len() > MAX_KEYS {
                keys.push("...");
            }
            format!("{{{}}}", keys.join(", "))
        }
        Value::Array(items) => match items.len() {
            1 => "[1 item]".to_string(),
            n => format!("[{} items]", n),
        },
        Value::String(s) if s.chars().count() > MAX_STRING => {
            let head: String = s.chars().take(MAX_STRING).collect();
            format!("\"{}...\"", head)
        }
        other => other.to_string(),
    }
}
