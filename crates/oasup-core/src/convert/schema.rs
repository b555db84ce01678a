//! Schema object fixups and reference rewriting

use crate::pointer;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Keywords whose values are themselves schemas
const SUBSCHEMA_KEYWORDS: &[&str] = &["items", "additionalProperties", "not"];
/// Keywords whose values are arrays of schemas
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

static COMPONENT_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9.\-_]+$").unwrap());

/// Whether a name is usable as an OpenAPI 3 component key
pub fn is_valid_component_key(key: &str) -> bool {
    COMPONENT_KEY_RE.is_match(key)
}

/// Replace characters not allowed in component keys
pub fn sanitize_component_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Rewrite Swagger 2.0 schema idioms into their OpenAPI 3.0 form
///
/// Applies recursively to nested schemas.
pub fn fix_schema(schema: &mut Value) {
    let Value::Object(obj) = schema else {
        return;
    };

    for (key, value) in std::mem::take(obj) {
        if key == "x-nullable" {
            obj.insert("nullable".to_string(), value);
            continue;
        }
        let value = match value {
            Value::String(property) if key == "discriminator" => {
                let mut discriminator = Map::new();
                discriminator.insert("propertyName".to_string(), Value::String(property));
                Value::Object(discriminator)
            }
            other => other,
        };
        obj.insert(key, value);
    }

    if obj.get("type").and_then(Value::as_str) == Some("file") {
        obj.insert("type".to_string(), Value::String("string".to_string()));
        obj.insert("format".to_string(), Value::String("binary".to_string()));
    }

    if let Some(Value::Object(properties)) = obj.get_mut("properties") {
        properties.values_mut().for_each(fix_schema);
    }
    for keyword in SUBSCHEMA_KEYWORDS {
        if let Some(child) = obj.get_mut(*keyword) {
            fix_schema(child);
        }
    }
    for keyword in SUBSCHEMA_LIST_KEYWORDS {
        if let Some(Value::Array(children)) = obj.get_mut(*keyword) {
            children.iter_mut().for_each(fix_schema);
        }
    }
}

/// Maps Swagger 2.0 local references onto OpenAPI 3.0 component paths
#[derive(Debug, Default, Clone)]
pub struct RefRewriter {
    /// Names of `#/parameters/` entries that are body parameters
    pub body_parameters: HashSet<String>,
    /// Definitions renamed to valid component keys
    pub renamed_schemas: HashMap<String, String>,
}

impl RefRewriter {
    /// Rewrite a single reference string
    pub fn rewrite(&self, reference: &str) -> String {
        if let Some(rest) = reference.strip_prefix("#/definitions/") {
            let (name, tail) = split_first_token(rest);
            let decoded = pointer::unescape(name);
            let target = self.renamed_schemas.get(&decoded).unwrap_or(&decoded);
            return format!("#/components/schemas/{}{}", pointer::escape(target), tail);
        }
        if let Some(name) = reference.strip_prefix("#/parameters/") {
            let (parameter, _) = split_first_token(name);
            let section = if self.body_parameters.contains(&pointer::unescape(parameter)) {
                "requestBodies"
            } else {
                "parameters"
            };
            return format!("#/components/{}/{}", section, name);
        }
        if let Some(name) = reference.strip_prefix("#/responses/") {
            return format!("#/components/responses/{}", name);
        }
        reference.to_string()
    }

    /// Rewrite every `$ref` in a document tree
    pub fn rewrite_all(&self, value: &mut Value) {
        match value {
            Value::Object(obj) => {
                for (key, child) in obj.iter_mut() {
                    if key == "$ref" {
                        if let Value::String(reference) = child {
                            *reference = self.rewrite(reference);
                            continue;
                        }
                    }
                    self.rewrite_all(child);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|item| self.rewrite_all(item)),
            _ => {}
        }
    }
}

/// Split `Name/rest/of/path` into `Name` and `/rest/of/path`
fn split_first_token(path: &str) -> (&str, &str) {
    match path.find('/') {
        Some(index) => path.split_at(index),
        None => (path, ""),
    }
}
