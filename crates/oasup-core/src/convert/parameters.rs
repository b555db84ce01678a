//! Parameters, request bodies and headers

use super::schema::fix_schema;
use serde_json::{json, Map, Value};

/// Parameter keys that describe the value and move into `schema`
const SCHEMA_KEYS: &[&str] = &[
    "type",
    "format",
    "items",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "enum",
    "multipleOf",
    "x-nullable",
];

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Split value keywords out of a parameter or header
///
/// Returns the remaining keys and the assembled schema.
fn split_schema(source: &Map<String, Value>) -> (Map<String, Value>, Value) {
    let mut rest = Map::new();
    let mut schema = Map::new();
    for (key, value) in source {
        if SCHEMA_KEYS.contains(&key.as_str()) {
            schema.insert(key.clone(), value.clone());
        } else {
            rest.insert(key.clone(), value.clone());
        }
    }
    if let Some(Value::Object(items)) = schema.get_mut("items") {
        strip_collection_format(items);
    }
    let mut schema = Value::Object(schema);
    fix_schema(&mut schema);
    (rest, schema)
}

fn strip_collection_format(items: &mut Map<String, Value>) {
    let nested = std::mem::take(items);
    for (key, value) in nested {
        if key != "collectionFormat" {
            items.insert(key, value);
        }
    }
    if let Some(Value::Object(inner)) = items.get_mut("items") {
        strip_collection_format(inner);
    }
}

/// `style`/`explode` for a Swagger 2.0 `collectionFormat`
fn collection_style(format: &str, location: &str) -> Option<(&'static str, bool)> {
    match (format, location) {
        ("csv", "query") => Some(("form", false)),
        ("csv", "path") | ("csv", "header") => Some(("simple", false)),
        ("ssv", _) => Some(("spaceDelimited", false)),
        ("pipes", _) => Some(("pipeDelimited", false)),
        ("multi", _) => Some(("form", true)),
        _ => None,
    }
}

/// Convert a non-body, non-form parameter
pub fn convert_parameter(param: &Map<String, Value>) -> Value {
    let (rest, schema) = split_schema(param);
    let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
    let is_array = schema.get("type").and_then(Value::as_str) == Some("array");

    let mut out = Map::new();
    for (key, value) in rest {
        match key.as_str() {
            "collectionFormat" => {}
            "x-example" => {
                out.insert("example".to_string(), value);
            }
            _ => {
                out.insert(key, value);
            }
        }
    }

    if is_array {
        let format = param
            .get("collectionFormat")
            .and_then(Value::as_str)
            .unwrap_or("csv");
        if let Some((style, explode)) = collection_style(format, location) {
            out.insert("style".to_string(), json!(style));
            out.insert("explode".to_string(), json!(explode));
        }
    }

    out.insert("schema".to_string(), schema);
    Value::Object(out)
}

/// Build a request body from a `body` parameter
pub fn request_body(param: &Map<String, Value>, consumes: &[String]) -> Value {
    let mut schema = param.get("schema").cloned().unwrap_or_else(|| json!({}));
    fix_schema(&mut schema);
    let examples = param.get("x-examples").and_then(Value::as_object);

    let mut content = Map::new();
    for media_type in consumes {
        let mut media = Map::new();
        media.insert("schema".to_string(), schema.clone());
        if let Some(example) = examples.and_then(|e| e.get(media_type)) {
            media.insert("example".to_string(), example.clone());
        }
        content.insert(media_type.clone(), Value::Object(media));
    }

    let mut body = Map::new();
    if let Some(description) = param.get("description") {
        body.insert("description".to_string(), description.clone());
    }
    body.insert("content".to_string(), Value::Object(content));
    if param.get("required").and_then(Value::as_bool) == Some(true) {
        body.insert("required".to_string(), Value::Bool(true));
    }
    for (key, value) in param.iter().filter(|(k, _)| k.starts_with("x-") && *k != "x-examples") {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

/// Build a request body from `formData` parameters
pub fn form_request_body(params: &[Map<String, Value>], consumes: &[String]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut has_file = false;

    for param in params {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            continue;
        };
        has_file |= param.get("type").and_then(Value::as_str) == Some("file");

        let (_, mut schema) = split_schema(param);
        if let (Some(description), Value::Object(obj)) = (param.get("description"), &mut schema) {
            obj.insert("description".to_string(), description.clone());
        }
        properties.insert(name.to_string(), schema);

        if param.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(Value::String(name.to_string()));
        }
    }

    let media_type = if has_file || consumes.iter().any(|c| c == MULTIPART) {
        MULTIPART
    } else {
        FORM_URLENCODED
    };

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    json!({ "content": { media_type: { "schema": Value::Object(schema) } } })
}

/// Convert a response header
pub fn convert_header(header: &Value) -> Value {
    let Some(obj) = header.as_object() else {
        return header.clone();
    };
    if obj.contains_key("$ref") {
        return header.clone();
    }
    let (rest, schema) = split_schema(obj);
    let mut out: Map<String, Value> = rest
        .into_iter()
        .filter(|(key, _)| key != "collectionFormat")
        .collect();
    out.insert("schema".to_string(), schema);
    Value::Object(out)
}
