//! Security definitions to OpenAPI 3.0 security schemes

use crate::error::{Error, Result};
use crate::pointer;
use serde_json::{Map, Value};

/// Convert one Swagger 2.0 security definition
pub fn convert_security_scheme(name: &str, definition: &Value) -> Result<Value> {
    let at = pointer::join("/securityDefinitions", name);
    let obj = definition
        .as_object()
        .ok_or_else(|| Error::conversion_at("Security definition must be an object", at.clone()))?;

    let mut scheme = Map::new();
    match obj.get("type").and_then(Value::as_str) {
        Some("basic") => {
            scheme.insert("type".into(), "http".into());
            scheme.insert("scheme".into(), "basic".into());
        }
        Some("apiKey") => {
            scheme.insert("type".into(), "apiKey".into());
            for key in ["name", "in"] {
                if let Some(value) = obj.get(key) {
                    scheme.insert(key.into(), value.clone());
                }
            }
        }
        Some("oauth2") => {
            scheme.insert("type".into(), "oauth2".into());
            scheme.insert("flows".into(), oauth2_flows(obj, &at)?);
        }
        other => {
            return Err(Error::conversion_at(
                format!("Unsupported security scheme type: {}", other.unwrap_or("<missing>")),
                at,
            ))
        }
    }

    if let Some(description) = obj.get("description") {
        scheme.insert("description".into(), description.clone());
    }
    for (key, value) in obj.iter().filter(|(key, _)| key.starts_with("x-")) {
        scheme.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(scheme))
}

fn oauth2_flows(definition: &Map<String, Value>, at: &str) -> Result<Value> {
    let flow = definition.get("flow").and_then(Value::as_str).unwrap_or_default();
    let (name, urls): (&str, &[&str]) = match flow {
        "implicit" => ("implicit", &["authorizationUrl"][..]),
        "password" => ("password", &["tokenUrl"][..]),
        "application" => ("clientCredentials", &["tokenUrl"][..]),
        "accessCode" => ("authorizationCode", &["authorizationUrl", "tokenUrl"][..]),
        other => {
            return Err(Error::conversion_at(
                format!("Unsupported OAuth2 flow: {}", other),
                at.to_string(),
            ))
        }
    };

    let mut body = Map::new();
    for url in urls {
        if let Some(value) = definition.get(*url) {
            body.insert((*url).to_string(), value.clone());
        }
    }
    body.insert(
        "scopes".into(),
        definition.get("scopes").cloned().unwrap_or_else(|| Value::Object(Map::new())),
    );

    let mut flows = Map::new();
    flows.insert(name.to_string(), Value::Object(body));
    Ok(Value::Object(flows))
}
