//! Path items and operations

use super::parameters::{convert_parameter, form_request_body, request_body};
use super::{string_list, Upgrade};
use crate::error::{Error, Result};
use crate::pointer;
use serde_json::{json, Map, Value};
use tracing::debug;

/// HTTP methods that may appear as operations on a path item
pub const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Where a request body comes from
#[derive(Debug, Clone)]
enum BodySource {
    Inline(Map<String, Value>),
    Component(String),
}

/// Parameters of a path item or operation, sorted by destination
#[derive(Debug, Clone, Default)]
struct SplitParameters {
    parameters: Vec<Value>,
    body: Option<BodySource>,
    form: Vec<Map<String, Value>>,
}

impl Upgrade {
    pub(super) fn convert_paths(&mut self, paths: &Map<String, Value>) -> Result<Value> {
        let mut out = Map::new();
        for (path, item) in paths {
            if path.starts_with("x-") {
                out.insert(path.clone(), item.clone());
                continue;
            }
            let at = pointer::join("/paths", path);
            let item = item
                .as_object()
                .ok_or_else(|| Error::conversion_at("Path item must be an object", at.clone()))?;
            out.insert(path.clone(), self.convert_path_item(item, &at)?);
        }
        Ok(Value::Object(out))
    }

    fn convert_path_item(&mut self, item: &Map<String, Value>, at: &str) -> Result<Value> {
        let shared = match item.get("parameters") {
            Some(Value::Array(list)) => {
                self.split_parameters(list, &pointer::join(at, "parameters"))?
            }
            _ => SplitParameters::default(),
        };

        let mut out = Map::new();
        for (key, value) in item {
            match key.as_str() {
                "parameters" => {
                    if !shared.parameters.is_empty() {
                        out.insert(key.clone(), Value::Array(shared.parameters.clone()));
                    }
                }
                method if HTTP_METHODS.contains(&method) => {
                    let op_at = pointer::join(at, method);
                    let operation = value.as_object().ok_or_else(|| {
                        Error::conversion_at("Operation must be an object", op_at.clone())
                    })?;
                    out.insert(key.clone(), self.convert_operation(operation, &shared, &op_at)?);
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(Value::Object(out))
    }

    fn convert_operation(
        &mut self,
        operation: &Map<String, Value>,
        shared: &SplitParameters,
        at: &str,
    ) -> Result<Value> {
        let consumes = media_types(operation.get("consumes"), &self.consumes);
        let produces = media_types(operation.get("produces"), &self.produces);

        let own = match operation.get("parameters") {
            Some(Value::Array(list)) => {
                self.split_parameters(list, &pointer::join(at, "parameters"))?
            }
            _ => SplitParameters::default(),
        };

        let mut form = own.form.clone();
        for param in &shared.form {
            let name = param.get("name");
            if !form.iter().any(|p| p.get("name") == name) {
                form.push(param.clone());
            }
        }
        let mut body = match own.body.as_ref().or(shared.body.as_ref()) {
            Some(BodySource::Inline(param)) => Some(request_body(param, &consumes)),
            Some(BodySource::Component(name)) => Some(json!({
                "$ref": format!("#/components/requestBodies/{}", pointer::escape(name))
            })),
            None if !form.is_empty() => Some(form_request_body(&form, &consumes)),
            None => None,
        };

        let mut out = Map::new();
        for (key, value) in operation {
            match key.as_str() {
                "parameters" => {
                    if !own.parameters.is_empty() {
                        out.insert(key.clone(), Value::Array(own.parameters.clone()));
                    }
                    if let Some(body) = body.take() {
                        out.insert("requestBody".to_string(), body);
                    }
                }
                "consumes" | "produces" => {}
                "schemes" => debug!(pointer = at, "dropping operation-level schemes"),
                "responses" => {
                    let responses_at = pointer::join(at, "responses");
                    let responses = self.convert_responses(value, &produces, &responses_at)?;
                    out.insert(key.clone(), responses);
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(body) = body {
            out.insert("requestBody".to_string(), body);
        }
        Ok(Value::Object(out))
    }

    fn split_parameters(&mut self, list: &[Value], at: &str) -> Result<SplitParameters> {
        let mut split = SplitParameters::default();
        for (index, param) in list.iter().enumerate() {
            let param_at = pointer::join(at, &index.to_string());
            let obj = param.as_object().ok_or_else(|| {
                Error::conversion_at("Parameter must be an object", param_at.clone())
            })?;

            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                let target = reference
                    .strip_prefix("#/parameters/")
                    .map(pointer::unescape)
                    .and_then(|name| self.parameters.get(&name).map(|p| (name, p)));
                match target {
                    Some((name, Value::Object(global))) if location_of(global) == Some("body") => {
                        split.body = Some(BodySource::Component(name));
                    }
                    Some((_, Value::Object(global))) if location_of(global) == Some("formData") => {
                        split.form.push(global.clone());
                    }
                    _ => split.parameters.push(param.clone()),
                }
                continue;
            }

            match location_of(obj) {
                Some("body") => split.body = Some(BodySource::Inline(obj.clone())),
                Some("formData") => split.form.push(obj.clone()),
                _ => {
                    let mut obj = obj.clone();
                    self.require_path_parameter(&mut obj, &param_at)?;
                    split.parameters.push(convert_parameter(&obj));
                }
            }
        }
        Ok(split)
    }

    /// Ensure a path parameter is marked required
    pub(super) fn require_path_parameter(
        &mut self,
        param: &mut Map<String, Value>,
        at: &str,
    ) -> Result<()> {
        if location_of(param) != Some("path") || param.get("required") == Some(&Value::Bool(true)) {
            return Ok(());
        }
        if !self.patch {
            let name = param.get("name").and_then(Value::as_str).unwrap_or_default();
            return Err(Error::conversion_at(
                format!("Path parameter '{}' must be required", name),
                at,
            ));
        }
        debug!(pointer = at, "patching path parameter to required");
        param.insert("required".to_string(), Value::Bool(true));
        self.patches += 1;
        Ok(())
    }
}

fn location_of(param: &Map<String, Value>) -> Option<&str> {
    param.get("in").and_then(Value::as_str)
}

/// Operation-level media types, falling back to the document defaults
fn media_types(local: Option<&Value>, global: &[String]) -> Vec<String> {
    let local = string_list(local);
    if !local.is_empty() {
        local
    } else if !global.is_empty() {
        global.to_vec()
    } else {
        vec!["application/json".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_media_type_fallbacks() {
        let global = vec!["application/xml".to_string()];
        assert_eq!(media_types(Some(&json!(["text/plain"])), &global), vec!["text/plain"]);
        assert_eq!(media_types(None, &global), vec!["application/xml"]);
        assert_eq!(media_types(None, &[]), vec!["application/json"]);
    }

    #[test]
    fn test_operation_body_and_parameters() {
        let mut upgrade = Upgrade::default();
        let paths = json!({
            "/pets/{petId}": {
                "parameters": [{"name": "petId", "in": "path", "required": true, "type": "string"}],
                "put": {
                    "operationId": "updatePet",
                    "consumes": ["application/json"],
                    "parameters": [
                        {"name": "pet", "in": "body", "required": true, "schema": {"$ref": "#/definitions/Pet"}}
                    ],
                    "responses": {"204": {"description": "Updated"}}
                }
            }
        });
        let converted = upgrade.convert_paths(paths.as_object().unwrap()).unwrap();
        assert_eq!(
            converted,
            json!({
                "/pets/{petId}": {
                    "parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}],
                    "put": {
                        "operationId": "updatePet",
                        "requestBody": {
                            "content": {"application/json": {"schema": {"$ref": "#/definitions/Pet"}}},
                            "required": true
                        },
                        "responses": {"204": {"description": "Updated"}}
                    }
                }
            })
        );
    }

    #[test]
    fn test_body_parameter_reference_points_at_request_bodies() {
        let mut upgrade = Upgrade::default();
        upgrade.parameters.insert(
            "PetBody".to_string(),
            json!({"name": "pet", "in": "body", "schema": {"type": "object"}}),
        );
        let paths = json!({
            "/pets": {"post": {
                "parameters": [{"$ref": "#/parameters/PetBody"}],
                "responses": {"201": {"description": "Created"}}
            }}
        });
        let converted = upgrade.convert_paths(paths.as_object().unwrap()).unwrap();
        let operation = &converted["/pets"]["post"];
        assert!(operation.get("parameters").is_none());
        assert_eq!(operation["requestBody"], json!({"$ref": "#/components/requestBodies/PetBody"}));
    }

    #[test]
    fn test_path_parameter_not_required() {
        let paths = json!({
            "/pets/{id}": {"get": {
                "parameters": [{"name": "id", "in": "path", "type": "string"}],
                "responses": {"200": {"description": "ok"}}
            }}
        });

        let mut strict = Upgrade::default();
        let err = strict.convert_paths(paths.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Path parameter 'id' must be required"));

        let mut patching = Upgrade {
            patch: true,
            ..Upgrade::default()
        };
        let converted = patching.convert_paths(paths.as_object().unwrap()).unwrap();
        assert_eq!(converted["/pets/{id}"]["get"]["parameters"][0]["required"], true);
        assert_eq!(patching.patches, 1);
    }

    #[test]
    fn test_path_level_form_data_applies_to_operations() {
        let mut upgrade = Upgrade::default();
        let paths = json!({
            "/upload": {
                "parameters": [{"name": "file", "in": "formData", "type": "file"}],
                "post": {"responses": {"200": {"description": "ok"}}}
            }
        });
        let converted = upgrade.convert_paths(paths.as_object().unwrap()).unwrap();
        let item = &converted["/upload"];
        assert!(item.get("parameters").is_none());
        assert!(item["post"]["requestBody"]["content"]["multipart/form-data"].is_object());
    }
}
