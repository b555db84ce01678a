//! Response objects

use super::parameters::convert_header;
use super::schema::fix_schema;
use super::Upgrade;
use crate::error::{Error, Result};
use crate::pointer;
use serde_json::{Map, Value};
use tracing::debug;

impl Upgrade {
    /// Convert an operation's `responses` map
    pub(super) fn convert_responses(
        &mut self,
        responses: &Value,
        produces: &[String],
        at: &str,
    ) -> Result<Value> {
        let Some(map) = responses.as_object() else {
            return Ok(responses.clone());
        };

        let mut out = Map::new();
        for (code, response) in map {
            let converted = if code.starts_with("x-") {
                response.clone()
            } else {
                self.convert_response(response, produces, &pointer::join(at, code))?
            };
            out.insert(code.clone(), converted);
        }
        Ok(Value::Object(out))
    }

    /// Convert a single response, moving its schema under `content`
    pub(super) fn convert_response(
        &mut self,
        response: &Value,
        produces: &[String],
        at: &str,
    ) -> Result<Value> {
        let Some(obj) = response.as_object() else {
            return Ok(response.clone());
        };
        if obj.contains_key("$ref") {
            return Ok(response.clone());
        }

        let mut out = Map::new();
        if !obj.contains_key("description") {
            if !self.patch {
                return Err(Error::conversion_at("Response is missing a description", at));
            }
            debug!(pointer = at, "patching missing response description");
            self.patches += 1;
            out.insert("description".to_string(), Value::String(String::new()));
        }

        for (key, value) in obj {
            match key.as_str() {
                "schema" | "examples" => {}
                "headers" => {
                    let headers = match value.as_object() {
                        Some(headers) => Value::Object(
                            headers
                                .iter()
                                .map(|(name, header)| (name.clone(), convert_header(header)))
                                .collect(),
                        ),
                        None => value.clone(),
                    };
                    out.insert(key.clone(), headers);
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }

        let content = response_content(obj, produces);
        if !content.is_empty() {
            out.insert("content".to_string(), Value::Object(content));
        }
        Ok(Value::Object(out))
    }
}

fn response_content(response: &Map<String, Value>, produces: &[String]) -> Map<String, Value> {
    let mut content = Map::new();
    if let Some(schema) = response.get("schema") {
        let mut schema = schema.clone();
        fix_schema(&mut schema);
        for media_type in produces {
            let mut media = Map::new();
            media.insert("schema".to_string(), schema.clone());
            content.insert(media_type.clone(), Value::Object(media));
        }
    }

    if let Some(Value::Object(examples)) = response.get("examples") {
        for (media_type, example) in examples {
            let entry = content
                .entry(media_type.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(media) = entry {
                media.insert("example".to_string(), example.clone());
            }
        }
    }
    content
}
