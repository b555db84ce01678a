//! Source format detection and document serialization
//!
//! The format of a document is decided by its content rather than its
//! file extension: text that parses as JSON is JSON, anything else that
//! parses as YAML is YAML.

use crate::error::{Error, Result};
use crate::types::SourceFormat;
use serde_json::Value;
use tracing::debug;

/// Parse source text, detecting its format from the content
pub fn parse_document(text: &str, designator: &str) -> Result<(Value, SourceFormat)> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            debug!(designator, "source parsed as JSON");
            Ok((value, SourceFormat::Json))
        }
        Err(json_err) => match serde_yaml::from_str::<Value>(text) {
            Ok(value) => {
                debug!(designator, "source parsed as YAML");
                Ok((value, SourceFormat::Yaml))
            }
            Err(yaml_err) => Err(Error::Parse {
                designator: designator.to_string(),
                message: format!("JSON: {}; YAML: {}", json_err, yaml_err),
            }),
        },
    }
}

/// Serialize a document in the given format
///
/// JSON output is pretty-printed with a two-space indent.
pub fn serialize_document(document: &Value, format: SourceFormat) -> Result<String> {
    match format {
        SourceFormat::Yaml => Ok(serde_yaml::to_string(document)?),
        SourceFormat::Json => Ok(serde_json::to_string_pretty(document)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_content_is_json_regardless_of_name() {
        let (value, format) = parse_document(r#"{"swagger": "2.0"}"#, "petstore.yaml").unwrap();
        assert_eq!(format, SourceFormat::Json);
        assert_eq!(value["swagger"], "2.0");
    }

    #[test]
    fn test_block_yaml_is_yaml() {
        let (value, format) =
            parse_document("swagger: '2.0'\ninfo:\n  title: Pets\n", "api.yaml").unwrap();
        assert_eq!(format, SourceFormat::Yaml);
        assert_eq!(value["info"]["title"], "Pets");
    }

    #[test]
    fn test_unparseable_text_is_a_parse_error() {
        let err = parse_document("{ \"unterminated\": [", "bad.json").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_json_output_uses_two_space_indent() {
        let document = json!({"openapi": "3.0.0", "info": {}});
        let text = serialize_document(&document, SourceFormat::Json).unwrap();
        assert!(text.starts_with("{\n  \"openapi\": \"3.0.0\""));
    }

    #[test]
    fn test_yaml_output_is_line_oriented() {
        let document = json!({"openapi": "3.0.0", "paths": {}});
        let text = serialize_document(&document, SourceFormat::Yaml).unwrap();
        assert!(text.starts_with("openapi:"));
        assert!(!text.trim_start().starts_with('{'));
    }
}
