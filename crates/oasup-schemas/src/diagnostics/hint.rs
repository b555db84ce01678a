//! Human hints derived from the violated schema rule

use oasup_core::pointer;
use regex::Regex;
use serde_json::{Map, Value};

/// Minimum similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.7;
/// Property and enum listings longer than this are cut
const MAX_LISTED: usize = 12;

/// Follow a schema path through the schema, jumping across `$ref`s
pub fn resolve_schema_path<'s>(schema: &'s Value, path: &str) -> Option<&'s Value> {
    let mut node = schema;
    for segment in pointer::segments(path) {
        if segment == "$ref" {
            node = follow_ref(schema, node)?;
            continue;
        }
        if node.get(&segment).is_none() && node.get("$ref").is_some() {
            node = follow_ref(schema, node)?;
        }
        node = match node {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

fn follow_ref<'s>(schema: &'s Value, node: &'s Value) -> Option<&'s Value> {
    let reference = node.get("$ref")?.as_str()?;
    schema.pointer(pointer::local_ref(reference)?)
}

/// JSON type name of a document value
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    let actual = type_name(value);
    actual == expected || (expected == "number" && actual == "integer")
}

/// The closest candidate to `input`, if it is similar enough
pub fn suggest<'c>(input: &str, candidates: impl IntoIterator<Item = &'c str>) -> Option<&'c str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(input, candidate)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}

fn listing<'v>(values: impl Iterator<Item = &'v str>) -> String {
    let values: Vec<&str> = values.collect();
    if values.len() > MAX_LISTED {
        format!("{}, ...", values[..MAX_LISTED].join(", "))
    } else {
        values.join(", ")
    }
}

/// Explain why `instance` violates `keyword` of the schema node at `parent`
pub fn hint(schema: &Value, parent: &Value, keyword: &str, instance: &Value) -> Option<String> {
    let rule = parent.get(keyword)?;
    match keyword {
        "type" => {
            let expected = match rule {
                Value::Array(types) => listing(types.iter().filter_map(Value::as_str)),
                other => other.as_str()?.to_string(),
            };
            Some(format!("expected type {}, found {}", expected, type_name(instance)))
        }
        "enum" => {
            let allowed: Vec<&str> = rule.as_array()?.iter().filter_map(Value::as_str).collect();
            let mut text = format!("allowed values: {}", listing(allowed.iter().copied()));
            let guess = instance
                .as_str()
                .and_then(|s| suggest(s, allowed.iter().copied()));
            if let Some(guess) = guess {
                text.push_str(&format!("\ndid you mean '{}'?", guess));
            }
            Some(text)
        }
        "required" => {
            let object = instance.as_object()?;
            let missing: Vec<&str> = rule
                .as_array()?
                .iter()
                .filter_map(Value::as_str)
                .filter(|name| !object.contains_key(*name))
                .collect();
            match missing.as_slice() {
                [] => None,
                [one] => Some(format!("missing required property '{}'", one)),
                many => Some(format!("missing required properties: {}", many.join(", "))),
            }
        }
        "additionalProperties" => additional_properties(parent, instance),
        "oneOf" | "anyOf" => branches(schema, rule, instance),
        "pattern" => Some(format!("value must match pattern {}", rule.as_str()?)),
        "minProperties" => Some(format!("object must have at least {} properties", rule)),
        "minItems" => Some(format!("array must have at least {} items", rule)),
        "uniqueItems" => Some("array items must be unique".to_string()),
        _ => None,
    }
}

fn additional_properties(parent: &Value, instance: &Value) -> Option<String> {
    let object = instance.as_object()?;
    let known: Vec<&str> = parent
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| props.keys().map(String::as_str).collect())
        .unwrap_or_default();
    let patterns: Vec<Regex> = parent
        .get("patternProperties")
        .and_then(Value::as_object)
        .map(|patterns| patterns.keys().filter_map(|p| Regex::new(p).ok()).collect())
        .unwrap_or_default();

    let unexpected: Vec<&str> = object
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key) && !patterns.iter().any(|re| re.is_match(key)))
        .collect();
    if unexpected.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    for key in &unexpected {
        match suggest(key, known.iter().copied()) {
            Some(guess) => lines.push(format!(
                "unexpected property '{}', did you mean '{}'?",
                key, guess
            )),
            None => lines.push(format!("unexpected property '{}'", key)),
        }
    }
    if !known.is_empty() {
        lines.push(format!("allowed properties: {}", listing(known.iter().copied())));
    }
    Some(lines.join("\n"))
}

/// Name each alternative of a `oneOf`/`anyOf` and say why the value misses it
fn branches(schema: &Value, rule: &Value, instance: &Value) -> Option<String> {
    let alternatives = rule.as_array()?;
    let mut lines = Vec::new();
    for alternative in alternatives {
        let name = alternative
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.rsplit('/').next())
            .unwrap_or("schema");
        let resolved = follow_ref(schema, alternative).unwrap_or(alternative);
        match mismatch(resolved, instance) {
            Some(reason) => lines.push(format!("not {}: {}", name, reason)),
            None => lines.push(format!("not {}", name)),
        }
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// First shallow reason an object fails a schema: a missing required
/// property or a property of the wrong type
fn mismatch(branch: &Value, instance: &Value) -> Option<String> {
    let object = instance.as_object()?;
    let required = branch.get("required").and_then(Value::as_array);
    if let Some(missing) = required
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|name| !object.contains_key(*name))
    {
        return Some(format!("missing required property '{}'", missing));
    }

    let properties: Option<&Map<String, Value>> =
        branch.get("properties").and_then(Value::as_object);
    for (key, value) in object {
        let Some(expected) = properties
            .and_then(|props| props.get(key))
            .and_then(|prop| prop.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !matches_type(expected, value) {
            return Some(format!(
                "property '{}' expected type {}, found {}",
                key,
                expected,
                type_name(value)
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Value {
        json!({
            "properties": {"info": {"$ref": "#/definitions/Info"}},
            "definitions": {
                "Info": {
                    "type": "object",
                    "required": ["title", "version"],
                    "properties": {"title": {"type": "string"}, "version": {"type": "string"}},
                    "patternProperties": {"^x-": {}},
                    "additionalProperties": false
                },
                "Reference": {"type": "object", "required": ["$ref"]}
            }
        })
    }

    #[test]
    fn test_resolve_schema_path_follows_refs() {
        let schema = schema();
        let node = resolve_schema_path(&schema, "/properties/info/$ref/properties/title").unwrap();
        assert_eq!(node, &json!({"type": "string"}));
        assert!(resolve_schema_path(&schema, "/properties/nope").is_none());
    }

    #[test]
    fn test_type_and_required_hints() {
        let schema = schema();
        let info = &schema["definitions"]["Info"];
        let title = &info["properties"]["title"];
        assert_eq!(
            hint(&schema, title, "type", &json!(42)).as_deref(),
            Some("expected type string, found integer")
        );
        assert_eq!(
            hint(&schema, info, "required", &json!({"version": "1"})).as_deref(),
            Some("missing required property 'title'")
        );
    }

    #[test]
    fn test_additional_properties_suggests() {
        let schema = schema();
        let info = &schema["definitions"]["Info"];
        let instance = json!({"titel": "x", "x-logo": {}});
        let text = hint(&schema, info, "additionalProperties", &instance).unwrap();
        assert!(text.starts_with("unexpected property 'titel', did you mean 'title'?"));
        assert!(text.ends_with("allowed properties: title, version"));
    }

    #[test]
    fn test_enum_suggestion() {
        let schema = json!({"in": {"enum": ["header", "query", "cookie"]}});
        let text = hint(&schema, &schema["in"], "enum", &json!("qeury")).unwrap();
        assert_eq!(text, "allowed values: header, query, cookie\ndid you mean 'query'?");
    }

    #[test]
    fn test_one_of_branches_explain_mismatch() {
        let schema = json!({
            "definitions": {
                "Response": {
                    "required": ["description"],
                    "properties": {"description": {"type": "string"}}
                },
                "Reference": {"required": ["$ref"]}
            },
            "node": {"oneOf": [{"$ref": "#/definitions/Response"}, {"$ref": "#/definitions/Reference"}]}
        });
        let text = hint(&schema, &schema["node"], "oneOf", &json!({"description": 42})).unwrap();
        assert_eq!(
            text,
            "not Response: property 'description' expected type string, found integer\n\
             not Reference: missing required property '$ref'"
        );
    }

    #[test]
    fn test_suggest_threshold() {
        assert_eq!(suggest("summry", ["summary", "description"]), Some("summary"));
        assert_eq!(suggest("zzz", ["summary", "description"]), None);
    }
}
