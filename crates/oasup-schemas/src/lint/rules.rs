//! Per-node rule checks

use super::Linter;
use oasup_core::pointer;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static SCRIPT_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<script\b").unwrap());

fn non_empty_array(value: Option<&Value>) -> bool {
    value.and_then(Value::as_array).is_some_and(|items| !items.is_empty())
}

impl Linter<'_> {
    /// Root-level rules
    pub fn check_root(&mut self, document: &Map<String, Value>) {
        if !non_empty_array(document.get("tags")) {
            self.report("openapi-tags", "");
            return;
        }
        let names: Vec<&str> = document
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tag| tag.get("name").and_then(Value::as_str))
            .collect();
        if names.windows(2).any(|pair| pair[0] > pair[1]) {
            self.report("openapi-tags-alphabetical", "/tags");
        }
    }

    pub fn check_info(&mut self, info: &Map<String, Value>, at: &str) {
        if !info.get("contact").is_some_and(Value::is_object) {
            self.report("info-contact", at);
        }
        match info.get("description").and_then(Value::as_str) {
            Some(description) => {
                self.check_markdown(description, &pointer::join(at, "description"))
            }
            None => self.report("info-description", at),
        }
        if let Some(Value::Object(license)) = info.get("license") {
            if !license.contains_key("url") {
                self.report("license-url", &pointer::join(at, "license"));
            }
        }
    }

    pub fn check_server(&mut self, server: &Map<String, Value>, at: &str) {
        if let Some(url) = server.get("url").and_then(Value::as_str) {
            if url != "/" && url.ends_with('/') {
                self.report("server-trailing-slash", &pointer::join(at, "url"));
            }
        }
    }

    pub fn check_tag(&mut self, tag: &Map<String, Value>, at: &str) {
        match tag.get("description").and_then(Value::as_str) {
            Some(description) => {
                self.check_markdown(description, &pointer::join(at, "description"))
            }
            None => self.report("tag-description", at),
        }
    }

    pub fn check_path_key(&mut self, path: &str, at: &str) {
        if path.len() > 1 && path.ends_with('/') {
            self.report("path-keys-no-trailing-slash", at);
        }
    }

    pub fn check_operation(&mut self, operation: &Map<String, Value>, at: &str) {
        if !non_empty_array(operation.get("tags")) {
            self.report("operation-tags", at);
        }
        if !operation.contains_key("operationId") {
            self.report("operation-operationId", at);
        }
        let summary = operation.get("summary").and_then(Value::as_str);
        let description = operation.get("description").and_then(Value::as_str);
        if summary.is_none() && description.is_none() {
            self.report("operation-summary-or-description", at);
        }
        if let Some(description) = description {
            self.check_markdown(description, &pointer::join(at, "description"));
        }
    }

    pub fn check_parameter(&mut self, parameter: &Map<String, Value>, at: &str) {
        if parameter.contains_key("$ref") {
            return;
        }
        match parameter.get("description").and_then(Value::as_str) {
            Some(description) => {
                self.check_markdown(description, &pointer::join(at, "description"))
            }
            None => self.report("parameter-description", at),
        }
    }

    pub fn check_reference(&mut self, reference: &Map<String, Value>, at: &str) {
        if reference.len() > 1 {
            self.report("reference-no-other-properties", at);
        }
    }

    pub fn check_markdown(&mut self, text: &str, at: &str) {
        if SCRIPT_TAG_RE.is_match(text) {
            self.report("no-script-tags-in-markdown", at);
        }
    }
}
