//! Structural rules JSON Schema cannot express
//!
//! The walker records a breadcrumb for every node it enters and removes it
//! on the way out. When a rule fails the walk returns immediately, leaving
//! the breadcrumb trail ending at the offending node.

use crate::lint::Linter;
use crate::validation::error::{ValidationError, ValidationResult};
use oasup_core::convert::{is_valid_component_key, HTTP_METHODS};
use oasup_core::{pointer, RunConfig, Warning};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use tracing::{debug, instrument};

static OPENAPI_30_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^3\.0\.\d+(-.+)?$").unwrap());
static TEMPLATE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}/]+)\}").unwrap());

/// What a semantic walk leaves behind
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Breadcrumbs still entered when the walk stopped
    pub context: Vec<String>,
    /// Lint findings in detection order
    pub warnings: Vec<Warning>,
}

/// Walks a converted document checking cross-cutting rules
pub struct SemanticWalker<'a> {
    document: &'a Value,
    linter: Linter<'a>,
    context: Vec<String>,
    operation_ids: HashMap<String, String>,
    security_schemes: HashSet<String>,
}

impl<'a> SemanticWalker<'a> {
    pub fn new(document: &'a Value, config: &'a RunConfig) -> Self {
        let security_schemes = document
            .pointer("/components/securitySchemes")
            .and_then(Value::as_object)
            .map(|schemes| schemes.keys().cloned().collect())
            .unwrap_or_default();
        Self {
            document,
            linter: Linter::new(config),
            context: Vec::new(),
            operation_ids: HashMap::new(),
            security_schemes,
        }
    }

    /// Run every check, stopping at the first violation
    #[instrument(skip(self))]
    pub fn walk(&mut self) -> ValidationResult<()> {
        let document = self.document;
        let Some(root) = document.as_object() else {
            return Err(ValidationError::new("", "Document must be an object"));
        };

        self.check_version(root)?;
        if let Some(Value::Object(info)) = root.get("info") {
            self.enter("/info");
            self.linter.check_info(info, "/info");
            self.leave();
        }
        self.check_servers(root)?;
        self.check_tags(root)?;
        if self.linter.is_enabled() {
            self.linter.check_root(root);
        }
        if let Some(security) = root.get("security") {
            self.check_security(security, "/security")?;
        }
        if let Some(Value::Object(paths)) = root.get("paths") {
            self.check_paths(paths)?;
        }
        if let Some(Value::Object(components)) = root.get("components") {
            self.check_components(components)?;
        }
        self.check_references(document, "")?;
        debug!(operations = self.operation_ids.len(), "semantic walk complete");
        Ok(())
    }

    /// Consume the walker, returning its breadcrumbs and lint findings
    pub fn finish(mut self) -> WalkReport {
        WalkReport {
            warnings: self.linter.drain(),
            context: self.context,
        }
    }

    fn enter(&mut self, at: impl Into<String>) {
        self.context.push(at.into());
    }

    fn leave(&mut self) {
        self.context.pop();
    }

    fn check_version(&mut self, root: &'a Map<String, Value>) -> ValidationResult<()> {
        self.enter("/openapi");
        match root.get("openapi").and_then(Value::as_str) {
            Some(version) if OPENAPI_30_RE.is_match(version) => {}
            Some(version) => {
                return Err(ValidationError::new(
                    "/openapi",
                    format!("Unsupported OpenAPI version '{}', expected 3.0.x", version),
                ))
            }
            None => return Err(ValidationError::new("/openapi", "Document has no openapi version")),
        }
        self.leave();
        Ok(())
    }

    fn check_servers(&mut self, root: &Map<String, Value>) -> ValidationResult<()> {
        let Some(Value::Array(servers)) = root.get("servers") else {
            return Ok(());
        };
        for (index, server) in servers.iter().enumerate() {
            if let Value::Object(server) = server {
                let at = format!("/servers/{}", index);
                self.enter(at.clone());
                self.linter.check_server(server, &at);
                self.leave();
            }
        }
        Ok(())
    }

    fn check_tags(&mut self, root: &Map<String, Value>) -> ValidationResult<()> {
        let Some(Value::Array(tags)) = root.get("tags") else {
            return Ok(());
        };
        let mut seen = HashSet::new();
        for (index, tag) in tags.iter().enumerate() {
            let Value::Object(tag) = tag else { continue };
            let at = format!("/tags/{}", index);
            self.enter(at.clone());
            if let Some(name) = tag.get("name").and_then(Value::as_str) {
                if !seen.insert(name) {
                    return Err(ValidationError::new(at, format!("Duplicate tag name '{}'", name)));
                }
            }
            self.linter.check_tag(tag, &at);
            self.leave();
        }
        Ok(())
    }

    fn check_paths(&mut self, paths: &'a Map<String, Value>) -> ValidationResult<()> {
        self.enter("/paths");
        for (path, item) in paths {
            if path.starts_with("x-") {
                continue;
            }
            let at = pointer::join("/paths", path);
            self.enter(at.clone());
            if !path.starts_with('/') {
                let message = format!("Path '{}' must begin with '/'", path);
                return Err(ValidationError::new(at, message));
            }
            self.linter.check_path_key(path, &at);
            if let Value::Object(item) = item {
                self.check_path_item(path, item, &at)?;
            }
            self.leave();
        }
        self.leave();
        Ok(())
    }

    fn check_path_item(
        &mut self,
        path: &str,
        item: &'a Map<String, Value>,
        at: &str,
    ) -> ValidationResult<()> {
        let shared =
            self.check_parameters(item.get("parameters"), &pointer::join(at, "parameters"))?;

        let mut has_operation = false;
        for (method, operation) in item {
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            let Value::Object(operation) = operation else { continue };
            has_operation = true;
            let op_at = pointer::join(at, method);
            self.enter(op_at.clone());
            let own_at = pointer::join(&op_at, "parameters");
            let own = self.check_parameters(operation.get("parameters"), &own_at)?;
            let declared: Vec<&Map<String, Value>> =
                own.iter().chain(shared.iter()).copied().collect();
            check_template_parameters(path, &declared, &op_at)?;
            self.check_operation(operation, &op_at)?;
            self.leave();
        }
        if !has_operation {
            check_template_parameters(path, &shared, at)?;
        }
        Ok(())
    }

    /// Check one parameter list, returning the parameter objects it declares
    fn check_parameters(
        &mut self,
        parameters: Option<&'a Value>,
        at: &str,
    ) -> ValidationResult<Vec<&'a Map<String, Value>>> {
        let Some(Value::Array(list)) = parameters else {
            return Ok(Vec::new());
        };
        let mut declared = Vec::new();
        let mut seen = HashSet::new();
        for (index, parameter) in list.iter().enumerate() {
            let param_at = pointer::join(at, &index.to_string());
            self.enter(param_at.clone());
            if let Value::Object(raw) = parameter {
                self.linter.check_parameter(raw, &param_at);
            }
            if let Some(param) = self.dereference(parameter) {
                let name = param.get("name").and_then(Value::as_str).unwrap_or_default();
                let location = param.get("in").and_then(Value::as_str).unwrap_or_default();
                if !seen.insert((name, location)) {
                    return Err(ValidationError::new(
                        param_at,
                        format!("Duplicate parameter '{}' in {}", name, location),
                    ));
                }
                if location == "path" && param.get("required") != Some(&Value::Bool(true)) {
                    return Err(ValidationError::new(
                        param_at,
                        format!("Path parameter '{}' must be required", name),
                    ));
                }
                declared.push(param);
            }
            self.leave();
        }
        Ok(declared)
    }

    fn check_operation(
        &mut self,
        operation: &Map<String, Value>,
        at: &str,
    ) -> ValidationResult<()> {
        self.linter.check_operation(operation, at);

        if let Some(id) = operation.get("operationId").and_then(Value::as_str) {
            if let Some(first) = self.operation_ids.get(id) {
                return Err(ValidationError::new(
                    pointer::join(at, "operationId"),
                    format!("Duplicate operationId '{}' (first used at {})", id, first),
                ));
            }
            self.operation_ids.insert(id.to_string(), at.to_string());
        }

        let responses_at = pointer::join(at, "responses");
        match operation.get("responses") {
            Some(Value::Object(responses)) if responses.keys().any(|k| !k.starts_with("x-")) => {}
            _ => {
                return Err(ValidationError::new(
                    responses_at,
                    "Operation must declare at least one response",
                ))
            }
        }

        if let Some(security) = operation.get("security") {
            self.check_security(security, &pointer::join(at, "security"))?;
        }
        Ok(())
    }

    fn check_security(&mut self, security: &Value, at: &str) -> ValidationResult<()> {
        let Value::Array(requirements) = security else {
            return Ok(());
        };
        self.enter(at);
        for (index, requirement) in requirements.iter().enumerate() {
            let Value::Object(requirement) = requirement else { continue };
            for name in requirement.keys() {
                if !self.security_schemes.contains(name) {
                    return Err(ValidationError::new(
                        pointer::join(at, &index.to_string()),
                        format!("Security requirement names undeclared scheme '{}'", name),
                    ));
                }
            }
        }
        self.leave();
        Ok(())
    }

    fn check_components(&mut self, components: &Map<String, Value>) -> ValidationResult<()> {
        self.enter("/components");
        for (kind, entries) in components {
            let Value::Object(entries) = entries else { continue };
            if kind.starts_with("x-") {
                continue;
            }
            for key in entries.keys() {
                if !is_valid_component_key(key) {
                    let at = pointer::join(&pointer::join("/components", kind), key);
                    self.enter(at.clone());
                    return Err(ValidationError::new(
                        at,
                        format!("Component key '{}' must match ^[a-zA-Z0-9.\\-_]+$", key),
                    ));
                }
            }
        }
        self.leave();
        Ok(())
    }

    fn check_references(&mut self, value: &Value, at: &str) -> ValidationResult<()> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    self.linter.check_reference(map, at);
                    if let Some(target) = pointer::local_ref(reference) {
                        if self.document.pointer(target).is_none() {
                            self.enter(at);
                            return Err(ValidationError::new(
                                at,
                                format!("Reference '{}' does not resolve", reference),
                            ));
                        }
                    }
                }
                for (key, child) in map {
                    if matches!(child, Value::Object(_) | Value::Array(_)) {
                        self.check_references(child, &pointer::join(at, key))?;
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate() {
                    self.check_references(child, &pointer::join(at, &index.to_string()))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Follow a local `$ref` to the object it names
    fn dereference(&self, value: &'a Value) -> Option<&'a Map<String, Value>> {
        let map = value.as_object()?;
        match map.get("$ref").and_then(Value::as_str) {
            Some(reference) => self
                .document
                .pointer(pointer::local_ref(reference)?)
                .and_then(Value::as_object),
            None => Some(map),
        }
    }
}

/// Every `{name}` in a path template must be declared as a path parameter
fn check_template_parameters(
    path: &str,
    declared: &[&Map<String, Value>],
    at: &str,
) -> ValidationResult<()> {
    for capture in TEMPLATE_PARAM_RE.captures_iter(path) {
        let name = &capture[1];
        let found = declared.iter().any(|param| {
            param.get("name").and_then(Value::as_str) == Some(name)
                && param.get("in").and_then(Value::as_str) == Some("path")
        });
        if !found {
            return Err(ValidationError::new(
                at,
                format!("Path parameter '{}' in '{}' is not declared", name, path),
            ));
        }
    }
    Ok(())
}
