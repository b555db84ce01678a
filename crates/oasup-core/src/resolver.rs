//! External `$ref` resolution
//!
//! References to other files are inlined so the converter and validator
//! see one self-contained document. References local to the root
//! document (`#/...`) are left untouched. Inside an inlined file, its own
//! local references are resolved against that file.
//!
//! A reference that re-enters a target still being resolved (a recursive
//! model) is not inlined again. The target is moved once into the root
//! document's schema section under a generated name and every recursive
//! occurrence points there.

use crate::error::{Error, Result};
use crate::format::parse_document;
use crate::pointer;
use crate::source::SourceBase;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default bound on nested external references
pub const MAX_RESOLUTION_DEPTH: usize = 10;

/// Tracks the chain of references being resolved
#[derive(Debug, Clone)]
pub struct ResolverContext {
    /// Stack of `file#pointer` keys for cycle detection
    pub resolution_stack: Vec<String>,
    /// Maximum resolution depth
    pub max_depth: usize,
}

impl Default for ResolverContext {
    fn default() -> Self {
        Self {
            resolution_stack: Vec::new(),
            max_depth: MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ResolverContext {
    /// Enter a reference, failing on cycles or excessive depth
    pub fn push(&mut self, key: String) -> Result<()> {
        if self.resolution_stack.len() >= self.max_depth {
            return Err(Error::reference(
                key,
                format!("Maximum resolution depth {} exceeded", self.max_depth),
            ));
        }

        if self.resolution_stack.contains(&key) {
            let mut chain = self.resolution_stack.clone();
            chain.push(key.clone());
            return Err(Error::reference(
                key,
                format!("Circular reference: {}", chain.join(" -> ")),
            ));
        }

        self.resolution_stack.push(key);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<String> {
        self.resolution_stack.pop()
    }
}

/// Inlines external `$ref`s relative to a source location
#[derive(Debug, Default)]
pub struct ReferenceResolver {
    cache: HashMap<PathBuf, Value>,
    /// Generated schema names of recursive targets, by `file#pointer` key
    hoisted: HashMap<String, String>,
    /// Resolved bodies of hoisted targets, inserted into the root at the end
    hoisted_schemas: Map<String, Value>,
    /// Schema names already present in the root document or generated
    taken: HashSet<String>,
    schemas_pointer: &'static str,
}

impl ReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every external reference in `document`
    pub fn resolve(&mut self, document: Value, base: &SourceBase) -> Result<Value> {
        match base {
            SourceBase::Directory(dir) => {
                self.prepare_hoisting(&document);
                let mut context = ResolverContext::default();
                let mut resolved = self.resolve_value(document, dir, None, &mut context)?;
                self.insert_hoisted(&mut resolved);
                Ok(resolved)
            }
            SourceBase::Url(url) => {
                let mut external = Vec::new();
                collect_external_refs(&document, &mut external);
                for reference in &external {
                    warn!(
                        reference = %reference,
                        base = %url,
                        "leaving remote relative reference unresolved"
                    );
                }
                Ok(document)
            }
        }
    }

    fn resolve_value(
        &mut self,
        value: Value,
        dir: &Path,
        current_file: Option<&Path>,
        context: &mut ResolverContext,
    ) -> Result<Value> {
        match value {
            Value::Object(mut obj) => {
                if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                    let reference = reference.to_string();
                    let is_local = reference.starts_with('#');
                    if !is_local || current_file.is_some() {
                        return self.resolve_reference(&reference, dir, current_file, context);
                    }
                }

                for child in obj.values_mut() {
                    *child = self.resolve_value(std::mem::take(child), dir, current_file, context)?;
                }
                Ok(Value::Object(obj))
            }
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_value(item, dir, current_file, context))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }

    fn resolve_reference(
        &mut self,
        reference: &str,
        dir: &Path,
        current_file: Option<&Path>,
        context: &mut ResolverContext,
    ) -> Result<Value> {
        let (file_part, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (reference, ""),
        };

        let file = if file_part.is_empty() {
            match current_file {
                Some(file) => file.to_path_buf(),
                None => {
                    return Err(Error::reference(
                        reference,
                        "Cannot resolve same-file reference without current file context",
                    ))
                }
            }
        } else {
            let joined = dir.join(file_part);
            joined
                .canonicalize()
                .map_err(|e| Error::reference(reference, format!("{}: {}", joined.display(), e)))?
        };

        let key = format!("{}#{}", file.display(), fragment);
        if let Some(name) = self.hoisted.get(&key) {
            if self.hoisted_schemas.contains_key(name) {
                return Ok(self.hoisted_ref(name));
            }
        }
        if context.resolution_stack.contains(&key) {
            let name = self.hoisted_name(&key, &file, fragment);
            debug!(reference, name = %name, "hoisting recursive reference");
            return Ok(self.hoisted_ref(&name));
        }

        context.push(key.clone())?;
        debug!(reference, file = %file.display(), "resolving external reference");

        let content = self.load_file(&file, reference)?;
        let target = extract_pointer(&content, fragment, reference)?;
        let file_dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
        let resolved = self.resolve_value(target, &file_dir, Some(&file), context)?;

        context.pop();
        if let Some(name) = self.hoisted.get(&key).cloned() {
            self.hoisted_schemas.insert(name.clone(), resolved);
            return Ok(self.hoisted_ref(&name));
        }
        Ok(resolved)
    }

    /// Pick the schema section for hoisted targets and record its names
    fn prepare_hoisting(&mut self, document: &Value) {
        self.hoisted.clear();
        self.hoisted_schemas.clear();

        let section = if document.get("openapi").is_some() {
            self.schemas_pointer = "#/components/schemas";
            document.pointer("/components/schemas")
        } else {
            self.schemas_pointer = "#/definitions";
            document.get("definitions")
        };
        self.taken = section
            .and_then(Value::as_object)
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default();
    }

    /// Generated name for a recursive target, stable per key
    fn hoisted_name(&mut self, key: &str, file: &Path, fragment: &str) -> String {
        if let Some(name) = self.hoisted.get(key) {
            return name.clone();
        }

        let base = pointer::segments(fragment)
            .pop()
            .filter(|segment| !segment.is_empty())
            .or_else(|| file.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "Schema".to_string());
        let mut name = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&name) {
            name = format!("{}{}", base, suffix);
            suffix += 1;
        }

        self.taken.insert(name.clone());
        self.hoisted.insert(key.to_string(), name.clone());
        name
    }

    fn hoisted_ref(&self, name: &str) -> Value {
        json!({ "$ref": pointer::join(self.schemas_pointer, name) })
    }

    fn insert_hoisted(&mut self, document: &mut Value) {
        if self.hoisted_schemas.is_empty() {
            return;
        }
        let Value::Object(root) = document else {
            return;
        };

        let section = if self.schemas_pointer == "#/definitions" {
            root.entry("definitions")
        } else {
            match root.entry("components").or_insert_with(|| json!({})) {
                Value::Object(components) => components.entry("schemas"),
                _ => return,
            }
        };
        if let Value::Object(schemas) = section.or_insert_with(|| json!({})) {
            schemas.extend(std::mem::take(&mut self.hoisted_schemas));
        }
    }

    fn load_file(&mut self, path: &Path, reference: &str) -> Result<Value> {
        if let Some(cached) = self.cache.get(path) {
            return Ok(cached.clone());
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::reference(reference, format!("{}: {}", path.display(), e)))?;
        let (content, _) = parse_document(&text, &path.display().to_string())?;
        self.cache.insert(path.to_path_buf(), content.clone());
        Ok(content)
    }
}

/// Apply a JSON pointer fragment to a document
fn extract_pointer(document: &Value, fragment: &str, reference: &str) -> Result<Value> {
    let mut current = document;
    for segment in pointer::segments(fragment) {
        current = match current {
            Value::Object(obj) => obj.get(&segment).ok_or_else(|| {
                Error::reference(reference, format!("Property '{}' not found", segment))
            })?,
            Value::Array(items) => {
                let index: usize = segment.parse().map_err(|_| {
                    Error::reference(reference, format!("Invalid array index '{}'", segment))
                })?;
                items.get(index).ok_or_else(|| {
                    Error::reference(reference, format!("Array index {} out of bounds", index))
                })?
            }
            _ => {
                return Err(Error::reference(
                    reference,
                    format!("Cannot access property '{}' on non-object/array", segment),
                ))
            }
        };
    }
    Ok(current.clone())
}

fn collect_external_refs(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                if !reference.starts_with('#') {
                    found.push(reference.to_string());
                }
            }
            obj.values().for_each(|child| collect_external_refs(child, found));
        }
        Value::Array(items) => items.iter().for_each(|item| collect_external_refs(item, found)),
        _ => {}
    }
}
