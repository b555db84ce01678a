//! Schema-aware rendering of validation warnings
//!
//! [`SchemaAwareRenderer`] turns a single [`Warning`] into a multi-line
//! block showing the violated keyword, the offending value in a numbered
//! frame of the document, a hint derived from the schema rule and the
//! schema path. Rendering never fails: when the warning cannot be located
//! in the document the renderer returns `None` and callers fall back to the
//! concise `message pointer` line.

pub mod frame;
pub mod hint;

use colored::Colorize;
use frame::Layout;
use oasup_core::{pointer, Warning};
use serde_json::Value;

/// Renders one warning against the schema and document it came from
pub trait DiagnosticRenderer: Send + Sync {
    fn render(&self, schema: &Value, document: &Value, warning: &Warning) -> Option<String>;

    /// Render every warning of one failure, in order
    fn render_all(
        &self,
        schema: &Value,
        document: &Value,
        warnings: &[Warning],
    ) -> Vec<Option<String>> {
        warnings
            .iter()
            .map(|warning| self.render(schema, document, warning))
            .collect()
    }
}

/// Default number of document lines shown around the offending value
pub const DEFAULT_CONTEXT_LINES: usize = 2;

/// Multi-line renderer with code frame and schema hints
#[derive(Debug, Clone)]
pub struct SchemaAwareRenderer {
    color: bool,
}

impl Default for SchemaAwareRenderer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl SchemaAwareRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, warning: &Warning) -> String {
        let label = warning
            .keyword
            .as_deref()
            .or(warning.rule.as_deref())
            .unwrap_or("error")
            .to_uppercase();
        if self.color {
            format!("{} {}", label.red().bold(), warning.message.bold())
        } else {
            format!("{} {}", label, warning.message)
        }
    }

    fn dim(&self, text: String) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text
        }
    }

    fn hint_text(&self, schema: &Value, document: &Value, warning: &Warning) -> Option<String> {
        let keyword = warning.keyword.as_deref()?;
        let schema_path = warning.schema_path.as_deref()?;
        let mut segments = pointer::segments(schema_path);
        segments.pop();
        let parent_path: String = segments
            .iter()
            .map(|s| format!("/{}", pointer::escape(s)))
            .collect();
        let parent = hint::resolve_schema_path(schema, &parent_path)?;
        let instance = document.pointer(&warning.pointer)?;
        hint::hint(schema, parent, keyword, instance)
    }

    fn render_in(
        &self,
        layout: &Layout,
        schema: &Value,
        document: &Value,
        warning: &Warning,
    ) -> Option<String> {
        let span = layout.span(&warning.pointer)?;

        let mut block = vec![self.header(warning)];
        block.push(frame::render(layout, span, DEFAULT_CONTEXT_LINES));
        if let Some(hint) = self.hint_text(schema, document, warning) {
            for line in hint.lines() {
                let line = format!("  hint: {}", line);
                block.push(if self.color { line.cyan().to_string() } else { line });
            }
        }
        let location = match (&warning.schema_path, &warning.rule) {
            (Some(schema_path), _) => format!("  schema: {}", schema_path),
            (None, Some(rule)) => format!("  rule: {}", rule),
            (None, None) => format!("  at: {}", warning.pointer),
        };
        block.push(self.dim(location));
        Some(block.join("\n"))
    }
}

impl DiagnosticRenderer for SchemaAwareRenderer {
    fn render(&self, schema: &Value, document: &Value, warning: &Warning) -> Option<String> {
        self.render_in(&Layout::new(document), schema, document, warning)
    }

    /// Lays the document out once for the whole failure
    fn render_all(
        &self,
        schema: &Value,
        document: &Value,
        warnings: &[Warning],
    ) -> Vec<Option<String>> {
        let layout = Layout::new(document);
        warnings
            .iter()
            .map(|warning| self.render_in(&layout, schema, document, warning))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::OpenApiSchema;
    use serde_json::json;

    fn broken() -> Value {
        json!({
            "openapi": "3.0.0",
            "info": {"title": "Petstore", "version": "1.0.0"},
            "paths": {"/pets": {"get": {"responses": {"200": {"description": 42}}}}}
        })
    }

    #[test]
    fn test_detailed_block_for_schema_violation() {
        let schema = OpenApiSchema::embedded().unwrap();
        let document = broken();
        let warning = schema.check(&document, true).remove(0);

        let text = SchemaAwareRenderer::new(false)
            .render(schema.schema(), &document, &warning)
            .unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("ONEOF "));
        assert!(text.contains(">"));
        assert!(text.contains("^"));
        assert!(text.contains(
            "hint: not Response: property 'description' expected type string, found integer"
        ));
        assert!(lines.last().unwrap().starts_with("  schema: "));
        assert!(lines.len() > 3);
    }

    #[test]
    fn test_unlocatable_pointer_is_none() {
        let warning = Warning::new("gone", "/paths/~1missing");
        let rendered = SchemaAwareRenderer::default().render(&json!({}), &broken(), &warning);
        assert!(rendered.is_none());
    }

    #[test]
    fn test_render_all_matches_single_renders() {
        let schema = OpenApiSchema::embedded().unwrap();
        let document = broken();
        let mut warnings = schema.check(&document, true);
        warnings.push(Warning::new("gone", "/paths/~1missing"));
        warnings.push(Warning::lint("info-contact", "missing contact", "/info"));

        let renderer = SchemaAwareRenderer::new(false);
        let all = renderer.render_all(schema.schema(), &document, &warnings);
        let single: Vec<Option<String>> = warnings
            .iter()
            .map(|warning| renderer.render(schema.schema(), &document, warning))
            .collect();
        assert_eq!(all, single);
        assert!(all[warnings.len() - 2].is_none());
    }

    #[test]
    fn test_lint_warning_renders_rule() {
        let warning =
            Warning::lint("info-contact", "info object should contain contact object", "/info");
        let text = SchemaAwareRenderer::default()
            .render(&json!({}), &broken(), &warning)
            .unwrap();
        assert!(text.starts_with("INFO-CONTACT info object should contain contact object"));
        assert!(text.ends_with("  rule: info-contact"));
    }
}
