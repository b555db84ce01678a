//! Numbered code frames over a pretty-printed document

use oasup_core::pointer;
use serde_json::Value;
use std::collections::HashMap;

const INDENT: usize = 2;
/// Lines of a multi-line value shown before the frame is cut
const MAX_SPAN_LINES: usize = 6;

/// Where a value sits in the pretty-printed text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First line (zero based)
    pub start: usize,
    /// Last line (zero based, inclusive)
    pub end: usize,
    /// Column where the value starts on the first line
    pub column: usize,
    /// Width of the value's text on the first line
    pub width: usize,
}

/// A document pretty-printed with two-space indentation, plus the span of every node
#[derive(Debug, Clone)]
pub struct Layout {
    lines: Vec<String>,
    spans: HashMap<String, Span>,
}

impl Layout {
    pub fn new(document: &Value) -> Self {
        let mut layout = Self {
            lines: Vec::new(),
            spans: HashMap::new(),
        };
        layout.write(document, String::new(), 0, String::new(), "");
        layout
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Span of the node at a JSON pointer
    pub fn span(&self, pointer: &str) -> Option<Span> {
        self.spans.get(pointer).copied()
    }

    fn write(&mut self, value: &Value, at: String, indent: usize, prefix: String, suffix: &str) {
        let pad = " ".repeat(indent);
        let column = indent + prefix.len();
        let start = self.lines.len();

        let (open, close, children): (char, char, Vec<(Option<&str>, &Value)>) = match value {
            Value::Object(map) if !map.is_empty() => (
                '{',
                '}',
                map.iter().map(|(k, v)| (Some(k.as_str()), v)).collect(),
            ),
            Value::Array(items) if !items.is_empty() => {
                ('[', ']', items.iter().map(|v| (None, v)).collect())
            }
            scalar => {
                let text = scalar.to_string();
                self.spans.insert(
                    at,
                    Span {
                        start,
                        end: start,
                        column,
                        width: text.chars().count(),
                    },
                );
                self.lines.push(format!("{}{}{}{}", pad, prefix, text, suffix));
                return;
            }
        };

        self.lines.push(format!("{}{}{}", pad, prefix, open));
        let last = children.len() - 1;
        for (index, (key, child)) in children.into_iter().enumerate() {
            let separator = if index == last { "" } else { "," };
            let (child_at, child_prefix) = match key {
                Some(key) => (
                    pointer::join(&at, key),
                    format!("{}: ", Value::String(key.to_string())),
                ),
                None => (pointer::join(&at, &index.to_string()), String::new()),
            };
            self.write(child, child_at, indent + INDENT, child_prefix, separator);
        }
        self.lines.push(format!("{}{}{}", pad, close, suffix));
        self.spans.insert(
            at,
            Span {
                start,
                end: self.lines.len() - 1,
                column,
                width: 1,
            },
        );
    }
}

/// Render the frame around a span
///
/// Lines inside the span are marked with `>`; the first one is underlined
/// with carets.
pub fn render(layout: &Layout, span: Span, context: usize) -> String {
    let lines = layout.lines();
    let first = span.start.saturating_sub(context);
    let shown_end = span.end.min(span.start + MAX_SPAN_LINES);
    let last = (shown_end + context).min(lines.len().saturating_sub(1));
    let gutter = (last + 1).to_string().len();

    let mut out = Vec::new();
    for (index, line) in lines.iter().enumerate().take(last + 1).skip(first) {
        let marked = index >= span.start && index <= shown_end;
        let marker = if marked { '>' } else { ' ' };
        out.push(format!("{} {:>width$} | {}", marker, index + 1, line, width = gutter));
        if index == span.start {
            out.push(format!(
                "  {:>width$} | {}{}",
                "",
                " ".repeat(span.column),
                "^".repeat(span.width.max(1)),
                width = gutter
            ));
        }
    }
    if shown_end < span.end {
        out.push(format!("  {:>width$} | ...", "", width = gutter));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn json_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z/~\"]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::vec(("[a-z/~]{1,6}", inner), 0..4)
                    .prop_map(|entries| Value::Object(entries.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_layout_is_pretty_json(doc in json_value()) {
            let layout = Layout::new(&doc);
            prop_assert_eq!(layout.lines().join("\n"), serde_json::to_string_pretty(&doc).unwrap());
            prop_assert!(layout.span("").is_some());
        }
    }

    #[test]
    fn test_layout_matches_pretty_printer() {
        let doc = json!({
            "openapi": "3.0.0",
            "tags": [{"name": "pets"}, "x"],
            "paths": {},
            "empty": []
        });
        let layout = Layout::new(&doc);
        let expected = serde_json::to_string_pretty(&doc).unwrap();
        assert_eq!(layout.lines().join("\n"), expected);
    }

    #[test]
    fn test_spans() {
        let doc = json!({"paths": {"/pets": {"get": {"description": 42}}}});
        let layout = Layout::new(&doc);
        let span = layout.span("/paths/~1pets/get/description").unwrap();
        assert_eq!(span.start, 4);
        assert_eq!(span.end, 4);
        assert_eq!(span.column, 8 + "\"description\": ".len());
        assert_eq!(span.width, 2);

        let object = layout.span("/paths/~1pets").unwrap();
        assert_eq!((object.start, object.end), (2, 6));
        assert_eq!(layout.span("").unwrap().start, 0);
        assert!(layout.span("/missing").is_none());
    }

    #[test]
    fn test_render_marks_and_underlines() {
        let doc = json!({"info": {"title": "Petstore", "version": 1}});
        let layout = Layout::new(&doc);
        let span = layout.span("/info/version").unwrap();
        let frame = render(&layout, span, 1);
        assert_eq!(
            frame,
            [
                "  3 |     \"title\": \"Petstore\",",
                "> 4 |     \"version\": 1",
                "    |                ^",
                "  5 |   }",
            ]
            .join("\n")
        );
    }
}
