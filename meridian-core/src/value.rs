//! Value - Atoms used to build block bodies
//!
//! A field value is a literal (rendered as a quoted string or structured
//! expression), a reference to another block's property (rendered as a
//! bare address), or a raw expression emitted verbatim.

use crate::reference::Reference;

/// A single field value inside a synthesized block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Literal(serde_json::Value),
    Reference(Reference),
    Raw(String),
}

impl Value {
    pub fn literal(v: impl Into<serde_json::Value>) -> Self {
        Value::Literal(v.into())
    }

    pub fn raw(s: impl Into<String>) -> Self {
        Value::Raw(s.into())
    }

    /// Render the value as expression text at the given indent level.
    pub fn render(&self, indent: usize) -> String {
        match self {
            Value::Literal(v) => render_json(v, indent),
            Value::Reference(r) => r.to_string(),
            Value::Raw(s) => s.clone(),
        }
    }
}

/// Quote a string for block text. Interpolation sequences pass through
/// untouched.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn ident_ok(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Render a JSON tree as object/list expression text.
pub fn render_json(value: &serde_json::Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    let inner_pad = "  ".repeat(indent + 1);
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => quote(s),
        serde_json::Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let mut out = String::from("[\n");
            for item in items {
                out.push_str(&inner_pad);
                out.push_str(&render_json(item, indent + 1));
                out.push_str(",\n");
            }
            out.push_str(&pad);
            out.push(']');
            out
        }
        serde_json::Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let mut out = String::from("{\n");
            for (key, val) in map {
                out.push_str(&inner_pad);
                if ident_ok(key) {
                    out.push_str(key);
                } else {
                    out.push_str(&quote(key));
                }
                out.push_str(" = ");
                out.push_str(&render_json(val, indent + 1));
                out.push('\n');
            }
            out.push_str(&pad);
            out.push('}');
            out
        }
    }
}
