//! Definition - Synthesis template for one declarative block
//!
//! A Definition is created by a caller or a resolver, deep-copied before
//! mutation, and consumed exactly once by the Context; only its serialized
//! text and the resulting Reference survive.

use std::fmt;

use crate::armid;
use crate::reference::BlockKind;
use crate::value::{Value, render_json};

/// How the body is rendered in block text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    /// Object expression (`body = { ... }`).
    #[default]
    Object,
    /// Wrapped in `jsonencode(...)`.
    JsonEncode,
}

/// Identity used by the recursion guard: two Definitions with the same
/// kind, declared type and source identifier are the same in-flight unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DefinitionIdentity {
    pub kind: BlockKind,
    pub declared_type: String,
    pub id: String,
}

impl fmt::Display for DefinitionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.kind, self.declared_type, self.id)
    }
}

/// Extra fields serialized before the body, in this order.
const LEADING_FIELDS: &[&str] = &["resource_id", "parent_id", "name", "location", "action", "method"];
/// Extra fields serialized after the body, in this order.
const TRAILING_FIELDS: &[&str] = &[
    "schema_validation_enabled",
    "ignore_casing",
    "ignore_missing_property",
    "depends_on",
];

/// Template for one declarative block, pending placeholder resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    /// Source resource identifier.
    pub id: String,
    pub kind: BlockKind,
    pub declared_type: String,
    pub label: String,
    pub azure_type: String,
    pub api_version: String,
    /// Nested map/array/scalar tree.
    pub body: serde_json::Value,
    /// Named extra fields, in insertion order.
    pub additional_fields: Vec<(String, Value)>,
    pub body_format: BodyFormat,
    /// Emitted verbatim above the block header.
    pub leading_comments: Option<String>,
}

impl Definition {
    pub fn new(
        id: impl Into<String>,
        kind: BlockKind,
        declared_type: impl Into<String>,
        label: impl Into<String>,
        azure_type: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            declared_type: declared_type.into(),
            label: label.into(),
            azure_type: azure_type.into(),
            api_version: api_version.into(),
            body: serde_json::Value::Null,
            additional_fields: Vec::new(),
            body_format: BodyFormat::default(),
            leading_comments: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_body_format(mut self, format: BodyFormat) -> Self {
        self.body_format = format;
        self
    }

    pub fn with_leading_comments(mut self, comments: impl Into<String>) -> Self {
        self.leading_comments = Some(comments.into());
        self
    }

    pub fn identity(&self) -> DefinitionIdentity {
        DefinitionIdentity {
            kind: self.kind,
            declared_type: self.declared_type.clone(),
            id: self.id.clone(),
        }
    }

    /// Whether this definition represents an action invocation rather
    /// than a resource.
    pub fn is_action(&self) -> bool {
        self.declared_type.ends_with("_resource_action") || armid::is_action_id(&self.id)
    }

    /// Whether this definition represents a list-all operation.
    pub fn is_list(&self) -> bool {
        self.declared_type.ends_with("_resource_list")
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.additional_fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.additional_fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.additional_fields.push((name, value)),
        }
    }

    /// Body with an all-empty `tags` map dropped; `None` when nothing
    /// would be emitted.
    fn effective_body(&self) -> Option<serde_json::Value> {
        let mut body = match &self.body {
            serde_json::Value::Null => return None,
            other => other.clone(),
        };
        if let serde_json::Value::Object(map) = &mut body {
            if map
                .get("tags")
                .is_some_and(|t| t.as_object().is_some_and(|m| m.is_empty()))
            {
                map.remove("tags");
            }
            if map.is_empty() {
                return None;
            }
        }
        Some(body)
    }

    /// Deterministic block text: header, `type`, leading extra fields in
    /// fixed priority order, body, trailing fields in fixed order.
    pub fn to_block_text(&self) -> String {
        let mut out = String::new();
        if let Some(comments) = &self.leading_comments {
            for line in comments.lines() {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.push_str(&format!(
            "{} \"{}\" \"{}\" {{\n",
            self.kind, self.declared_type, self.label
        ));
        if !self.azure_type.is_empty() {
            out.push_str(&format!(
                "  type = \"{}@{}\"\n",
                self.azure_type, self.api_version
            ));
        }
        for name in LEADING_FIELDS {
            if let Some(value) = self.field(name) {
                out.push_str(&format!("  {} = {}\n", name, value.render(1)));
            }
        }
        for (name, value) in &self.additional_fields {
            if LEADING_FIELDS.contains(&name.as_str()) || TRAILING_FIELDS.contains(&name.as_str()) {
                continue;
            }
            out.push_str(&format!("  {} = {}\n", name, value.render(1)));
        }
        if let Some(body) = self.effective_body() {
            match self.body_format {
                BodyFormat::Object => {
                    out.push_str(&format!("  body = {}\n", render_json(&body, 1)));
                }
                BodyFormat::JsonEncode => {
                    let json = serde_json::to_string_pretty(&body).unwrap_or_default();
                    out.push_str(&format!("  body = jsonencode({})\n", json));
                }
            }
        }
        for name in TRAILING_FIELDS {
            if let Some(value) = self.field(name) {
                out.push_str(&format!("  {} = {}\n", name, value.render(1)));
            }
        }
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Definition {
        Definition::new(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
            BlockKind::Resource,
            "azapi_resource",
            "virtualNetwork",
            "Microsoft.Network/virtualNetworks",
            "2023-04-01",
        )
    }

    #[test]
    fn field_order_is_fixed() {
        let def = sample()
            .with_field("depends_on", Value::raw("[azapi_resource.rg]"))
            .with_field("location", Value::raw("var.location"))
            .with_field("name", Value::raw("var.resource_name"))
            .with_field("parent_id", Value::raw("azapi_resource.rg.id"))
            .with_body(json!({"properties": {"addressSpace": {"addressPrefixes": ["10.0.0.0/16"]}}}));
        let text = def.to_block_text();
        let parent = text.find("parent_id").unwrap();
        let name = text.find("name").unwrap();
        let location = text.find("location").unwrap();
        let body = text.find("body").unwrap();
        let depends = text.find("depends_on").unwrap();
        assert!(parent < name && name < location && location < body && body < depends);
        assert!(text.starts_with("resource \"azapi_resource\" \"virtualNetwork\" {"));
        assert!(text.contains("type = \"Microsoft.Network/virtualNetworks@2023-04-01\""));
    }

    #[test]
    fn empty_body_is_omitted() {
        let text = sample().to_block_text();
        assert!(!text.contains("body"));
    }

    #[test]
    fn empty_tags_map_is_dropped() {
        let def = sample().with_body(json!({"tags": {}}));
        assert!(!def.to_block_text().contains("body"));
        let def = sample().with_body(json!({"tags": {"env": "test"}}));
        assert!(def.to_block_text().contains("tags"));
    }

    #[test]
    fn leading_comments_are_verbatim() {
        let def = sample().with_leading_comments("# TODO: complete this block");
        let text = def.to_block_text();
        assert!(text.starts_with("# TODO: complete this block\nresource"));
    }

    #[test]
    fn jsonencode_format() {
        let def = sample()
            .with_body(json!({"properties": {}}))
            .with_body_format(BodyFormat::JsonEncode);
        assert!(def.to_block_text().contains("body = jsonencode("));
    }

    #[test]
    fn action_and_list_predicates() {
        let action = Definition::new(
            "/subscriptions/s/providers/Microsoft.Storage/storageAccounts/sa/listKeys",
            BlockKind::Resource,
            "azapi_resource_action",
            "listKeys",
            "Microsoft.Storage/storageAccounts",
            "2023-01-01",
        );
        assert!(action.is_action());
        let list = Definition::new(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks",
            BlockKind::Data,
            "azapi_resource_list",
            "virtualNetworks",
            "Microsoft.Network/virtualNetworks",
            "2023-04-01",
        );
        assert!(list.is_list());
        assert!(!sample().is_action());
        assert!(!sample().is_list());
    }
}
