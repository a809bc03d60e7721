//! Reference - Typed pointer to a declared block and one of its properties

use std::fmt;

/// Kind of a declarative block a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Resource,
    Data,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Resource => "resource",
            BlockKind::Data => "data",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "resource" => Some(BlockKind::Resource),
            "data" => Some(BlockKind::Data),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved pointer to a concrete declared block and one of its
/// exported properties. An unknown reference (any empty field) must never
/// be substituted into output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub kind: BlockKind,
    pub declared_type: String,
    pub label: String,
    pub property: String,
}

impl Reference {
    pub fn new(
        kind: BlockKind,
        declared_type: impl Into<String>,
        label: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            declared_type: declared_type.into(),
            label: label.into(),
            property: property.into(),
        }
    }

    /// Whether every field is populated.
    pub fn is_known(&self) -> bool {
        !self.declared_type.is_empty() && !self.label.is_empty() && !self.property.is_empty()
    }

    /// The block address without the property, e.g. `azapi_resource.vnet`
    /// or `data.azapi_resource_id.subscription`.
    pub fn address(&self) -> String {
        match self.kind {
            BlockKind::Resource => format!("{}.{}", self.declared_type, self.label),
            BlockKind::Data => format!("data.{}.{}", self.declared_type, self.label),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.address(), self.property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_reference_renders_dotted() {
        let r = Reference::new(BlockKind::Resource, "azapi_resource", "vnet", "id");
        assert_eq!(r.to_string(), "azapi_resource.vnet.id");
        assert_eq!(r.address(), "azapi_resource.vnet");
        assert!(r.is_known());
    }

    #[test]
    fn data_reference_has_data_prefix() {
        let r = Reference::new(BlockKind::Data, "azapi_resource_id", "subscription", "id");
        assert_eq!(r.to_string(), "data.azapi_resource_id.subscription.id");
    }

    #[test]
    fn empty_field_is_unknown() {
        let r = Reference::new(BlockKind::Resource, "azapi_resource", "", "id");
        assert!(!r.is_known());
    }
}
