//! Pattern - Normalized dependency key derived from a resource identifier
//!
//! Two identifiers with the same resource type and scope produce equal
//! Patterns regardless of casing or concrete key values.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::armid;

/// Where in the resource hierarchy a dependency must be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Tenant,
    Subscription,
    ResourceGroup,
    Resource,
}

impl Scope {
    /// Classify a parent identifier's resource type against the three
    /// well-known sentinel types; anything else is resource scope.
    pub fn classify(parent_type: &str) -> Self {
        if parent_type.eq_ignore_ascii_case(armid::TYPE_TENANT) {
            Scope::Tenant
        } else if parent_type.eq_ignore_ascii_case(armid::TYPE_SUBSCRIPTION) {
            Scope::Subscription
        } else if parent_type.eq_ignore_ascii_case(armid::TYPE_RESOURCE_GROUP) {
            Scope::ResourceGroup
        } else {
            Scope::Resource
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Scope::Tenant => "tenant",
            Scope::Subscription => "subscription",
            Scope::ResourceGroup => "resource_group",
            Scope::Resource => "resource",
        };
        write!(f, "{}", s)
    }
}

/// Normalized (resource type, scope) dependency key. The placeholder is
/// the first concrete identifier that produced this pattern; it does not
/// participate in equality or hashing.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub resource_type: String,
    pub scope: Scope,
    pub placeholder: String,
}

impl Pattern {
    /// Derive a Pattern from a resource identifier. Returns `None` when
    /// the string is not a valid resource identifier. Derivation is a
    /// pure function of the id string.
    pub fn from_id(id: &str) -> Option<Self> {
        if !armid::is_resource_id(id) {
            return None;
        }
        let scope = match armid::parent_id(id) {
            None => Scope::Tenant, // bare `/`
            Some(parent) => Scope::classify(&armid::resource_type_of(&parent)),
        };
        Some(Self {
            resource_type: armid::resource_type_of(id),
            scope,
            placeholder: id.to_string(),
        })
    }

    /// Canonical cache key: `scope:resourcetype`, lower-cased.
    pub fn key(&self) -> String {
        format!("{}:{}", self.scope, self.resource_type.to_lowercase())
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope
            && self
                .resource_type
                .eq_ignore_ascii_case(&other.resource_type)
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_and_scope_are_equal() {
        let a = Pattern::from_id(
            "/subscriptions/S/resourceGroups/G/providers/Microsoft.Network/virtualNetworks/V",
        )
        .unwrap();
        let b = Pattern::from_id(
            "/subscriptions/S2/resourceGroups/G2/providers/microsoft.network/VIRTUALNETWORKS/V2",
        )
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn deeper_nesting_differs() {
        let vnet = Pattern::from_id(
            "/subscriptions/S/resourceGroups/G/providers/Microsoft.Network/virtualNetworks/V",
        )
        .unwrap();
        let subnet = Pattern::from_id(
            "/subscriptions/S/resourceGroups/G/providers/Microsoft.Network/virtualNetworks/V/subnets/X",
        )
        .unwrap();
        assert_ne!(vnet, subnet);
        assert_eq!(subnet.scope, Scope::Resource);
    }

    #[test]
    fn scope_classification_table() {
        assert_eq!(Pattern::from_id("/subscriptions/S").unwrap().scope, Scope::Tenant);
        assert_eq!(
            Pattern::from_id("/subscriptions/S/resourceGroups/G").unwrap().scope,
            Scope::Subscription
        );
        assert_eq!(
            Pattern::from_id(
                "/subscriptions/S/resourceGroups/G/providers/Microsoft.Network/virtualNetworks/V"
            )
            .unwrap()
            .scope,
            Scope::ResourceGroup
        );
        assert_eq!(
            Pattern::from_id(
                "/subscriptions/S/resourceGroups/G/providers/Microsoft.Network/virtualNetworks/V/subnets/X"
            )
            .unwrap()
            .scope,
            Scope::Resource
        );
    }

    #[test]
    fn tenant_root_pattern() {
        let p = Pattern::from_id("/").unwrap();
        assert_eq!(p.scope, Scope::Tenant);
        assert_eq!(p.key(), "tenant:microsoft.resources/tenants");
    }

    #[test]
    fn invalid_id_has_no_pattern() {
        assert!(Pattern::from_id("not-an-id").is_none());
        assert!(Pattern::from_id("/foo/bar").is_none());
    }
}
