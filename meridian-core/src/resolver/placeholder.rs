//! Last-resort writable placeholder stub

use serde_json::json;

use super::{FALLBACK_API_VERSION, Resolve, ResolveError, ResolveRequest, Resolved, default_label};
use crate::armid;
use crate::definition::Definition;
use crate::pattern::Scope;
use crate::reference::BlockKind;
use crate::value::Value;

/// Never declines: synthesizes a writable placeholder resource with a
/// stub body, so generation degrades to an explicit manual action item
/// in the output instead of aborting the whole run.
pub struct PlaceholderResolver;

impl Resolve for PlaceholderResolver {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        let pattern = req.pattern;
        let mut def = Definition::new(
            pattern.placeholder.clone(),
            BlockKind::Resource,
            "azapi_resource",
            default_label(&pattern.resource_type),
            pattern.resource_type.clone(),
            FALLBACK_API_VERSION,
        )
        .with_body(json!({"properties": {}}))
        .with_field("name", Value::raw("var.resource_name"))
        .with_field("schema_validation_enabled", Value::literal(false))
        .with_leading_comments(format!(
            "# TODO: complete the definition of {}",
            pattern.resource_type
        ));
        if let Some(parent) = armid::parent_id(&pattern.placeholder) {
            def = def.with_field("parent_id", Value::literal(parent));
        }
        if pattern.scope == Scope::ResourceGroup {
            def = def.with_field("location", Value::raw("var.location"));
        }
        Ok(Some(Resolved::Definition(def)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use std::collections::HashMap;

    #[test]
    fn always_produces_a_stub() {
        let pattern = Pattern::from_id(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Sql/servers/srv",
        )
        .unwrap();
        let known = HashMap::new();
        let req = ResolveRequest {
            pattern: &pattern,
            known: &known,
        };
        match PlaceholderResolver.resolve(&req).unwrap() {
            Some(Resolved::Definition(d)) => {
                assert_eq!(d.kind, BlockKind::Resource);
                let text = d.to_block_text();
                assert!(text.starts_with("# TODO: complete the definition of Microsoft.Sql/servers"));
                assert!(text.contains("schema_validation_enabled = false"));
                assert!(text.contains("parent_id = \"/subscriptions/s/resourceGroups/g\""));
                assert!(text.contains("location = var.location"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn nested_resources_omit_location() {
        let pattern = Pattern::from_id(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Sql/servers/srv/databases/db",
        )
        .unwrap();
        let known = HashMap::new();
        let req = ResolveRequest {
            pattern: &pattern,
            known: &known,
        };
        match PlaceholderResolver.resolve(&req).unwrap() {
            Some(Resolved::Definition(d)) => {
                assert!(d.field("location").is_none());
                assert!(d.field("parent_id").is_some());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
