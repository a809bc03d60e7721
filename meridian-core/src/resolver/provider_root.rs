//! Read handle for provider-root resource types

use super::{FALLBACK_API_VERSION, Resolve, ResolveError, ResolveRequest, Resolved, default_label};
use crate::definition::Definition;
use crate::pattern::Scope;
use crate::reference::BlockKind;
use crate::value::Value;

/// Non-namespaced resource types (a bare provider namespace such as
/// `Microsoft.Insights`) at non-tenant scope resolve to a read handle
/// for the resource provider itself.
pub struct ProviderIdResolver;

impl Resolve for ProviderIdResolver {
    fn name(&self) -> &'static str {
        "provider_id"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        let pattern = req.pattern;
        if pattern.scope == Scope::Tenant || pattern.resource_type.contains('/') {
            return Ok(None);
        }
        let def = Definition::new(
            pattern.placeholder.clone(),
            BlockKind::Data,
            "azapi_resource_id",
            default_label(&pattern.resource_type),
            pattern.resource_type.clone(),
            FALLBACK_API_VERSION,
        )
        .with_field("resource_id", Value::literal(pattern.placeholder.clone()));
        Ok(Some(Resolved::Definition(def)))
    }
}
