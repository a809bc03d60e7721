//! Generic read handle for an arbitrary existing resource

use super::{FALLBACK_API_VERSION, Resolve, ResolveError, ResolveRequest, Resolved, default_label};
use crate::definition::Definition;
use crate::pattern::Scope;
use crate::reference::BlockKind;
use crate::value::Value;

/// Fallback for dependencies that live outside the run's resource group
/// (tenant- and subscription-scope resources): the run cannot create
/// them, but only a reference is required, so a data lookup addressing
/// the placeholder identifier suffices. Declines templated ids, which
/// cannot be read.
pub struct ResourceIdResolver;

impl Resolve for ResourceIdResolver {
    fn name(&self) -> &'static str {
        "resource_id"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        let pattern = req.pattern;
        if !matches!(pattern.scope, Scope::Tenant | Scope::Subscription) {
            return Ok(None);
        }
        if pattern.placeholder.contains('{') {
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
