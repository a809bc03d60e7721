//! Read handle for the synthetic locations resource type

use super::{FALLBACK_API_VERSION, Resolve, ResolveError, ResolveRequest, Resolved};
use crate::armid;
use crate::definition::Definition;
use crate::reference::BlockKind;
use crate::value::Value;

const LOCATIONS_TYPE: &str = "Microsoft.Resources/locations";

/// Location ids are not deployable resources; they resolve to a
/// read-only handle parameterized by the shared location variable.
pub struct LocationIdResolver;

impl Resolve for LocationIdResolver {
    fn name(&self) -> &'static str {
        "location_id"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        let pattern = req.pattern;
        if !pattern.resource_type.eq_ignore_ascii_case(LOCATIONS_TYPE) {
            return Ok(None);
        }
        let parent = armid::parent_id(&pattern.placeholder).unwrap_or_default();
        let def = Definition::new(
            pattern.placeholder.clone(),
            BlockKind::Data,
            "azapi_resource_id",
            "location",
            LOCATIONS_TYPE,
            FALLBACK_API_VERSION,
        )
        .with_field(
            "resource_id",
            Value::raw(format!("\"{}/locations/${{var.location}}\"", parent)),
        );
        Ok(Some(Resolved::Definition(def)))
    }
}
