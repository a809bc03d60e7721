//! Reuse of Definitions synthesized earlier in the same run

use super::{Resolve, ResolveError, ResolveRequest, Resolved};
use crate::definition::Definition;

/// Searches a caller-supplied pool of previously synthesized Definitions
/// for a matching resource type, so a dependency that was already
/// generated as its own example is folded into this generation instead
/// of being treated as unrelated. Actions and list operations are never
/// offered: they denote calls, not resources.
pub struct DefinitionPoolResolver {
    pool: Vec<Definition>,
}

impl DefinitionPoolResolver {
    pub fn new(pool: Vec<Definition>) -> Self {
        Self { pool }
    }
}

impl Resolve for DefinitionPoolResolver {
    fn name(&self) -> &'static str {
        "definition_pool"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        Ok(self
            .pool
            .iter()
            .find(|d| {
                !d.is_action()
                    && !d.is_list()
                    && d.azure_type.eq_ignore_ascii_case(&req.pattern.resource_type)
            })
            .cloned()
            .map(Resolved::Definition))
    }
}
