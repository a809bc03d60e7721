//! Exact Pattern lookup in the memoization cache

use super::{Resolve, ResolveError, ResolveRequest, Resolved};

/// Highest-priority strategy: a Pattern that was already resolved in this
/// run reuses the exact same Reference, so sibling dependencies converge
/// on one instance.
pub struct KnownReferenceResolver;

impl Resolve for KnownReferenceResolver {
    fn name(&self) -> &'static str {
        "known_reference"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        Ok(req
            .known
            .get(&req.pattern.key())
            .cloned()
            .map(Resolved::Known))
    }
}
