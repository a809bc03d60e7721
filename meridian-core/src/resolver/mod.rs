//! Resolver chain - Ordered strategies that satisfy dependency Patterns
//!
//! Each strategy implements one way to satisfy a Pattern. The chain
//! evaluates strategies left-to-right; the first non-nil result wins and
//! a nil result (not an error) means "try the next strategy". The order
//! is a correctness contract, not an extensibility point: prefer reuse
//! over synthesis, specific synthesis over generic synthesis, and data
//! lookups over writable stubs.

mod existing;
mod known;
mod location;
mod placeholder;
mod pool;
mod provider_root;
mod resource_id;

pub use existing::ExistingDependencyResolver;
pub use known::KnownReferenceResolver;
pub use location::LocationIdResolver;
pub use placeholder::PlaceholderResolver;
pub use pool::DefinitionPoolResolver;
pub use provider_root::ProviderIdResolver;
pub use resource_id::ResourceIdResolver;

use std::collections::HashMap;

use log::debug;

use crate::definition::Definition;
use crate::pattern::Pattern;
use crate::reference::Reference;

/// API version used for synthesized read handles when no better one is
/// known for the resource type.
pub const FALLBACK_API_VERSION: &str = "2024-03-01";

/// Resolver errors
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The outcome of a successful resolution. Callers must check variants
/// in this priority order: a known reference is adopted directly, raw
/// text is merged into the document, and a definition is recursively
/// added.
#[derive(Debug, Clone)]
pub enum Resolved {
    Known(Reference),
    Text(String),
    Definition(Definition),
}

/// Everything a strategy may look at: the Pattern under resolution and a
/// read view of the memoization cache.
pub struct ResolveRequest<'a> {
    pub pattern: &'a Pattern,
    pub known: &'a HashMap<String, Reference>,
}

/// One resolution strategy.
pub trait Resolve {
    fn name(&self) -> &'static str;

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError>;
}

/// Evaluate the chain left-to-right; first non-nil result wins.
pub fn resolve_chain(
    chain: &[Box<dyn Resolve>],
    req: &ResolveRequest<'_>,
) -> Result<Option<Resolved>, ResolveError> {
    for resolver in chain {
        if let Some(resolved) = resolver.resolve(req)? {
            debug!("pattern {} satisfied by {}", req.pattern.key(), resolver.name());
            return Ok(Some(resolved));
        }
    }
    Ok(None)
}

/// Block label derived from a resource type: the last type segment, or
/// the sanitized namespace for provider-root types.
pub fn default_label(resource_type: &str) -> String {
    match resource_type.rsplit_once('/') {
        Some((_, last)) => last.to_string(),
        None => resource_type.to_lowercase().replace('.', "_"),
    }
}
