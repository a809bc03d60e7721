//! Catalogue resolver strategies and the standard chain

use std::path::PathBuf;

use meridian_core::definition::Definition;
use meridian_core::resolver::{
    DefinitionPoolResolver, ExistingDependencyResolver, KnownReferenceResolver, LocationIdResolver,
    PlaceholderResolver, ProviderIdResolver, Resolve, ResolveError, ResolveRequest, Resolved,
    ResourceIdResolver,
};

use crate::{azapi, azurerm, types};

/// Exact ARM-type lookup in the generic-provider fragment table.
pub struct AzapiCatalogResolver;

impl Resolve for AzapiCatalogResolver {
    fn name(&self) -> &'static str {
        "azapi_catalog"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        Ok(azapi::lookup(&req.pattern.resource_type).map(|entry| Resolved::Text(entry.hcl.to_string())))
    }
}

/// Exact ARM-type lookup in the typed-provider fragment table.
pub struct AzurermCatalogResolver;

impl Resolve for AzurermCatalogResolver {
    fn name(&self) -> &'static str {
        "azurerm_catalog"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        Ok(azurerm::lookup(&req.pattern.resource_type)
            .map(|entry| Resolved::Text(entry.hcl.to_string())))
    }
}

/// Options for assembling the standard chain.
#[derive(Default)]
pub struct ChainOptions {
    /// Previously synthesized definitions from the same run.
    pub pool: Vec<Definition>,
    /// Directory holding already-declared configuration files.
    pub working_dir: Option<PathBuf>,
    /// Drop the synthesizing fallbacks (location handle, provider
    /// handle, generic read, writable stub) for offline runs.
    pub reuse_only: bool,
}

/// The standard resolver chain. The order is a correctness contract:
/// prefer reuse over synthesis, specific synthesis over generic
/// synthesis, data lookups over writable stubs.
pub fn standard_chain(options: ChainOptions) -> Vec<Box<dyn Resolve>> {
    let mut chain: Vec<Box<dyn Resolve>> = vec![Box::new(KnownReferenceResolver)];
    if let Some(dir) = options.working_dir {
        chain.push(Box::new(ExistingDependencyResolver::new(
            dir,
            types::azurerm_type_map(),
        )));
    }
    chain.push(Box::new(DefinitionPoolResolver::new(options.pool)));
    chain.push(Box::new(AzapiCatalogResolver));
    chain.push(Box::new(AzurermCatalogResolver));
    if !options.reuse_only {
        chain.push(Box::new(LocationIdResolver));
        chain.push(Box::new(ProviderIdResolver));
        chain.push(Box::new(ResourceIdResolver));
        chain.push(Box::new(PlaceholderResolver));
    }
    chain
}
