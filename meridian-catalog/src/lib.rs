//! Meridian Catalogue
//!
//! Embedded, versioned catalogue of minimal example configuration
//! fragments keyed by ARM resource type, the declared-type mapping for
//! the typed provider, and the catalogue-backed resolver strategies.
//!
//! ## Module Structure
//!
//! - `azapi` - Fragments for the generic provider
//! - `azurerm` - Fragments for the typed provider
//! - `types` - Declared type -> ARM type mapping
//! - `resolvers` - Catalogue strategies and the standard chain

pub mod azapi;
pub mod azurerm;
pub mod resolvers;
pub mod types;

// Re-export main types
pub use azapi::CatalogEntry;
pub use resolvers::{AzapiCatalogResolver, AzurermCatalogResolver, ChainOptions, standard_chain};
pub use types::azurerm_type_map;
