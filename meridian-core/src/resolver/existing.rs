//! Reuse of blocks already declared in the working directory

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use log::warn;

use super::{Resolve, ResolveError, ResolveRequest, Resolved};
use crate::document::parse_blocks;
use crate::reference::{BlockKind, Reference};

#[derive(Debug, Clone)]
struct DeclaredBlock {
    kind: BlockKind,
    declared_type: String,
    label: String,
    azure_type: String,
}

/// Scans configuration files already present in the target directory so
/// user-authored or previously generated resources are reused rather
/// than duplicated. The scan is performed once, on first use.
pub struct ExistingDependencyResolver {
    dir: PathBuf,
    /// Declared type -> ARM type, for the non-generic provider. Generic
    /// provider blocks carry the ARM type in their `type` attribute.
    azurerm_types: HashMap<String, String>,
    cache: RefCell<Option<Vec<DeclaredBlock>>>,
}

impl ExistingDependencyResolver {
    pub fn new(dir: impl Into<PathBuf>, azurerm_types: HashMap<String, String>) -> Self {
        Self {
            dir: dir.into(),
            azurerm_types,
            cache: RefCell::new(None),
        }
    }

    fn scan(&self) -> Result<Vec<DeclaredBlock>, ResolveError> {
        let mut paths: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "tf"))
            .collect();
        paths.sort();

        let mut declared = Vec::new();
        for path in paths {
            let text = fs::read_to_string(&path)?;
            let blocks = match parse_blocks(&text) {
                Ok(blocks) => blocks,
                Err(err) => {
                    warn!("skipping {}: {}", path.display(), err);
                    continue;
                }
            };
            for block in blocks {
                let kind = match block.block_type.as_str() {
                    "resource" => BlockKind::Resource,
                    "data" => BlockKind::Data,
                    _ => continue,
                };
                let (Some(declared_type), Some(label)) =
                    (block.labels.first(), block.labels.get(1))
                else {
                    continue;
                };
                let azure_type = if declared_type.starts_with("azapi_") {
                    block
                        .type_attr()
                        .map(|t| t.split('@').next().unwrap_or("").to_string())
                } else {
                    self.azurerm_types.get(declared_type.as_str()).cloned()
                };
                let Some(azure_type) = azure_type else {
                    continue;
                };
                if azure_type.is_empty() {
                    continue;
                }
                declared.push(DeclaredBlock {
                    kind,
                    declared_type: declared_type.clone(),
                    label: label.clone(),
                    azure_type,
                });
            }
        }
        Ok(declared)
    }
}

impl Resolve for ExistingDependencyResolver {
    fn name(&self) -> &'static str {
        "existing_dependency"
    }

    fn resolve(&self, req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
        if self.cache.borrow().is_none() {
            let declared = self.scan()?;
            *self.cache.borrow_mut() = Some(declared);
        }
        let cache = self.cache.borrow();
        let Some(declared) = cache.as_ref() else {
            return Ok(None);
        };
        Ok(declared
            .iter()
            .find(|b| b.azure_type.eq_ignore_ascii_case(&req.pattern.resource_type))
            .map(|b| {
                Resolved::Known(Reference::new(b.kind, &b.declared_type, &b.label, "id"))
            }))
    }
}
