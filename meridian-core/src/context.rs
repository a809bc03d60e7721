//! Context - Root orchestrator for one generation run
//!
//! Owns the output document, the resolver chain, the memoization cache
//! of already-resolved Patterns, and the recursion guard. The cache and
//! guard are unsynchronized mutable state: one Context per generation
//! run, never shared across threads. Sharing resolver data (read-only)
//! across Contexts is safe.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::armid;
use crate::definition::{Definition, DefinitionIdentity};
use crate::document::{Document, DocumentError};
use crate::pattern::Pattern;
use crate::reference::Reference;
use crate::resolver::{Resolve, ResolveError, ResolveRequest, Resolved, resolve_chain};
use crate::value::Value;

/// Base document every run starts from: provider requirements and the
/// shared variables the merge normalizations converge on.
const BASE_DOCUMENT: &str = r#"terraform {
  required_providers {
    azapi = {
      source = "Azure/azapi"
    }
    azurerm = {
      source = "hashicorp/azurerm"
    }
  }
}

provider "azapi" {
}

provider "azurerm" {
  features {}
}

variable "resource_name" {
  type    = string
  default = "acctest0001"
}

variable "location" {
  type    = string
  default = "westeurope"
}
"#;

/// Context errors
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("already adding {0}")]
    AlreadyAdding(DefinitionIdentity),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("definition for {0} produced no block")]
    NoReference(String),
}

/// A placeholder identifier found inside a definition body, with the
/// structural path needed to substitute it later. A JSON key cannot be
/// rewritten in place like a value, so key candidates carry a flag.
#[derive(Debug, Clone)]
struct Candidate {
    path: Vec<String>,
    id: String,
    is_key: bool,
}

impl Candidate {
    fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// Collect candidate identifiers: every leaf string value matching the
/// identifier grammar, and every map key that is itself an identifier
/// (ARM bodies key maps such as `userAssignedIdentities` by id).
fn discover(value: &serde_json::Value, path: &mut Vec<String>, out: &mut Vec<Candidate>) {
    match value {
        serde_json::Value::String(s) => {
            if armid::is_resource_id(s) || armid::is_action_id(s) {
                out.push(Candidate {
                    path: path.clone(),
                    id: s.clone(),
                    is_key: false,
                });
            }
        }
        serde_json::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                path.push(index.to_string());
                discover(item, path, out);
                path.pop();
            }
        }
        serde_json::Value::Object(map) => {
            for (key, item) in map {
                if armid::is_resource_id(key) {
                    let mut key_path = path.clone();
                    key_path.push(key.clone());
                    out.push(Candidate {
                        path: key_path,
                        id: key.clone(),
                        is_key: true,
                    });
                }
                path.push(key.clone());
                discover(item, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

fn value_at_mut<'a>(
    value: &'a mut serde_json::Value,
    path: &[String],
) -> Option<&'a mut serde_json::Value> {
    let mut current = value;
    for segment in path {
        current = match current {
            serde_json::Value::Object(map) => map.get_mut(segment)?,
            serde_json::Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Replace a resolved candidate with an interpolation expression built
/// from the adopted reference.
fn substitute(body: &mut serde_json::Value, candidate: &Candidate, reference: &Reference) {
    let expression = format!("${{{}}}", reference);
    if candidate.is_key {
        let parent = &candidate.path[..candidate.path.len() - 1];
        if let Some(serde_json::Value::Object(map)) = value_at_mut(body, parent)
            && let Some(item) = map.remove(&candidate.id)
        {
            map.insert(expression, item);
        }
    } else if let Some(slot) = value_at_mut(body, &candidate.path) {
        *slot = serde_json::Value::String(expression);
    }
}

/// Root orchestrator: turns Definitions into wired, conflict-free blocks.
pub struct Context {
    document: Document,
    known: HashMap<String, Reference>,
    resolvers: Vec<Box<dyn Resolve>>,
    adding: HashSet<DefinitionIdentity>,
}

impl Context {
    /// A Context over the standard base document.
    pub fn new(resolvers: Vec<Box<dyn Resolve>>) -> Result<Self, ContextError> {
        Ok(Self::with_document(Document::parse(BASE_DOCUMENT)?, resolvers))
    }

    /// A Context over a caller-provided document, for runs that seed
    /// their own preamble.
    pub fn with_document(document: Document, resolvers: Vec<Box<dyn Resolve>>) -> Self {
        Self {
            document,
            known: HashMap::new(),
            resolvers,
            adding: HashSet::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn known_patterns(&self) -> &HashMap<String, Reference> {
        &self.known
    }

    /// Formatted text of the accumulated document.
    pub fn render(&self) -> String {
        self.document.render()
    }

    /// Add a top-level definition and return the reference to the block
    /// that now represents it. Re-entrant addition of the same identity
    /// is the cycle breaker for mutually referencing dependency graphs
    /// and fails fast; the guard is released on every exit path.
    pub fn add_definition(&mut self, definition: &Definition) -> Result<Reference, ContextError> {
        let identity = definition.identity();
        if self.adding.contains(&identity) {
            return Err(ContextError::AlreadyAdding(identity));
        }
        self.adding.insert(identity.clone());
        let result = self.add_inner(definition);
        self.adding.remove(&identity);
        result
    }

    fn add_inner(&mut self, definition: &Definition) -> Result<Reference, ContextError> {
        let mut def = definition.clone();

        // parent_id / resource_id extra fields, when literal. A field
        // addressing the definition's own id is not a dependency.
        for field in ["parent_id", "resource_id"] {
            let Some(Value::Literal(serde_json::Value::String(id))) = def.field(field) else {
                continue;
            };
            let id = id.clone();
            if !armid::is_resource_id(&id) || id == def.id {
                continue;
            }
            match self.resolve_id(&id)? {
                Some(reference) => def.set_field(field, Value::Reference(reference)),
                None => warn!("unresolved {} {}", field, id),
            }
        }

        // body placeholders, deepest first: renaming a key would
        // invalidate the paths beneath it
        let mut candidates = Vec::new();
        let mut path = Vec::new();
        discover(&def.body, &mut path, &mut candidates);
        for candidate in candidates.iter().rev() {
            if armid::is_action_id(&candidate.id) {
                debug!("skipping action id {}", candidate.id);
                continue;
            }
            if candidate.id == def.id {
                continue;
            }
            match self.resolve_id(&candidate.id)? {
                Some(reference) => substitute(&mut def.body, candidate, &reference),
                None => warn!(
                    "unresolved placeholder {} at {}",
                    candidate.id,
                    candidate.path_string()
                ),
            }
        }

        // a list-all operation must observe writes to the same type even
        // though the two blocks reference different scopes
        if def.is_list() {
            let suffix = format!(":{}", def.azure_type.to_lowercase());
            let same_type = self
                .known
                .iter()
                .filter(|(key, _)| key.ends_with(&suffix))
                .min_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(_, reference)| reference.clone());
            if let Some(reference) = same_type {
                def.set_field("depends_on", Value::raw(format!("[{}]", reference.address())));
            }
        }

        let text = def.to_block_text();
        let reference = self
            .document
            .merge(&text, false)?
            .ok_or_else(|| ContextError::NoReference(def.id.clone()))?;

        if !def.is_action()
            && !def.is_list()
            && let Some(pattern) = Pattern::from_id(&def.id)
        {
            self.known.insert(pattern.key(), reference.clone());
        }

        Ok(reference)
    }

    /// Resolve one identifier through the chain, folding whatever the
    /// winning strategy produced into the document.
    fn resolve_id(&mut self, id: &str) -> Result<Option<Reference>, ContextError> {
        let Some(pattern) = Pattern::from_id(id) else {
            return Ok(None);
        };
        let resolved = {
            let request = ResolveRequest {
                pattern: &pattern,
                known: &self.known,
            };
            resolve_chain(&self.resolvers, &request)?
        };
        match resolved {
            None => Ok(None),
            Some(Resolved::Known(reference)) => {
                if !reference.is_known() {
                    warn!("discarding incomplete reference for {}", pattern.key());
                    return Ok(None);
                }
                Ok(Some(reference))
            }
            Some(Resolved::Text(text)) => {
                let reference = self.document.merge(&text, true)?;
                if let Some(reference) = &reference {
                    self.known.insert(pattern.key(), reference.clone());
                }
                Ok(reference)
            }
            Some(Resolved::Definition(definition)) => {
                Ok(Some(self.add_definition(&definition)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::BlockKind;
    use crate::resolver::KnownReferenceResolver;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    const RG_FRAGMENT: &str = "resource \"azurerm_resource_group\" \"example\" {\n  name     = \"acctest-rg\"\n  location = \"westeurope\"\n}\n";

    /// Counts invocations and returns a fixed fragment, standing in for
    /// the catalogue.
    struct CountingFragment {
        count: Rc<RefCell<usize>>,
    }

    impl Resolve for CountingFragment {
        fn name(&self) -> &'static str {
            "counting_fragment"
        }

        fn resolve(&self, _req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
            *self.count.borrow_mut() += 1;
            Ok(Some(Resolved::Text(RG_FRAGMENT.to_string())))
        }
    }

    fn vnet_definition(id: &str) -> Definition {
        Definition::new(
            id,
            BlockKind::Resource,
            "azapi_resource",
            "virtualNetwork",
            "Microsoft.Network/virtualNetworks",
            "2023-04-01",
        )
    }

    #[test]
    fn parent_id_is_substituted_with_a_reference() {
        let count = Rc::new(RefCell::new(0));
        let mut ctx = Context::new(vec![
            Box::new(KnownReferenceResolver),
            Box::new(CountingFragment { count: count.clone() }),
        ])
        .unwrap();
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_field(
            "parent_id",
            Value::literal("/subscriptions/s/resourceGroups/g"),
        )
        .with_body(json!({"properties": {"addressSpace": {"addressPrefixes": ["10.0.0.0/16"]}}}));
        let reference = ctx.add_definition(&def).unwrap();
        assert_eq!(reference.declared_type, "azapi_resource");
        let rendered = ctx.render();
        assert!(rendered.contains("parent_id = azurerm_resource_group.example.id"));
        assert!(rendered.contains("resource \"azurerm_resource_group\" \"example\""));
    }

    #[test]
    fn cache_wins_over_lower_priority_resolvers() {
        let count = Rc::new(RefCell::new(0));
        let mut ctx = Context::new(vec![
            Box::new(KnownReferenceResolver),
            Box::new(CountingFragment { count: count.clone() }),
        ])
        .unwrap();
        let first = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/a",
        )
        .with_field(
            "parent_id",
            Value::literal("/subscriptions/s/resourceGroups/g"),
        );
        ctx.add_definition(&first).unwrap();
        assert_eq!(*count.borrow(), 1);

        // a sibling needing the same logical resource must hit the cache
        let mut second = vnet_definition(
            "/subscriptions/other/resourceGroups/g2/providers/Microsoft.Network/virtualNetworks/b",
        )
        .with_field(
            "parent_id",
            Value::literal("/subscriptions/other/resourceGroups/g2"),
        );
        second.label = "virtualNetwork2".to_string();
        ctx.add_definition(&second).unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn body_value_placeholder_becomes_interpolation() {
        let count = Rc::new(RefCell::new(0));
        let mut ctx = Context::new(vec![
            Box::new(KnownReferenceResolver),
            Box::new(CountingFragment { count }),
        ])
        .unwrap();
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({
            "properties": {
                "scope": "/subscriptions/s/resourceGroups/g"
            }
        }));
        ctx.add_definition(&def).unwrap();
        assert!(ctx
            .render()
            .contains("scope = \"${azurerm_resource_group.example.id}\""));
    }

    #[test]
    fn identifier_keys_are_renamed() {
        let count = Rc::new(RefCell::new(0));
        let mut ctx = Context::new(vec![
            Box::new(KnownReferenceResolver),
            Box::new(CountingFragment { count }),
        ])
        .unwrap();
        let identity_id = "/subscriptions/s/resourceGroups/g";
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({
            "identity": {
                "userAssignedIdentities": {
                    (identity_id): {}
                }
            }
        }));
        ctx.add_definition(&def).unwrap();
        assert!(ctx
            .render()
            .contains("\"${azurerm_resource_group.example.id}\" = {}"));
    }

    #[test]
    fn unresolved_placeholders_stay_literal() {
        let mut ctx = Context::new(vec![Box::new(KnownReferenceResolver)]).unwrap();
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({"properties": {"scope": "/subscriptions/s/resourceGroups/g"}}));
        ctx.add_definition(&def).unwrap();
        assert!(ctx
            .render()
            .contains("scope = \"/subscriptions/s/resourceGroups/g\""));
    }

    #[test]
    fn incidental_strings_are_not_dependencies() {
        let mut ctx = Context::new(vec![Box::new(KnownReferenceResolver)]).unwrap();
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({
            "properties": {
                "docs": "https://example.com/some/path",
                "template": "Microsoft.Network/virtualNetworks@2023-04-01"
            }
        }));
        ctx.add_definition(&def).unwrap();
        let rendered = ctx.render();
        assert!(rendered.contains("https://example.com/some/path"));
        assert!(rendered.contains("Microsoft.Network/virtualNetworks@2023-04-01"));
    }

    /// Resolves every pattern back to a fixed definition, standing in
    /// for a mutually recursive dependency graph.
    struct SelfReferential {
        definition: Definition,
    }

    impl Resolve for SelfReferential {
        fn name(&self) -> &'static str {
            "self_referential"
        }

        fn resolve(&self, _req: &ResolveRequest<'_>) -> Result<Option<Resolved>, ResolveError> {
            Ok(Some(Resolved::Definition(self.definition.clone())))
        }
    }

    #[test]
    fn cycles_terminate_with_already_adding() {
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({"properties": {"peer": "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/other"}}));
        let mut ctx = Context::new(vec![Box::new(SelfReferential {
            definition: def.clone(),
        })])
        .unwrap();
        let err = ctx.add_definition(&def).unwrap_err();
        assert!(matches!(err, ContextError::AlreadyAdding(_)));
    }

    #[test]
    fn guard_is_released_after_failure() {
        let def = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        )
        .with_body(json!({"properties": {"peer": "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/other"}}));
        let mut ctx = Context::new(vec![Box::new(SelfReferential {
            definition: def.clone(),
        })])
        .unwrap();
        ctx.add_definition(&def).unwrap_err();
        // the same identity can be attempted again once the guard is
        // clear; without the body placeholder nothing recurses
        let mut retry = def.clone();
        retry.body = serde_json::Value::Null;
        ctx.add_definition(&retry).unwrap();
    }

    #[test]
    fn own_id_in_resource_id_field_is_not_a_dependency() {
        let mut ctx = Context::new(vec![]).unwrap();
        let id = "/subscriptions/s/resourceGroups/g";
        let def = Definition::new(
            id,
            BlockKind::Data,
            "azapi_resource_id",
            "resourceGroup",
            "Microsoft.Resources/resourceGroups",
            "2024-03-01",
        )
        .with_field("resource_id", Value::literal(id));
        let reference = ctx.add_definition(&def).unwrap();
        assert_eq!(reference.kind, BlockKind::Data);
        assert!(ctx.render().contains("resource_id = \"/subscriptions/s/resourceGroups/g\""));
    }

    #[test]
    fn actions_and_lists_are_exempt_from_the_cache() {
        let mut ctx = Context::new(vec![]).unwrap();
        let action = Definition::new(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Storage/storageAccounts/sa/listKeys",
            BlockKind::Resource,
            "azapi_resource_action",
            "listKeys",
            "Microsoft.Storage/storageAccounts",
            "2023-01-01",
        );
        ctx.add_definition(&action).unwrap();
        assert!(ctx.known_patterns().is_empty());
    }

    #[test]
    fn list_operations_depend_on_same_type_writes() {
        let count = Rc::new(RefCell::new(0));
        let mut ctx = Context::new(vec![
            Box::new(KnownReferenceResolver),
            Box::new(CountingFragment { count }),
        ])
        .unwrap();
        let write = vnet_definition(
            "/subscriptions/s/resourceGroups/g/providers/Microsoft.Network/virtualNetworks/v",
        );
        ctx.add_definition(&write).unwrap();

        let list = Definition::new(
            "/subscriptions/other/resourceGroups/g2/providers/Microsoft.Network/virtualNetworks",
            BlockKind::Data,
            "azapi_resource_list",
            "virtualNetworks",
            "Microsoft.Network/virtualNetworks",
            "2023-04-01",
        )
        .with_field(
            "parent_id",
            Value::literal("/subscriptions/other/resourceGroups/g2"),
        );
        ctx.add_definition(&list).unwrap();
        assert!(ctx
            .render()
            .contains("depends_on = [azapi_resource.virtualNetwork]"));
    }
}
