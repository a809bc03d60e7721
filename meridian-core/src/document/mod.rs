//! Document - The accumulating block tree produced by one generation run
//!
//! Raw block text is parsed into labeled blocks, merged with conflict
//! detection and renaming, and rendered back out as formatted text.
//! Uniqueness invariant: every `resource`/`data` block label is unique
//! within its `(kind, declaredType)` pair; `variable`/`provider` blocks
//! are unique by label.

mod parser;
pub(crate) mod scan;

use std::collections::HashSet;

use log::debug;

use crate::reference::{BlockKind, Reference};
use crate::value::quote;

pub use parser::BlockParseError;

/// Document errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error(transparent)]
    Parse(#[from] BlockParseError),

    #[error("{kind} block requires a declared type and a label")]
    MissingLabels { kind: String },
}

/// One top-level block: type keyword, quoted labels, raw body text.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: String,
    pub labels: Vec<String>,
    pub body: String,
    pub leading_comments: Vec<String>,
}

impl Block {
    pub fn new(block_type: impl Into<String>, labels: Vec<String>, body: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            labels,
            body: body.into(),
            leading_comments: Vec::new(),
        }
    }

    /// The declared type attribute value (`type = "..."`), unquoted.
    pub fn type_attr(&self) -> Option<String> {
        scan::attr_value(&self.body, "type").and_then(scan::unquote)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for comment in &self.leading_comments {
            out.push_str(comment);
            out.push('\n');
        }
        out.push_str(&self.block_type);
        for label in &self.labels {
            out.push(' ');
            out.push_str(&quote(label));
        }
        if self.body.trim().is_empty() {
            out.push_str(" {}\n");
        } else {
            out.push_str(" {\n");
            out.push_str(&self.body);
            out.push_str("\n}\n");
        }
        out
    }
}

fn unquote_label(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    inner.replace("\\\"", "\"").replace("\\\\", "\\")
}

/// Parse raw text into top-level blocks, attaching preceding comments.
pub fn parse_blocks(text: &str) -> Result<Vec<Block>, DocumentError> {
    let pairs = parser::parse(text)?;
    let mut blocks = Vec::new();
    let mut pending_comments: Vec<String> = Vec::new();
    for pair in pairs {
        if pair.as_rule() != parser::Rule::file {
            continue;
        }
        for item in pair.into_inner() {
            match item.as_rule() {
                parser::Rule::comment => {
                    pending_comments.push(item.as_str().to_string());
                }
                parser::Rule::block => {
                    let mut block_type = String::new();
                    let mut labels = Vec::new();
                    let mut body = String::new();
                    for part in item.into_inner() {
                        match part.as_rule() {
                            parser::Rule::ident => block_type = part.as_str().to_string(),
                            parser::Rule::string => labels.push(unquote_label(part.as_str())),
                            parser::Rule::body => {
                                body = part
                                    .as_str()
                                    .trim_matches(['\n', '\r'])
                                    .trim_end()
                                    .to_string();
                            }
                            _ => {}
                        }
                    }
                    let mut block = Block::new(block_type, labels, body);
                    block.leading_comments = std::mem::take(&mut pending_comments);
                    blocks.push(block);
                }
                _ => {}
            }
        }
    }
    Ok(blocks)
}

/// The accumulating set of declarative blocks for one generation run.
#[derive(Debug, Clone, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Ok(Self {
            blocks: parse_blocks(text)?,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&block.render());
        }
        out
    }

    fn find(&self, block_type: &str, declared: &str, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| {
            b.block_type == block_type
                && b.labels.first().map(String::as_str) == Some(declared)
                && b.labels.get(1).map(String::as_str) == Some(label)
        })
    }

    fn find_labeled(&self, block_type: &str, label: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| {
            b.block_type == block_type && b.labels.first().map(String::as_str) == Some(label)
        })
    }

    fn next_free_label(&self, block_type: &str, declared: &str, label: &str) -> String {
        let mut n = 1;
        loop {
            let candidate = format!("{}_{}", label, n);
            if self.find(block_type, declared, &candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Default value of a top-level `variable` block, unquoted.
    pub fn variable_default(&self, name: &str) -> Option<String> {
        self.find_labeled("variable", name)
            .and_then(|b| scan::attr_value(&b.body, "default"))
            .and_then(scan::unquote)
    }

    fn set_variable_default(&mut self, name: &str, value: &str) {
        let quoted = quote(value);
        if let Some(block) = self
            .blocks
            .iter_mut()
            .find(|b| b.block_type == "variable" && b.labels.first().map(String::as_str) == Some(name))
        {
            match scan::replace_attr_value(&block.body, "default", &quoted) {
                Some(body) => block.body = body,
                None => block.body.push_str(&format!("\n  default = {}", quoted)),
            }
        } else {
            self.blocks.push(Block::new(
                "variable",
                vec![name.to_string()],
                format!("  type    = string\n  default = {}", quoted),
            ));
        }
    }

    /// The first resource's literal location becomes the run's ambient
    /// default; subsequent blocks fall in line behind `var.location`.
    fn normalize_location(&mut self, block: &mut Block) {
        let Some(value) = scan::attr_value(&block.body, "location").map(str::to_string) else {
            return;
        };
        let Some(literal) = scan::unquote(&value) else {
            return; // already a variable reference or expression
        };
        if self.variable_default("location").as_deref() != Some(literal.as_str()) {
            self.set_variable_default("location", &literal);
        }
        if let Some(body) = scan::replace_attr_value(&block.body, "location", "var.location") {
            block.body = body;
        }
    }

    /// Machine-generated names are centralized behind `var.resource_name`
    /// so acceptance naming stays randomizable from one place.
    fn normalize_name(&mut self, block: &mut Block) {
        let Some(value) = scan::attr_value(&block.body, "name").map(str::to_string) else {
            return;
        };
        let Some(literal) = scan::unquote(&value) else {
            return;
        };
        if literal == "default" || literal == "current" || literal.starts_with("Microsoft.") {
            return;
        }
        if let Some(body) = scan::replace_attr_value(&block.body, "name", "var.resource_name") {
            block.body = body;
        }
    }

    fn merge_terraform(&mut self, incoming: &Block) {
        let Some(pos) = self.blocks.iter().position(|b| b.block_type == "terraform") else {
            self.blocks.push(incoming.clone());
            return;
        };
        let Some(inc_range) = scan::nested_block_inner(&incoming.body, "required_providers") else {
            return;
        };
        let inc_inner = incoming.body[inc_range].to_string();
        let existing = &self.blocks[pos];
        let Some(ex_range) = scan::nested_block_inner(&existing.body, "required_providers") else {
            return;
        };
        let ex_inner = existing.body[ex_range.clone()].to_string();
        let present: HashSet<String> = scan::top_level_attrs(&ex_inner)
            .into_iter()
            .map(|a| a.name)
            .collect();
        let mut additions = String::new();
        for attr in scan::top_level_attrs(&inc_inner) {
            if !present.contains(&attr.name) {
                additions.push_str(&format!("    {} = {}\n", attr.name, &inc_inner[attr.value]));
            }
        }
        if additions.is_empty() {
            return;
        }
        // insert before the closing brace's indentation
        let mut at = ex_range.end;
        let bytes = existing.body.as_bytes();
        while at > ex_range.start && (bytes[at - 1] == b' ' || bytes[at - 1] == b'\t') {
            at -= 1;
        }
        self.blocks[pos].body.insert_str(at, &additions);
    }

    /// Fold raw block text into the document. On a label collision the
    /// incoming block is either skipped (idempotent reuse, when
    /// `skip_when_duplicate` is set and the declared `type` attributes
    /// match) or renamed with a numeric suffix, with every address
    /// mentioning the old label rewritten across the incoming text.
    /// Returns a Reference to the last resource/data block retained.
    /// A parse failure leaves the document unmodified.
    pub fn merge(
        &mut self,
        text: &str,
        skip_when_duplicate: bool,
    ) -> Result<Option<Reference>, DocumentError> {
        let mut incoming = parse_blocks(text)?;
        for block in &incoming {
            if matches!(block.block_type.as_str(), "resource" | "data") && block.labels.len() < 2 {
                return Err(DocumentError::MissingLabels {
                    kind: block.block_type.clone(),
                });
            }
        }

        let mut last_ref = None;
        let mut idx = 0;
        while idx < incoming.len() {
            match incoming[idx].block_type.as_str() {
                "resource" | "data" => {
                    let kind = if incoming[idx].block_type == "data" {
                        BlockKind::Data
                    } else {
                        BlockKind::Resource
                    };
                    let declared = incoming[idx].labels[0].clone();
                    let label = incoming[idx].labels[1].clone();
                    if let Some(existing) = self.find(&incoming[idx].block_type, &declared, &label)
                    {
                        let same_type = existing.type_attr() == incoming[idx].type_attr();
                        if skip_when_duplicate && same_type {
                            debug!("reusing existing {} \"{}\" \"{}\"", kind, declared, label);
                            last_ref = Some(Reference::new(kind, &declared, &label, "id"));
                            idx += 1;
                            continue;
                        }
                        let new_label =
                            self.next_free_label(&incoming[idx].block_type, &declared, &label);
                        debug!("renaming {}.{} to {}.{}", declared, label, declared, new_label);
                        let old_prefix = format!("{}.{}.", declared, label);
                        let new_prefix = format!("{}.{}.", declared, new_label);
                        for other in incoming.iter_mut() {
                            if other.body.contains(&old_prefix) {
                                other.body = other.body.replace(&old_prefix, &new_prefix);
                            }
                        }
                        incoming[idx].labels[1] = new_label;
                    }
                    let mut block = incoming[idx].clone();
                    self.normalize_location(&mut block);
                    self.normalize_name(&mut block);
                    last_ref = Some(Reference::new(kind, &declared, &block.labels[1], "id"));
                    self.blocks.push(block);
                }
                "variable" | "provider" => {
                    let label = incoming[idx].labels.first().cloned().unwrap_or_default();
                    if self
                        .find_labeled(&incoming[idx].block_type, &label)
                        .is_none()
                    {
                        self.blocks.push(incoming[idx].clone());
                    }
                }
                "terraform" => {
                    let block = incoming[idx].clone();
                    self.merge_terraform(&block);
                }
                "output" => {}
                _ => {
                    self.blocks.push(incoming[idx].clone());
                }
            }
            idx += 1;
        }
        Ok(last_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VNET: &str = "resource \"azapi_resource\" \"vnet\" {\n  type = \"Microsoft.Network/virtualNetworks@2023-04-01\"\n  name = \"acctest-vnet\"\n  location = \"westeurope\"\n}\n";

    fn base() -> Document {
        Document::parse(
            "variable \"resource_name\" {\n  type    = string\n  default = \"acctest0001\"\n}\n\nvariable \"location\" {\n  type    = string\n  default = \"westeurope\"\n}\n",
        )
        .unwrap()
    }

    #[test]
    fn parse_and_render_round_trip() {
        let doc = Document::parse(VNET).unwrap();
        assert_eq!(doc.blocks().len(), 1);
        let rendered = doc.render();
        assert!(rendered.starts_with("resource \"azapi_resource\" \"vnet\" {"));
        assert!(rendered.contains("type = \"Microsoft.Network/virtualNetworks@2023-04-01\""));
    }

    #[test]
    fn idempotent_merge_keeps_one_copy() {
        let mut doc = base();
        let first = doc.merge(VNET, true).unwrap().unwrap();
        let count = doc.blocks().len();
        let second = doc.merge(VNET, true).unwrap().unwrap();
        assert_eq!(doc.blocks().len(), count);
        assert_eq!(first, second);
    }

    #[test]
    fn collision_renames_with_suffix_and_rewrites_addresses() {
        let mut doc = base();
        doc.merge(VNET, true).unwrap();
        let other = "resource \"azapi_resource\" \"vnet\" {\n  type = \"Microsoft.Compute/virtualMachines@2023-03-01\"\n  name = \"acctest-vm\"\n}\n\nresource \"azapi_resource\" \"dependent\" {\n  type = \"Microsoft.Compute/disks@2023-03-01\"\n  parent_id = azapi_resource.vnet.id\n  other_id = \"${azapi_resource.vnet.id}/sub\"\n}\n";
        let reference = doc.merge(other, true).unwrap().unwrap();
        assert_eq!(reference.label, "dependent");
        let renamed = doc.find("resource", "azapi_resource", "vnet_1").unwrap();
        assert!(renamed.type_attr().unwrap().starts_with("Microsoft.Compute"));
        let dependent = doc.find("resource", "azapi_resource", "dependent").unwrap();
        assert!(dependent.body.contains("azapi_resource.vnet_1.id"));
        assert!(dependent.body.contains("${azapi_resource.vnet_1.id}/sub"));
        // the original block is untouched
        let original = doc.find("resource", "azapi_resource", "vnet").unwrap();
        assert!(original.type_attr().unwrap().starts_with("Microsoft.Network"));
    }

    #[test]
    fn location_literal_updates_ambient_default() {
        let mut doc = base();
        let text = "resource \"azapi_resource\" \"a\" {\n  type = \"Microsoft.X/y@1\"\n  location = \"eastus\"\n}\n";
        doc.merge(text, true).unwrap();
        assert_eq!(doc.variable_default("location").as_deref(), Some("eastus"));
        let block = doc.find("resource", "azapi_resource", "a").unwrap();
        assert!(block.body.contains("location = var.location"));
    }

    #[test]
    fn location_variable_reference_is_left_alone() {
        let mut doc = base();
        let text = "resource \"azapi_resource\" \"a\" {\n  type = \"Microsoft.X/y@1\"\n  location = var.location\n}\n";
        doc.merge(text, true).unwrap();
        assert_eq!(doc.variable_default("location").as_deref(), Some("westeurope"));
    }

    #[test]
    fn name_literal_is_centralized() {
        let mut doc = base();
        doc.merge(VNET, true).unwrap();
        let block = doc.find("resource", "azapi_resource", "vnet").unwrap();
        assert!(block.body.contains("name = var.resource_name"));
    }

    #[test]
    fn sentinel_names_are_kept() {
        let mut doc = base();
        let text = "resource \"azapi_resource\" \"a\" {\n  type = \"Microsoft.X/y@1\"\n  name = \"default\"\n}\n\nresource \"azapi_resource\" \"b\" {\n  type = \"Microsoft.X/z@1\"\n  name = \"Microsoft.Insights\"\n}\n";
        doc.merge(text, true).unwrap();
        assert!(doc.find("resource", "azapi_resource", "a").unwrap().body.contains("name = \"default\""));
        assert!(doc.find("resource", "azapi_resource", "b").unwrap().body.contains("name = \"Microsoft.Insights\""));
    }

    #[test]
    fn variables_and_providers_are_unique_by_label() {
        let mut doc = base();
        let text = "variable \"location\" {\n  type    = string\n  default = \"eastus\"\n}\n\nprovider \"azapi\" {}\n";
        doc.merge(text, true).unwrap();
        assert_eq!(doc.variable_default("location").as_deref(), Some("westeurope"));
        let providers = doc.blocks().iter().filter(|b| b.block_type == "provider").count();
        assert_eq!(providers, 1);
    }

    #[test]
    fn required_providers_merge_without_duplication() {
        let mut doc = Document::parse(
            "terraform {\n  required_providers {\n    azapi = {\n      source = \"Azure/azapi\"\n    }\n  }\n}\n",
        )
        .unwrap();
        let text = "terraform {\n  required_providers {\n    azapi = {\n      source = \"Azure/azapi\"\n    }\n    azurerm = {\n      source = \"hashicorp/azurerm\"\n    }\n  }\n}\n";
        doc.merge(text, true).unwrap();
        let tf = doc.blocks().iter().find(|b| b.block_type == "terraform").unwrap();
        assert_eq!(tf.body.matches("azapi = {").count(), 1);
        assert!(tf.body.contains("azurerm = {"));
        let terraform_blocks = doc.blocks().iter().filter(|b| b.block_type == "terraform").count();
        assert_eq!(terraform_blocks, 1);
    }

    #[test]
    fn output_blocks_are_dropped() {
        let mut doc = base();
        doc.merge("output \"id\" {\n  value = azapi_resource.a.id\n}\n", true)
            .unwrap();
        assert!(doc.blocks().iter().all(|b| b.block_type != "output"));
    }

    #[test]
    fn parse_failure_leaves_document_unmodified() {
        let mut doc = base();
        let before = doc.blocks().len();
        assert!(doc.merge("resource \"azapi_resource\" \"a\" {", true).is_err());
        assert_eq!(doc.blocks().len(), before);
    }

    #[test]
    fn missing_labels_are_fatal() {
        let mut doc = base();
        let err = doc.merge("resource \"azapi_resource\" {\n}\n", true);
        assert!(matches!(err, Err(DocumentError::MissingLabels { .. })));
    }

    #[test]
    fn leading_comments_attach_to_blocks() {
        let text = "# TODO: finish this\nresource \"azapi_resource\" \"stub\" {\n  type = \"Microsoft.X/y@1\"\n}\n";
        let blocks = parse_blocks(text).unwrap();
        assert_eq!(blocks[0].leading_comments, vec!["# TODO: finish this"]);
        assert!(blocks[0].render().starts_with("# TODO: finish this\n"));
    }
}
