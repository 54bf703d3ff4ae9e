// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::ids::{InlineNodeTypeName, MarkTypeName, NodeTypeName};
use crate::schema::inline_spec::InlineNodeSpec;
use crate::schema::mark_spec::MarkSpec;
use crate::schema::node_spec::NodeSpec;

/// A pass-through registry entry: the core stores these only to hand them
/// back out to the host (keymaps, input rules, toolbar items, block-type
/// picker entries, file handlers, §4.1); it never interprets their
/// contents.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PassThroughEntry {
    pub id: String,
    pub data: serde_json::Value,
}

impl PassThroughEntry {
    pub fn new(id: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

/// Built at plugin-init time, then read-only for the session (§4.1).
#[derive(Default)]
pub struct SchemaRegistry {
    nodes: HashMap<NodeTypeName, NodeSpec>,
    marks: HashMap<MarkTypeName, MarkSpec>,
    inline_nodes: HashMap<InlineNodeTypeName, InlineNodeSpec>,
    keymaps: Vec<PassThroughEntry>,
    input_rules: Vec<PassThroughEntry>,
    toolbar_items: Vec<PassThroughEntry>,
    block_type_picker_entries: Vec<PassThroughEntry>,
    file_handlers: Vec<PassThroughEntry>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node(&mut self, type_name: impl Into<NodeTypeName>, spec: NodeSpec) {
        self.nodes.insert(type_name.into(), spec);
    }

    pub fn register_mark(&mut self, type_name: impl Into<MarkTypeName>, spec: MarkSpec) {
        self.marks.insert(type_name.into(), spec);
    }

    pub fn register_inline_node(
        &mut self,
        type_name: impl Into<InlineNodeTypeName>,
        spec: InlineNodeSpec,
    ) {
        self.inline_nodes.insert(type_name.into(), spec);
    }

    pub fn node_spec(&self, type_name: &NodeTypeName) -> Option<&NodeSpec> {
        self.nodes.get(type_name)
    }

    pub fn require_node_spec(&self, type_name: &NodeTypeName) -> CoreResult<&NodeSpec> {
        self.node_spec(type_name)
            .ok_or_else(|| CoreError::unknown_node_type(type_name))
    }

    pub fn mark_spec(&self, type_name: &MarkTypeName) -> Option<&MarkSpec> {
        self.marks.get(type_name)
    }

    pub fn require_mark_spec(&self, type_name: &MarkTypeName) -> CoreResult<&MarkSpec> {
        self.mark_spec(type_name)
            .ok_or_else(|| CoreError::unknown_mark_type(type_name))
    }

    pub fn inline_node_spec(&self, type_name: &InlineNodeTypeName) -> Option<&InlineNodeSpec> {
        self.inline_nodes.get(type_name)
    }

    pub fn node_type_names(&self) -> impl Iterator<Item = &NodeTypeName> {
        self.nodes.keys()
    }

    pub fn register_keymap(&mut self, entry: PassThroughEntry) {
        self.keymaps.push(entry);
    }

    pub fn register_input_rule(&mut self, entry: PassThroughEntry) {
        self.input_rules.push(entry);
    }

    pub fn register_toolbar_item(&mut self, entry: PassThroughEntry) {
        self.toolbar_items.push(entry);
    }

    pub fn register_block_type_picker_entry(&mut self, entry: PassThroughEntry) {
        self.block_type_picker_entries.push(entry);
    }

    pub fn register_file_handler(&mut self, entry: PassThroughEntry) {
        self.file_handlers.push(entry);
    }

    pub fn keymaps(&self) -> &[PassThroughEntry] {
        &self.keymaps
    }

    pub fn input_rules(&self) -> &[PassThroughEntry] {
        &self.input_rules
    }

    pub fn toolbar_items(&self) -> &[PassThroughEntry] {
        &self.toolbar_items
    }

    pub fn block_type_picker_entries(&self) -> &[PassThroughEntry] {
        &self.block_type_picker_entries
    }

    pub fn file_handlers(&self) -> &[PassThroughEntry] {
        &self.file_handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node_spec::AttrFieldSpec;

    #[test]
    fn node_lookup_is_present_after_registration() {
        let mut registry = SchemaRegistry::new();
        registry.register_node(
            "heading",
            NodeSpec::default().with_attr("level", AttrFieldSpec::new(1.0)),
        );
        let spec = registry.require_node_spec(&NodeTypeName::from("heading")).unwrap();
        assert!(spec.attr_schema.contains_key("level"));
    }

    #[test]
    fn unknown_node_lookup_errors() {
        let registry = SchemaRegistry::new();
        let err = registry.require_node_spec(&NodeTypeName::from("bogus"));
        assert!(matches!(err, Err(CoreError::UnknownType { .. })));
    }

    #[test]
    fn pass_through_registries_preserve_registration_order() {
        let mut registry = SchemaRegistry::new();
        registry.register_toolbar_item(PassThroughEntry::new("bold", serde_json::json!({"icon": "B"})));
        registry.register_toolbar_item(PassThroughEntry::new("italic", serde_json::json!({"icon": "I"})));
        let ids: Vec<_> = registry.toolbar_items().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["bold", "italic"]);
    }
}
