// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Block-type command (§4.10): `setBlockType`.

use crate::dom::attrs::AttrMap;
use crate::ids::{BlockId, NodeTypeName};
use crate::state::EditorState;
use crate::transaction::{Transaction, TransactionBuilder};

/// Retype `block` to `new_type` (§4.10, "emits `SetBlockType` and drops
/// excluded marks"). Mark-exclusion and attribute-default merging both
/// happen inside `Step::apply` (§4.2) — this command just queues the step
/// and carries the selection through unchanged. `None` for an unknown
/// block or an unregistered node type.
pub fn set_block_type(state: &EditorState, block: BlockId, new_type: impl Into<NodeTypeName>, attrs: AttrMap) -> Option<Transaction> {
    let doc = state.doc();
    let schema = state.schema();
    let new_type = new_type.into();
    schema.node_spec(&new_type)?;
    doc.block(block)?;
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.set_block_type(block, new_type.clone()).ok()?;
    if !attrs.is_empty() {
        let path = doc.path_of(block)?;
        builder.set_node_attr(path, attrs).ok()?;
    }
    builder.set_selection(state.selection().clone());
    Some(builder.build())
}
