// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Structural commands (§4.10): `splitBlock`, `mergeWithPrevious`,
//! `mergeWithNext`, `insertHardBreak`.

use crate::dom::attrs::AttrMap;
use crate::dom::node::InlineNode;
use crate::dom::path::BlockPos;
use crate::ids::next_block_id;
use crate::range_ops::delete_range;
use crate::selection::Selection;
use crate::state::EditorState;
use crate::transaction::{Transaction, TransactionBuilder};

/// Split the current block at the caret into two siblings (§4.10,
/// `splitBlock`). Clears any active range first. The tail block carries a
/// freshly generated id and the caret lands at its start.
pub fn split_block(state: &EditorState) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    let (from, to) = t.range(doc);
    delete_range(&mut builder, from, to).ok()?;
    let tail_id = next_block_id();
    builder.split_block(from.block, from.offset, tail_id).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(tail_id, 0)));
    Some(builder.build())
}

/// Merge the current block into its previous sibling (§4.10,
/// `mergeWithPrevious`). `None` if there is no previous sibling in the same
/// parent (§7: callers needing cross-parent unwrap/lift behavior compose
/// this with a separate "lift out of container" command, not built here —
/// §1 Non-goals doesn't name this, but it's out of scope for this pass;
/// see DESIGN.md).
pub fn merge_with_previous(state: &EditorState) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    if !t.is_collapsed() {
        return None;
    }
    let doc = state.doc();
    let schema = state.schema();
    let prev = doc.prev_sibling(t.head.block)?;
    if !doc.block(prev)?.content.is_leaf() {
        return None;
    }
    let caret_offset = doc.block(prev)?.text_len();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.merge_blocks(prev, t.head.block).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(prev, caret_offset)));
    Some(builder.build())
}

/// Merge the next sibling into the current block (§4.10,
/// `mergeWithNext`).
pub fn merge_with_next(state: &EditorState) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    if !t.is_collapsed() {
        return None;
    }
    let doc = state.doc();
    let schema = state.schema();
    let next = doc.next_sibling(t.head.block)?;
    if !doc.block(next)?.content.is_leaf() {
        return None;
    }
    let caret_offset = doc.block(t.head.block)?.text_len();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.merge_blocks(t.head.block, next).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, caret_offset)));
    Some(builder.build())
}

/// Insert a `hard_break` InlineNode at the caret, replacing any active
/// range first (§4.10).
pub fn insert_hard_break(state: &EditorState) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    let (from, to) = t.range(doc);
    delete_range(&mut builder, from, to).ok()?;
    let content = vec![crate::dom::node::InlineChild::Inline(InlineNode::new("hard_break", AttrMap::new()))];
    builder.insert_segments(from.block, from.offset, content).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(from.block, from.offset + 1)));
    Some(builder.build())
}
