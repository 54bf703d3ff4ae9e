// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Motion and extension commands (§4.7): character, block-end ("Home"/
//! "End") and document-end ("Ctrl+Home"/"Ctrl+End") granularities, each
//! with a caret-moving and a selection-extending form, parameterized by a
//! `forward` direction flag rather than four separate functions per
//! granularity.
//!
//! `storedMarks` clearing falls out for free: these commands never set
//! `Transaction::stored_marks`, and `EditorState::apply`'s default for an
//! unset field is to clear (§4.6).

use crate::dom::document::Document;
use crate::dom::node::{BlockContent, BlockNode, InlineChild};
use crate::dom::path::BlockPos;
use crate::ids::BlockId;
use crate::schema::SchemaRegistry;
use crate::selection::{GapCursor, GapSide, NodeSelection, Selection};
use crate::state::EditorState;
use crate::text_unit::{next_grapheme_width, prev_grapheme_width};
use crate::transaction::{Transaction, TransactionBuilder};

/// One extended-grapheme-cluster (or whole-InlineNode) step within a leaf
/// block's children, starting at `offset`. `None` if `offset` is already at
/// the edge in the requested direction (§4.7: "Step over InlineNodes
/// atomically").
fn step_within_block(children: &[InlineChild], offset: usize, forward: bool) -> Option<usize> {
    let total: usize = children.iter().map(InlineChild::width).sum();
    if forward {
        if offset >= total {
            return None;
        }
        let mut pos = 0;
        for child in children {
            let width = child.width();
            if offset < pos + width {
                return match child {
                    InlineChild::Text(t) => {
                        let local = offset - pos;
                        next_grapheme_width(&t.text, local).map(|w| offset + w)
                    }
                    InlineChild::Inline(_) => Some(pos + width),
                };
            }
            pos += width;
        }
        None
    } else {
        if offset == 0 {
            return None;
        }
        let mut pos = 0;
        for child in children {
            let width = child.width();
            if offset > pos && offset <= pos + width {
                return match child {
                    InlineChild::Text(t) => {
                        let local = offset - pos;
                        prev_grapheme_width(&t.text, local).map(|w| offset - w)
                    }
                    InlineChild::Inline(_) => Some(pos),
                };
            }
            pos += width;
        }
        None
    }
}

/// Every block a caret or NodeSelection can land on, in document order:
/// leaves, and void blocks (which are never descended into even when
/// structurally a container, §4.7 "void-and-selectable").
fn navigable_units(doc: &Document, schema: &SchemaRegistry) -> Vec<BlockId> {
    fn walk(node: &BlockNode, schema: &SchemaRegistry, out: &mut Vec<BlockId>) {
        let is_void = schema.node_spec(&node.type_name).map(|s| s.is_void).unwrap_or(false);
        match &node.content {
            BlockContent::Leaf(_) => out.push(node.id),
            BlockContent::Container(children) => {
                if is_void {
                    out.push(node.id);
                } else {
                    for child in children {
                        walk(child, schema, out);
                    }
                }
            }
        }
    }
    let mut out = Vec::new();
    if let BlockContent::Container(children) = &doc.root().content {
        for child in children {
            walk(child, schema, out);
        }
    }
    out
}

fn adjacent_unit(doc: &Document, schema: &SchemaRegistry, id: BlockId, forward: bool) -> Option<BlockId> {
    let units = navigable_units(doc, schema);
    let idx = units.iter().position(|u| *u == id)?;
    if forward {
        units.get(idx + 1).copied()
    } else {
        idx.checked_sub(1).and_then(|i| units.get(i).copied())
    }
}

/// Land a caret/selection on `target`, entering from the side implied by
/// `forward` (crossing into it from the block we just left).
fn land_entering(doc: &Document, schema: &SchemaRegistry, target: BlockId, forward: bool) -> Option<Transaction> {
    let target_node = doc.block(target)?;
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    if target_node.content.is_leaf() {
        let offset = if forward { 0 } else { target_node.text_len() };
        builder.set_selection(Selection::collapsed(BlockPos::new(target, offset)));
    } else {
        let path = doc.path_of(target)?;
        let selectable = schema.node_spec(&target_node.type_name).map(|s| s.selectable).unwrap_or(false);
        if selectable {
            builder.set_selection(Selection::node(target, path));
        } else {
            let side = if forward { GapSide::Before } else { GapSide::After };
            builder.set_selection(Selection::gap(target, side, path));
        }
    }
    Some(builder.build())
}

/// Land at the extreme edge of `target` itself (document start/end), not
/// at the edge implied by crossing in from a neighbor.
fn land_at_extreme(doc: &Document, schema: &SchemaRegistry, target: BlockId, at_end: bool) -> Option<Transaction> {
    let target_node = doc.block(target)?;
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    if target_node.content.is_leaf() {
        let offset = if at_end { target_node.text_len() } else { 0 };
        builder.set_selection(Selection::collapsed(BlockPos::new(target, offset)));
    } else {
        let path = doc.path_of(target)?;
        let selectable = schema.node_spec(&target_node.type_name).map(|s| s.selectable).unwrap_or(false);
        if selectable {
            builder.set_selection(Selection::node(target, path));
        } else {
            let side = if at_end { GapSide::After } else { GapSide::Before };
            builder.set_selection(Selection::gap(target, side, path));
        }
    }
    Some(builder.build())
}

fn move_away_from_node(state: &EditorState, n: &NodeSelection, forward: bool) -> Option<Transaction> {
    let doc = state.doc();
    let schema = state.schema();
    let target = adjacent_unit(doc, schema, n.node, forward)?;
    land_entering(doc, schema, target, forward)
}

fn move_away_from_gap(state: &EditorState, g: &GapCursor, forward: bool) -> Option<Transaction> {
    let doc = state.doc();
    let schema = state.schema();
    match (g.side, forward) {
        (GapSide::Before, true) | (GapSide::After, false) => land_entering(doc, schema, g.block, forward),
        (GapSide::Before, false) => {
            let target = adjacent_unit(doc, schema, g.block, false)?;
            land_entering(doc, schema, target, false)
        }
        (GapSide::After, true) => {
            let target = adjacent_unit(doc, schema, g.block, true)?;
            land_entering(doc, schema, target, true)
        }
    }
}

/// Move the caret one extended grapheme cluster (§4.7). `forward` selects
/// direction. A non-collapsed selection collapses to its `head` rather
/// than also advancing (§4.7).
pub fn move_by_char(state: &EditorState, forward: bool) -> Option<Transaction> {
    match state.selection() {
        Selection::Text(t) => {
            if !t.is_collapsed() {
                let mut builder = TransactionBuilder::new(state.doc(), state.schema(), "motion");
                builder.set_selection(Selection::collapsed(t.head));
                return Some(builder.build());
            }
            let doc = state.doc();
            let schema = state.schema();
            let node = doc.block(t.head.block)?;
            let children = node.content.as_leaf()?;
            if let Some(new_offset) = step_within_block(children, t.head.offset, forward) {
                let mut builder = TransactionBuilder::new(doc, schema, "motion");
                builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, new_offset)));
                return Some(builder.build());
            }
            let target = adjacent_unit(doc, schema, t.head.block, forward)?;
            land_entering(doc, schema, target, forward)
        }
        Selection::Node(n) => move_away_from_node(state, n, forward),
        Selection::Gap(g) => move_away_from_gap(state, g, forward),
    }
}

/// Extend the head of a TextSelection by one grapheme cluster, keeping the
/// anchor fixed. Extending across a void block is not supported (treated
/// as a hard boundary); extending from a NodeSelection/GapCursor is not
/// supported either (§9 open question — see DESIGN.md).
pub fn extend_by_char(state: &EditorState, forward: bool) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let children = node.content.as_leaf()?;
    if let Some(new_offset) = step_within_block(children, t.head.offset, forward) {
        let mut builder = TransactionBuilder::new(doc, schema, "motion");
        builder.set_selection(Selection::text(t.anchor, BlockPos::new(t.head.block, new_offset)));
        return Some(builder.build());
    }
    let target = adjacent_unit(doc, schema, t.head.block, forward)?;
    let target_node = doc.block(target)?;
    if !target_node.content.is_leaf() {
        return None;
    }
    let offset = if forward { 0 } else { target_node.text_len() };
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    builder.set_selection(Selection::text(t.anchor, BlockPos::new(target, offset)));
    Some(builder.build())
}

/// Move the caret to the start (`forward = false`) or end (`forward =
/// true`) of the current block ("Home"/"End").
pub fn move_by_block_end(state: &EditorState, forward: bool) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    if !t.is_collapsed() {
        let mut builder = TransactionBuilder::new(doc, schema, "motion");
        builder.set_selection(Selection::collapsed(t.head));
        return Some(builder.build());
    }
    let node = doc.block(t.head.block)?;
    let edge = if forward { node.text_len() } else { 0 };
    if t.head.offset == edge {
        return None;
    }
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, edge)));
    Some(builder.build())
}

/// Extend the head to the start/end of the current block ("Shift+Home"/
/// "Shift+End").
pub fn extend_by_block_end(state: &EditorState, forward: bool) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let edge = if forward { node.text_len() } else { 0 };
    if t.head.offset == edge {
        return None;
    }
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    builder.set_selection(Selection::text(t.anchor, BlockPos::new(t.head.block, edge)));
    Some(builder.build())
}

/// Move the caret to the very start/end of the document ("Ctrl+Home"/
/// "Ctrl+End").
pub fn move_by_document_end(state: &EditorState, forward: bool) -> Option<Transaction> {
    let doc = state.doc();
    let schema = state.schema();
    if let Selection::Text(t) = state.selection() {
        if !t.is_collapsed() {
            let mut builder = TransactionBuilder::new(doc, schema, "motion");
            builder.set_selection(Selection::collapsed(t.head));
            return Some(builder.build());
        }
    }
    let units = navigable_units(doc, schema);
    let target = if forward { units.last().copied() } else { units.first().copied() }?;
    let already = match state.selection() {
        Selection::Text(t) => {
            let edge = if forward { doc.block(target)?.text_len() } else { 0 };
            t.head.block == target && t.head.offset == edge
        }
        Selection::Node(n) => n.node == target,
        Selection::Gap(g) => g.block == target,
    };
    if already {
        return None;
    }
    land_at_extreme(doc, schema, target, forward)
}

/// Extend the head to the very start/end of the document.
pub fn extend_by_document_end(state: &EditorState, forward: bool) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let units = navigable_units(doc, schema);
    let target = if forward { units.last().copied() } else { units.first().copied() }?;
    let target_node = doc.block(target)?;
    if !target_node.content.is_leaf() {
        return None;
    }
    let offset = if forward { target_node.text_len() } else { 0 };
    if t.head.block == target && t.head.offset == offset {
        return None;
    }
    let mut builder = TransactionBuilder::new(doc, schema, "motion");
    builder.set_selection(Selection::text(t.anchor, BlockPos::new(target, offset)));
    Some(builder.build())
}
