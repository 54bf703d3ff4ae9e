// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Text-editing commands (§4.10): `insertText`, the four delete-backward/
//! forward flavors (character, word, soft line), each clearing a current
//! range first when one is selected.

use crate::dom::mark::MarkSet;
use crate::dom::path::BlockPos;
use crate::range_ops::delete_range;
use crate::selection::Selection;
use crate::state::EditorState;
use crate::text_unit::{prev_grapheme_width, word_boundaries};
use crate::transaction::{Transaction, TransactionBuilder};

/// Insert `text` at the caret, replacing any active range first (§4.10).
/// `marks` are normally `state.stored_marks()` if set, else the marks
/// already present at the insertion point — callers decide and pass them
/// in explicitly since that policy lives at the input-event layer (§6.1).
/// Any mark the target block's schema excludes is dropped before insertion
/// (§4.6, "silently dropped at consumption time").
pub fn insert_text(state: &EditorState, text: &str, mut marks: MarkSet) -> Option<Transaction> {
    if text.is_empty() {
        return None;
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    if let Some(spec) = schema.node_spec(&doc.block(t.head.block)?.type_name) {
        marks.strip_excluded(&spec.exclude_marks);
    }
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    let (from, to) = t.range(doc);
    delete_range(&mut builder, from, to).ok()?;
    let width = crate::text_unit::utf16_len(text);
    builder.insert_text(from.block, from.offset, text, marks).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(from.block, from.offset + width)));
    Some(builder.build())
}

fn delete_active_range(state: &EditorState) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    if t.is_collapsed() {
        return None;
    }
    let doc = state.doc();
    let schema = state.schema();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    let (from, to) = t.range(doc);
    delete_range(&mut builder, from, to).ok()?;
    builder.set_selection(Selection::collapsed(from));
    Some(builder.build())
}

/// Delete one grapheme cluster before the caret, or the active range if
/// there is one (§4.10). `None` at the very start of the document's first
/// block, matching motion's "no transaction when impossible" convention.
pub fn delete_backward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let width = prev_grapheme_width(&leaf_plain_text(node), t.head.offset)?;
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, t.head.offset - width, t.head.offset).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, t.head.offset - width)));
    Some(builder.build())
}

/// Delete one grapheme cluster after the caret, or the active range.
pub fn delete_forward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let width = crate::text_unit::next_grapheme_width(&leaf_plain_text(node), t.head.offset)?;
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, t.head.offset, t.head.offset + width).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, t.head.offset)));
    Some(builder.build())
}

/// Delete from the caret back to the start of the Unicode word it's in
/// (§4.10, "uses Unicode word boundaries").
pub fn delete_word_backward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let bounds = word_boundaries(&leaf_plain_text(node));
    let start = bounds.iter().rev().find(|&&b| b < t.head.offset).copied()?;
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, start, t.head.offset).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, start)));
    Some(builder.build())
}

pub fn delete_word_forward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let bounds = word_boundaries(&leaf_plain_text(node));
    let end = bounds.iter().find(|&&b| b > t.head.offset).copied()?;
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, t.head.offset, end).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, t.head.offset)));
    Some(builder.build())
}

/// Delete from the caret to the start of the current visual line. Since
/// this crate has no layout component (§1 Non-goals: "layout"), "soft
/// line" degrades to "block", matching a single-line leaf block exactly
/// and a multi-line one approximately.
pub fn delete_soft_line_backward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    if t.head.offset == 0 {
        return None;
    }
    let doc = state.doc();
    let schema = state.schema();
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, 0, t.head.offset).ok()?;
    builder.set_selection(Selection::collapsed(BlockPos::new(t.head.block, 0)));
    Some(builder.build())
}

pub fn delete_soft_line_forward(state: &EditorState) -> Option<Transaction> {
    if let Some(tx) = delete_active_range(state) {
        return Some(tx);
    }
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();
    let node = doc.block(t.head.block)?;
    let len = node.text_len();
    if t.head.offset == len {
        return None;
    }
    let mut builder = TransactionBuilder::new(doc, schema, "command");
    builder.delete_text(t.head.block, t.head.offset, len).ok()?;
    builder.set_selection(Selection::collapsed(t.head));
    Some(builder.build())
}

/// Concatenate a leaf block's text runs into one plain string for
/// grapheme/word-boundary scanning. InlineNodes contribute a single
/// placeholder code unit so offsets stay aligned with `BlockNode::text_len`.
fn leaf_plain_text(node: &crate::dom::node::BlockNode) -> String {
    let mut out = String::new();
    if let Some(children) = node.content.as_leaf() {
        for child in children {
            match child {
                crate::dom::node::InlineChild::Text(t) => out.push_str(&t.text),
                crate::dom::node::InlineChild::Inline(_) => out.push('\u{fffc}'),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attrs::AttrMap;
    use crate::dom::document::Document;
    use crate::dom::node::{BlockNode, InlineChild, TextNode};
    use crate::ids::BlockId;
    use crate::schema::SchemaRegistry;
    use std::sync::Arc;

    fn para(id: u64, text: &str) -> BlockNode {
        BlockNode::new_leaf(BlockId::from_raw(id), "paragraph", AttrMap::new(), vec![InlineChild::Text(TextNode::plain(text))])
    }

    fn state(blocks: Vec<BlockNode>, sel: Selection) -> EditorState {
        EditorState::new(Document::new(blocks), sel, Arc::new(SchemaRegistry::new()))
    }

    #[test]
    fn insert_text_replaces_active_range() {
        let s = state(
            vec![para(1, "hello world")],
            Selection::text(BlockPos::new(BlockId::from_raw(1), 6), BlockPos::new(BlockId::from_raw(1), 11)),
        );
        let tx = insert_text(&s, "there", MarkSet::new()).unwrap();
        let next = s.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().content.as_leaf().unwrap()[0].as_text().unwrap().text, "hello there");
    }

    #[test]
    fn delete_backward_removes_one_grapheme() {
        let s = state(vec![para(1, "abc")], Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 3)));
        let tx = delete_backward(&s).unwrap();
        let next = s.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().text_len(), 2);
    }

    #[test]
    fn delete_backward_at_start_of_document_returns_none() {
        let s = state(vec![para(1, "abc")], Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 0)));
        assert!(delete_backward(&s).is_none());
    }

    #[test]
    fn delete_backward_prefers_deleting_active_range_over_single_grapheme() {
        let s = state(
            vec![para(1, "abcdef")],
            Selection::text(BlockPos::new(BlockId::from_raw(1), 1), BlockPos::new(BlockId::from_raw(1), 4)),
        );
        let tx = delete_backward(&s).unwrap();
        let next = s.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().text_len(), 3);
    }

    #[test]
    fn delete_word_backward_stops_at_word_boundary() {
        let s = state(vec![para(1, "hello world")], Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 11)));
        let tx = delete_word_backward(&s).unwrap();
        let next = s.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().content.as_leaf().unwrap()[0].as_text().unwrap().text, "hello ");
    }

    #[test]
    fn delete_soft_line_backward_clears_to_block_start() {
        let s = state(vec![para(1, "hello world")], Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 7)));
        let tx = delete_soft_line_backward(&s).unwrap();
        let next = s.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().content.as_leaf().unwrap()[0].as_text().unwrap().text, "orld");
    }
}
