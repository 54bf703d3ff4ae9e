// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Mark command (§4.10): `toggleMark`.

use crate::dom::document::Document;
use crate::dom::mark::Mark;
use crate::dom::node::InlineChild;
use crate::dom::path::BlockPos;
use crate::ids::{BlockId, MarkTypeName};
use crate::state::EditorState;
use crate::transaction::{Transaction, TransactionBuilder};

/// Toggle `mark` over the current selection (§4.10). On a collapsed
/// selection this updates `storedMarks` instead of touching the document
/// (§4.6); otherwise it emits `AddMark` if any part of the range is
/// missing the mark, or `RemoveMark` if the whole range already carries it
/// — "fully covered" per §4.10. Atomic inline nodes don't carry marks and
/// are skipped when checking coverage.
///
/// Like `range_ops::delete_range`, multi-block ranges are only compiled
/// when every block in the span shares an immediate parent (see
/// `DESIGN.md`).
pub fn toggle_mark(state: &EditorState, mark: Mark) -> Option<Transaction> {
    let t = state.selection().as_text()?;
    let doc = state.doc();
    let schema = state.schema();

    if t.is_collapsed() {
        let mut active = caret_active_marks(doc, t.head);
        if active.iter().any(|m| m.type_name == mark.type_name) {
            active.retain(|m| m.type_name != mark.type_name);
        } else {
            active.push(mark);
        }
        let previous = state.stored_marks().map(|m| m.to_vec());
        let mut builder = TransactionBuilder::new(doc, schema, "command");
        builder.set_stored_marks_step(Some(active.clone()), previous).ok()?;
        builder.set_stored_marks(crate::transaction::StoredMarksChange::Set(active));
        builder.set_selection(state.selection().clone());
        return Some(builder.build());
    }

    let (from, to) = t.range(doc);
    let spans = collect_spans(doc, from, to)?;
    let fully_covered = spans
        .iter()
        .all(|(block, start, end)| *start == *end || span_has_mark(doc, *block, *start, *end, &mark.type_name));

    let mut builder = TransactionBuilder::new(doc, schema, "command");
    for (block, start, end) in &spans {
        if start == end {
            continue;
        }
        if fully_covered {
            builder.remove_mark(*block, *start, *end, mark.clone()).ok()?;
        } else {
            builder.add_mark(*block, *start, *end, mark.clone()).ok()?;
        }
    }
    builder.set_selection(state.selection().clone());
    Some(builder.build())
}

/// The marks that would apply to text typed at `pos`: the run just before
/// the caret, or the run at the caret if it sits at the block's start.
fn caret_active_marks(doc: &Document, pos: BlockPos) -> Vec<Mark> {
    let Some(node) = doc.block(pos.block) else {
        return Vec::new();
    };
    let Some(children) = node.content.as_leaf() else {
        return Vec::new();
    };
    let mut consumed = 0usize;
    let mut before: Option<&InlineChild> = None;
    let mut at_or_after: Option<&InlineChild> = None;
    for child in children {
        let start = consumed;
        let end = consumed + child.width();
        consumed = end;
        if end <= pos.offset {
            before = Some(child);
        } else if at_or_after.is_none() {
            at_or_after = Some(child);
        }
    }
    let chosen = if pos.offset == 0 { at_or_after.or(before) } else { before.or(at_or_after) };
    chosen.and_then(InlineChild::as_text).map(|t| t.marks.to_vec()).unwrap_or_default()
}

fn span_has_mark(doc: &Document, block: BlockId, start: usize, end: usize, mark_type: &MarkTypeName) -> bool {
    let Some(node) = doc.block(block) else {
        return false;
    };
    let Some(children) = node.content.as_leaf() else {
        return false;
    };
    let mut consumed = 0usize;
    for child in children {
        let child_start = consumed;
        let child_end = consumed + child.width();
        consumed = child_end;
        if child_end <= start || child_start >= end {
            continue;
        }
        if let InlineChild::Text(t) = child {
            if !t.marks.contains_type(mark_type) {
                return false;
            }
        }
    }
    true
}

/// Per-block `(start, end)` spans the selection touches, assuming every
/// block in the range shares one immediate parent (flat sibling case).
fn collect_spans(doc: &Document, from: BlockPos, to: BlockPos) -> Option<Vec<(BlockId, usize, usize)>> {
    if from.block == to.block {
        return Some(vec![(from.block, from.offset, to.offset)]);
    }
    let parent_path = doc.parent_path_of(from.block)?;
    if doc.parent_path_of(to.block)? != parent_path {
        return None;
    }
    let parent = doc.navigate(&parent_path)?;
    let siblings = parent.content.as_container()?;
    let from_idx = siblings.iter().position(|c| c.id == from.block)?;
    let to_idx = siblings.iter().position(|c| c.id == to.block)?;
    if to_idx <= from_idx {
        return None;
    }
    let mut spans = vec![(from.block, from.offset, doc.block(from.block)?.text_len())];
    for sibling in &siblings[from_idx + 1..to_idx] {
        spans.push((sibling.id, 0, sibling.text_len()));
    }
    spans.push((to.block, 0, to.offset));
    Some(spans)
}
