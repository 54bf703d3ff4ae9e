// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component H: content slice & paste planner (§4.8) — extracting a
//! sub-document (`copy_slice`) and re-splicing one at an arbitrary position
//! with correct block splitting/merging (`paste_slice`), plus the
//! canonical clipboard JSON shape of §6.2.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dom::document::Document;
use crate::dom::mark::MarkSet;
use crate::dom::node::{BlockNode, InlineChild, InlineNode, TextNode};
use crate::dom::path::BlockPos;
use crate::error::{CoreError, CoreResult};
use crate::ids::{next_block_id, NodeTypeName};
use crate::range_ops::delete_range;
use crate::selection::Selection;
use crate::state::EditorState;
use crate::step::slice_children_range;
use crate::transaction::{Transaction, TransactionBuilder};

pub const PARAGRAPH_TYPE: &str = "paragraph";

/// One inline unit of a [`SliceBlock`] (§4.8): a text span carrying its own
/// mark set, or a marker standing in for an atomic inline node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SliceSegment {
    Text { text: String, marks: MarkSet },
    Inline(InlineNode),
}

impl SliceSegment {
    pub fn text(text: impl Into<String>, marks: MarkSet) -> Self {
        SliceSegment::Text {
            text: text.into(),
            marks,
        }
    }
}

/// One block of a [`ContentSlice`] (§4.8).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceBlock {
    #[serde(rename = "type")]
    pub type_name: NodeTypeName,
    pub attrs: crate::dom::attrs::AttrMap,
    pub segments: Vec<SliceSegment>,
}

/// A language-neutral, serializable document fragment used for copy/paste
/// (§4.8). HTML parsing into a `ContentSlice` is an external collaborator's
/// job (§1); this crate only knows how to extract one from a [`Document`]
/// and splice one back in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSlice {
    pub blocks: Vec<SliceBlock>,
}

impl ContentSlice {
    pub fn single_block(type_name: impl Into<NodeTypeName>, attrs: crate::dom::attrs::AttrMap, segments: Vec<SliceSegment>) -> Self {
        Self {
            blocks: vec![SliceBlock {
                type_name: type_name.into(),
                attrs,
                segments,
            }],
        }
    }

    /// Concatenation of every text segment's plain text, used as the
    /// clipboard side-channel key (§6.2, §9 open question).
    pub fn plain_text_fingerprint(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            for seg in &block.segments {
                if let SliceSegment::Text { text, .. } = seg {
                    out.push_str(text);
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn to_canonical_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn children_to_segments(children: &[InlineChild]) -> Vec<SliceSegment> {
    children
        .iter()
        .map(|c| match c {
            InlineChild::Text(t) => SliceSegment::text(t.text.clone(), t.marks.clone()),
            InlineChild::Inline(i) => SliceSegment::Inline(i.clone()),
        })
        .collect()
}

fn segments_to_children(segments: &[SliceSegment]) -> Vec<InlineChild> {
    segments
        .iter()
        .map(|seg| match seg {
            SliceSegment::Text { text, marks } => InlineChild::Text(TextNode::new(text.clone(), marks.clone())),
            SliceSegment::Inline(node) => InlineChild::Inline(node.clone()),
        })
        .collect()
}

/// Apply a slice block's own `attrs` onto `block` (§4.8, "change current
/// block's type/attrs to the slice's"). A no-op when the slice carried no
/// attrs of its own.
fn apply_slice_attrs(builder: &mut TransactionBuilder, block: crate::ids::BlockId, attrs: &crate::dom::attrs::AttrMap) -> CoreResult<()> {
    if attrs.is_empty() {
        return Ok(());
    }
    let path = builder
        .current_doc()
        .path_of(block)
        .ok_or_else(|| CoreError::step_precondition(block, "unknown block path"))?;
    builder.set_node_attr(path, attrs.clone())?;
    Ok(())
}

/// Extract a [`ContentSlice`] from `doc` over `[from, to)`. The pure
/// inline-paragraph-range case is what the round-trip law in §8 targets;
/// spanning several sibling blocks extracts each one's full or partial
/// content in document order.
pub fn copy_slice(doc: &Document, from: BlockPos, to: BlockPos) -> CoreResult<ContentSlice> {
    if from.block == to.block {
        let block = require_leaf(doc, from.block)?;
        let children = block.content.as_leaf().unwrap();
        let sliced = slice_children_range(children, from.offset, to.offset)?;
        return Ok(ContentSlice {
            blocks: vec![SliceBlock {
                type_name: block.type_name.clone(),
                attrs: block.attrs.clone(),
                segments: children_to_segments(&sliced),
            }],
        });
    }

    let parent_path = doc
        .parent_path_of(from.block)
        .ok_or_else(|| CoreError::step_precondition(from.block, "unknown block id"))?;
    if doc.parent_path_of(to.block) != Some(parent_path.clone()) {
        return Err(CoreError::step_precondition_no_block(
            "copy_slice requires both range endpoints to share a parent",
        ));
    }
    let parent = doc
        .navigate(&parent_path)
        .ok_or_else(|| CoreError::step_precondition_no_block("parent block missing"))?;
    let siblings = parent
        .content
        .as_container()
        .ok_or_else(|| CoreError::step_precondition_no_block("parent is not a container"))?;
    let from_idx = siblings
        .iter()
        .position(|c| c.id == from.block)
        .ok_or_else(|| CoreError::step_precondition(from.block, "block missing from parent"))?;
    let to_idx = siblings
        .iter()
        .position(|c| c.id == to.block)
        .ok_or_else(|| CoreError::step_precondition(to.block, "block missing from parent"))?;

    let mut blocks = Vec::new();
    let first = require_leaf(doc, from.block)?;
    let first_children = first.content.as_leaf().unwrap();
    let first_sliced = slice_children_range(first_children, from.offset, first.text_len())?;
    blocks.push(SliceBlock {
        type_name: first.type_name.clone(),
        attrs: first.attrs.clone(),
        segments: children_to_segments(&first_sliced),
    });
    for sibling in &siblings[from_idx + 1..to_idx] {
        let children = sibling
            .content
            .as_leaf()
            .ok_or_else(|| CoreError::step_precondition(sibling.id, "non-leaf block in range"))?;
        blocks.push(SliceBlock {
            type_name: sibling.type_name.clone(),
            attrs: sibling.attrs.clone(),
            segments: children_to_segments(children),
        });
    }
    let last = require_leaf(doc, to.block)?;
    let last_children = last.content.as_leaf().unwrap();
    let last_sliced = slice_children_range(last_children, 0, to.offset)?;
    blocks.push(SliceBlock {
        type_name: last.type_name.clone(),
        attrs: last.attrs.clone(),
        segments: children_to_segments(&last_sliced),
    });
    Ok(ContentSlice { blocks })
}

fn require_leaf<'a>(doc: &'a Document, id: crate::ids::BlockId) -> CoreResult<&'a BlockNode> {
    let block = doc.block(id).ok_or_else(|| CoreError::step_precondition(id, "unknown block id"))?;
    if !block.content.is_leaf() {
        return Err(CoreError::step_precondition(id, "copy_slice range endpoint is not a leaf block"));
    }
    Ok(block)
}

/// Splice `slice` into `state` at the caret/selection (§4.8). Chooses
/// exactly one of the inline / single-block / multi-block strategies based
/// on the slice's shape. A `NodeSelection` target makes paste a no-op that
/// only re-asserts the current selection (§4.8).
pub fn paste_slice(state: &EditorState, slice: &ContentSlice, origin: &str) -> CoreResult<Transaction> {
    let doc = state.doc();
    let schema = state.schema();
    let mut builder = TransactionBuilder::new(doc, schema, origin);

    if matches!(state.selection(), Selection::Node(_)) {
        builder.set_selection(state.selection().clone());
        return Ok(builder.build());
    }

    let text_sel = state
        .selection()
        .as_text()
        .ok_or_else(|| CoreError::step_precondition_no_block("paste requires a text or node selection"))?;
    let (from, to) = text_sel.range(doc);
    delete_range(&mut builder, from, to)?;

    let caret_block = from.block;
    let caret_offset = from.offset;

    let caret_block_type = builder
        .current_doc()
        .block(caret_block)
        .ok_or_else(|| CoreError::step_precondition(caret_block, "unknown caret block"))?
        .type_name
        .clone();

    match slice.blocks.as_slice() {
        [] => {
            builder.set_selection(Selection::collapsed(BlockPos::new(caret_block, caret_offset)));
        }
        [only] => {
            // §4.8: "Inline" strategy iff the slice's single block is a
            // `paragraph` (keep the current block, just insert segments);
            // "Single block" strategy otherwise (retype to the slice's
            // type and attrs first).
            if only.type_name.as_str() == PARAGRAPH_TYPE {
                let content = segments_to_children(&only.segments);
                let width: usize = content.iter().map(InlineChild::width).sum();
                builder.insert_segments(caret_block, caret_offset, content)?;
                builder.set_selection(Selection::collapsed(BlockPos::new(caret_block, caret_offset + width)));
            } else {
                if caret_block_type != only.type_name {
                    builder.set_block_type(caret_block, only.type_name.clone())?;
                }
                apply_slice_attrs(&mut builder, caret_block, &only.attrs)?;
                let content = segments_to_children(&only.segments);
                let width: usize = content.iter().map(InlineChild::width).sum();
                builder.insert_segments(caret_block, caret_offset, content)?;
                builder.set_selection(Selection::collapsed(BlockPos::new(caret_block, caret_offset + width)));
            }
        }
        blocks => {
            let first = &blocks[0];
            let last = &blocks[blocks.len() - 1];
            let middles = &blocks[1..blocks.len() - 1];

            if caret_block_type != first.type_name {
                builder.set_block_type(caret_block, first.type_name.clone())?;
            }
            apply_slice_attrs(&mut builder, caret_block, &first.attrs)?;
            let first_content = segments_to_children(&first.segments);
            let first_width: usize = first_content.iter().map(InlineChild::width).sum();
            builder.insert_segments(caret_block, caret_offset, first_content)?;

            let tail_id = next_block_id();
            builder.split_block(caret_block, caret_offset + first_width, tail_id)?;

            let parent_path = builder
                .current_doc()
                .parent_path_of(caret_block)
                .ok_or_else(|| CoreError::step_precondition(caret_block, "unknown parent"))?;
            let parent_id = parent_path
                .target()
                .ok_or_else(|| CoreError::step_precondition_no_block("empty parent path"))?;
            let mut insert_at = builder
                .current_doc()
                .index_in_parent(tail_id)
                .ok_or_else(|| CoreError::step_precondition(tail_id, "split tail block missing from parent"))?;
            for middle in middles {
                let block_id = next_block_id();
                let node = BlockNode::new_leaf(
                    block_id,
                    middle.type_name.clone(),
                    middle.attrs.clone(),
                    segments_to_children(&middle.segments),
                );
                builder.insert_node(parent_id, insert_at, node)?;
                insert_at += 1;
            }

            let last_content = segments_to_children(&last.segments);
            let last_width: usize = last_content.iter().map(InlineChild::width).sum();
            builder.insert_segments(tail_id, 0, last_content)?;
            // `split_block` carries the (possibly just-retyped) caret
            // block's type onto the tail block, so only retype it when the
            // slice's last block actually differs.
            if last.type_name != first.type_name {
                builder.set_block_type(tail_id, last.type_name.clone())?;
            }
            apply_slice_attrs(&mut builder, tail_id, &last.attrs)?;
            builder.set_selection(Selection::collapsed(BlockPos::new(tail_id, last_width)));
        }
    }

    Ok(builder.build())
}

/// A single-block `NodeSelection`'s canonical clipboard JSON (§6.2):
/// `{ "type": "<block type>", "attrs"?: {...} }`.
pub fn serialize_node_selection(block: &BlockNode) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert("type".to_string(), serde_json::Value::String(block.type_name.as_str().to_string()));
    if !block.attrs.is_empty() {
        map.insert("attrs".to_string(), serde_json::to_value(&block.attrs).unwrap_or(serde_json::Value::Null));
    }
    serde_json::Value::Object(map)
}

/// In-memory side channel keyed by plain-text fingerprint (§6.2, §9): the
/// system clipboard strips custom MIME types across browser-origin
/// boundaries, so a same-process paste recovers the rich slice by matching
/// the plain text it also put on the system clipboard. Behavior when two
/// editor instances in the same process race to set the same fingerprint
/// is unspecified by the source and left as last-write-wins here (§9 open
/// question).
static CLIPBOARD_SIDE_CHANNEL: Lazy<Mutex<HashMap<String, ContentSlice>>> = Lazy::new(|| Mutex::new(HashMap::new()));

pub fn remember_slice_for_plain_text(slice: ContentSlice) {
    let key = slice.plain_text_fingerprint();
    CLIPBOARD_SIDE_CHANNEL.lock().unwrap().insert(key, slice);
}

pub fn recall_slice_for_plain_text(plain_text: &str) -> Option<ContentSlice> {
    CLIPBOARD_SIDE_CHANNEL.lock().unwrap().get(plain_text).cloned()
}
