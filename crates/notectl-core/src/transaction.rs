// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component F: transactions (§4.4) — an ordered list of steps plus a
//! pending selection, a stored-marks change, and an origin tag, built up
//! through [`TransactionBuilder`].
//!
//! The builder tracks a provisional document reflecting every step queued
//! so far, so each `push_*` call validates against what the document will
//! actually look like at that point in the sequence (§4.4, "against the
//! current builder document"), and fails fast with `BuildError` the moment
//! a step wouldn't apply (§7).

use crate::dom::attrs::AttrMap;
use crate::dom::document::Document;
use crate::dom::mark::{Mark, MarkSet};
use crate::dom::node::{BlockNode, InlineChild};
use crate::dom::path::NodePath;
use crate::error::{CoreError, CoreResult};
use crate::ids::{BlockId, NodeTypeName};
use crate::schema::SchemaRegistry;
use crate::selection::Selection;
use crate::step::{
    AddMarkStep, DeleteTextStep, InsertNodeStep, InsertTextStep, MergeBlocksStep, RemoveMarkStep,
    RemoveNodeStep, ReplaceNodeStep, SetBlockTypeStep, SetNodeAttrStep, SetStoredMarksStep, SplitBlockStep, Step,
};

/// The pending change to `EditorState::stored_marks` a transaction carries
/// (§4.4, §4.6).
#[derive(Clone, Debug, PartialEq)]
pub enum StoredMarksChange {
    Set(Vec<Mark>),
    Clear,
}

/// An immutable, ordered list of steps plus the transaction-level metadata
/// described in §4.4. Built via [`TransactionBuilder::build`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub selection: Option<Selection>,
    pub stored_marks: Option<StoredMarksChange>,
    pub origin: String,
}

impl Transaction {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.selection.is_none() && self.stored_marks.is_none()
    }
}

/// Accumulates steps for one transaction, validating each against a
/// provisional document as it's added (§4.4).
pub struct TransactionBuilder<'a> {
    schema: &'a SchemaRegistry,
    doc: Document,
    steps: Vec<Step>,
    selection: Option<Selection>,
    stored_marks: Option<StoredMarksChange>,
    origin: String,
}

impl<'a> TransactionBuilder<'a> {
    pub fn new(doc: &Document, schema: &'a SchemaRegistry, origin: impl Into<String>) -> Self {
        Self {
            schema,
            doc: doc.clone(),
            steps: Vec::new(),
            selection: None,
            stored_marks: None,
            origin: origin.into(),
        }
    }

    /// The provisional document reflecting every step queued so far.
    pub fn current_doc(&self) -> &Document {
        &self.doc
    }

    fn push(&mut self, step: Step) -> CoreResult<&mut Self> {
        let next = step
            .apply(&self.doc, self.schema)
            .map_err(|e| CoreError::BuildError { reason: e.to_string() })?;
        self.doc = next;
        self.steps.push(step);
        Ok(self)
    }

    pub fn insert_text(
        &mut self,
        block: BlockId,
        offset: usize,
        text: impl Into<String>,
        marks: MarkSet,
    ) -> CoreResult<&mut Self> {
        self.push(Step::InsertText(InsertTextStep::plain(block, offset, text, marks)))
    }

    pub fn insert_segments(
        &mut self,
        block: BlockId,
        offset: usize,
        content: Vec<InlineChild>,
    ) -> CoreResult<&mut Self> {
        self.push(Step::InsertText(InsertTextStep::segments(block, offset, content)))
    }

    pub fn delete_text(&mut self, block: BlockId, from: usize, to: usize) -> CoreResult<&mut Self> {
        let deleted = capture_deleted_range(&self.doc, block, from, to)?;
        self.push(Step::DeleteText(DeleteTextStep {
            block,
            from,
            to,
            deleted,
        }))
    }

    pub fn add_mark(&mut self, block: BlockId, from: usize, to: usize, mark: Mark) -> CoreResult<&mut Self> {
        self.push(Step::AddMark(AddMarkStep { block, from, to, mark }))
    }

    pub fn remove_mark(&mut self, block: BlockId, from: usize, to: usize, mark: Mark) -> CoreResult<&mut Self> {
        self.push(Step::RemoveMark(RemoveMarkStep { block, from, to, mark }))
    }

    pub fn split_block(&mut self, block: BlockId, offset: usize, new_block: BlockId) -> CoreResult<&mut Self> {
        self.push(Step::SplitBlock(SplitBlockStep {
            block,
            offset,
            new_block,
        }))
    }

    pub fn merge_blocks(&mut self, target: BlockId, source: BlockId) -> CoreResult<&mut Self> {
        let target_length_before = self
            .doc
            .block(target)
            .ok_or_else(|| CoreError::BuildError {
                reason: format!("unknown target block {target}"),
            })?
            .text_len();
        self.push(Step::MergeBlocks(MergeBlocksStep {
            target,
            source,
            target_length_before,
        }))
    }

    pub fn set_block_type(&mut self, block: BlockId, new_type: impl Into<NodeTypeName>) -> CoreResult<&mut Self> {
        let current = self.doc.block(block).ok_or_else(|| CoreError::BuildError {
            reason: format!("unknown block {block}"),
        })?;
        let previous_type = current.type_name.clone();
        let previous_attrs = current.attrs.clone();
        self.push(Step::SetBlockType(SetBlockTypeStep {
            block,
            new_type: new_type.into(),
            previous_type,
            previous_attrs,
        }))
    }

    pub fn set_node_attr(&mut self, path: NodePath, new_attrs: AttrMap) -> CoreResult<&mut Self> {
        let previous_attrs = self
            .doc
            .navigate(&path)
            .ok_or_else(|| CoreError::BuildError {
                reason: format!("unknown path {path}"),
            })?
            .attrs
            .clone();
        self.push(Step::SetNodeAttr(SetNodeAttrStep {
            path,
            new_attrs,
            previous_attrs,
        }))
    }

    pub fn insert_node(&mut self, parent: BlockId, index: usize, node: BlockNode) -> CoreResult<&mut Self> {
        self.push(Step::InsertNode(InsertNodeStep { parent, index, node }))
    }

    /// Remove a child. Callers removing several children from the same
    /// parent must queue these in descending index order so earlier
    /// removals don't invalidate later indices (§4.2, "Ordering within a
    /// transaction").
    pub fn remove_node(&mut self, parent: BlockId, index: usize) -> CoreResult<&mut Self> {
        let removed = self
            .doc
            .block(parent)
            .and_then(|p| p.content.as_container())
            .and_then(|children| children.get(index))
            .cloned()
            .ok_or_else(|| CoreError::BuildError {
                reason: format!("no child at index {index} of {parent}"),
            })?;
        self.push(Step::RemoveNode(RemoveNodeStep { parent, index, removed }))
    }

    pub fn replace_node(&mut self, path: NodePath, new_node: BlockNode) -> CoreResult<&mut Self> {
        let previous = self
            .doc
            .navigate(&path)
            .cloned()
            .ok_or_else(|| CoreError::BuildError {
                reason: format!("unknown path {path}"),
            })?;
        self.push(Step::ReplaceNode(ReplaceNodeStep {
            path,
            previous,
            new_node,
        }))
    }

    /// Queue a `SetStoredMarks` step (§4.2, §4.6); `previous` should be the
    /// stored-marks value before this change, normally taken from
    /// `EditorState::stored_marks`.
    pub fn set_stored_marks_step(&mut self, marks: Option<Vec<Mark>>, previous: Option<Vec<Mark>>) -> CoreResult<&mut Self> {
        self.push(Step::SetStoredMarks(SetStoredMarksStep { marks, previous }))
    }

    /// Set the transaction's pending selection (§4.4). If never called,
    /// `EditorState::apply` maps the current selection through every step
    /// instead.
    pub fn set_selection(&mut self, selection: Selection) -> &mut Self {
        self.selection = Some(selection);
        self
    }

    /// Set the transaction-level stored-marks change (§4.4, §4.6). Most
    /// transactions don't call this and instead get the default "clear"
    /// behavior at apply time.
    pub fn set_stored_marks(&mut self, change: StoredMarksChange) -> &mut Self {
        self.stored_marks = Some(change);
        self
    }

    pub fn build(self) -> Transaction {
        Transaction {
            steps: self.steps,
            selection: self.selection,
            stored_marks: self.stored_marks,
            origin: self.origin,
        }
    }
}

fn capture_deleted_range(doc: &Document, block: BlockId, from: usize, to: usize) -> CoreResult<Vec<InlineChild>> {
    if from > to {
        return Err(CoreError::BuildError {
            reason: "delete_text: from > to".to_string(),
        });
    }
    let node = doc.block(block).ok_or_else(|| CoreError::BuildError {
        reason: format!("unknown block {block}"),
    })?;
    let children = node.content.as_leaf().ok_or_else(|| CoreError::BuildError {
        reason: "block is not a leaf block".to_string(),
    })?;
    let mut consumed = 0usize;
    let mut out = Vec::new();
    for child in children {
        let width = child.width();
        let start = consumed;
        let end = consumed + width;
        consumed = end;
        if end <= from || start >= to {
            continue;
        }
        match child {
            InlineChild::Text(t) => {
                let lo = from.max(start) - start;
                let hi = to.min(end) - start;
                let slice = crate::text_unit::slice_utf16(&t.text, lo, hi);
                out.push(InlineChild::Text(crate::dom::node::TextNode::new(slice, t.marks.clone())));
            }
            InlineChild::Inline(_) => out.push(child.clone()),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attrs::AttrMap;
    use crate::dom::node::TextNode;
    use crate::schema::SchemaRegistry;

    fn para(id: u64, text: &str) -> BlockNode {
        BlockNode::new_leaf(
            BlockId::from_raw(id),
            "paragraph",
            AttrMap::new(),
            vec![InlineChild::Text(TextNode::plain(text))],
        )
    }

    #[test]
    fn builder_tracks_provisional_document_across_steps() {
        let doc = Document::new(vec![para(1, "AB")]);
        let schema = SchemaRegistry::new();
        let mut builder = TransactionBuilder::new(&doc, &schema, "command");
        builder.insert_text(BlockId::from_raw(1), 2, "C", MarkSet::new()).unwrap();
        builder.insert_text(BlockId::from_raw(1), 3, "D", MarkSet::new()).unwrap();
        assert_eq!(builder.current_doc().block(BlockId::from_raw(1)).unwrap().text_len(), 4);
        let tx = builder.build();
        assert_eq!(tx.steps.len(), 2);
    }

    #[test]
    fn builder_fails_fast_on_out_of_range_offset() {
        let doc = Document::new(vec![para(1, "AB")]);
        let schema = SchemaRegistry::new();
        let mut builder = TransactionBuilder::new(&doc, &schema, "command");
        let err = builder.insert_text(BlockId::from_raw(1), 50, "X", MarkSet::new());
        assert!(matches!(err, Err(CoreError::BuildError { .. })));
    }

    #[test]
    fn delete_text_captures_deleted_payload_for_inversion() {
        let doc = Document::new(vec![para(1, "ABCDE")]);
        let schema = SchemaRegistry::new();
        let mut builder = TransactionBuilder::new(&doc, &schema, "command");
        builder.delete_text(BlockId::from_raw(1), 1, 3).unwrap();
        let tx = builder.build();
        match &tx.steps[0] {
            Step::DeleteText(s) => {
                assert_eq!(s.deleted.len(), 1);
                assert_eq!(s.deleted[0].as_text().unwrap().text, "BC");
            }
            _ => panic!("expected DeleteText"),
        }
    }
}
