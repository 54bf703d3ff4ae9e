// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component E: the step algebra (§4.2, §4.3) — twelve atomic, invertible
//! mutation primitives plus the position-mapping contract every consumer
//! (selection, decorations) relies on. (§4.2's prose header rounds this up
//! to "thirteen"; the step table it introduces names exactly the twelve
//! below, which is what's implemented here — see `DESIGN.md`.)
//!
//! Each [`Step`] carries exactly the payload required to apply it, to
//! produce its inverse, and to map an arbitrary position through it. Forward
//! application is a pure `Document -> Document` function; nothing here
//! touches selection or decorations directly — those are mapped separately
//! (`selection::Selection`, `decoration::DecorationSet`) using the same
//! [`map_position`]/[`shift_for_insert`]/[`shift_for_delete`] primitives so
//! the arithmetic is defined exactly once.

use crate::dom::attrs::AttrMap;
use crate::dom::document::Document;
use crate::dom::mark::Mark;
use crate::dom::node::{BlockContent, BlockNode, InlineChild, TextNode};
use crate::dom::path::{BlockPos, NodePath};
use crate::error::{CoreError, CoreResult};
use crate::ids::{BlockId, NodeTypeName};
use crate::schema::SchemaRegistry;
use crate::selection::Assoc;
use crate::text_unit::{slice_utf16, split_at_utf16};

/// `InsertText`'s payload (§4.2). `content` is the run(s) of inline
/// children to splice in at `offset`; a plain uniform-mark insertion is a
/// single `TextNode`, while paste preserves mixed-mark runs as multiple
/// segments (§4.2, "segments preserves mixed-mark runs when pasting").
#[derive(Clone, Debug, PartialEq)]
pub struct InsertTextStep {
    pub block: BlockId,
    pub offset: usize,
    pub content: Vec<InlineChild>,
}

impl InsertTextStep {
    pub fn plain(block: BlockId, offset: usize, text: impl Into<String>, marks: crate::dom::mark::MarkSet) -> Self {
        Self {
            block,
            offset,
            content: vec![InlineChild::Text(TextNode::new(text, marks))],
        }
    }

    pub fn segments(block: BlockId, offset: usize, content: Vec<InlineChild>) -> Self {
        Self { block, offset, content }
    }

    pub fn inserted_width(&self) -> usize {
        self.content.iter().map(InlineChild::width).sum()
    }
}

/// `DeleteText`'s payload. `deleted` captures the removed run(s) so the
/// step can be inverted (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteTextStep {
    pub block: BlockId,
    pub from: usize,
    pub to: usize,
    pub deleted: Vec<InlineChild>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AddMarkStep {
    pub block: BlockId,
    pub from: usize,
    pub to: usize,
    pub mark: Mark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemoveMarkStep {
    pub block: BlockId,
    pub from: usize,
    pub to: usize,
    pub mark: Mark,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitBlockStep {
    pub block: BlockId,
    pub offset: usize,
    pub new_block: BlockId,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergeBlocksStep {
    pub target: BlockId,
    pub source: BlockId,
    pub target_length_before: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetBlockTypeStep {
    pub block: BlockId,
    pub new_type: NodeTypeName,
    pub previous_type: NodeTypeName,
    pub previous_attrs: AttrMap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetNodeAttrStep {
    pub path: NodePath,
    pub new_attrs: AttrMap,
    pub previous_attrs: AttrMap,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InsertNodeStep {
    pub parent: BlockId,
    pub index: usize,
    pub node: BlockNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RemoveNodeStep {
    pub parent: BlockId,
    pub index: usize,
    pub removed: BlockNode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetStoredMarksStep {
    pub marks: Option<Vec<Mark>>,
    pub previous: Option<Vec<Mark>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReplaceNodeStep {
    pub path: NodePath,
    pub previous: BlockNode,
    pub new_node: BlockNode,
}

/// One atomic, invertible document mutation (§4.2).
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    InsertText(InsertTextStep),
    DeleteText(DeleteTextStep),
    AddMark(AddMarkStep),
    RemoveMark(RemoveMarkStep),
    SplitBlock(SplitBlockStep),
    MergeBlocks(MergeBlocksStep),
    SetBlockType(SetBlockTypeStep),
    SetNodeAttr(SetNodeAttrStep),
    InsertNode(InsertNodeStep),
    RemoveNode(RemoveNodeStep),
    SetStoredMarks(SetStoredMarksStep),
    ReplaceNode(ReplaceNodeStep),
}

/// The result of mapping a position through one step (§4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MappedPos {
    At(BlockPos),
    /// The block the position lived in was removed (§4.3, `RemoveNode`).
    Deleted,
}

impl MappedPos {
    pub fn at(block: BlockId, offset: usize) -> Self {
        MappedPos::At(BlockPos::new(block, offset))
    }
}

/// Shift a code-unit position `q` through an `InsertText(p, len)` at
/// association `assoc` (§4.3).
pub fn shift_for_insert(q: usize, p: usize, len: usize, assoc: Assoc) -> usize {
    if q < p {
        q
    } else if q > p {
        q + len
    } else {
        match assoc {
            Assoc::Before => p,
            Assoc::After => p + len,
        }
    }
}

/// Shift a code-unit position `q` through a `DeleteText(from, to)` (§4.3).
/// Positions strictly inside the deleted range clamp to `from`.
pub fn shift_for_delete(q: usize, from: usize, to: usize) -> usize {
    if q <= from {
        q
    } else if q >= to {
        q - (to - from)
    } else {
        from
    }
}

fn leaf_children(block: &BlockNode) -> CoreResult<&[InlineChild]> {
    block
        .content
        .as_leaf()
        .ok_or_else(|| CoreError::step_precondition(block.id, "block is not a leaf block"))
}

fn require_block<'a>(doc: &'a Document, id: BlockId) -> CoreResult<&'a BlockNode> {
    doc.block(id)
        .ok_or_else(|| CoreError::step_precondition(id, "unknown block id"))
}

fn require_block_mut<'a>(doc: &'a mut Document, id: BlockId) -> CoreResult<&'a mut BlockNode> {
    doc.block_mut(id)
        .ok_or_else(|| CoreError::step_precondition(id, "unknown block id"))
}

/// Split a leaf block's children at a UTF-16 code-unit offset, splitting a
/// `TextNode` run if the offset lands inside one. Returns `(before, after)`.
pub(crate) fn split_children_at(children: &[InlineChild], offset: usize) -> CoreResult<(Vec<InlineChild>, Vec<InlineChild>)> {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let mut consumed = 0usize;
    for child in children {
        let width = child.width();
        if consumed + width <= offset {
            before.push(child.clone());
        } else if consumed >= offset {
            after.push(child.clone());
        } else {
            // offset falls inside this child: only TextNodes are splittable.
            match child {
                InlineChild::Text(t) => {
                    let local = offset - consumed;
                    let (l, r) = split_at_utf16(&t.text, local);
                    before.push(InlineChild::Text(TextNode::new(l, t.marks.clone())));
                    after.push(InlineChild::Text(TextNode::new(r, t.marks.clone())));
                }
                InlineChild::Inline(_) => {
                    return Err(CoreError::step_precondition_no_block(
                        "offset falls inside an atomic inline node",
                    ));
                }
            }
        }
        consumed += width;
    }
    if offset > consumed {
        return Err(CoreError::step_precondition_no_block(format!(
            "offset {offset} exceeds block length {consumed}"
        )));
    }
    Ok((before, after))
}

/// The `[from, to)` slice of a leaf block's children, used by the content
/// slice & paste planner (§4.8) to extract a sub-range without deleting it.
pub(crate) fn slice_children_range(children: &[InlineChild], from: usize, to: usize) -> CoreResult<Vec<InlineChild>> {
    let (_, rest) = split_children_at(children, from)?;
    let (middle, _) = split_children_at(&rest, to - from)?;
    Ok(middle)
}

impl Step {
    /// Apply this step to `doc`, returning the next document. `schema` is
    /// consulted by steps that need it (`SetBlockType`'s attr-merge and
    /// excluded-mark policy, §4.2).
    pub fn apply(&self, doc: &Document, schema: &SchemaRegistry) -> CoreResult<Document> {
        let mut next = doc.clone();
        match self {
            Step::InsertText(s) => Self::apply_insert_text(&mut next, s)?,
            Step::DeleteText(s) => Self::apply_delete_text(&mut next, s)?,
            Step::AddMark(s) => Self::apply_add_mark(&mut next, s)?,
            Step::RemoveMark(s) => Self::apply_remove_mark(&mut next, s)?,
            Step::SplitBlock(s) => Self::apply_split_block(&mut next, s)?,
            Step::MergeBlocks(s) => Self::apply_merge_blocks(&mut next, s)?,
            Step::SetBlockType(s) => Self::apply_set_block_type(&mut next, s, schema)?,
            Step::SetNodeAttr(s) => Self::apply_set_node_attr(&mut next, s)?,
            Step::InsertNode(s) => Self::apply_insert_node(&mut next, s)?,
            Step::RemoveNode(s) => Self::apply_remove_node(&mut next, s)?,
            Step::SetStoredMarks(_) => {
                // Stored marks live on `EditorState`, not the document tree
                // (§4.6); nothing to do here.
            }
            Step::ReplaceNode(s) => Self::apply_replace_node(&mut next, s)?,
        }
        Ok(next)
    }

    fn apply_insert_text(doc: &mut Document, s: &InsertTextStep) -> CoreResult<()> {
        let block = require_block_mut(doc, s.block)?;
        let children = block
            .content
            .as_leaf_mut()
            .ok_or_else(|| CoreError::step_precondition(s.block, "block is not a leaf block"))?;
        let (before, after) = split_children_at(children, s.offset)?;
        let mut merged = before;
        merged.extend(s.content.iter().cloned());
        merged.extend(after);
        *children = merged;
        block.coalesce();
        Ok(())
    }

    fn apply_delete_text(doc: &mut Document, s: &DeleteTextStep) -> CoreResult<()> {
        if s.from > s.to {
            return Err(CoreError::step_precondition(s.block, "from > to"));
        }
        let block = require_block_mut(doc, s.block)?;
        let children = leaf_children(block)?;
        let (before, rest) = split_children_at(children, s.from)?;
        let (_removed, after) = split_children_at(&rest, s.to - s.from)?;
        let leaf = block.content.as_leaf_mut().unwrap();
        let mut merged = before;
        merged.extend(after);
        *leaf = merged;
        block.coalesce();
        Ok(())
    }

    fn apply_add_mark(doc: &mut Document, s: &AddMarkStep) -> CoreResult<()> {
        Self::map_range_marks(doc, s.block, s.from, s.to, |marks| marks.insert(s.mark.clone()))
    }

    fn apply_remove_mark(doc: &mut Document, s: &RemoveMarkStep) -> CoreResult<()> {
        Self::map_range_marks(doc, s.block, s.from, s.to, |marks| {
            marks.remove_type(&s.mark.type_name);
        })
    }

    fn map_range_marks(
        doc: &mut Document,
        block_id: BlockId,
        from: usize,
        to: usize,
        edit: impl Fn(&mut crate::dom::mark::MarkSet),
    ) -> CoreResult<()> {
        if from > to {
            return Err(CoreError::step_precondition(block_id, "from > to"));
        }
        let block = require_block_mut(doc, block_id)?;
        let children = leaf_children(block)?;
        let (before, rest) = split_children_at(children, from)?;
        let (mut middle, after) = split_children_at(&rest, to - from)?;
        for child in &mut middle {
            if let InlineChild::Text(t) = child {
                edit(&mut t.marks);
            }
        }
        let leaf = block.content.as_leaf_mut().unwrap();
        let mut merged = before;
        merged.extend(middle);
        merged.extend(after);
        *leaf = merged;
        block.coalesce();
        Ok(())
    }

    fn apply_split_block(doc: &mut Document, s: &SplitBlockStep) -> CoreResult<()> {
        let parent_path = doc
            .parent_path_of(s.block)
            .ok_or_else(|| CoreError::step_precondition(s.block, "unknown block id"))?;
        let block = require_block(doc, s.block)?.clone();
        let children = leaf_children(&block)?;
        let (before, after) = split_children_at(children, s.offset)?;

        let mut first = block.clone();
        *first.content.as_leaf_mut().unwrap() = before;
        if first.content.as_leaf().unwrap().is_empty() {
            first.content = BlockContent::empty_leaf();
        }
        first.coalesce();

        let mut second = BlockNode::new_leaf(s.new_block, block.type_name.clone(), block.attrs.clone(), after);
        second.coalesce();

        let parent = doc
            .navigate_mut(&parent_path)
            .ok_or_else(|| CoreError::step_precondition(s.block, "parent block missing"))?;
        let siblings = parent
            .content
            .as_container_mut()
            .ok_or_else(|| CoreError::step_precondition(s.block, "parent is not a container"))?;
        let idx = siblings
            .iter()
            .position(|c| c.id == s.block)
            .ok_or_else(|| CoreError::step_precondition(s.block, "block missing from parent"))?;
        siblings[idx] = first;
        siblings.insert(idx + 1, second);
        Ok(())
    }

    fn apply_merge_blocks(doc: &mut Document, s: &MergeBlocksStep) -> CoreResult<()> {
        let source = require_block(doc, s.source)?.clone();
        let source_children = leaf_children(&source)?.to_vec();
        let parent_path = doc
            .parent_path_of(s.source)
            .ok_or_else(|| CoreError::step_precondition(s.source, "unknown block id"))?;

        {
            let target = require_block_mut(doc, s.target)?;
            let target_children = target
                .content
                .as_leaf_mut()
                .ok_or_else(|| CoreError::step_precondition(s.target, "target is not a leaf block"))?;
            if target_children.iter().map(InlineChild::width).sum::<usize>() != s.target_length_before {
                return Err(CoreError::step_precondition(
                    s.target,
                    "target_length_before does not match current target length",
                ));
            }
            target_children.extend(source_children);
            target.coalesce();
        }

        let parent = doc
            .navigate_mut(&parent_path)
            .ok_or_else(|| CoreError::step_precondition(s.source, "parent block missing"))?;
        let siblings = parent
            .content
            .as_container_mut()
            .ok_or_else(|| CoreError::step_precondition(s.source, "parent is not a container"))?;
        let idx = siblings
            .iter()
            .position(|c| c.id == s.source)
            .ok_or_else(|| CoreError::step_precondition(s.source, "source missing from parent"))?;
        siblings.remove(idx);
        Ok(())
    }

    fn apply_set_block_type(doc: &mut Document, s: &SetBlockTypeStep, schema: &SchemaRegistry) -> CoreResult<()> {
        let block = require_block_mut(doc, s.block)?;
        if block.type_name != s.previous_type {
            return Err(CoreError::step_precondition(
                s.block,
                "previous_type does not match current block type",
            ));
        }
        let new_spec = schema
            .node_spec(&s.new_type)
            .ok_or_else(|| CoreError::unknown_node_type(&s.new_type))?;
        block.attrs = new_spec.effective_attrs(&block.attrs);
        block.type_name = s.new_type.clone();
        if let Some(children) = block.content.as_leaf_mut() {
            for child in children.iter_mut() {
                if let InlineChild::Text(t) = child {
                    t.marks.strip_excluded(&new_spec.exclude_marks);
                }
            }
        }
        block.coalesce();
        Ok(())
    }

    fn apply_set_node_attr(doc: &mut Document, s: &SetNodeAttrStep) -> CoreResult<()> {
        let block = doc
            .navigate_mut(&s.path)
            .ok_or_else(|| CoreError::step_precondition_no_block("unknown path"))?;
        block.attrs = s.new_attrs.clone();
        Ok(())
    }

    fn apply_insert_node(doc: &mut Document, s: &InsertNodeStep) -> CoreResult<()> {
        let parent = require_block_mut(doc, s.parent)?;
        let children = parent
            .content
            .as_container_mut()
            .ok_or_else(|| CoreError::step_precondition(s.parent, "parent is not a container"))?;
        if s.index > children.len() {
            return Err(CoreError::step_precondition(s.parent, "index out of range"));
        }
        children.insert(s.index, s.node.clone());
        Ok(())
    }

    fn apply_remove_node(doc: &mut Document, s: &RemoveNodeStep) -> CoreResult<()> {
        let parent = require_block_mut(doc, s.parent)?;
        let children = parent
            .content
            .as_container_mut()
            .ok_or_else(|| CoreError::step_precondition(s.parent, "parent is not a container"))?;
        if s.index >= children.len() || children[s.index] != s.removed {
            return Err(CoreError::step_precondition(
                s.parent,
                "index/removed node does not match current document",
            ));
        }
        children.remove(s.index);
        Ok(())
    }

    fn apply_replace_node(doc: &mut Document, s: &ReplaceNodeStep) -> CoreResult<()> {
        let target = doc
            .navigate_mut(&s.path)
            .ok_or_else(|| CoreError::step_precondition_no_block("unknown path"))?;
        if target.id != s.previous.id || target.id != s.new_node.id {
            return Err(CoreError::step_precondition(
                target.id,
                "ReplaceNode must preserve the block id",
            ));
        }
        *target = s.new_node.clone();
        Ok(())
    }

    /// Produce the inverse of this step, given the document it was applied
    /// to (`before`). Round-tripping `step` then `step.invert(before)` must
    /// restore `before` structurally (§8, "Round-trip laws").
    pub fn invert(&self, before: &Document) -> CoreResult<Step> {
        match self {
            Step::InsertText(s) => Ok(Step::DeleteText(DeleteTextStep {
                block: s.block,
                from: s.offset,
                to: s.offset + s.inserted_width(),
                deleted: s.content.clone(),
            })),
            Step::DeleteText(s) => Ok(Step::InsertText(InsertTextStep {
                block: s.block,
                offset: s.from,
                content: s.deleted.clone(),
            })),
            Step::AddMark(s) => Ok(Step::RemoveMark(RemoveMarkStep {
                block: s.block,
                from: s.from,
                to: s.to,
                mark: s.mark.clone(),
            })),
            Step::RemoveMark(s) => Ok(Step::AddMark(AddMarkStep {
                block: s.block,
                from: s.from,
                to: s.to,
                mark: s.mark.clone(),
            })),
            Step::SplitBlock(s) => Ok(Step::MergeBlocks(MergeBlocksStep {
                target: s.block,
                source: s.new_block,
                target_length_before: s.offset,
            })),
            Step::MergeBlocks(s) => {
                let source = require_block(before, s.source)?.clone();
                Ok(Step::SplitBlock(SplitBlockStep {
                    block: s.target,
                    offset: s.target_length_before,
                    new_block: source.id,
                }))
            }
            Step::SetBlockType(s) => {
                let block = require_block(before, s.block)?;
                Ok(Step::SetBlockType(SetBlockTypeStep {
                    block: s.block,
                    new_type: s.previous_type.clone(),
                    previous_type: s.new_type.clone(),
                    previous_attrs: block.attrs.clone(),
                }))
            }
            Step::SetNodeAttr(s) => Ok(Step::SetNodeAttr(SetNodeAttrStep {
                path: s.path.clone(),
                new_attrs: s.previous_attrs.clone(),
                previous_attrs: s.new_attrs.clone(),
            })),
            Step::InsertNode(s) => Ok(Step::RemoveNode(RemoveNodeStep {
                parent: s.parent,
                index: s.index,
                removed: s.node.clone(),
            })),
            Step::RemoveNode(s) => Ok(Step::InsertNode(InsertNodeStep {
                parent: s.parent,
                index: s.index,
                node: s.removed.clone(),
            })),
            Step::SetStoredMarks(s) => Ok(Step::SetStoredMarks(SetStoredMarksStep {
                marks: s.previous.clone(),
                previous: s.marks.clone(),
            })),
            Step::ReplaceNode(s) => Ok(Step::ReplaceNode(ReplaceNodeStep {
                path: s.path.clone(),
                previous: s.new_node.clone(),
                new_node: s.previous.clone(),
            })),
        }
    }

    /// Map a block-local position through this step (§4.3). `assoc`
    /// disambiguates a position sitting exactly at a boundary the step
    /// touches.
    pub fn map_position(&self, pos: BlockPos, assoc: Assoc) -> MappedPos {
        match self {
            Step::InsertText(s) if pos.block == s.block => {
                MappedPos::at(pos.block, shift_for_insert(pos.offset, s.offset, s.inserted_width(), assoc))
            }
            Step::DeleteText(s) if pos.block == s.block => {
                MappedPos::at(pos.block, shift_for_delete(pos.offset, s.from, s.to))
            }
            Step::SplitBlock(s) if pos.block == s.block => {
                let before = pos.offset < s.offset || (pos.offset == s.offset && assoc == Assoc::Before);
                if before {
                    MappedPos::At(pos)
                } else {
                    MappedPos::at(s.new_block, pos.offset - s.offset)
                }
            }
            Step::MergeBlocks(s) if pos.block == s.source => {
                MappedPos::at(s.target, pos.offset + s.target_length_before)
            }
            Step::RemoveNode(s) if pos.block == s.removed.id || is_descendant_of(&s.removed, pos.block) => {
                MappedPos::Deleted
            }
            _ => MappedPos::At(pos),
        }
    }
}

fn is_descendant_of(node: &BlockNode, id: BlockId) -> bool {
    if node.id == id {
        return true;
    }
    if let BlockContent::Container(children) = &node.content {
        children.iter().any(|c| is_descendant_of(c, id))
    } else {
        false
    }
}
