// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! The three node kinds (§3.1) and the leaf-block coalescing helper that
//! upholds invariant §3.2.4 (adjacent same-mark-set text runs merge; a
//! zero-length text node is only ever the sole child).

use serde::{Deserialize, Serialize};

use crate::dom::attrs::AttrMap;
use crate::dom::mark::MarkSet;
use crate::ids::{BlockId, InlineNodeTypeName, NodeTypeName};
use crate::text_unit::utf16_len;

/// A run of text sharing one mark set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    pub marks: MarkSet,
}

impl TextNode {
    pub fn new(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, MarkSet::new())
    }

    pub fn width(&self) -> usize {
        utf16_len(&self.text)
    }
}

/// An atomic width-1 inline object, e.g. `hard_break` or `mention` (§3.1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineNode {
    pub type_name: InlineNodeTypeName,
    pub attrs: AttrMap,
}

impl InlineNode {
    pub fn new(type_name: impl Into<InlineNodeTypeName>, attrs: AttrMap) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }
}

/// A leaf block's child: either a text run or an atomic inline node.
#[derive(Clone, Debug, PartialEq)]
pub enum InlineChild {
    Text(TextNode),
    Inline(InlineNode),
}

impl InlineChild {
    pub fn width(&self) -> usize {
        match self {
            InlineChild::Text(t) => t.width(),
            InlineChild::Inline(_) => 1,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            InlineChild::Text(t) => Some(t),
            InlineChild::Inline(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextNode> {
        match self {
            InlineChild::Text(t) => Some(t),
            InlineChild::Inline(_) => None,
        }
    }
}

/// Either a block's children are all blocks (a container) or all inline
/// (a leaf) — §3.2, invariant 2.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockContent {
    Leaf(Vec<InlineChild>),
    Container(Vec<BlockNode>),
}

impl BlockContent {
    pub fn empty_leaf() -> Self {
        // Invariant 3: an empty leaf block has exactly one empty TextNode.
        BlockContent::Leaf(vec![InlineChild::Text(TextNode::plain(""))])
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BlockContent::Leaf(_))
    }

    pub fn is_container(&self) -> bool {
        matches!(self, BlockContent::Container(_))
    }

    pub fn as_leaf(&self) -> Option<&[InlineChild]> {
        match self {
            BlockContent::Leaf(children) => Some(children),
            BlockContent::Container(_) => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Vec<InlineChild>> {
        match self {
            BlockContent::Leaf(children) => Some(children),
            BlockContent::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&[BlockNode]> {
        match self {
            BlockContent::Container(children) => Some(children),
            BlockContent::Leaf(_) => None,
        }
    }

    pub fn as_container_mut(&mut self) -> Option<&mut Vec<BlockNode>> {
        match self {
            BlockContent::Container(children) => Some(children),
            BlockContent::Leaf(_) => None,
        }
    }
}

/// A block node: a type tag, a stable identity, attributes, and either
/// block or inline children (§3.1).
#[derive(Clone, Debug, PartialEq)]
pub struct BlockNode {
    pub id: BlockId,
    pub type_name: NodeTypeName,
    pub attrs: AttrMap,
    pub content: BlockContent,
}

impl BlockNode {
    pub fn new_leaf(
        id: BlockId,
        type_name: impl Into<NodeTypeName>,
        attrs: AttrMap,
        children: Vec<InlineChild>,
    ) -> Self {
        let content = if children.is_empty() {
            BlockContent::empty_leaf()
        } else {
            BlockContent::Leaf(children)
        };
        Self {
            id,
            type_name: type_name.into(),
            attrs,
            content,
        }
    }

    pub fn new_container(
        id: BlockId,
        type_name: impl Into<NodeTypeName>,
        attrs: AttrMap,
        children: Vec<BlockNode>,
    ) -> Self {
        Self {
            id,
            type_name: type_name.into(),
            attrs,
            content: BlockContent::Container(children),
        }
    }

    /// Length of this block's content measured in UTF-16 code units
    /// (§3.2.6). Container blocks have no intrinsic offset space; callers
    /// should only call this on leaf blocks.
    pub fn text_len(&self) -> usize {
        match &self.content {
            BlockContent::Leaf(children) => children.iter().map(InlineChild::width).sum(),
            BlockContent::Container(_) => 0,
        }
    }

    /// Coalesce adjacent `InlineChild::Text` runs that carry identical mark
    /// sets (§3.2, invariant 4), and drop any resulting zero-length runs
    /// unless it would leave the block with no children at all (invariant
    /// 3: an empty leaf has exactly one empty TextNode).
    pub fn coalesce(&mut self) {
        let Some(children) = self.content.as_leaf_mut() else {
            return;
        };
        let mut merged: Vec<InlineChild> = Vec::with_capacity(children.len());
        for child in children.drain(..) {
            match (&child, merged.last_mut()) {
                (
                    InlineChild::Text(next),
                    Some(InlineChild::Text(prev)),
                ) if prev.marks == next.marks => {
                    prev.text.push_str(&next.text);
                }
                _ => merged.push(child),
            }
        }
        merged.retain(|c| !matches!(c, InlineChild::Text(t) if t.text.is_empty()));
        if merged.is_empty() {
            merged.push(InlineChild::Text(TextNode::plain("")));
        }
        *children = merged;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::mark::Mark;

    fn leaf(children: Vec<InlineChild>) -> BlockNode {
        BlockNode::new_leaf(BlockId::from_raw(1), "paragraph", AttrMap::new(), children)
    }

    #[test]
    fn coalesce_merges_adjacent_runs_with_identical_marks() {
        let mut block = leaf(vec![
            InlineChild::Text(TextNode::new("foo", MarkSet::from_marks([Mark::simple("bold")]))),
            InlineChild::Text(TextNode::new("bar", MarkSet::from_marks([Mark::simple("bold")]))),
        ]);
        block.coalesce();
        let children = block.content.as_leaf().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().text, "foobar");
    }

    #[test]
    fn coalesce_keeps_runs_with_different_marks_separate() {
        let mut block = leaf(vec![
            InlineChild::Text(TextNode::new("foo", MarkSet::from_marks([Mark::simple("bold")]))),
            InlineChild::Text(TextNode::plain("bar")),
        ]);
        block.coalesce();
        assert_eq!(block.content.as_leaf().unwrap().len(), 2);
    }

    #[test]
    fn coalesce_of_all_empty_runs_leaves_single_empty_text_node() {
        let mut block = leaf(vec![
            InlineChild::Text(TextNode::plain("")),
            InlineChild::Text(TextNode::plain("")),
        ]);
        block.coalesce();
        let children = block.content.as_leaf().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].as_text().unwrap().text, "");
    }

    #[test]
    fn text_len_counts_inline_nodes_as_width_one() {
        let block = leaf(vec![
            InlineChild::Text(TextNode::plain("ab")),
            InlineChild::Inline(InlineNode::new("hard_break", AttrMap::new())),
        ]);
        assert_eq!(block.text_len(), 3);
    }
}
