// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component C: the selection algebra (§4.7) — three variants (text range,
//! node selection, gap cursor) with normalization and range-extraction
//! helpers. Grapheme-aware motion itself lives in `commands::motion`, which
//! builds on [`Selection`] plus `text_unit`.

use crate::dom::document::Document;
use crate::dom::path::{BlockPos, NodePath};
use crate::ids::BlockId;

/// Which side of a same-offset boundary a position is associated with
/// (§4.3). Determines whether an insertion at that exact offset pushes the
/// position forward or leaves it in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assoc {
    /// Stays put when something is inserted at this exact offset.
    Before,
    /// Moves forward when something is inserted at this exact offset.
    After,
}

/// A collapsed-or-ranged text cursor, `{anchor, head}` (§4.7). Collapsed
/// when `anchor == head`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextSelection {
    pub anchor: BlockPos,
    pub head: BlockPos,
}

impl TextSelection {
    pub fn new(anchor: BlockPos, head: BlockPos) -> Self {
        Self { anchor, head }
    }

    pub fn collapsed(pos: BlockPos) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor.block == self.head.block && self.anchor.offset == self.head.offset
    }

    /// `(from, to)`, normalized to document order regardless of which
    /// endpoint the user dragged from (§4.7, "`selectionRange(order)`").
    pub fn range(&self, doc: &Document) -> (BlockPos, BlockPos) {
        if self.anchor.block == self.head.block {
            return if self.anchor.offset <= self.head.offset {
                (self.anchor, self.head)
            } else {
                (self.head, self.anchor)
            };
        }
        if doc.precedes_or_eq(self.anchor.block, self.head.block) {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// A selection targeting a whole block, typically a `isVoid && selectable`
/// one (§4.7).
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSelection {
    pub node: BlockId,
    pub path: NodePath,
}

impl NodeSelection {
    pub fn new(node: BlockId, path: NodePath) -> Self {
        Self { node, path }
    }
}

/// Which side of a void block a [`GapCursor`] sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GapSide {
    Before,
    After,
}

/// A caret state adjacent to a void block where a text caret cannot land
/// (§4.7), e.g. between two consecutive void blocks, or at document end
/// right after one.
#[derive(Clone, Debug, PartialEq)]
pub struct GapCursor {
    pub block: BlockId,
    pub side: GapSide,
    pub path: NodePath,
}

impl GapCursor {
    pub fn new(block: BlockId, side: GapSide, path: NodePath) -> Self {
        Self { block, side, path }
    }
}

/// The three selection variants (§4.7).
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Text(TextSelection),
    Node(NodeSelection),
    Gap(GapCursor),
}

impl Selection {
    pub fn text(anchor: BlockPos, head: BlockPos) -> Self {
        Selection::Text(TextSelection::new(anchor, head))
    }

    pub fn collapsed(pos: BlockPos) -> Self {
        Selection::Text(TextSelection::collapsed(pos))
    }

    pub fn node(node: BlockId, path: NodePath) -> Self {
        Selection::Node(NodeSelection::new(node, path))
    }

    pub fn gap(block: BlockId, side: GapSide, path: NodePath) -> Self {
        Selection::Gap(GapCursor::new(block, side, path))
    }

    pub fn as_text(&self) -> Option<&TextSelection> {
        match self {
            Selection::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeSelection> {
        match self {
            Selection::Node(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Text(t) => t.is_collapsed(),
            Selection::Node(_) | Selection::Gap(_) => true,
        }
    }

    /// Validate that this selection corresponds to positions that actually
    /// exist in `doc` (§4.5, "block ids must exist, offsets must be in
    /// range"). Callers turn a `false` result into `CoreError::InvalidSelection`.
    pub fn is_valid_in(&self, doc: &Document) -> bool {
        match self {
            Selection::Text(t) => {
                Self::pos_is_valid(doc, t.anchor) && Self::pos_is_valid(doc, t.head)
            }
            Selection::Node(n) => doc.contains(n.node),
            Selection::Gap(g) => doc.contains(g.block),
        }
    }

    fn pos_is_valid(doc: &Document, pos: BlockPos) -> bool {
        match doc.block(pos.block) {
            Some(block) => pos.offset <= block.text_len(),
            None => false,
        }
    }
}
