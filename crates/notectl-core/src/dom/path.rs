// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Positions and paths (§3.3). A path is a sequence of block ids from the
//! document root to a target block, *not* a sequence of child indices —
//! that's what lets a path outlive sibling inserts/removes elsewhere in the
//! tree (§9, "Deep nesting and path arithmetic").

use std::fmt;

use crate::ids::BlockId;

/// A block-local position: `(blockId, offset)` with `offset` in
/// `[0, blockLength]` (§3.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockPos {
    pub block: BlockId,
    pub offset: usize,
}

impl BlockPos {
    pub fn new(block: BlockId, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A sequence of block identifiers from the document root to a target
/// block, with the target included (§3.3).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<BlockId>);

impl NodePath {
    pub fn root() -> Self {
        NodePath(vec![BlockId::DOCUMENT_ROOT])
    }

    pub fn from_ids(ids: Vec<BlockId>) -> Self {
        NodePath(ids)
    }

    pub fn ids(&self) -> &[BlockId] {
        &self.0
    }

    pub fn target(&self) -> Option<BlockId> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<NodePath> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(NodePath(self.0[..self.0.len() - 1].to_vec()))
    }

    pub fn child(&self, id: BlockId) -> NodePath {
        let mut ids = self.0.clone();
        ids.push(id);
        NodePath(ids)
    }

    pub fn is_root(&self) -> bool {
        self.0.len() == 1 && self.0[0] == BlockId::DOCUMENT_ROOT
    }

    /// Whether `self` is `other`, or a descendant of `other`.
    pub fn is_or_descends_from(&self, other: &NodePath) -> bool {
        self.0.len() >= other.0.len() && self.0[..other.0.len()] == other.0[..]
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_path_extends_parent() {
        let root = NodePath::root();
        let child = root.child(BlockId::from_raw(5));
        assert_eq!(child.ids(), &[BlockId::DOCUMENT_ROOT, BlockId::from_raw(5)]);
        assert_eq!(child.parent().unwrap(), root);
    }

    #[test]
    fn descendant_check_is_prefix_based() {
        let root = NodePath::root();
        let a = root.child(BlockId::from_raw(1));
        let b = a.child(BlockId::from_raw(2));
        assert!(b.is_or_descends_from(&a));
        assert!(!a.is_or_descends_from(&b));
        assert!(a.is_or_descends_from(&a));
    }
}
