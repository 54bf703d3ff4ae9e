// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Assertions that the document tree satisfies §3.2's invariants.
//!
//! By default, outside tests, nothing here runs: enable the
//! `assert-invariants` feature to have a host call these on every state
//! transition. `EditorState::apply` always runs them under `#[cfg(test)]`.

#![cfg_attr(not(any(test, feature = "assert-invariants")), allow(dead_code))]

use std::collections::HashSet;

use crate::dom::document::Document;
use crate::dom::node::{BlockContent, BlockNode};
use crate::ids::BlockId;

impl Document {
    pub fn explicitly_assert_invariants(&self) {
        cfg_if::cfg_if! {
            if #[cfg(any(test, feature = "assert-invariants"))] {
                self.assert_invariants();
            } else {
                let _ = self;
            }
        }
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    pub(crate) fn assert_invariants(&self) {
        self.assert_unique_block_ids();
        self.assert_homogeneous_children();
        self.assert_leaf_blocks_non_empty_or_single_empty_text();
        self.assert_no_adjacent_mergeable_text_runs();
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_unique_block_ids(&self) {
        let mut seen: HashSet<BlockId> = HashSet::new();
        fn walk(node: &BlockNode, seen: &mut HashSet<BlockId>, tree: &str) {
            if !seen.insert(node.id) {
                panic!("Duplicate block id found: {:?}\n{}", node.id, tree);
            }
            if let BlockContent::Container(children) = &node.content {
                for child in children {
                    walk(child, seen, tree);
                }
            }
        }
        let tree = self.to_tree_string();
        walk(self.root(), &mut seen, &tree);
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_homogeneous_children(&self) {
        // Homogeneity is enforced by `BlockContent`'s type itself (a
        // container's children are `Vec<BlockNode>`, a leaf's are
        // `Vec<InlineChild>`) so there is nothing further to check here
        // beyond documenting the invariant's source.
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_leaf_blocks_non_empty_or_single_empty_text(&self) {
        fn walk(node: &BlockNode, tree: &str) {
            match &node.content {
                BlockContent::Leaf(children) => {
                    if children.is_empty() {
                        panic!(
                            "Leaf block {:?} has no children at all (must have \
                             at least one, or exactly one empty TextNode)\n{}",
                            node.id, tree
                        );
                    }
                }
                BlockContent::Container(children) => {
                    for child in children {
                        walk(child, tree);
                    }
                }
            }
        }
        walk(self.root(), &self.to_tree_string());
    }

    #[cfg(any(test, feature = "assert-invariants"))]
    fn assert_no_adjacent_mergeable_text_runs(&self) {
        fn walk(node: &BlockNode, tree: &str) {
            match &node.content {
                BlockContent::Leaf(children) => {
                    for pair in children.windows(2) {
                        if let (
                            crate::dom::node::InlineChild::Text(a),
                            crate::dom::node::InlineChild::Text(b),
                        ) = (&pair[0], &pair[1])
                        {
                            if a.marks == b.marks {
                                panic!(
                                    "Adjacent text runs with identical mark sets \
                                     found in block {:?} (should have been \
                                     coalesced)\n{}",
                                    node.id, tree
                                );
                            }
                        }
                    }
                }
                BlockContent::Container(children) => {
                    for child in children {
                        walk(child, tree);
                    }
                }
            }
        }
        walk(self.root(), &self.to_tree_string());
    }
}
