// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! The document tree (§3.1) and its navigation helpers, generalized from
//! the teacher's `Dom<S>` (index-handle based) to id-based [`NodePath`]s
//! per §3.3/§9.

use crate::dom::attrs::AttrMap;
use crate::dom::node::{BlockContent, BlockNode};
use crate::dom::path::NodePath;
use crate::ids::BlockId;

pub const DOCUMENT_TYPE: &str = "document";

/// An immutable tree of blocks, rooted at a fixed virtual `"document"`
/// block (§3.1). Cloning a `Document` is a deep clone; callers build new
/// documents by cloning the old one and mutating the copy, never the tree
/// in place (§3.4, "Ownership").
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    root: BlockNode,
}

impl Document {
    pub fn new(top_level_blocks: Vec<BlockNode>) -> Self {
        Self {
            root: BlockNode::new_container(
                BlockId::DOCUMENT_ROOT,
                DOCUMENT_TYPE,
                AttrMap::new(),
                top_level_blocks,
            ),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn root(&self) -> &BlockNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut BlockNode {
        &mut self.root
    }

    pub fn top_level_blocks(&self) -> &[BlockNode] {
        self.root
            .content
            .as_container()
            .expect("document root is always a container")
    }

    /// Find the path (root to target, inclusive) of the block with id
    /// `id`, by depth-first search.
    pub fn path_of(&self, id: BlockId) -> Option<NodePath> {
        if id == BlockId::DOCUMENT_ROOT {
            return Some(NodePath::root());
        }
        fn search(node: &BlockNode, target: BlockId, path: &mut Vec<BlockId>) -> bool {
            if let BlockContent::Container(children) = &node.content {
                for child in children {
                    path.push(child.id);
                    if child.id == target || search(child, target, path) {
                        return true;
                    }
                    path.pop();
                }
            }
            false
        }
        let mut path = vec![BlockId::DOCUMENT_ROOT];
        if search(&self.root, id, &mut path) {
            Some(NodePath::from_ids(path))
        } else {
            None
        }
    }

    /// Navigate to the block at `path`, matching each step by block id
    /// rather than positional index (§9).
    pub fn navigate(&self, path: &NodePath) -> Option<&BlockNode> {
        let ids = path.ids();
        debug_assert_eq!(ids.first().copied(), Some(BlockId::DOCUMENT_ROOT));
        let mut node = &self.root;
        for id in &ids[1..] {
            let children = node.content.as_container()?;
            node = children.iter().find(|c| c.id == *id)?;
        }
        Some(node)
    }

    pub fn navigate_mut(&mut self, path: &NodePath) -> Option<&mut BlockNode> {
        let ids = path.ids();
        debug_assert_eq!(ids.first().copied(), Some(BlockId::DOCUMENT_ROOT));
        let mut node = &mut self.root;
        for id in &ids[1..] {
            let children = node.content.as_container_mut()?;
            node = children.iter_mut().find(|c| c.id == *id)?;
        }
        Some(node)
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockNode> {
        if id == BlockId::DOCUMENT_ROOT {
            return Some(&self.root);
        }
        let path = self.path_of(id)?;
        self.navigate(&path)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BlockNode> {
        if id == BlockId::DOCUMENT_ROOT {
            return Some(&mut self.root);
        }
        let path = self.path_of(id)?;
        self.navigate_mut(&path)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.block(id).is_some()
    }

    /// The parent container's path of the block identified by `id`.
    pub fn parent_path_of(&self, id: BlockId) -> Option<NodePath> {
        self.path_of(id)?.parent()
    }

    pub fn parent_of(&self, id: BlockId) -> Option<&BlockNode> {
        let parent_path = self.parent_path_of(id)?;
        self.navigate(&parent_path)
    }

    pub fn index_in_parent(&self, id: BlockId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        let children = parent.content.as_container()?;
        children.iter().position(|c| c.id == id)
    }

    pub fn children_of(&self, id: BlockId) -> Option<&[BlockNode]> {
        self.block(id)?.content.as_container()
    }

    pub fn prev_sibling(&self, id: BlockId) -> Option<BlockId> {
        let parent = self.parent_of(id)?;
        let children = parent.content.as_container()?;
        let idx = children.iter().position(|c| c.id == id)?;
        if idx == 0 {
            None
        } else {
            Some(children[idx - 1].id)
        }
    }

    pub fn next_sibling(&self, id: BlockId) -> Option<BlockId> {
        let parent = self.parent_of(id)?;
        let children = parent.content.as_container()?;
        let idx = children.iter().position(|c| c.id == id)?;
        children.get(idx + 1).map(|c| c.id)
    }

    /// A sortable key giving `id`'s position in document order: the
    /// sequence of child indices from the root down to `id`. Used by
    /// [`crate::selection::Selection`] to normalize `(anchor, head)` pairs
    /// without needing any separate traversal order index (§4.7,
    /// "`selectionRange(order)`").
    pub fn order_key(&self, id: BlockId) -> Option<Vec<usize>> {
        let path = self.path_of(id)?;
        let ids = path.ids();
        let mut key = Vec::with_capacity(ids.len());
        let mut parent = &self.root;
        for child_id in &ids[1..] {
            let children = parent.content.as_container()?;
            let idx = children.iter().position(|c| c.id == *child_id)?;
            key.push(idx);
            parent = &children[idx];
        }
        Some(key)
    }

    /// Whether `a` precedes `b` in document order (or they are the same
    /// block).
    pub fn precedes_or_eq(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return true;
        }
        match (self.order_key(a), self.order_key(b)) {
            (Some(ka), Some(kb)) => ka <= kb,
            _ => false,
        }
    }

    /// All ids in the subtree rooted at `node`, including `node` itself.
    pub fn subtree_ids(node: &BlockNode) -> Vec<BlockId> {
        let mut ids = vec![node.id];
        if let BlockContent::Container(children) = &node.content {
            for child in children {
                ids.extend(Self::subtree_ids(child));
            }
        }
        ids
    }

    /// A human-readable indented tree dump, mirrored from the teacher's
    /// `ToTree` trait, for test assertions and host debug panels.
    pub fn to_tree_string(&self) -> String {
        fn write_node(node: &BlockNode, depth: usize, out: &mut String) {
            out.push_str(&"  ".repeat(depth));
            out.push_str(&format!("{}#{}", node.type_name, node.id.raw()));
            match &node.content {
                BlockContent::Container(children) => {
                    out.push('\n');
                    for child in children {
                        write_node(child, depth + 1, out);
                    }
                }
                BlockContent::Leaf(children) => {
                    out.push_str(": ");
                    let parts: Vec<String> = children
                        .iter()
                        .map(|c| match c {
                            crate::dom::node::InlineChild::Text(t) => format!("{:?}", t.text),
                            crate::dom::node::InlineChild::Inline(i) => {
                                format!("<{}>", i.type_name)
                            }
                        })
                        .collect();
                    out.push_str(&parts.join(""));
                    out.push('\n');
                }
            }
        }
        let mut out = String::new();
        write_node(&self.root, 0, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::{InlineChild, TextNode};
    use crate::dom::mark::MarkSet;
    use indoc::indoc;
    use speculoos::prelude::*;

    fn para(id: u64, text: &str) -> BlockNode {
        BlockNode::new_leaf(
            BlockId::from_raw(id),
            "paragraph",
            AttrMap::new(),
            vec![InlineChild::Text(TextNode::new(text, MarkSet::new()))],
        )
    }

    #[test]
    fn path_of_finds_top_level_block() {
        let doc = Document::new(vec![para(1, "a"), para(2, "b")]);
        let path = doc.path_of(BlockId::from_raw(2)).unwrap();
        assert_eq!(path.target(), Some(BlockId::from_raw(2)));
    }

    #[test]
    fn path_of_finds_nested_block() {
        let inner = para(2, "inner");
        let container = BlockNode::new_container(
            BlockId::from_raw(1),
            "blockquote",
            AttrMap::new(),
            vec![inner],
        );
        let doc = Document::new(vec![container]);
        let path = doc.path_of(BlockId::from_raw(2)).unwrap();
        assert_eq!(
            path.ids(),
            &[BlockId::DOCUMENT_ROOT, BlockId::from_raw(1), BlockId::from_raw(2)]
        );
    }

    #[test]
    fn navigate_matches_by_id_not_index() {
        let doc = Document::new(vec![para(1, "a"), para(2, "b")]);
        let path = NodePath::root().child(BlockId::from_raw(2));
        let node = doc.navigate(&path).unwrap();
        assert_eq!(node.id, BlockId::from_raw(2));
    }

    #[test]
    fn subtree_ids_includes_self_and_descendants() {
        let inner = para(2, "inner");
        let container = BlockNode::new_container(
            BlockId::from_raw(1),
            "blockquote",
            AttrMap::new(),
            vec![inner],
        );
        let ids = Document::subtree_ids(&container);
        assert_eq!(ids, vec![BlockId::from_raw(1), BlockId::from_raw(2)]);
    }

    #[test]
    fn prev_and_next_sibling() {
        let doc = Document::new(vec![para(1, "a"), para(2, "b"), para(3, "c")]);
        assert_eq!(doc.prev_sibling(BlockId::from_raw(2)), Some(BlockId::from_raw(1)));
        assert_eq!(doc.next_sibling(BlockId::from_raw(2)), Some(BlockId::from_raw(3)));
        assert_eq!(doc.prev_sibling(BlockId::from_raw(1)), None);
        assert_eq!(doc.next_sibling(BlockId::from_raw(3)), None);
    }

    #[test]
    fn to_tree_string_renders_nested_blocks_indented() {
        let inner = para(2, "inner");
        let container = BlockNode::new_container(BlockId::from_raw(1), "blockquote", AttrMap::new(), vec![inner]);
        let doc = Document::new(vec![container]);
        assert_that(&doc.to_tree_string()).is_equal_to(indoc! {r#"
            document#0
              blockquote#1
                paragraph#2: "inner"
        "#}.to_string());
    }
}
