// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component G: the editor state (§4.5) — an immutable snapshot of
//! `(doc, selection, storedMarks, schema, decorations)` with the single
//! `apply(transaction) -> new state` entry point every mutation goes
//! through.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::decoration::DecorationSet;
use crate::dom::document::Document;
use crate::dom::mark::Mark;
use crate::dom::node::{BlockContent, BlockNode};
use crate::dom::path::{BlockPos, NodePath};
use crate::error::{CoreError, CoreResult};
use crate::ids::BlockId;
use crate::schema::SchemaRegistry;
use crate::selection::{Assoc, Selection};
use crate::step::MappedPos;
use crate::transaction::{StoredMarksChange, Transaction};

#[derive(Clone, Default)]
struct Indices {
    path_by_id: HashMap<BlockId, NodePath>,
}

fn build_indices(doc: &Document) -> Indices {
    let mut path_by_id = HashMap::new();
    fn walk(node: &BlockNode, path: &NodePath, map: &mut HashMap<BlockId, NodePath>) {
        map.insert(node.id, path.clone());
        if let BlockContent::Container(children) = &node.content {
            for child in children {
                walk(child, &path.child(child.id), map);
            }
        }
    }
    walk(doc.root(), &NodePath::root(), &mut path_by_id);
    Indices { path_by_id }
}

/// An immutable snapshot of the whole editor (§4.5). Mutation always goes
/// through [`EditorState::apply`], which returns a new `EditorState`
/// rather than touching this one — matching §3.4's "all public values
/// appear immutable to consumers".
#[derive(Clone)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
    stored_marks: Option<Vec<Mark>>,
    schema: Arc<SchemaRegistry>,
    decorations: DecorationSet,
    indices: OnceCell<Indices>,
}

impl EditorState {
    pub fn new(doc: Document, selection: Selection, schema: Arc<SchemaRegistry>) -> Self {
        Self {
            doc,
            selection,
            stored_marks: None,
            schema,
            decorations: DecorationSet::empty(),
            indices: OnceCell::new(),
        }
    }

    /// A fresh state holding a single empty paragraph, with the caret at
    /// its start. Convenience for hosts/tests bootstrapping a document
    /// without hand-rolling one.
    pub fn empty_document(schema: Arc<SchemaRegistry>) -> Self {
        let id = crate::ids::next_block_id();
        let para = BlockNode::new_leaf(id, "paragraph", crate::dom::attrs::AttrMap::new(), vec![]);
        let doc = Document::new(vec![para]);
        let selection = Selection::collapsed(BlockPos::new(id, 0));
        Self::new(doc, selection, schema)
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn stored_marks(&self) -> Option<&[Mark]> {
        self.stored_marks.as_deref()
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn schema_handle(&self) -> Arc<SchemaRegistry> {
        self.schema.clone()
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    fn indices(&self) -> &Indices {
        self.indices.get_or_init(|| build_indices(&self.doc))
    }

    /// `id -> BlockNode` lookup (§4.5), backed by the lazily-rebuilt
    /// `id -> path` index rather than a fresh tree walk each time.
    pub fn block(&self, id: BlockId) -> Option<&BlockNode> {
        let path = self.indices().path_by_id.get(&id)?;
        self.doc.navigate(path)
    }

    /// Alias matching §5's "`state.getBlock(id)` returns nothing" phrasing,
    /// used by async task cancellation checks.
    pub fn get_block(&self, id: BlockId) -> Option<&BlockNode> {
        self.block(id)
    }

    pub fn path_of(&self, id: BlockId) -> Option<NodePath> {
        self.indices().path_by_id.get(&id).cloned()
    }

    /// Apply a transaction, producing the next state (§4.5). All-or-
    /// nothing: a rejected transaction returns `Err` and `self` is
    /// untouched.
    pub fn apply(&self, tx: Transaction) -> CoreResult<EditorState> {
        let mut doc = self.doc.clone();
        for step in &tx.steps {
            doc = step.apply(&doc, &self.schema).map_err(|err| {
                tracing::debug!(origin = %tx.origin, error = %err, "transaction rejected: step precondition violated");
                err
            })?;
        }

        let selection = match &tx.selection {
            Some(explicit) => {
                if !explicit.is_valid_in(&doc) {
                    tracing::debug!(origin = %tx.origin, "transaction rejected: explicit selection invalid in post-step document");
                    return Err(CoreError::invalid_selection(
                        "explicit selection does not correspond to a valid position in the resulting document",
                    ));
                }
                explicit.clone()
            }
            None => map_selection_through(&self.selection, &tx.steps, &doc),
        };

        let stored_marks = match &tx.stored_marks {
            Some(StoredMarksChange::Set(marks)) => Some(marks.clone()),
            Some(StoredMarksChange::Clear) => None,
            None => None,
        };

        let mut decorations = self.decorations.clone();
        for step in &tx.steps {
            decorations = decorations.map(step);
        }

        Ok(EditorState {
            doc,
            selection,
            stored_marks,
            schema: self.schema.clone(),
            decorations,
            indices: OnceCell::new(),
        })
    }
}

/// Map the current selection through every step of a transaction that
/// didn't carry an explicit final selection (§4.5 step 2). Falls back to
/// the document's first available position if a selection endpoint's
/// block was deleted.
fn map_selection_through(selection: &Selection, steps: &[crate::step::Step], doc: &Document) -> Selection {
    match selection {
        Selection::Text(t) => {
            let mut anchor = t.anchor;
            let mut head = t.head;
            let mut anchor_deleted = false;
            let mut head_deleted = false;
            for step in steps {
                if !anchor_deleted {
                    match step.map_position(anchor, Assoc::Before) {
                        MappedPos::At(p) => anchor = p,
                        MappedPos::Deleted => anchor_deleted = true,
                    }
                }
                if !head_deleted {
                    match step.map_position(head, Assoc::After) {
                        MappedPos::At(p) => head = p,
                        MappedPos::Deleted => head_deleted = true,
                    }
                }
            }
            if anchor_deleted || head_deleted {
                return fallback_selection(doc);
            }
            Selection::Text(crate::selection::TextSelection::new(anchor, head))
        }
        Selection::Node(n) => {
            if doc.contains(n.node) {
                selection.clone()
            } else {
                fallback_selection(doc)
            }
        }
        Selection::Gap(g) => {
            if doc.contains(g.block) {
                selection.clone()
            } else {
                fallback_selection(doc)
            }
        }
    }
}

/// The start of the first leaf block in document order, or a collapsed
/// selection at the document root if the document is entirely empty of
/// leaf blocks (pathological, but must not panic).
fn fallback_selection(doc: &Document) -> Selection {
    fn first_leaf(node: &BlockNode) -> Option<BlockId> {
        match &node.content {
            BlockContent::Leaf(_) => Some(node.id),
            BlockContent::Container(children) => children.iter().find_map(first_leaf),
        }
    }
    match first_leaf(doc.root()) {
        Some(id) => Selection::collapsed(BlockPos::new(id, 0)),
        None => Selection::collapsed(BlockPos::new(BlockId::DOCUMENT_ROOT, 0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attrs::AttrMap;
    use crate::dom::mark::MarkSet;
    use crate::dom::node::{InlineChild, TextNode};
    use crate::transaction::TransactionBuilder;

    fn para(id: u64, text: &str) -> BlockNode {
        BlockNode::new_leaf(
            BlockId::from_raw(id),
            "paragraph",
            AttrMap::new(),
            vec![InlineChild::Text(TextNode::plain(text))],
        )
    }

    #[test]
    fn apply_inserts_text_and_maps_selection_forward() {
        let schema = Arc::new(SchemaRegistry::new());
        let doc = Document::new(vec![para(1, "AB")]);
        let selection = Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 2));
        let state = EditorState::new(doc, selection, schema.clone());

        let mut builder = TransactionBuilder::new(state.doc(), &schema, "command");
        builder.insert_text(BlockId::from_raw(1), 2, "C", MarkSet::new()).unwrap();
        let tx = builder.build();

        let next = state.apply(tx).unwrap();
        assert_eq!(next.block(BlockId::from_raw(1)).unwrap().text_len(), 3);
        let sel = next.selection().as_text().unwrap();
        assert_eq!(sel.head.offset, 3);
    }

    #[test]
    fn apply_rejects_invalid_explicit_selection_and_preserves_state() {
        let schema = Arc::new(SchemaRegistry::new());
        let doc = Document::new(vec![para(1, "AB")]);
        let selection = Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 0));
        let state = EditorState::new(doc, selection, schema.clone());

        let mut builder = TransactionBuilder::new(state.doc(), &schema, "command");
        builder.set_selection(Selection::collapsed(BlockPos::new(BlockId::from_raw(99), 0)));
        let tx = builder.build();

        let result = state.apply(tx);
        assert!(matches!(result, Err(CoreError::InvalidSelection { .. })));
    }

    #[test]
    fn apply_clears_stored_marks_by_default() {
        let schema = Arc::new(SchemaRegistry::new());
        let doc = Document::new(vec![para(1, "AB")]);
        let selection = Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 0));
        let mut state = EditorState::new(doc, selection, schema.clone());
        state.stored_marks = Some(vec![crate::dom::mark::Mark::simple("bold")]);

        let builder = TransactionBuilder::new(state.doc(), &schema, "motion");
        let tx = builder.build();
        let next = state.apply(tx).unwrap();
        assert!(next.stored_marks().is_none());
    }

    #[test]
    fn block_lookup_works_after_structural_change() {
        let schema = Arc::new(SchemaRegistry::new());
        let doc = Document::new(vec![para(1, "ABCDE")]);
        let selection = Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 5));
        let state = EditorState::new(doc, selection, schema.clone());

        let mut builder = TransactionBuilder::new(state.doc(), &schema, "command");
        builder.split_block(BlockId::from_raw(1), 2, BlockId::from_raw(2)).unwrap();
        let tx = builder.build();
        let next = state.apply(tx).unwrap();
        assert!(next.block(BlockId::from_raw(2)).is_some());
    }
}
