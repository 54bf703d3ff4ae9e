// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Property-based tests for §8's "Round-trip laws": step/inverse identity,
//! and selection-mapping identity for an untouched block.

use proptest::prelude::*;

use crate::dom::attrs::AttrMap;
use crate::dom::document::Document;
use crate::dom::mark::MarkSet;
use crate::dom::node::{BlockNode, InlineChild, TextNode};
use crate::dom::path::BlockPos;
use crate::ids::BlockId;
use crate::schema::SchemaRegistry;
use crate::selection::{Assoc, TextSelection};
use crate::step::{DeleteTextStep, InsertTextStep, Step};
use crate::text_unit::utf16_len;

fn para(id: u64, text: &str) -> BlockNode {
    BlockNode::new_leaf(BlockId::from_raw(id), "paragraph", AttrMap::new(), vec![InlineChild::Text(TextNode::plain(text))])
}

/// ASCII-only strategy: keeps UTF-16 code-unit arithmetic and byte-offset
/// arithmetic trivially aligned, which is all this property needs -
/// surrogate-pair correctness is covered directly in `text_unit`'s tests.
fn ascii_text() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{0,12}"
}

proptest! {
    /// For every step kind, `step` then `step.invert(before)` restores the
    /// original document structurally (§8, round-trip law).
    #[test]
    fn insert_text_then_invert_round_trips(base in ascii_text(), insert in ascii_text(), offset_frac in 0.0f64..=1.0) {
        let schema = SchemaRegistry::new();
        let before = Document::new(vec![para(1, &base)]);
        let len = utf16_len(&base);
        let offset = (offset_frac * len as f64).round() as usize;

        let step = Step::InsertText(InsertTextStep::plain(BlockId::from_raw(1), offset, insert.clone(), MarkSet::new()));
        let after = step.apply(&before, &schema).unwrap();
        let inverse = step.invert(&before).unwrap();
        let restored = inverse.apply(&after, &schema).unwrap();
        prop_assert_eq!(restored, before);
    }

    #[test]
    fn delete_text_then_invert_round_trips(base in ascii_text(), from_frac in 0.0f64..=1.0, to_frac in 0.0f64..=1.0) {
        let schema = SchemaRegistry::new();
        let before = Document::new(vec![para(1, &base)]);
        let len = utf16_len(&base);
        let mut from = (from_frac * len as f64).round() as usize;
        let mut to = (to_frac * len as f64).round() as usize;
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }

        let deleted_children = {
            let block = before.block(BlockId::from_raw(1)).unwrap();
            let children = block.content.as_leaf().unwrap();
            crate::step::slice_children_range(children, from, to).unwrap()
        };
        let step = Step::DeleteText(DeleteTextStep {
            block: BlockId::from_raw(1),
            from,
            to,
            deleted: deleted_children,
        });
        let after = step.apply(&before, &schema).unwrap();
        let inverse = step.invert(&before).unwrap();
        let restored = inverse.apply(&after, &schema).unwrap();
        prop_assert_eq!(restored, before);
    }

    /// A text selection endpoint in a block untouched by a transaction maps
    /// to itself, regardless of edits elsewhere in the document (§8).
    #[test]
    fn selection_in_untouched_block_is_unaffected_by_unrelated_edit(
        untouched_text in ascii_text(),
        other_text in ascii_text(),
        insert in ascii_text(),
        anchor_frac in 0.0f64..=1.0,
    ) {
        let schema = SchemaRegistry::new();
        let untouched_id = BlockId::from_raw(1);
        let other_id = BlockId::from_raw(2);
        let before = Document::new(vec![para(1, &untouched_text), para(2, &other_text)]);

        let untouched_len = utf16_len(&untouched_text);
        let anchor_offset = (anchor_frac * untouched_len as f64).round() as usize;
        let original = TextSelection::new(BlockPos::new(untouched_id, anchor_offset), BlockPos::new(untouched_id, anchor_offset));

        let other_len = utf16_len(&other_text);
        let step = Step::InsertText(InsertTextStep::plain(other_id, other_len, insert, MarkSet::new()));
        let _ = step.apply(&before, &schema).unwrap();

        let mapped = step.map_position(original.anchor, Assoc::Before);
        match mapped {
            crate::step::MappedPos::At(p) => prop_assert_eq!(p, original.anchor),
            crate::step::MappedPos::Deleted => prop_assert!(false, "an unrelated block's position must never be reported deleted"),
        }
    }
}
