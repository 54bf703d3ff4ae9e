// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Shared multi-block range deletion, used by both `commands::text` (a
//! `deleteBackward`/`deleteForward` that crosses a block boundary) and
//! `slice::paste_slice` (§4.8's "delete current range if any").
//!
//! §4.10: "Deletion of a range spanning multiple blocks is compiled into:
//! `DeleteText` on the first block from `from.offset` to its length;
//! `RemoveNode` for each fully-covered middle block (emitted in descending
//! order of index); `DeleteText` on the last block from 0 to `to.offset`;
//! finally `MergeBlocks(first, last)`."
//!
//! This assumes `from.block` and `to.block` share an immediate parent
//! container — true for the common case of sibling leaf blocks. Spanning a
//! range that crosses a container boundary (e.g. into/out of a blockquote)
//! is not handled generically here; see `DESIGN.md`.

use crate::dom::path::BlockPos;
use crate::error::{CoreError, CoreResult};
use crate::transaction::TransactionBuilder;

/// Compile and queue the steps to delete `[from, to)` (a range possibly
/// spanning several sibling blocks) onto `builder`. No-op if the range is
/// already collapsed.
pub fn delete_range(builder: &mut TransactionBuilder<'_>, from: BlockPos, to: BlockPos) -> CoreResult<()> {
    if from.block == to.block {
        if from.offset != to.offset {
            builder.delete_text(from.block, from.offset, to.offset)?;
        }
        return Ok(());
    }

    let doc = builder.current_doc().clone();
    let parent_path = doc
        .parent_path_of(from.block)
        .ok_or_else(|| CoreError::BuildError {
            reason: format!("unknown block {}", from.block),
        })?;
    if doc.parent_path_of(to.block) != Some(parent_path.clone()) {
        return Err(CoreError::BuildError {
            reason: "multi-block range deletion requires both endpoints to share a parent".to_string(),
        });
    }
    let parent = doc.navigate(&parent_path).ok_or_else(|| CoreError::BuildError {
        reason: "parent block missing".to_string(),
    })?;
    let siblings = parent.content.as_container().ok_or_else(|| CoreError::BuildError {
        reason: "parent is not a container".to_string(),
    })?;
    let from_idx = siblings
        .iter()
        .position(|c| c.id == from.block)
        .ok_or_else(|| CoreError::BuildError {
            reason: "from block missing from parent".to_string(),
        })?;
    let to_idx = siblings
        .iter()
        .position(|c| c.id == to.block)
        .ok_or_else(|| CoreError::BuildError {
            reason: "to block missing from parent".to_string(),
        })?;
    if to_idx <= from_idx {
        return Err(CoreError::BuildError {
            reason: "to block does not follow from block in document order".to_string(),
        });
    }

    let first_len = doc.block(from.block).unwrap().text_len();
    builder.delete_text(from.block, from.offset, first_len)?;

    for idx in (from_idx + 1..to_idx).rev() {
        builder.remove_node(parent.id, idx)?;
    }

    builder.delete_text(to.block, 0, to.offset)?;
    builder.merge_blocks(from.block, to.block)?;
    Ok(())
}


/// Like [`delete_range`] but reports whether any steps were queued,
/// convenient for commands that want to distinguish "nothing to delete"
/// from "deleted".
pub fn delete_range_checked(builder: &mut TransactionBuilder<'_>, from: BlockPos, to: BlockPos) -> CoreResult<bool> {
    let before = builder.current_doc().clone();
    delete_range(builder, from, to)?;
    Ok(*builder.current_doc() != before)
}
