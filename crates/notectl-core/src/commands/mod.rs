// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component J: commands (§4.10) — pure `state -> Option<Transaction>`
//! functions grouped into the families §4.10 names. None of these mutate
//! anything; each builds a [`crate::transaction::TransactionBuilder`]
//! against the state's document and returns `None` when the action is a
//! no-op (motion at document edges, deleting with nothing to delete, an
//! unknown mark/node type), matching §4.10's "pure function `state ->
//! transaction | null`".

mod block_type;
mod marks;
pub mod motion;
mod structure;
mod text;

pub use block_type::set_block_type;
pub use marks::toggle_mark;
pub use motion::{extend_by_block_end, extend_by_char, extend_by_document_end, move_by_block_end, move_by_char, move_by_document_end};
pub use structure::{insert_hard_break, merge_with_next, merge_with_previous, split_block};
pub use text::{delete_backward, delete_forward, delete_soft_line_backward, delete_soft_line_forward, delete_word_backward, delete_word_forward, insert_text};
