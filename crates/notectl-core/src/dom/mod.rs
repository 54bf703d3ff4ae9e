// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component B: the document model — an immutable tree of block/inline/text
//! nodes with marks, stable node identities, and strict structural rules
//! (§3).

pub mod attrs;
pub mod document;
pub mod invariants;
pub mod mark;
pub mod node;
pub mod path;

pub use attrs::{attr_map, AttrMap, AttrValue};
pub use document::{Document, DOCUMENT_TYPE};
pub use mark::{Mark, MarkSet};
pub use node::{BlockContent, BlockNode, InlineChild, InlineNode, TextNode};
pub use path::{BlockPos, NodePath};
