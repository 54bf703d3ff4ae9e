// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! `notectl-core`: a deterministic, host-agnostic document and state engine
//! for a structured rich-text editor.
//!
//! The crate owns an immutable block-tree document model, a closed algebra
//! of atomic edit steps, and the transaction/state machinery that applies
//! them — but none of a UI. A host embeds it by constructing an
//! [`EditorState`], building [`transaction::Transaction`]s (directly or via
//! the [`commands`] functions), and applying them; optionally through a
//! [`plugin::PluginHost`] for middleware and `onStateChange` observation.
//!
//! Module map, following the component letters used throughout the design
//! notes:
//! - [`ids`] (A) — opaque block/mark/node-type identifiers.
//! - [`dom`] (B) — the document tree: blocks, inline children, marks, paths.
//! - [`selection`] (C) — text/node/gap selections and motion primitives.
//! - [`schema`] (D) — node/mark/inline-node specs and the pass-through
//!   registries a host plugs keymaps, input rules, and toolbar entries into.
//! - [`step`] (E) — the atomic step algebra and position mapping.
//! - [`transaction`] (F) — `TransactionBuilder` and `Transaction`.
//! - [`state`] (G) — `EditorState::apply`, the single mutation entry point.
//! - [`slice`] (H) — copy/paste content slices.
//! - [`decoration`] (I) — the decoration set and its step-driven remapping.
//! - [`commands`] (J) — pure `state -> transaction?` editing commands.
//! - [`plugin`] (K) — the plugin host: middleware, observers, services.

pub mod commands;
pub mod decoration;
pub mod dom;
pub mod error;
pub mod ids;
pub mod plugin;
pub mod range_ops;
pub mod schema;
pub mod selection;
pub mod slice;
pub mod state;
pub mod step;
pub mod text_unit;
pub mod transaction;
pub mod typed_registry;

#[cfg(test)]
mod tests;

pub use decoration::{DecorationSet, InlineDecoration, NodeDecoration, WidgetDecoration, WidgetSide};
pub use dom::{attr_map, AttrMap, AttrValue, BlockContent, BlockNode, BlockPos, Document, InlineChild, InlineNode, Mark, MarkSet, NodePath, TextNode};
pub use error::{CoreError, CoreResult};
pub use ids::{next_block_id, BlockId, BlockIdGenerator, InlineNodeTypeName, MarkTypeName, NodeTypeName};
pub use plugin::{CommandFn, MiddlewareFn, ObserverFn, PluginHost};
pub use schema::{InlineNodeSpec, MarkSpec, NodeSpec, SchemaRegistry};
pub use selection::{Assoc, GapCursor, GapSide, NodeSelection, Selection, TextSelection};
pub use slice::{copy_slice, paste_slice, ContentSlice, SliceBlock, SliceSegment};
pub use state::EditorState;
pub use step::{MappedPos, Step};
pub use transaction::{StoredMarksChange, Transaction, TransactionBuilder};
