// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component I: the decoration set (§4.9) — an immutable, indexed
//! collection of view-only annotations mapped through every step, never
//! part of the document model.
//!
//! `toDOM` rendering (the actual DOM element a widget becomes) is an
//! external collaborator's concern (§1); [`WidgetDecoration`] carries an
//! opaque host-supplied render callback, mirroring how
//! [`crate::schema::node_spec::NodeSpec::wrapper`] carries an opaque
//! DOM-wrapper callback for the same reason.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dom::attrs::AttrMap;
use crate::dom::document::Document;
use crate::ids::BlockId;
use crate::step::{shift_for_insert, Step};

/// A display-styling annotation over a text range (§4.9). `from` is
/// `Assoc::Before`, `to` is `Assoc::After` (so an insertion exactly at the
/// boundary expands `to` but leaves `from` fixed — §8 boundary scenario 1).
#[derive(Clone, Debug, PartialEq)]
pub struct InlineDecoration {
    pub block: BlockId,
    pub from: usize,
    pub to: usize,
    pub attrs: AttrMap,
}

/// A whole-block styling annotation (§4.9).
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDecoration {
    pub block: BlockId,
    pub attrs: AttrMap,
}

/// Which way an insertion exactly at a widget's offset pushes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetSide {
    Before,
    After,
}

pub type ToDomFn = Arc<dyn Fn() -> String + Send + Sync>;

/// An anchor for a host-rendered UI element at a point inside a block
/// (§4.9).
#[derive(Clone)]
pub struct WidgetDecoration {
    pub block: BlockId,
    pub offset: usize,
    pub side: WidgetSide,
    pub key: Option<String>,
    pub to_dom: Option<ToDomFn>,
}

impl fmt::Debug for WidgetDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetDecoration")
            .field("block", &self.block)
            .field("offset", &self.offset)
            .field("side", &self.side)
            .field("key", &self.key)
            .field("to_dom", &self.to_dom.is_some())
            .finish()
    }
}

impl PartialEq for WidgetDecoration {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.offset == other.offset && self.side == other.side && self.key == other.key
    }
}

impl WidgetDecoration {
    pub fn new(block: BlockId, offset: usize, side: WidgetSide) -> Self {
        Self {
            block,
            offset,
            side,
            key: None,
            to_dom: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct BlockDecorations {
    inline: Vec<InlineDecoration>,
    node: Vec<NodeDecoration>,
    widget: Vec<WidgetDecoration>,
}

impl BlockDecorations {
    fn is_empty(&self) -> bool {
        self.inline.is_empty() && self.node.is_empty() && self.widget.is_empty()
    }
}

/// An immutable, indexed collection of decorations (§4.9). All mutating
/// operations return a new set; `Arc`-backed storage means an unaffected
/// [`DecorationSet::map`] call is a cheap `Arc::clone`, matching the
/// spec's "reference-equal short circuits when no change occurs".
#[derive(Clone, Default)]
pub struct DecorationSet {
    by_block: Arc<HashMap<BlockId, BlockDecorations>>,
}

impl PartialEq for DecorationSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.by_block, &other.by_block) || *self.by_block == *other.by_block
    }
}

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.by_block.values().all(BlockDecorations::is_empty)
    }

    fn with_map(map: HashMap<BlockId, BlockDecorations>) -> Self {
        Self {
            by_block: Arc::new(map),
        }
    }

    pub fn inline_decorations(&self, block: BlockId) -> &[InlineDecoration] {
        self.by_block.get(&block).map(|b| b.inline.as_slice()).unwrap_or(&[])
    }

    pub fn node_decorations(&self, block: BlockId) -> &[NodeDecoration] {
        self.by_block.get(&block).map(|b| b.node.as_slice()).unwrap_or(&[])
    }

    pub fn widget_decorations(&self, block: BlockId) -> &[WidgetDecoration] {
        self.by_block.get(&block).map(|b| b.widget.as_slice()).unwrap_or(&[])
    }

    pub fn add_inline(&self, deco: InlineDecoration) -> Self {
        let mut map = (*self.by_block).clone();
        map.entry(deco.block).or_default().inline.push(deco);
        Self::with_map(map)
    }

    pub fn add_node(&self, deco: NodeDecoration) -> Self {
        let mut map = (*self.by_block).clone();
        map.entry(deco.block).or_default().node.push(deco);
        Self::with_map(map)
    }

    pub fn add_widget(&self, deco: WidgetDecoration) -> Self {
        let mut map = (*self.by_block).clone();
        map.entry(deco.block).or_default().widget.push(deco);
        Self::with_map(map)
    }

    /// Remove every decoration (of any kind) matching `predicate`'s block
    /// id, returning a new set. Reference-equal to `self` if nothing
    /// matched.
    pub fn remove(&self, predicate: impl Fn(BlockId) -> bool) -> Self {
        let mut changed = false;
        let mut map = HashMap::with_capacity(self.by_block.len());
        for (block, decos) in self.by_block.iter() {
            if predicate(*block) {
                changed = true;
                continue;
            }
            map.insert(*block, decos.clone());
        }
        if !changed {
            return self.clone();
        }
        Self::with_map(map)
    }

    /// Merge two decoration sets (e.g. one from a schema-registered plugin,
    /// one from host-applied selection highlights).
    pub fn merge(&self, other: &Self) -> Self {
        let mut map = (*self.by_block).clone();
        for (block, decos) in other.by_block.iter() {
            let entry = map.entry(*block).or_default();
            entry.inline.extend(decos.inline.iter().cloned());
            entry.node.extend(decos.node.iter().cloned());
            entry.widget.extend(decos.widget.iter().cloned());
        }
        Self::with_map(map)
    }

    /// Map every decoration through `step` (§4.9's table), returning the
    /// next set. `self.clone()` (an `Arc::clone`) is returned unchanged
    /// when `step` touches no block this set has decorations on.
    pub fn map(&self, step: &Step) -> Self {
        match step {
            Step::InsertText(s) => self.map_single_block(s.block, |bd| map_insert(bd, s.offset, s.inserted_width())),
            Step::DeleteText(s) => self.map_single_block(s.block, |bd| map_delete(bd, s.from, s.to)),
            Step::SplitBlock(s) => self.map_split(s.block, s.offset, s.new_block),
            Step::MergeBlocks(s) => self.map_merge(s.source, s.target, s.target_length_before),
            Step::RemoveNode(s) => {
                let removed_ids = Document::subtree_ids(&s.removed);
                self.remove(|block| removed_ids.contains(&block))
            }
            _ => self.clone(),
        }
    }

    fn map_single_block(&self, block: BlockId, f: impl Fn(&BlockDecorations) -> BlockDecorations) -> Self {
        let Some(bd) = self.by_block.get(&block) else {
            return self.clone();
        };
        let mapped = f(bd);
        let mut map = (*self.by_block).clone();
        map.insert(block, mapped);
        Self::with_map(map)
    }

    fn map_split(&self, block: BlockId, split: usize, new_block: BlockId) -> Self {
        let Some(bd) = self.by_block.get(&block) else {
            return self.clone();
        };
        let mut left = BlockDecorations::default();
        let mut right = BlockDecorations::default();

        for d in &bd.inline {
            if d.to <= split {
                left.inline.push(d.clone());
            } else if d.from >= split {
                right.inline.push(InlineDecoration {
                    block: new_block,
                    from: d.from - split,
                    to: d.to - split,
                    attrs: d.attrs.clone(),
                });
            } else {
                left.inline.push(InlineDecoration {
                    block,
                    from: d.from,
                    to: split,
                    attrs: d.attrs.clone(),
                });
                right.inline.push(InlineDecoration {
                    block: new_block,
                    from: 0,
                    to: d.to - split,
                    attrs: d.attrs.clone(),
                });
            }
        }
        for d in &bd.node {
            left.node.push(d.clone());
        }
        for d in &bd.widget {
            let goes_right = d.offset > split || (d.offset == split && d.side == WidgetSide::After);
            if goes_right {
                right.widget.push(WidgetDecoration {
                    block: new_block,
                    offset: d.offset - split,
                    side: d.side,
                    key: d.key.clone(),
                    to_dom: d.to_dom.clone(),
                });
            } else {
                left.widget.push(d.clone());
            }
        }

        let mut map = (*self.by_block).clone();
        map.insert(block, left);
        let right_entry = map.entry(new_block).or_default();
        right_entry.inline.extend(right.inline);
        right_entry.node.extend(right.node);
        right_entry.widget.extend(right.widget);
        Self::with_map(map)
    }

    fn map_merge(&self, source: BlockId, target: BlockId, target_len: usize) -> Self {
        let Some(src) = self.by_block.get(&source) else {
            return self.clone();
        };
        let mut map = (*self.by_block).clone();
        let shifted_inline: Vec<_> = src
            .inline
            .iter()
            .map(|d| InlineDecoration {
                block: target,
                from: d.from + target_len,
                to: d.to + target_len,
                attrs: d.attrs.clone(),
            })
            .collect();
        let shifted_widget: Vec<_> = src
            .widget
            .iter()
            .map(|d| WidgetDecoration {
                block: target,
                offset: d.offset + target_len,
                side: d.side,
                key: d.key.clone(),
                to_dom: d.to_dom.clone(),
            })
            .collect();
        map.remove(&source);
        let entry = map.entry(target).or_default();
        entry.inline.extend(shifted_inline);
        entry.widget.extend(shifted_widget);
        // NodeDecoration on the source block is deleted (§4.9's table), not
        // carried to the target.
        Self::with_map(map)
    }
}

fn map_insert(bd: &BlockDecorations, p: usize, len: usize) -> BlockDecorations {
    let mut out = BlockDecorations::default();
    for d in &bd.inline {
        out.inline.push(InlineDecoration {
            block: d.block,
            from: shift_for_insert(d.from, p, len, crate::selection::Assoc::Before),
            to: shift_for_insert(d.to, p, len, crate::selection::Assoc::After),
            attrs: d.attrs.clone(),
        });
    }
    out.node = bd.node.clone();
    for d in &bd.widget {
        let assoc = match d.side {
            WidgetSide::Before => crate::selection::Assoc::Before,
            WidgetSide::After => crate::selection::Assoc::After,
        };
        out.widget.push(WidgetDecoration {
            block: d.block,
            offset: shift_for_insert(d.offset, p, len, assoc),
            side: d.side,
            key: d.key.clone(),
            to_dom: d.to_dom.clone(),
        });
    }
    out
}

fn map_delete(bd: &BlockDecorations, from: usize, to: usize) -> BlockDecorations {
    let mut out = BlockDecorations::default();
    for d in &bd.inline {
        let new_from = clamp_for_delete(d.from, from, to);
        let new_to = clamp_for_delete(d.to, from, to);
        if new_from < new_to {
            out.inline.push(InlineDecoration {
                block: d.block,
                from: new_from,
                to: new_to,
                attrs: d.attrs.clone(),
            });
        }
        // Drops (reference-equal-clean "empty after clamp") when the
        // range collapses.
    }
    out.node = bd.node.clone();
    for d in &bd.widget {
        if d.offset > from && d.offset < to {
            continue; // strictly inside: dropped.
        }
        let new_offset = if d.offset == to {
            from
        } else {
            clamp_for_delete(d.offset, from, to)
        };
        out.widget.push(WidgetDecoration {
            block: d.block,
            offset: new_offset,
            side: d.side,
            key: d.key.clone(),
            to_dom: d.to_dom.clone(),
        });
    }
    out
}

fn clamp_for_delete(q: usize, from: usize, to: usize) -> usize {
    if q <= from {
        q
    } else if q >= to {
        q - (to - from)
    } else {
        from
    }
}
