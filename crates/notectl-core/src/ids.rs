// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Opaque identifiers and type brands (component A).
//!
//! [`BlockId`] is the stable identity a [`crate::dom::BlockNode`] keeps for
//! its whole lifetime; it is never reused within a process, including
//! across undo (§3.2.9). [`NodeTypeName`] and [`MarkTypeName`] brand schema
//! lookups so a bare `String` typo can't silently pass where a registered
//! type name was expected.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Stable identity of a block node, unique within a document for the life
/// of the process that created it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    /// The id reserved for the virtual document root (§3.1).
    pub const DOCUMENT_ROOT: BlockId = BlockId(0);

    pub(crate) const fn from_raw(raw: u64) -> Self {
        BlockId(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block#{}", self.0)
    }
}

/// Process-wide monotonic generator for [`BlockId`]s.
///
/// Seeded once per process (§9, "Global mutable state is avoided ... the
/// single exception is the block-id generator").
pub struct BlockIdGenerator {
    next: AtomicU64,
}

impl BlockIdGenerator {
    pub const fn new() -> Self {
        // Start at 1: 0 is reserved for BlockId::DOCUMENT_ROOT.
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> BlockId {
        BlockId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BlockIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static GENERATOR: BlockIdGenerator = BlockIdGenerator::new();

/// Allocate a fresh, globally-unique [`BlockId`].
pub fn next_block_id() -> BlockId {
    GENERATOR.next_id()
}

macro_rules! type_name_brand {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

type_name_brand!(NodeTypeName, "A registered block/container node type tag, e.g. `paragraph`.");
type_name_brand!(MarkTypeName, "A registered mark type tag, e.g. `bold`.");
type_name_brand!(InlineNodeTypeName, "A registered atomic inline node type tag, e.g. `hard_break`.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_ids_are_monotonically_unique() {
        let gen = BlockIdGenerator::new();
        let a = gen.next_id();
        let b = gen.next_id();
        let c = gen.next_id();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(b.raw() > a.raw());
        assert!(c.raw() > b.raw());
    }

    #[test]
    fn document_root_is_not_allocatable() {
        let gen = BlockIdGenerator::new();
        assert_ne!(gen.next_id(), BlockId::DOCUMENT_ROOT);
    }

    #[test]
    fn type_names_compare_by_value() {
        let a = NodeTypeName::from("paragraph");
        let b = NodeTypeName::new("paragraph".to_string());
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "paragraph");
    }
}
