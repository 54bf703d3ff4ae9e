// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Marks (§3.1) and the mark set invariant: two marks on the same text run
//! must have distinct type tags (§3.2, invariant 4's precondition).

use serde::{Deserialize, Serialize};

use crate::dom::attrs::AttrMap;
use crate::ids::MarkTypeName;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    pub type_name: MarkTypeName,
    pub attrs: AttrMap,
}

impl Mark {
    pub fn new(type_name: impl Into<MarkTypeName>, attrs: AttrMap) -> Self {
        Self {
            type_name: type_name.into(),
            attrs,
        }
    }

    pub fn simple(type_name: impl Into<MarkTypeName>) -> Self {
        Self::new(type_name, AttrMap::new())
    }
}

/// An ordered, de-duplicated-by-type set of marks (§3.1). Order is by
/// insertion, which is stable and deterministic for a given sequence of
/// `AddMark`/`RemoveMark` steps; rendering order (nearest-to-text-first) is
/// a presentation concern driven by `MarkSpec::rank` and is not the
/// storage order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkSet(Vec<Mark>);

impl MarkSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut set = Self::new();
        for mark in marks {
            set.insert(mark);
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.0.iter()
    }

    pub fn contains_type(&self, type_name: &MarkTypeName) -> bool {
        self.0.iter().any(|m| &m.type_name == type_name)
    }

    pub fn get(&self, type_name: &MarkTypeName) -> Option<&Mark> {
        self.0.iter().find(|m| &m.type_name == type_name)
    }

    /// Insert or replace the mark with this type tag (§3.1: "Two marks on
    /// the same text run must have distinct type tags").
    pub fn insert(&mut self, mark: Mark) {
        if let Some(existing) = self.0.iter_mut().find(|m| m.type_name == mark.type_name) {
            *existing = mark;
        } else {
            self.0.push(mark);
        }
    }

    pub fn remove_type(&mut self, type_name: &MarkTypeName) -> Option<Mark> {
        let idx = self.0.iter().position(|m| &m.type_name == type_name)?;
        Some(self.0.remove(idx))
    }

    /// Remove every mark whose type is in `excluded` (§3.2, invariant 8).
    pub fn strip_excluded(&mut self, excluded: &[MarkTypeName]) {
        self.0.retain(|m| !excluded.contains(&m.type_name));
    }

    pub fn to_vec(&self) -> Vec<Mark> {
        self.0.clone()
    }
}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        Self::from_marks(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserting_same_type_twice_replaces() {
        let mut set = MarkSet::new();
        set.insert(Mark::new("link", crate::dom::attrs::attr_map([("href", "a".into())])));
        set.insert(Mark::new("link", crate::dom::attrs::attr_map([("href", "b".into())])));
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.get(&MarkTypeName::from("link")).unwrap().attrs.get("href").unwrap().to_string(),
            "b"
        );
    }

    #[test]
    fn strip_excluded_removes_only_named_types() {
        let mut set = MarkSet::from_marks([Mark::simple("bold"), Mark::simple("code")]);
        set.strip_excluded(&[MarkTypeName::from("bold")]);
        assert!(!set.contains_type(&MarkTypeName::from("bold")));
        assert!(set.contains_type(&MarkTypeName::from("code")));
    }
}
