// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

use crate::ids::MarkTypeName;

/// The registered shape of a mark type (§4.1).
#[derive(Clone, Debug, Default)]
pub struct MarkSpec {
    /// Lower ranks nest nearer to the text when rendering overlapping
    /// marks.
    pub rank: i32,
    /// Other mark types this one displaces when applied (e.g. `strike`
    /// excluding `code`).
    pub excludes: Vec<MarkTypeName>,
}

impl MarkSpec {
    pub fn new(rank: i32) -> Self {
        Self {
            rank,
            excludes: Vec::new(),
        }
    }

    pub fn excluding(mut self, types: impl IntoIterator<Item = MarkTypeName>) -> Self {
        self.excludes.extend(types);
        self
    }
}
