// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;

use crate::schema::node_spec::AttrFieldSpec;

/// The registered shape of an atomic inline node type, e.g. `mention`
/// (§4.1).
#[derive(Clone, Debug, Default)]
pub struct InlineNodeSpec {
    pub attr_schema: HashMap<String, AttrFieldSpec>,
}

impl InlineNodeSpec {
    pub fn with_attr(mut self, name: impl Into<String>, spec: AttrFieldSpec) -> Self {
        self.attr_schema.insert(name.into(), spec);
        self
    }
}
