// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Schema: the registered shapes of node, mark and inline-node types, and
//! the aggregate registry a plugin host builds at init time (§4.1).

mod inline_spec;
mod mark_spec;
mod node_spec;
mod registry;

pub use inline_spec::InlineNodeSpec;
pub use mark_spec::MarkSpec;
pub use node_spec::{AttrFieldSpec, AttrValidator, NodeSpec, WrapperFn, WrapperInfo};
pub use registry::{PassThroughEntry, SchemaRegistry};
