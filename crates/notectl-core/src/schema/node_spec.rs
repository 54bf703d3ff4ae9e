// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dom::{AttrMap, AttrValue, BlockNode};
use crate::ids::MarkTypeName;

/// Validates an explicit attribute value against a schema's expectations.
pub type AttrValidator = Arc<dyn Fn(&AttrValue) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct AttrFieldSpec {
    pub default: AttrValue,
    pub validator: Option<AttrValidator>,
}

impl fmt::Debug for AttrFieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrFieldSpec")
            .field("default", &self.default)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl AttrFieldSpec {
    pub fn new(default: impl Into<AttrValue>) -> Self {
        Self {
            default: default.into(),
            validator: None,
        }
    }

    pub fn with_validator(
        default: impl Into<AttrValue>,
        validator: impl Fn(&AttrValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            default: default.into(),
            validator: Some(Arc::new(validator)),
        }
    }

    pub fn accepts(&self, value: &AttrValue) -> bool {
        match &self.validator {
            Some(f) => f(value),
            None => true,
        }
    }
}

/// Describes a DOM wrapper shared by consecutive same-key container blocks
/// (§4.1), e.g. grouping adjacent `list_item`s under one `<ul>`.
#[derive(Clone, Debug, PartialEq)]
pub struct WrapperInfo {
    pub tag: String,
    pub key: String,
    pub attrs: AttrMap,
    pub class_name: Option<String>,
}

pub type WrapperFn = Arc<dyn Fn(&BlockNode) -> WrapperInfo + Send + Sync>;

/// The registered shape of a node type: attribute schema, grouping, and
/// structural rules (§4.1).
#[derive(Clone)]
pub struct NodeSpec {
    pub attr_schema: HashMap<String, AttrFieldSpec>,
    pub group: Option<String>,
    pub is_void: bool,
    pub selectable: bool,
    pub isolating: bool,
    pub exclude_marks: Vec<MarkTypeName>,
    pub wrapper: Option<WrapperFn>,
}

impl fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeSpec")
            .field("attr_schema", &self.attr_schema)
            .field("group", &self.group)
            .field("is_void", &self.is_void)
            .field("selectable", &self.selectable)
            .field("isolating", &self.isolating)
            .field("exclude_marks", &self.exclude_marks)
            .field("wrapper", &self.wrapper.is_some())
            .finish()
    }
}

impl Default for NodeSpec {
    fn default() -> Self {
        Self {
            attr_schema: HashMap::new(),
            group: None,
            is_void: false,
            selectable: false,
            isolating: false,
            exclude_marks: Vec::new(),
            wrapper: None,
        }
    }
}

impl NodeSpec {
    pub fn with_attr(mut self, name: impl Into<String>, spec: AttrFieldSpec) -> Self {
        self.attr_schema.insert(name.into(), spec);
        self
    }

    pub fn void_selectable(mut self) -> Self {
        self.is_void = true;
        self.selectable = true;
        self
    }

    pub fn isolating(mut self) -> Self {
        self.isolating = true;
        self
    }

    pub fn excluding_marks(mut self, marks: impl IntoIterator<Item = MarkTypeName>) -> Self {
        self.exclude_marks.extend(marks);
        self
    }

    /// Overlay the schema defaults with `explicit` values (§3.2.7). Values
    /// for keys not present in the schema are dropped (unknown attributes
    /// are rejected at the point a command would add them, §7
    /// `SchemaViolation`; here we only apply known defaults).
    pub fn effective_attrs(&self, explicit: &AttrMap) -> AttrMap {
        let mut attrs: AttrMap = self
            .attr_schema
            .iter()
            .map(|(k, v)| (k.clone(), v.default.clone()))
            .collect();
        for (key, value) in explicit {
            if self.attr_schema.contains_key(key) {
                attrs.insert(key.clone(), value.clone());
            }
        }
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_attrs_overlays_defaults_with_explicit_values() {
        let spec = NodeSpec::default()
            .with_attr("level", AttrFieldSpec::new(1.0))
            .with_attr("collapsed", AttrFieldSpec::new(false));
        let explicit = crate::dom::attr_map([("level", AttrValue::from(3.0))]);
        let effective = spec.effective_attrs(&explicit);
        assert_eq!(effective.get("level"), Some(&AttrValue::from(3.0)));
        assert_eq!(effective.get("collapsed"), Some(&AttrValue::from(false)));
    }

    #[test]
    fn effective_attrs_drops_unknown_keys() {
        let spec = NodeSpec::default().with_attr("level", AttrFieldSpec::new(1.0));
        let explicit = crate::dom::attr_map([("bogus", AttrValue::from("x"))]);
        let effective = spec.effective_attrs(&explicit);
        assert!(!effective.contains_key("bogus"));
    }
}
