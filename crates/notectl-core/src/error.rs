// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! The error taxonomy (§7). These are typed variants, not strings: the core
//! never renders user-facing text (§7, "User-visible behavior") — it only
//! ever tells its caller whether a transaction succeeded.

use crate::ids::{BlockId, MarkTypeName, NodeTypeName};

/// Errors the core can produce. All are recoverable at a well-defined
/// boundary (§7, "Propagation policy"): transaction application is
/// all-or-nothing and a rejected transaction leaves the prior state
/// untouched.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum CoreError {
    /// A step's inputs don't match the current document: unknown block id,
    /// out-of-range offset, or the wrong node kind for the operation.
    #[error("step precondition violated: {reason} (block {block:?})")]
    StepPreconditionViolation {
        block: Option<BlockId>,
        reason: String,
    },

    /// An explicit selection on a transaction doesn't correspond to valid
    /// positions in the post-step document.
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    /// An attempt to place content of the wrong child-kind into a block, or
    /// to apply a mark the block excludes.
    #[error("schema violation: {reason}")]
    SchemaViolation { reason: String },

    /// A registered schema lookup missed. Treated as `SchemaViolation` by
    /// the time it reaches a caller (§7).
    #[error("unknown type: {type_name}")]
    UnknownType { type_name: String },

    /// The transaction builder observed an inconsistency while accumulating
    /// steps; it fails fast at the offending method call rather than
    /// deferring to `apply`.
    #[error("transaction builder error: {reason}")]
    BuildError { reason: String },
}

impl CoreError {
    pub fn step_precondition(block: BlockId, reason: impl Into<String>) -> Self {
        CoreError::StepPreconditionViolation {
            block: Some(block),
            reason: reason.into(),
        }
    }

    pub fn step_precondition_no_block(reason: impl Into<String>) -> Self {
        CoreError::StepPreconditionViolation {
            block: None,
            reason: reason.into(),
        }
    }

    pub fn invalid_selection(reason: impl Into<String>) -> Self {
        CoreError::InvalidSelection {
            reason: reason.into(),
        }
    }

    pub fn unknown_node_type(type_name: &NodeTypeName) -> Self {
        CoreError::UnknownType {
            type_name: type_name.as_str().to_string(),
        }
    }

    pub fn unknown_mark_type(type_name: &MarkTypeName) -> Self {
        CoreError::UnknownType {
            type_name: type_name.as_str().to_string(),
        }
    }

    /// §7: `UnknownType` is treated as `SchemaViolation` once it escapes a
    /// schema lookup into command/transaction logic.
    pub fn into_schema_violation(self) -> Self {
        match self {
            CoreError::UnknownType { type_name } => CoreError::SchemaViolation {
                reason: format!("unknown type: {type_name}"),
            },
            other => other,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
