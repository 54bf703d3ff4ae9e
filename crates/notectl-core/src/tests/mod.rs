// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Scenario and property tests that exercise several modules together,
//! mirroring the teacher's `src/tests/test_*.rs` split (as opposed to the
//! per-module `#[cfg(test)]` units elsewhere in this crate).

#[cfg(test)]
mod test_boundary_scenarios;
#[cfg(test)]
mod test_properties;
