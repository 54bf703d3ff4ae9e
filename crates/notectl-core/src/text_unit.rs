// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! UTF-16 code-unit and grapheme-cluster helpers (§3.2.6, §4.7).
//!
//! The document model measures offsets in UTF-16 code units over a plain
//! `String`, matching the teacher's choice of offset unit without pulling in
//! its `UnicodeString`/`widestring` generic text abstraction (see
//! `DESIGN.md`). Motion commands instead iterate by extended grapheme
//! cluster, via `unicode-segmentation`.

use unicode_segmentation::UnicodeSegmentation;

/// Number of UTF-16 code units `s` would occupy.
pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Split `s` at the given UTF-16 code-unit offset, returning the byte-level
/// split point. Panics if `offset` does not land on a char boundary (a
/// precondition every caller must uphold: offsets come from validated
/// positions, §3.3).
pub fn utf16_offset_to_byte(s: &str, utf16_offset: usize) -> usize {
    if utf16_offset == 0 {
        return 0;
    }
    let mut units = 0usize;
    for (byte_idx, ch) in s.char_indices() {
        if units == utf16_offset {
            return byte_idx;
        }
        units += ch.len_utf16();
    }
    if units == utf16_offset {
        return s.len();
    }
    panic!(
        "utf16 offset {} does not fall on a char boundary in {:?}",
        utf16_offset, s
    );
}

/// Split a string at a UTF-16 code-unit offset into (before, after).
pub fn split_at_utf16(s: &str, utf16_offset: usize) -> (&str, &str) {
    let byte_idx = utf16_offset_to_byte(s, utf16_offset);
    s.split_at(byte_idx)
}

/// Slice a string by a `[from, to)` UTF-16 code-unit range.
pub fn slice_utf16(s: &str, from: usize, to: usize) -> &str {
    let start = utf16_offset_to_byte(s, from);
    let end = utf16_offset_to_byte(s, to);
    &s[start..end]
}

/// Count of extended grapheme clusters in `s` (Unicode UAX #29).
pub fn grapheme_len(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Byte length, in UTF-16 code units, of the extended grapheme cluster
/// starting at UTF-16 offset `from` when walking forward, or `None` if
/// `from` is already at the end of `s`.
pub fn next_grapheme_width(s: &str, from: usize) -> Option<usize> {
    let byte_idx = utf16_offset_to_byte(s, from);
    let rest = &s[byte_idx..];
    rest.graphemes(true).next().map(utf16_len)
}

/// Width, in UTF-16 code units, of the extended grapheme cluster ending at
/// UTF-16 offset `to` when walking backward, or `None` if `to` is already
/// at the start of `s`.
pub fn prev_grapheme_width(s: &str, to: usize) -> Option<usize> {
    let byte_idx = utf16_offset_to_byte(s, to);
    let head = &s[..byte_idx];
    head.graphemes(true).next_back().map(utf16_len)
}

/// Unicode-word-boundary split points (UAX #29 words), used by
/// delete-word commands (§4.10). Returns UTF-16 offsets of each boundary,
/// always including 0 and `utf16_len(s)`.
pub fn word_boundaries(s: &str) -> Vec<usize> {
    let mut offsets = vec![0usize];
    let mut units = 0usize;
    for word in s.split_word_bounds() {
        units += utf16_len(word);
        offsets.push(units);
    }
    offsets
}
