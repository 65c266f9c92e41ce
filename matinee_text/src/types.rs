// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::ResolvedTextStyle;

/// A run of bytes within one line sharing a style.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StyledSpan {
    /// Byte offset of the run within the UTF-8 line.
    pub start: u32,
    /// Byte length of the run.
    pub length: u32,
    /// Index into [`StyledText::styles`].
    pub style: u32,
}

/// One line of parsed text and its style runs.
///
/// The spans cover the line exactly: their lengths sum to the line's
/// byte length.
#[derive(Clone, PartialEq, Debug)]
pub struct StyledLine {
    pub text: String,
    pub spans: Vec<StyledSpan>,
}

/// A numeric marker inside text whose laid-out geometry can be
/// referenced by layout expressions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InlineAnchor {
    pub id: u32,
    /// 0-based line the anchor opens on.
    pub line: u32,
    /// Start byte offset within that line.
    pub start: u32,
    /// End byte offset; clamped to the opening line.
    pub end: u32,
}

/// The output of the styled-text parser: lines with spans, a table of
/// unique resolved styles, and the declared inline anchors.
#[derive(Clone, PartialEq, Debug)]
pub struct StyledText {
    pub lines: Vec<StyledLine>,
    pub styles: Vec<ResolvedTextStyle>,
    pub anchors: Vec<InlineAnchor>,
}
