// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text styles and styled-text parsing.
//!
//! Provides the authoring-time [`TextStyle`] (every field optional and
//! steppable) with its merge semantics, the plain [`ResolvedTextStyle`]
//! handed to renderers, the inline styled-text parser (nested named
//! styles and numeric inline anchors), and the per-line step gating
//! parser for code blocks.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod error;
mod markers;
mod parse;
mod style;
mod types;

pub use error::{ParseError, StyleError};
pub use markers::parse_step_markers;
pub use parse::{parse_styled_text, StyleDelimiters};
pub use style::{
    default_code_style, default_text_style, FontStretch, FontWeight, ResolvedTextStyle, TextStyle,
};
pub use types::{InlineAnchor, StyledLine, StyledSpan, StyledText};
