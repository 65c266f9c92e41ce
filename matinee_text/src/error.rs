// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use matinee_core::StepError;

/// Errors from validating text-style fields.
#[derive(Clone, Debug, PartialEq)]
pub enum StyleError {
    /// Font weight outside 1..=1000.
    InvalidWeight(u16),
    /// Not one of the nine stretch keywords.
    InvalidFontStretch(String),
    /// Negative font size.
    InvalidSize(f32),
    /// Negative line spacing.
    InvalidLineSpacing(f32),
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWeight(w) => write!(f, "invalid font weight {w}; expected 1..=1000"),
            Self::InvalidFontStretch(s) => write!(f, "invalid font stretch: {s:?}"),
            Self::InvalidSize(v) => write!(f, "invalid font size {v}; must be non-negative"),
            Self::InvalidLineSpacing(v) => {
                write!(f, "invalid line spacing {v}; must be non-negative")
            }
        }
    }
}

impl std::error::Error for StyleError {}

/// Errors from the styled-text and code-marker parsers.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// A style block was opened but never closed, or the opening
    /// bracket after a style name is missing.
    UnterminatedStyle {
        /// 1-based line of the offending block.
        line: usize,
    },
    /// A closing bracket appeared with no open style block.
    UnbalancedBracket {
        /// 1-based line of the offending bracket.
        line: usize,
    },
    /// A referenced style name has no definition in scope.
    UnknownStyleName(String),
    /// A code step marker used a mode flag other than `e`, `n`, `en`.
    InvalidModeFlag(String),
    /// A step selector inside a marker failed to parse.
    Step(StepError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedStyle { line } => {
                write!(f, "unterminated style block on line {line}")
            }
            Self::UnbalancedBracket { line } => {
                write!(f, "closing bracket without open style block on line {line}")
            }
            Self::UnknownStyleName(name) => write!(f, "unknown style name: {name:?}"),
            Self::InvalidModeFlag(mode) => {
                write!(f, "invalid step marker mode {mode:?}; expected e, n, or en")
            }
            Self::Step(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StepError> for ParseError {
    fn from(err: StepError) -> Self {
        Self::Step(err)
    }
}
