// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::Step;

/// Errors produced while parsing steps and step selectors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// The selector (or one of its items) is not well formed.
    StepSyntax(String),
    /// A selector step must start at 1 or later.
    NonPositiveStep(Step),
    /// The same marker step was declared twice in one selector.
    DuplicateStepBinding(Step),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepSyntax(text) => write!(f, "invalid step selector: {text:?}"),
            Self::NonPositiveStep(step) => {
                write!(f, "step {step} is not positive; selector steps start at 1")
            }
            Self::DuplicateStepBinding(step) => {
                write!(f, "step {step} is bound more than once in the selector")
            }
        }
    }
}

impl std::error::Error for StepError {}

/// Errors produced while validating primitive attribute values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// The color string could not be parsed.
    InvalidColor(String),
    /// The length string is neither a number, a percentage, nor `auto`
    /// where allowed.
    InvalidLength(String),
    /// The position value is not a number, percentage, or expression.
    InvalidPosition(String),
    /// The size value is not a number, percentage, or expression.
    InvalidSize(String),
    /// Not a known alignment keyword.
    InvalidAlign(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor(text) => write!(f, "invalid color: {text:?}"),
            Self::InvalidLength(text) => write!(f, "invalid length: {text:?}"),
            Self::InvalidPosition(text) => write!(f, "invalid position: {text:?}"),
            Self::InvalidSize(text) => write!(f, "invalid size: {text:?}"),
            Self::InvalidAlign(text) => write!(f, "invalid alignment: {text:?}"),
        }
    }
}

impl std::error::Error for ValueError {}
