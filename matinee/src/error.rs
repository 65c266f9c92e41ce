// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::path::PathBuf;

use matinee_core::{StepError, ValueError};
use matinee_text::{ParseError, StyleError};

use crate::NodeId;

/// Everything that can go wrong while building or rendering a deck.
///
/// Validation errors surface at the author call that introduced the
/// offending value; parse and resolution errors during materialisation
/// fail the whole render, as does any single page's layout or backend
/// failure. No partial output is written.
#[derive(Debug)]
pub enum Error {
    /// Step or step-selector parsing failed.
    Step(StepError),
    /// A primitive attribute value failed validation.
    Value(ValueError),
    /// A text-style field failed validation.
    Style(StyleError),
    /// Styled-text or code-marker parsing failed.
    TextParse(ParseError),
    /// `update_style` was called against a stepped existing entry; use
    /// `set_style` instead.
    StyleNotUpdatable(String),
    /// A layout expression referenced a node the layout engine did not
    /// place.
    LayoutResolveMissingNode(NodeId),
    /// A layout expression referenced a text line that does not exist.
    LayoutResolveMissingLine { node: NodeId, line: u32 },
    /// A layout expression referenced an inline anchor that does not
    /// exist.
    LayoutResolveMissingAnchor { node: NodeId, anchor: u32 },
    /// A referenced font family is not in the resource set.
    FontNotFound(String),
    /// An image path does not exist or is not a file.
    ImagePathMissing(PathBuf),
    /// An image file could not be read or its container is damaged.
    ImageDecode { path: String, reason: String },
    /// The file extension maps to no supported image format.
    UnsupportedImageFormat(String),
    /// The layout engine rejected a page.
    LayoutEngineFailure { page: usize, reason: String },
    /// The render backend rejected a page.
    RenderBackendFailure { page: usize, reason: String },
    /// The PDF compression level is outside 0..=10.
    InvalidCompressionLevel(u8),
    /// Writing output failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step(err) => err.fmt(f),
            Self::Value(err) => err.fmt(f),
            Self::Style(err) => err.fmt(f),
            Self::TextParse(err) => err.fmt(f),
            Self::StyleNotUpdatable(name) => {
                write!(
                    f,
                    "style {name:?} is stepped and cannot be updated; use set_style instead"
                )
            }
            Self::LayoutResolveMissingNode(node) => {
                write!(f, "layout expression references unknown node {node:?}")
            }
            Self::LayoutResolveMissingLine { node, line } => {
                write!(
                    f,
                    "layout expression references missing line {line} of node {node:?}"
                )
            }
            Self::LayoutResolveMissingAnchor { node, anchor } => {
                write!(
                    f,
                    "layout expression references missing inline anchor {anchor} of node {node:?}"
                )
            }
            Self::FontNotFound(family) => write!(f, "font family {family:?} not found"),
            Self::ImagePathMissing(path) => {
                write!(f, "image path {} does not exist", path.display())
            }
            Self::ImageDecode { path, reason } => {
                write!(f, "failed to load image {path}: {reason}")
            }
            Self::UnsupportedImageFormat(ext) => {
                write!(f, "unsupported image format: {ext:?}")
            }
            Self::LayoutEngineFailure { page, reason } => {
                write!(f, "layout failed for page {page}: {reason}")
            }
            Self::RenderBackendFailure { page, reason } => {
                write!(f, "rendering failed for page {page}: {reason}")
            }
            Self::InvalidCompressionLevel(level) => {
                write!(f, "compression level {level} outside 0..=10")
            }
            Self::Io { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step(err) => Some(err),
            Self::Value(err) => Some(err),
            Self::Style(err) => Some(err),
            Self::TextParse(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StepError> for Error {
    fn from(err: StepError) -> Self {
        Self::Step(err)
    }
}

impl From<ValueError> for Error {
    fn from(err: ValueError) -> Self {
        Self::Value(err)
    }
}

impl From<StyleError> for Error {
    fn from(err: StyleError) -> Self {
        Self::Style(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Self::TextParse(err)
    }
}
