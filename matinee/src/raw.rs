// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The immutable raw scene: one page's tree with every stepped
//! attribute sampled at a single step.
//!
//! Raw scenes are what crosses the boundary to the layout engine and
//! the render backend. They contain no shared handles and are `Send`,
//! so pages can be laid out and rendered on worker threads.

use std::sync::Arc;

use matinee_core::{AlignContent, AlignItems, Color, Length, LengthAuto, Step, TextAlign};
use matinee_text::{InlineAnchor, ResolvedTextStyle, StyledLine};

use crate::image::ImageFormat;
use crate::shape::{Arrow, PathCommand};
use crate::{Coord, GridPlacement, NodeId};

/// One page of output: the scene at a single (slide, step).
#[derive(Clone, Debug)]
pub struct RawPage {
    /// Position in the deck's overall page sequence; assigned at
    /// emission.
    pub index: usize,
    pub step: Step,
    pub width: f64,
    pub height: f64,
    pub bg_color: Color,
    pub root: RawNode,
    /// Boxes to draw debug frames over, in traversal order.
    pub debug_entries: Vec<DebugEntry>,
}

/// A box marked for a debug-layout frame.
#[derive(Clone, Debug)]
pub struct DebugEntry {
    pub node: NodeId,
    pub color: Color,
    pub name: String,
}

/// A box with all attributes sampled at one step.
#[derive(Clone, Debug)]
pub struct RawNode {
    pub node_id: NodeId,
    /// `None` means automatic placement by the layout engine.
    pub x: Option<Coord>,
    pub y: Option<Coord>,
    /// `None` means content- or flex-determined.
    pub width: Option<Coord>,
    pub height: Option<Coord>,
    /// Hidden boxes still occupy layout; only the visual is skipped.
    pub show: bool,
    pub z_level: i32,
    pub bg_color: Option<Color>,
    pub border_radius: f64,
    pub row: bool,
    pub reverse: bool,
    pub p_left: Length,
    pub p_right: Length,
    pub p_top: Length,
    pub p_bottom: Length,
    pub m_left: LengthAuto,
    pub m_right: LengthAuto,
    pub m_top: LengthAuto,
    pub m_bottom: LengthAuto,
    pub flex_grow: f64,
    pub flex_shrink: f64,
    pub align_items: Option<AlignItems>,
    pub align_self: Option<AlignItems>,
    pub justify_self: Option<AlignItems>,
    pub align_content: Option<AlignContent>,
    pub justify_content: Option<AlignContent>,
    pub gap_x: Length,
    pub gap_y: Length,
    pub grid: Option<RawGrid>,
    pub url: Option<String>,
    pub name: String,
    pub content: Option<RawContent>,
    pub children: Vec<RawItem>,
}

impl RawNode {
    /// A node with nothing set: automatic everything, defaults as the
    /// layout engine expects them.
    pub fn empty(node_id: NodeId) -> Self {
        Self {
            node_id,
            x: None,
            y: None,
            width: None,
            height: None,
            show: true,
            z_level: 0,
            bg_color: None,
            border_radius: 0.0,
            row: false,
            reverse: false,
            p_left: Length::ZERO,
            p_right: Length::ZERO,
            p_top: Length::ZERO,
            p_bottom: Length::ZERO,
            m_left: LengthAuto::Points(0.0),
            m_right: LengthAuto::Points(0.0),
            m_top: LengthAuto::Points(0.0),
            m_bottom: LengthAuto::Points(0.0),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            align_items: None,
            align_self: None,
            justify_self: None,
            align_content: None,
            justify_content: None,
            gap_x: Length::ZERO,
            gap_y: Length::ZERO,
            grid: None,
            url: None,
            name: String::new(),
            content: None,
            children: Vec::new(),
        }
    }
}

/// Grid options sampled at one step.
#[derive(Clone, Debug)]
pub struct RawGrid {
    pub template_rows: Vec<Length>,
    pub template_columns: Vec<Length>,
    pub row: GridPlacement,
    pub column: GridPlacement,
}

/// A child of a raw node. Text and images are carried as box content,
/// so children are boxes and free-floating shapes.
#[derive(Clone, Debug)]
pub enum RawItem {
    Node(RawNode),
    Shape(RawShape),
}

/// Box content after sampling: shaped-text input or an image.
#[derive(Clone, Debug)]
pub enum RawContent {
    Text(RawText),
    Image(RawImage),
}

/// Everything the shaper needs for one text at one step.
#[derive(Clone, Debug)]
pub struct RawText {
    pub lines: Vec<StyledLine>,
    /// Unique resolved styles referenced by the line spans.
    pub styles: Vec<ResolvedTextStyle>,
    pub anchors: Vec<InlineAnchor>,
    pub align: TextAlign,
    pub syntax_language: Option<String>,
    pub syntax_theme: Option<String>,
}

/// An image reference after sampling.
#[derive(Clone, Debug)]
pub struct RawImage {
    pub format: ImageFormat,
    pub data: Arc<Vec<u8>>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// The image's own animation step (already unshifted), or `None`
    /// when the slide step precedes the image's shifted window.
    pub step: Option<Step>,
}

/// A drawable shape after sampling. Coordinates may still contain
/// fractions and layout expressions; the post-layout pass replaces them
/// with absolute points.
#[derive(Clone, Debug)]
pub enum RawShape {
    Rect(RawRect),
    Path(RawPath),
}

impl RawShape {
    pub fn z_level(&self) -> i32 {
        match self {
            Self::Rect(rect) => rect.z_level,
            Self::Path(path) => path.z_level,
        }
    }
}

/// A rectangle or oval between two corner points.
#[derive(Clone, Debug)]
pub struct RawRect {
    pub oval: bool,
    pub x1: Coord,
    pub y1: Coord,
    pub x2: Coord,
    pub y2: Coord,
    pub stroke: Option<RawStroke>,
    pub fill_color: Option<Color>,
    pub z_level: i32,
}

/// A path with its command list and interleaved x/y point stream.
#[derive(Clone, Debug)]
pub struct RawPath {
    pub commands: Vec<PathCommand>,
    pub points: Vec<Coord>,
    pub stroke: Option<RawStroke>,
    pub fill_color: Option<Color>,
    pub arrow_start: Option<Arrow>,
    pub arrow_end: Option<Arrow>,
    pub z_level: i32,
}

/// Stroke parameters sampled at one step.
#[derive(Clone, Debug)]
pub struct RawStroke {
    pub color: Color,
    pub width: f64,
    pub dash_array: Option<Vec<f64>>,
    pub dash_offset: f64,
}
