// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug overlays: layout frames over marked boxes and the per-page
//! step strip.

use matinee_core::{Color, Step, TextAlign};
use matinee_text::{ResolvedTextStyle, StyledLine, StyledSpan};

use crate::layout::LayoutMap;
use crate::node::IdSource;
use crate::raw::{RawContent, RawItem, RawNode, RawPage, RawRect, RawShape, RawStroke, RawText};
use crate::{Coord, Error, NodeId};

pub(crate) const DEBUG_STEPS_FRAME_HEIGHT: f64 = 20.0;
const DEBUG_STEPS_FRAME_FONT_SIZE: f32 = 15.0;
const DEBUG_LAYOUT_Z_LEVEL: i32 = 999_999;
const DEBUG_LAYOUT_FONT_SIZE: f32 = 8.0;

/// A single-line monospace label.
fn label_text(text: String, size: f32, color: Color) -> RawText {
    let length = text.len() as u32;
    RawText {
        lines: vec![StyledLine {
            text,
            spans: vec![StyledSpan {
                start: 0,
                length,
                style: 0,
            }],
        }],
        styles: vec![ResolvedTextStyle {
            font: "monospace".to_owned(),
            color,
            size,
            ..ResolvedTextStyle::default()
        }],
        anchors: Vec::new(),
        align: TextAlign::Start,
        syntax_language: None,
        syntax_theme: None,
    }
}

/// Wraps a page's root so the original content keeps its size and a
/// black step-label strip is appended below it.
pub(crate) fn wrap_with_step_strip(
    root: RawNode,
    step: &Step,
    width: f64,
    full_height: f64,
    ids: &IdSource,
) -> RawNode {
    let mut strip = RawNode::empty(ids.next());
    strip.width = Some(Coord::Fraction(1.0));
    strip.height = Some(Coord::Points(DEBUG_STEPS_FRAME_HEIGHT));
    strip.bg_color = Some(Color::BLACK);

    let mut label = RawNode::empty(ids.next());
    label.content = Some(RawContent::Text(label_text(
        step.to_string(),
        DEBUG_STEPS_FRAME_FONT_SIZE,
        Color::WHITE,
    )));
    strip.children.push(RawItem::Node(label));

    let mut wrapper = RawNode::empty(ids.next());
    wrapper.width = Some(Coord::Points(width));
    wrapper.height = Some(Coord::Points(full_height));
    wrapper.children.push(RawItem::Node(root));
    wrapper.children.push(RawItem::Node(strip));
    wrapper
}

/// Inserts a dashed frame and a `NAME [WxH]` label over every box the
/// page marked for debug layout. Runs after layout, so the rectangles
/// match the resolved geometry exactly.
pub(crate) fn insert_debug_frames(page: &mut RawPage, layout: &LayoutMap) -> Result<(), Error> {
    let mut synthetic = 0;
    for entry in std::mem::take(&mut page.debug_entries) {
        let geometry = layout
            .get(&entry.node)
            .ok_or(Error::LayoutResolveMissingNode(entry.node))?;
        let width = geometry.width.max(1.0);
        let height = geometry.height.max(1.0);

        page.root.children.push(RawItem::Shape(RawShape::Rect(RawRect {
            oval: false,
            x1: Coord::Points(geometry.x),
            y1: Coord::Points(geometry.y),
            x2: Coord::Points(geometry.x + width),
            y2: Coord::Points(geometry.y + height),
            stroke: Some(RawStroke {
                color: entry.color,
                width: 1.0,
                dash_array: Some(vec![5.0, 2.0]),
                dash_offset: 0.0,
            }),
            fill_color: None,
            z_level: DEBUG_LAYOUT_Z_LEVEL,
        })));

        let dimensions = format!(
            "[{}x{}]",
            format_dimension(geometry.width),
            format_dimension(geometry.height)
        );
        let text = if entry.name.is_empty() {
            dimensions
        } else {
            format!("{} {}", entry.name, dimensions)
        };
        let mut label = RawNode::empty(NodeId::synthetic(synthetic));
        synthetic += 1;
        label.x = Some(Coord::Points(geometry.x + 1.0));
        label.y = Some(Coord::Points(geometry.y + 1.0));
        label.z_level = DEBUG_LAYOUT_Z_LEVEL;
        label.content = Some(RawContent::Text(label_text(
            text,
            DEBUG_LAYOUT_FONT_SIZE,
            entry.color,
        )));
        page.root.children.push(RawItem::Node(label));
    }
    Ok(())
}

/// Formats a dimension with up to two decimals, trailing zeros
/// trimmed.
fn format_dimension(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0');
    text.trim_end_matches('.').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_trimmed() {
        assert_eq!(format_dimension(100.0), "100");
        assert_eq!(format_dimension(99.5), "99.5");
        assert_eq!(format_dimension(99.25), "99.25");
        assert_eq!(format_dimension(99.256), "99.26");
    }
}
