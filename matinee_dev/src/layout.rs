// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny deterministic layout engine.
//!
//! Boxes stack along their main axis (column unless `row`) from the
//! parent's padded origin; explicit positions are parent-relative for
//! numbers and fractions and absolute for expressions, and take the
//! box out of the flow. Text uses a monospace model: every character
//! is `0.6 × font size` wide and lines are `font size × line spacing`
//! tall. Fractions of an auto-sized box resolve against the
//! grandparent extent, and expressions can only reference nodes placed
//! earlier in the traversal.

use hashbrown::HashMap;
use matinee::{
    Coord, LayoutEngine, LayoutMap, NodeGeometry, RawContent, RawItem, RawNode, RawPage, RawText,
    RectGeometry,
};

const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// The deterministic solver used by tests and examples.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicLayout;

impl LayoutEngine for BasicLayout {
    fn compute(&self, page: &RawPage) -> Result<LayoutMap, String> {
        let mut map = LayoutMap::default();
        let viewport = RectGeometry {
            x: 0.0,
            y: 0.0,
            width: page.width,
            height: page.height,
        };
        place(&page.root, viewport, (0.0, 0.0), &mut map)?;
        Ok(map)
    }
}

fn place(
    node: &RawNode,
    parent: RectGeometry,
    flow: (f64, f64),
    map: &mut LayoutMap,
) -> Result<RectGeometry, String> {
    let (width, height) = node_size(node, parent, map)?;
    let x = match &node.x {
        Some(coord) => resolve_position(coord, parent.x, parent.width, map)?,
        None => flow.0,
    };
    let y = match &node.y {
        Some(coord) => resolve_position(coord, parent.y, parent.height, map)?,
        None => flow.1,
    };
    let rect = RectGeometry {
        x,
        y,
        width,
        height,
    };

    let pad_left = node.p_left.resolve(width as f32) as f64;
    let pad_top = node.p_top.resolve(height as f32) as f64;

    let (lines, inline) = match &node.content {
        Some(RawContent::Text(text)) => text_rects(text, x + pad_left, y + pad_top),
        _ => (Vec::new(), HashMap::default()),
    };
    map.insert(
        node.node_id,
        NodeGeometry {
            x,
            y,
            width,
            height,
            lines,
            inline,
        },
    );

    let gap_x = node.gap_x.resolve(width as f32) as f64;
    let gap_y = node.gap_y.resolve(height as f32) as f64;
    let mut cursor = (x + pad_left, y + pad_top);
    for child in &node.children {
        let RawItem::Node(child) = child else {
            continue;
        };
        let geometry = place(child, rect, cursor, map)?;
        let in_flow = child.x.is_none() && child.y.is_none();
        if in_flow {
            if node.row {
                cursor.0 += geometry.width + gap_x;
            } else {
                cursor.1 += geometry.height + gap_y;
            }
        }
    }
    Ok(rect)
}

fn node_size(
    node: &RawNode,
    parent: RectGeometry,
    map: &LayoutMap,
) -> Result<(f64, f64), String> {
    let explicit_w = resolve_extent(&node.width, parent.width, map)?;
    let explicit_h = resolve_extent(&node.height, parent.height, map)?;
    if let (Some(w), Some(h)) = (explicit_w, explicit_h) {
        return Ok((w, h));
    }
    let (iw, ih) = intrinsic_size(node, parent, map)?;
    Ok((explicit_w.unwrap_or(iw), explicit_h.unwrap_or(ih)))
}

fn intrinsic_size(
    node: &RawNode,
    parent: RectGeometry,
    map: &LayoutMap,
) -> Result<(f64, f64), String> {
    if let Some(content) = &node.content {
        return Ok(match content {
            RawContent::Text(text) => text_size(text),
            RawContent::Image(image) => {
                (image.width.unwrap_or(100.0), image.height.unwrap_or(80.0))
            }
        });
    }

    let mut main = 0.0_f64;
    let mut cross = 0.0_f64;
    let mut in_flow = 0_usize;
    for child in &node.children {
        let RawItem::Node(child) = child else {
            continue;
        };
        if child.x.is_some() || child.y.is_some() {
            continue;
        }
        let (w, h) = node_size(child, parent, map)?;
        let (child_main, child_cross) = if node.row { (w, h) } else { (h, w) };
        main += child_main;
        cross = cross.max(child_cross);
        in_flow += 1;
    }
    let gap = if node.row {
        node.gap_x.resolve(parent.width as f32) as f64
    } else {
        node.gap_y.resolve(parent.height as f32) as f64
    };
    if in_flow > 1 {
        main += gap * (in_flow - 1) as f64;
    }

    let (mut w, mut h) = if node.row { (main, cross) } else { (cross, main) };
    w += (node.p_left.resolve(parent.width as f32) + node.p_right.resolve(parent.width as f32))
        as f64;
    h += (node.p_top.resolve(parent.height as f32) + node.p_bottom.resolve(parent.height as f32))
        as f64;
    Ok((w, h))
}

fn resolve_extent(
    coord: &Option<Coord>,
    parent_extent: f64,
    map: &LayoutMap,
) -> Result<Option<f64>, String> {
    Ok(match coord {
        None => None,
        Some(Coord::Points(v)) => Some(*v),
        Some(Coord::Fraction(f)) => Some(f * parent_extent),
        Some(Coord::Expr(expr)) => Some(expr.eval(map).map_err(|err| err.to_string())?),
    })
}

fn resolve_position(
    coord: &Coord,
    parent_origin: f64,
    parent_extent: f64,
    map: &LayoutMap,
) -> Result<f64, String> {
    Ok(match coord {
        Coord::Points(v) => parent_origin + v,
        Coord::Fraction(f) => parent_origin + f * parent_extent,
        Coord::Expr(expr) => expr.eval(map).map_err(|err| err.to_string())?,
    })
}

fn line_metrics(text: &RawText, line_index: usize) -> (f64, f64) {
    let line = &text.lines[line_index];
    let mut size = 0.0_f64;
    let mut spacing = 0.0_f64;
    for span in &line.spans {
        if let Some(style) = text.styles.get(span.style as usize) {
            size = size.max(style.size as f64);
            spacing = spacing.max(style.line_spacing as f64);
        }
    }
    if line.spans.is_empty() {
        if let Some(style) = text.styles.first() {
            size = style.size as f64;
            spacing = style.line_spacing as f64;
        }
    }
    if size == 0.0 {
        size = 32.0;
        spacing = 1.2;
    }
    (size, size * spacing)
}

fn text_size(text: &RawText) -> (f64, f64) {
    let mut width = 0.0_f64;
    let mut height = 0.0_f64;
    for index in 0..text.lines.len() {
        let (size, line_height) = line_metrics(text, index);
        let chars = text.lines[index].text.chars().count() as f64;
        width = width.max(chars * size * CHAR_WIDTH_FACTOR);
        height += line_height;
    }
    (width, height)
}

fn text_rects(
    text: &RawText,
    origin_x: f64,
    origin_y: f64,
) -> (Vec<RectGeometry>, HashMap<u32, RectGeometry>) {
    let mut lines = Vec::with_capacity(text.lines.len());
    let mut y = origin_y;
    for index in 0..text.lines.len() {
        let (size, line_height) = line_metrics(text, index);
        let chars = text.lines[index].text.chars().count() as f64;
        lines.push(RectGeometry {
            x: origin_x,
            y,
            width: chars * size * CHAR_WIDTH_FACTOR,
            height: line_height,
        });
        y += line_height;
    }

    let mut inline = HashMap::default();
    for anchor in &text.anchors {
        let Some(line_rect) = lines.get(anchor.line as usize) else {
            continue;
        };
        let line = &text.lines[anchor.line as usize];
        let (size, _) = line_metrics(text, anchor.line as usize);
        let char_width = size * CHAR_WIDTH_FACTOR;
        let prefix = line.text[..anchor.start as usize].chars().count() as f64;
        let span = line.text[anchor.start as usize..anchor.end as usize]
            .chars()
            .count() as f64;
        inline.insert(
            anchor.id,
            RectGeometry {
                x: line_rect.x + prefix * char_width,
                y: line_rect.y,
                width: span * char_width,
                height: line_rect.height,
            },
        );
    }
    (lines, inline)
}
