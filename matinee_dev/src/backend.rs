// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A plain SVG-writing render backend.
//!
//! Pages come out as small hand-written SVG documents, which is enough
//! for tests to assert on content. The PNG format reuses the SVG bytes
//! and "PDF assembly" is a trivial page container; a real rasteriser
//! and PDF writer live behind the same trait in production.

use std::fmt::Write as _;

use matinee::{
    Color, Coord, LayoutMap, OutputFormat, PathCommand, RawContent, RawItem, RawNode, RawPage,
    RawShape, RenderBackend, Resources,
};

/// The development backend: deterministic, dependency-free output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainBackend;

impl RenderBackend for PlainBackend {
    fn render_page(
        &self,
        page: &RawPage,
        layout: &LayoutMap,
        _resources: &Resources,
        _format: OutputFormat,
    ) -> Result<Vec<u8>, String> {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            page.width, page.height
        );
        let _ = writeln!(
            svg,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            page.width, page.height, page.bg_color
        );
        emit_node(&mut svg, &page.root, layout)?;
        svg.push_str("</svg>\n");
        Ok(svg.into_bytes())
    }

    fn assemble_pdf(&self, pages: &[Vec<u8>], compression_level: u8) -> Result<Vec<u8>, String> {
        let mut document = format!(
            "%matinee-document pages={} compression={}\n",
            pages.len(),
            compression_level
        )
        .into_bytes();
        for (index, page) in pages.iter().enumerate() {
            document.extend_from_slice(format!("%page {index}\n").as_bytes());
            document.extend_from_slice(page);
        }
        Ok(document)
    }
}

fn emit_node(svg: &mut String, node: &RawNode, layout: &LayoutMap) -> Result<(), String> {
    // Overlay nodes are synthesised after layout and carry absolute
    // coordinates instead of an entry in the map.
    let geometry = match layout.get(&node.node_id) {
        Some(geometry) => matinee::RectGeometry {
            x: geometry.x,
            y: geometry.y,
            width: geometry.width,
            height: geometry.height,
        },
        None => matinee::RectGeometry {
            x: node.x.as_ref().map(points).unwrap_or(0.0),
            y: node.y.as_ref().map(points).unwrap_or(0.0),
            width: node.width.as_ref().map(points).unwrap_or(0.0),
            height: node.height.as_ref().map(points).unwrap_or(0.0),
        },
    };
    let geometry = &geometry;

    if node.show {
        if let Some(bg) = node.bg_color {
            let _ = writeln!(
                svg,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                geometry.x, geometry.y, geometry.width, geometry.height, bg
            );
        }
        if let Some(content) = &node.content {
            emit_content(svg, content, geometry.x, geometry.y);
        }
    }

    for child in &node.children {
        match child {
            RawItem::Node(inner) => emit_node(svg, inner, layout)?,
            RawItem::Shape(shape) => emit_shape(svg, shape),
        }
    }
    Ok(())
}

fn emit_content(svg: &mut String, content: &RawContent, x: f64, y: f64) {
    match content {
        RawContent::Text(text) => {
            for (index, line) in text.lines.iter().enumerate() {
                let color = line
                    .spans
                    .first()
                    .and_then(|span| text.styles.get(span.style as usize))
                    .or_else(|| text.styles.first())
                    .map(|style| style.color)
                    .unwrap_or(Color::BLACK);
                let _ = writeln!(
                    svg,
                    r#"<text x="{}" y="{}" fill="{}">{}</text>"#,
                    x,
                    y + 32.0 * (index + 1) as f64,
                    color,
                    escape(&line.text)
                );
            }
        }
        RawContent::Image(image) => {
            let _ = writeln!(
                svg,
                r#"<!-- image {:?} {} bytes step={:?} -->"#,
                image.format,
                image.data.len(),
                image.step.as_ref().map(ToString::to_string)
            );
        }
    }
}

fn emit_shape(svg: &mut String, shape: &RawShape) {
    match shape {
        RawShape::Rect(rect) => {
            let (x1, y1) = (points(&rect.x1), points(&rect.y1));
            let (x2, y2) = (points(&rect.x2), points(&rect.y2));
            let (x, width) = (x1.min(x2), (x2 - x1).abs());
            let (y, height) = (y1.min(y2), (y2 - y1).abs());
            let fill = rect
                .fill_color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_owned());
            let stroke = stroke_attrs(&rect.stroke);
            if rect.oval {
                let _ = writeln!(
                    svg,
                    r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{fill}"{stroke}/>"#,
                    x + width / 2.0,
                    y + height / 2.0,
                    width / 2.0,
                    height / 2.0,
                );
            } else {
                let _ = writeln!(
                    svg,
                    r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"{stroke}/>"#,
                );
            }
        }
        RawShape::Path(path) => {
            let mut d = String::new();
            let mut cursor = 0;
            for command in &path.commands {
                let take = command.point_count() * 2;
                let coords: Vec<f64> = path.points[cursor..cursor + take]
                    .iter()
                    .map(points)
                    .collect();
                cursor += take;
                match command {
                    PathCommand::Move => {
                        let _ = write!(d, "M {} {} ", coords[0], coords[1]);
                    }
                    PathCommand::Line => {
                        let _ = write!(d, "L {} {} ", coords[0], coords[1]);
                    }
                    PathCommand::Quad => {
                        let _ = write!(
                            d,
                            "Q {} {} {} {} ",
                            coords[0], coords[1], coords[2], coords[3]
                        );
                    }
                    PathCommand::Cubic => {
                        let _ = write!(
                            d,
                            "C {} {} {} {} {} {} ",
                            coords[0], coords[1], coords[2], coords[3], coords[4], coords[5]
                        );
                    }
                    PathCommand::Close => d.push_str("Z "),
                }
            }
            let fill = path
                .fill_color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "none".to_owned());
            let stroke = stroke_attrs(&path.stroke);
            let _ = writeln!(svg, r#"<path d="{}" fill="{fill}"{stroke}/>"#, d.trim_end());
        }
    }
}

fn stroke_attrs(stroke: &Option<matinee::RawStroke>) -> String {
    match stroke {
        None => String::new(),
        Some(stroke) => {
            let mut attrs = format!(
                r#" stroke="{}" stroke-width="{}""#,
                stroke.color, stroke.width
            );
            if let Some(dashes) = &stroke.dash_array {
                let dashes: Vec<String> = dashes.iter().map(ToString::to_string).collect();
                let _ = write!(attrs, r#" stroke-dasharray="{}""#, dashes.join(" "));
            }
            attrs
        }
    }
}

/// Shapes reach the backend fully resolved; anything else is a
/// pipeline bug surfaced as 0.
fn points(coord: &Coord) -> f64 {
    match coord {
        Coord::Points(v) => *v,
        _ => 0.0,
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
