// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary to the external layout engine, and the post-layout
//! pass that resolves deferred geometry in shapes.

use hashbrown::HashMap;

use crate::raw::{RawItem, RawNode, RawPage, RawShape};
use crate::{Coord, Error, NodeId};

/// An axis-aligned rectangle in page coordinates.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct RectGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// The geometry the layout engine reports for one node: its rectangle,
/// the rectangles of its text lines, and the rectangles of its inline
/// anchors keyed by anchor id.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct NodeGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<RectGeometry>,
    pub inline: HashMap<u32, RectGeometry>,
}

impl NodeGeometry {
    pub fn rect(&self) -> RectGeometry {
        RectGeometry {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Geometry for every node of a page, keyed by node identity.
pub type LayoutMap = HashMap<NodeId, NodeGeometry>;

/// The external flex/grid solver.
///
/// The engine receives the immutable raw scene of a page and reports
/// the geometry of every box (plus text lines and inline anchors for
/// text content). Boxes whose positions are layout expressions are
/// expected to be resolved by the engine against nodes it has already
/// placed.
pub trait LayoutEngine: Sync {
    fn compute(&self, page: &RawPage) -> Result<LayoutMap, String>;
}

/// Which axis a percent value resolves against.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Axis {
    X,
    Y,
}

/// Resolves one shape coordinate to an absolute page value.
///
/// Points and expressions are absolute; fractions are relative to the
/// parent box on the semantically matching axis.
pub(crate) fn resolve_coord(
    coord: &Coord,
    parent: NodeId,
    axis: Axis,
    layout: &LayoutMap,
) -> Result<f64, Error> {
    match coord {
        Coord::Points(v) => Ok(*v),
        Coord::Fraction(f) => {
            let geometry = layout
                .get(&parent)
                .ok_or(Error::LayoutResolveMissingNode(parent))?;
            Ok(match axis {
                Axis::X => geometry.x + f * geometry.width,
                Axis::Y => geometry.y + f * geometry.height,
            })
        }
        Coord::Expr(expr) => expr.eval(layout),
    }
}

/// Walks the raw scene substituting every residual coordinate in shape
/// geometry with its absolute value.
///
/// Text and image content need no work here; the layout engine produces
/// their final boxes.
pub(crate) fn resolve_page(page: &mut RawPage, layout: &LayoutMap) -> Result<(), Error> {
    resolve_node(&mut page.root, layout)
}

fn resolve_node(node: &mut RawNode, layout: &LayoutMap) -> Result<(), Error> {
    let parent = node.node_id;
    for child in &mut node.children {
        match child {
            RawItem::Node(inner) => resolve_node(inner, layout)?,
            RawItem::Shape(shape) => resolve_shape(shape, parent, layout)?,
        }
    }
    Ok(())
}

fn resolve_shape(shape: &mut RawShape, parent: NodeId, layout: &LayoutMap) -> Result<(), Error> {
    match shape {
        RawShape::Rect(rect) => {
            for (coord, axis) in [
                (&mut rect.x1, Axis::X),
                (&mut rect.y1, Axis::Y),
                (&mut rect.x2, Axis::X),
                (&mut rect.y2, Axis::Y),
            ] {
                *coord = Coord::Points(resolve_coord(coord, parent, axis, layout)?);
            }
        }
        RawShape::Path(path) => {
            for (index, coord) in path.points.iter_mut().enumerate() {
                let axis = if index % 2 == 0 { Axis::X } else { Axis::Y };
                *coord = Coord::Points(resolve_coord(coord, parent, axis, layout)?);
            }
        }
    }
    Ok(())
}
