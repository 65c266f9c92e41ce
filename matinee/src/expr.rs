// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred arithmetic over layout results.
//!
//! A [`LayoutExpr`] is a small symbolic tree referencing box, text-line,
//! and inline-anchor geometry by node identity. Expressions are built
//! while authoring (usually through the accessor family on
//! [`BoxBuilder`](crate::BoxBuilder)) and evaluated only after the
//! layout engine has produced geometry for the page.

use core::fmt;
use core::ops::{Add, Mul, Sub};
use core::str::FromStr;
use std::collections::BTreeSet;

use matinee_core::{CollectSteps, Step, Value, ValueError};

use crate::layout::LayoutMap;
use crate::Error;

/// The identity of a box, issued by the deck and stable across steps.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Ids used for overlay nodes synthesised after layout; they never
    /// collide with deck-issued ids.
    pub(crate) const fn synthetic(index: u64) -> Self {
        Self(u64::MAX - index)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Symbolic arithmetic over deferred layout metrics.
#[derive(Clone, PartialEq, Debug)]
pub enum LayoutExpr {
    Const(f64),
    X(NodeId),
    Y(NodeId),
    Width { node: NodeId, fraction: f64 },
    Height { node: NodeId, fraction: f64 },
    LineX { node: NodeId, line: u32 },
    LineY { node: NodeId, line: u32 },
    LineWidth { node: NodeId, line: u32, fraction: f64 },
    LineHeight { node: NodeId, line: u32, fraction: f64 },
    InlineX { node: NodeId, anchor: u32 },
    InlineY { node: NodeId, anchor: u32 },
    InlineWidth { node: NodeId, anchor: u32, fraction: f64 },
    InlineHeight { node: NodeId, anchor: u32, fraction: f64 },
    Add(Box<LayoutExpr>, Box<LayoutExpr>),
    Sub(Box<LayoutExpr>, Box<LayoutExpr>),
    Mul(Box<LayoutExpr>, Box<LayoutExpr>),
    Max(Vec<LayoutExpr>),
}

impl LayoutExpr {
    /// The maximum of the given expressions.
    pub fn max(expressions: Vec<LayoutExpr>) -> Self {
        Self::Max(expressions)
    }

    /// Evaluates against the page's layout map.
    pub fn eval(&self, layout: &LayoutMap) -> Result<f64, Error> {
        match self {
            Self::Const(v) => Ok(*v),
            Self::X(node) => Ok(geometry(layout, *node)?.x),
            Self::Y(node) => Ok(geometry(layout, *node)?.y),
            Self::Width { node, fraction } => Ok(geometry(layout, *node)?.width * fraction),
            Self::Height { node, fraction } => Ok(geometry(layout, *node)?.height * fraction),
            Self::LineX { node, line } => Ok(line_rect(layout, *node, *line)?.x),
            Self::LineY { node, line } => Ok(line_rect(layout, *node, *line)?.y),
            Self::LineWidth {
                node,
                line,
                fraction,
            } => Ok(line_rect(layout, *node, *line)?.width * fraction),
            Self::LineHeight {
                node,
                line,
                fraction,
            } => Ok(line_rect(layout, *node, *line)?.height * fraction),
            Self::InlineX { node, anchor } => Ok(anchor_rect(layout, *node, *anchor)?.x),
            Self::InlineY { node, anchor } => Ok(anchor_rect(layout, *node, *anchor)?.y),
            Self::InlineWidth {
                node,
                anchor,
                fraction,
            } => Ok(anchor_rect(layout, *node, *anchor)?.width * fraction),
            Self::InlineHeight {
                node,
                anchor,
                fraction,
            } => Ok(anchor_rect(layout, *node, *anchor)?.height * fraction),
            Self::Add(a, b) => Ok(a.eval(layout)? + b.eval(layout)?),
            Self::Sub(a, b) => Ok(a.eval(layout)? - b.eval(layout)?),
            Self::Mul(a, b) => Ok(a.eval(layout)? * b.eval(layout)?),
            Self::Max(items) => {
                let mut result = f64::NEG_INFINITY;
                for item in items {
                    result = result.max(item.eval(layout)?);
                }
                Ok(result)
            }
        }
    }
}

fn geometry(layout: &LayoutMap, node: NodeId) -> Result<&crate::NodeGeometry, Error> {
    layout
        .get(&node)
        .ok_or(Error::LayoutResolveMissingNode(node))
}

fn line_rect(layout: &LayoutMap, node: NodeId, line: u32) -> Result<&crate::RectGeometry, Error> {
    geometry(layout, node)?
        .lines
        .get(line as usize)
        .ok_or(Error::LayoutResolveMissingLine { node, line })
}

fn anchor_rect(
    layout: &LayoutMap,
    node: NodeId,
    anchor: u32,
) -> Result<&crate::RectGeometry, Error> {
    geometry(layout, node)?
        .inline
        .get(&anchor)
        .ok_or(Error::LayoutResolveMissingAnchor { node, anchor })
}

impl From<f64> for LayoutExpr {
    fn from(value: f64) -> Self {
        Self::Const(value)
    }
}

impl From<f32> for LayoutExpr {
    fn from(value: f32) -> Self {
        Self::Const(value.into())
    }
}

impl From<i32> for LayoutExpr {
    fn from(value: i32) -> Self {
        Self::Const(value.into())
    }
}

impl<T: Into<LayoutExpr>> Add<T> for LayoutExpr {
    type Output = Self;

    fn add(self, rhs: T) -> Self {
        Self::Add(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<LayoutExpr>> Sub<T> for LayoutExpr {
    type Output = Self;

    fn sub(self, rhs: T) -> Self {
        Self::Sub(Box::new(self), Box::new(rhs.into()))
    }
}

impl<T: Into<LayoutExpr>> Mul<T> for LayoutExpr {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::Mul(Box::new(self), Box::new(rhs.into()))
    }
}

impl CollectSteps for LayoutExpr {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

/// A coordinate or extent: absolute points, a fraction of the parent
/// box (from a percent string), or a deferred layout expression.
#[derive(Clone, PartialEq, Debug)]
pub enum Coord {
    Points(f64),
    Fraction(f64),
    Expr(LayoutExpr),
}

impl Coord {
    /// Shifts an absolute coordinate; fractions are left untouched.
    pub(crate) fn offset(&self, by: f64) -> Self {
        match self {
            Self::Points(v) => Self::Points(v + by),
            Self::Fraction(f) => Self::Fraction(*f),
            Self::Expr(e) => Self::Expr(e.clone() + by),
        }
    }
}

impl From<f64> for Coord {
    fn from(value: f64) -> Self {
        Self::Points(value)
    }
}

impl From<f32> for Coord {
    fn from(value: f32) -> Self {
        Self::Points(value.into())
    }
}

impl From<i32> for Coord {
    fn from(value: i32) -> Self {
        Self::Points(value.into())
    }
}

impl From<LayoutExpr> for Coord {
    fn from(value: LayoutExpr) -> Self {
        Self::Expr(value)
    }
}

impl From<f64> for Value<Coord> {
    fn from(value: f64) -> Self {
        Self::Const(Coord::Points(value))
    }
}

impl From<f32> for Value<Coord> {
    fn from(value: f32) -> Self {
        Self::Const(Coord::Points(value.into()))
    }
}

impl From<i32> for Value<Coord> {
    fn from(value: i32) -> Self {
        Self::Const(Coord::Points(value.into()))
    }
}

impl From<LayoutExpr> for Value<Coord> {
    fn from(value: LayoutExpr) -> Self {
        Self::Const(Coord::Expr(value))
    }
}

impl FromStr for Coord {
    type Err = ValueError;

    /// Parses `"30"` or `"25%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<matinee_core::Length>() {
            Ok(matinee_core::Length::Points(v)) => Ok(Self::Points(v.into())),
            Ok(matinee_core::Length::Fraction(f)) => Ok(Self::Fraction(f.into())),
            Err(_) => Err(ValueError::InvalidPosition(s.to_owned())),
        }
    }
}

impl CollectSteps for Coord {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeGeometry;

    fn layout_with(node: NodeId, x: f64, y: f64, w: f64, h: f64) -> LayoutMap {
        let mut map = LayoutMap::default();
        map.insert(
            node,
            NodeGeometry {
                x,
                y,
                width: w,
                height: h,
                lines: vec![],
                inline: Default::default(),
            },
        );
        map
    }

    #[test]
    fn arithmetic_lifts_numbers() {
        let node = NodeId::new(1);
        let layout = layout_with(node, 10.0, 20.0, 100.0, 50.0);
        let expr = (LayoutExpr::X(node) + 5.0)
            * 2.0
            - LayoutExpr::Height {
                node,
                fraction: 0.5,
            };
        assert_eq!(expr.eval(&layout).unwrap(), (10.0 + 5.0) * 2.0 - 25.0);
    }

    #[test]
    fn max_takes_the_largest() {
        let node = NodeId::new(1);
        let layout = layout_with(node, 0.0, 0.0, 40.0, 60.0);
        let expr = LayoutExpr::max(vec![
            LayoutExpr::Width {
                node,
                fraction: 1.0,
            },
            LayoutExpr::Height {
                node,
                fraction: 1.0,
            },
        ]);
        assert_eq!(expr.eval(&layout).unwrap(), 60.0);
    }

    #[test]
    fn missing_node_is_an_error() {
        let layout = LayoutMap::default();
        let expr = LayoutExpr::X(NodeId::new(9));
        assert!(matches!(
            expr.eval(&layout),
            Err(Error::LayoutResolveMissingNode(_))
        ));
    }

    #[test]
    fn missing_line_and_anchor_errors() {
        let node = NodeId::new(1);
        let layout = layout_with(node, 0.0, 0.0, 1.0, 1.0);
        assert!(matches!(
            LayoutExpr::LineX { node, line: 3 }.eval(&layout),
            Err(Error::LayoutResolveMissingLine { line: 3, .. })
        ));
        assert!(matches!(
            LayoutExpr::InlineY { node, anchor: 7 }.eval(&layout),
            Err(Error::LayoutResolveMissingAnchor { anchor: 7, .. })
        ));
    }

    #[test]
    fn coord_parses_percent() {
        assert_eq!("50%".parse::<Coord>().unwrap(), Coord::Fraction(0.5));
        assert_eq!("30".parse::<Coord>().unwrap(), Coord::Points(30.0));
        assert!("wat".parse::<Coord>().is_err());
    }
}
