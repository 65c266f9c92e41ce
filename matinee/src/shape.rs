// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawable shapes: rectangles, ovals, and paths with arrow heads.
//!
//! Shape attributes are stepped like everything else; materialisation
//! samples them at a step and yields a [`RawShape`], or nothing when
//! the shape is hidden at that step.

use std::collections::BTreeSet;

use matinee_core::{CollectSteps, Color, Step, Value};

use crate::compile::show_at;
use crate::raw::{RawPath, RawRect, RawShape, RawStroke};
use crate::Coord;

/// A point whose coordinates may be stepped, fractional, or deferred.
#[derive(Clone, PartialEq, Debug)]
pub struct Point {
    pub x: Value<Coord>,
    pub y: Value<Coord>,
}

impl Point {
    pub fn new(x: impl Into<Coord>, y: impl Into<Coord>) -> Self {
        Self {
            x: Value::Const(x.into()),
            y: Value::Const(y.into()),
        }
    }

    /// Samples both coordinates at a step; unset falls back to 0.
    pub(crate) fn at_step(&self, step: &Step) -> (Coord, Coord) {
        (
            self.x.get(step).cloned().unwrap_or(Coord::Points(0.0)),
            self.y.get(step).cloned().unwrap_or(Coord::Points(0.0)),
        )
    }
}

impl CollectSteps for Point {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.x.collect_steps(out);
        self.y.collect_steps(out);
    }
}

/// Stroke parameters; every field stepped.
#[derive(Clone, PartialEq, Debug)]
pub struct Stroke {
    pub color: Value<Color>,
    pub width: Value<f64>,
    pub dash_array: Value<Vec<f64>>,
    pub dash_offset: Value<f64>,
}

impl Stroke {
    pub fn new(color: Color) -> Self {
        Self {
            color: Value::Const(color),
            width: Value::Const(1.0),
            dash_array: Value::Unset,
            dash_offset: Value::Unset,
        }
    }

    #[must_use]
    pub fn with_width(mut self, width: impl Into<Value<f64>>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn with_dash_array(mut self, dashes: impl Into<Value<Vec<f64>>>) -> Self {
        self.dash_array = dashes.into();
        self
    }

    #[must_use]
    pub fn with_dash_offset(mut self, offset: impl Into<Value<f64>>) -> Self {
        self.dash_offset = offset.into();
        self
    }

    pub(crate) fn at_step(&self, step: &Step) -> RawStroke {
        RawStroke {
            color: self.color.get(step).copied().unwrap_or(Color::BLACK),
            width: self.width.get(step).copied().unwrap_or(1.0),
            dash_array: self.dash_array.get(step).cloned(),
            dash_offset: self.dash_offset.get(step).copied().unwrap_or(0.0),
        }
    }
}

impl CollectSteps for Stroke {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.color.collect_steps(out);
        self.width.collect_steps(out);
        self.dash_array.collect_steps(out);
        self.dash_offset.collect_steps(out);
    }
}

/// An arrow head attached to the start or end of a path.
#[derive(Clone, PartialEq, Debug)]
pub struct Arrow {
    /// Size in points.
    pub size: f64,
    /// Opening angle in degrees.
    pub angle: f64,
    /// `None` takes the path's stroke color.
    pub color: Option<Color>,
    /// `None` draws a filled head; a width draws a stroked one.
    pub stroke_width: Option<f64>,
    /// Head shape: < 1 sharper, 1 straight sides, > 1 diamond.
    pub inner_point: Option<f64>,
}

impl Default for Arrow {
    fn default() -> Self {
        Self {
            size: 10.0,
            angle: 40.0,
            color: None,
            stroke_width: None,
            inner_point: None,
        }
    }
}

impl CollectSteps for Arrow {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

macro_rules! rect_like {
    ($name:ident, $oval:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Debug)]
        pub struct $name {
            pub p1: Value<Point>,
            pub p2: Value<Point>,
            pub stroke: Value<Stroke>,
            pub fill_color: Value<Color>,
            pub z_level: Value<i32>,
            pub show: Value<bool>,
        }

        impl $name {
            pub fn new(p1: Point, p2: Point) -> Self {
                Self {
                    p1: Value::Const(p1),
                    p2: Value::Const(p2),
                    stroke: Value::Unset,
                    fill_color: Value::Unset,
                    z_level: Value::Unset,
                    show: Value::Unset,
                }
            }

            #[must_use]
            pub fn with_stroke(mut self, stroke: impl Into<Value<Stroke>>) -> Self {
                self.stroke = stroke.into();
                self
            }

            #[must_use]
            pub fn with_fill(mut self, color: impl Into<Value<Color>>) -> Self {
                self.fill_color = color.into();
                self
            }

            #[must_use]
            pub fn with_z_level(mut self, z_level: impl Into<Value<i32>>) -> Self {
                self.z_level = z_level.into();
                self
            }

            #[must_use]
            pub fn with_show(mut self, show: impl Into<Value<bool>>) -> Self {
                self.show = show.into();
                self
            }

            pub(crate) fn to_raw(&self, step: &Step, ctx_z_level: i32) -> Option<RawShape> {
                if !show_at(&self.show, step) {
                    return None;
                }
                let p1 = self.p1.get(step)?.at_step(step);
                let p2 = self.p2.get(step)?.at_step(step);
                Some(RawShape::Rect(RawRect {
                    oval: $oval,
                    x1: p1.0,
                    y1: p1.1,
                    x2: p2.0,
                    y2: p2.1,
                    stroke: self.stroke.get(step).map(|s| s.at_step(step)),
                    fill_color: self.fill_color.get(step).copied(),
                    z_level: self.z_level.get(step).copied().unwrap_or(ctx_z_level),
                }))
            }
        }

        impl CollectSteps for $name {
            fn collect_steps(&self, out: &mut BTreeSet<Step>) {
                self.p1.collect_steps(out);
                self.p2.collect_steps(out);
                self.stroke.collect_steps(out);
                self.fill_color.collect_steps(out);
                self.z_level.collect_steps(out);
                self.show.collect_steps(out);
            }
        }
    };
}

rect_like!(Rect, false, "A rectangle spanned by two corner points.");
rect_like!(Oval, true, "An oval inscribed in the rectangle spanned by two corner points.");

/// One drawing command of a [`Path`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PathCommand {
    /// 1 point.
    Move,
    /// 1 point.
    Line,
    /// Control point + end point.
    Quad,
    /// Two control points + end point.
    Cubic,
    /// No points.
    Close,
}

impl PathCommand {
    /// Number of points the command consumes.
    pub fn point_count(&self) -> usize {
        match self {
            Self::Move | Self::Line => 1,
            Self::Quad => 2,
            Self::Cubic => 3,
            Self::Close => 0,
        }
    }
}

/// A free-form path built from move/line/quad/cubic commands.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Path {
    pub stroke: Option<Stroke>,
    pub fill_color: Option<Color>,
    pub arrow_start: Option<Arrow>,
    pub arrow_end: Option<Arrow>,
    pub z_level: Value<i32>,
    pub show: Value<bool>,
    commands: Vec<PathCommand>,
    points: Vec<Value<Coord>>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    #[must_use]
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = Some(color);
        self
    }

    #[must_use]
    pub fn with_arrow_start(mut self, arrow: Arrow) -> Self {
        self.arrow_start = Some(arrow);
        self
    }

    #[must_use]
    pub fn with_arrow_end(mut self, arrow: Arrow) -> Self {
        self.arrow_end = Some(arrow);
        self
    }

    #[must_use]
    pub fn with_show(mut self, show: impl Into<Value<bool>>) -> Self {
        self.show = show.into();
        self
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// The last point of the path, or the origin when empty.
    pub fn last_point(&self) -> (Coord, Coord) {
        if self.points.len() < 2 {
            return (Coord::Points(0.0), Coord::Points(0.0));
        }
        let x = &self.points[self.points.len() - 2];
        let y = &self.points[self.points.len() - 1];
        (
            match x {
                Value::Const(c) => c.clone(),
                _ => Coord::Points(0.0),
            },
            match y {
                Value::Const(c) => c.clone(),
                _ => Coord::Points(0.0),
            },
        )
    }

    pub fn move_to(mut self, x: impl Into<Value<Coord>>, y: impl Into<Value<Coord>>) -> Self {
        self.commands.push(PathCommand::Move);
        self.points.push(x.into());
        self.points.push(y.into());
        self
    }

    pub fn line_to(mut self, x: impl Into<Value<Coord>>, y: impl Into<Value<Coord>>) -> Self {
        self.commands.push(PathCommand::Line);
        self.points.push(x.into());
        self.points.push(y.into());
        self
    }

    /// Moves relative to the last point of the path.
    pub fn move_by(self, dx: f64, dy: f64) -> Self {
        let (x, y) = self.last_point();
        self.move_to(x.offset(dx), y.offset(dy))
    }

    /// Draws a line relative to the last point of the path.
    pub fn line_by(self, dx: f64, dy: f64) -> Self {
        let (x, y) = self.last_point();
        self.line_to(x.offset(dx), y.offset(dy))
    }

    pub fn quad_to(
        mut self,
        x1: impl Into<Value<Coord>>,
        y1: impl Into<Value<Coord>>,
        x: impl Into<Value<Coord>>,
        y: impl Into<Value<Coord>>,
    ) -> Self {
        self.commands.push(PathCommand::Quad);
        self.points.push(x1.into());
        self.points.push(y1.into());
        self.points.push(x.into());
        self.points.push(y.into());
        self
    }

    pub fn cubic_to(
        mut self,
        x1: impl Into<Value<Coord>>,
        y1: impl Into<Value<Coord>>,
        x2: impl Into<Value<Coord>>,
        y2: impl Into<Value<Coord>>,
        x: impl Into<Value<Coord>>,
        y: impl Into<Value<Coord>>,
    ) -> Self {
        self.commands.push(PathCommand::Cubic);
        for point in [x1.into(), y1.into(), x2.into(), y2.into(), x.into(), y.into()] {
            self.points.push(point);
        }
        self
    }

    pub fn close(mut self) -> Self {
        self.commands.push(PathCommand::Close);
        self
    }

    pub(crate) fn to_raw(&self, step: &Step, ctx_z_level: i32) -> Option<RawShape> {
        if !show_at(&self.show, step) {
            return None;
        }
        Some(RawShape::Path(RawPath {
            commands: self.commands.clone(),
            points: self
                .points
                .iter()
                .map(|p| p.get(step).cloned().unwrap_or(Coord::Points(0.0)))
                .collect(),
            stroke: self.stroke.as_ref().map(|s| s.at_step(step)),
            fill_color: self.fill_color,
            arrow_start: self.arrow_start.clone(),
            arrow_end: self.arrow_end.clone(),
            z_level: self.z_level.get(step).copied().unwrap_or(ctx_z_level),
        }))
    }
}

impl CollectSteps for Path {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.stroke.collect_steps(out);
        self.z_level.collect_steps(out);
        self.show.collect_steps(out);
        self.points.collect_steps(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matinee_core::{parse_step_selector, StepVal};

    #[test]
    fn hidden_shape_materialises_to_nothing() {
        let rect = Rect::new(Point::new(0, 0), Point::new(10, 10))
            .with_show(Value::Steps(parse_step_selector("2+").unwrap()));
        assert!(rect.to_raw(&Step::from(1), 0).is_none());
        assert!(rect.to_raw(&Step::from(2), 0).is_some());
    }

    #[test]
    fn rect_takes_context_z_level_when_unset() {
        let rect = Rect::new(Point::new(0, 0), Point::new(1, 1));
        let Some(RawShape::Rect(raw)) = rect.to_raw(&Step::from(1), 7) else {
            panic!("expected a raw rect");
        };
        assert_eq!(raw.z_level, 7);

        let above = Rect::new(Point::new(0, 0), Point::new(1, 1)).with_z_level(9);
        let Some(RawShape::Rect(raw)) = above.to_raw(&Step::from(1), 7) else {
            panic!("expected a raw rect");
        };
        assert_eq!(raw.z_level, 9);
    }

    #[test]
    fn stepped_stroke_samples_per_step() {
        let stroke = Stroke::new(Color::BLACK)
            .with_width(StepVal::new().at(1, 1.0).at(3, 4.0));
        assert_eq!(stroke.at_step(&Step::from(2)).width, 1.0);
        assert_eq!(stroke.at_step(&Step::from(3)).width, 4.0);
    }

    #[test]
    fn path_relative_commands_extend_from_last_point() {
        let path = Path::new().move_to(10.0, 20.0).line_by(5.0, -5.0);
        let Some(RawShape::Path(raw)) = path.to_raw(&Step::from(1), 0) else {
            panic!("expected a raw path");
        };
        assert_eq!(raw.commands, vec![PathCommand::Move, PathCommand::Line]);
        assert_eq!(
            raw.points,
            vec![
                Coord::Points(10.0),
                Coord::Points(20.0),
                Coord::Points(15.0),
                Coord::Points(15.0),
            ]
        );
    }

    #[test]
    fn command_point_counts_match_stream() {
        let path = Path::new()
            .move_to(0.0, 0.0)
            .quad_to(1.0, 1.0, 2.0, 0.0)
            .cubic_to(3.0, 1.0, 4.0, 1.0, 5.0, 0.0)
            .close();
        let total: usize = path.commands().iter().map(|c| c.point_count() * 2).sum();
        let Some(RawShape::Path(raw)) = path.to_raw(&Step::from(1), 0) else {
            panic!("expected a raw path");
        };
        assert_eq!(raw.points.len(), total);
    }
}
