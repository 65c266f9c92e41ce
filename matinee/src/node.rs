// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The box tree and its builder surface.
//!
//! A [`Node`] is a cheap shared handle to one box. Trees are built
//! single-threaded through the [`BoxBuilder`] trait (implemented by
//! both [`Node`] and [`Slide`](crate::Slide)) and become read-only
//! during compilation. Box identity is a deck-issued [`NodeId`], which
//! is what layout expressions and the post-layout geometry map refer
//! to.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use matinee_core::{
    AlignContent, AlignItems, Color, Length, LengthAuto, StepVal, TextAlign, Value,
};
use matinee_text::{parse_step_markers, StyleDelimiters, TextStyle};

use crate::image::{ImageContent, ImageSource};
use crate::shape::{Oval, Path, Point, Rect, Stroke};
use crate::text::TextContent;
use crate::{Coord, Error, LayoutExpr, NodeId};

/// Issues deck-unique node ids.
#[derive(Clone, Debug)]
pub(crate) struct IdSource(Rc<Cell<u64>>);

impl IdSource {
    pub(crate) fn new() -> Self {
        Self(Rc::new(Cell::new(1)))
    }

    pub(crate) fn next(&self) -> NodeId {
        let value = self.0.get();
        self.0.set(value + 1);
        NodeId::new(value)
    }
}

/// Per-box debug-layout override.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum DebugLayout {
    /// Follow the slide (or surrounding context).
    #[default]
    Inherit,
    /// Never draw a frame for this box.
    Off,
    /// Draw a frame in this color.
    Color(Color),
}

/// Placement of a box within a grid container.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum GridPlacement {
    #[default]
    Auto,
    Line(i32),
    Span(u32),
}

impl matinee_core::CollectSteps for GridPlacement {
    fn collect_steps(&self, _out: &mut std::collections::BTreeSet<matinee_core::Step>) {}
}

/// Grid container options; templates and placements are stepped.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct GridOptions {
    pub template_rows: Value<Vec<Length>>,
    pub template_columns: Value<Vec<Length>>,
    pub row: Value<GridPlacement>,
    pub column: Value<GridPlacement>,
}

impl matinee_core::CollectSteps for GridOptions {
    fn collect_steps(&self, out: &mut std::collections::BTreeSet<matinee_core::Step>) {
        self.template_rows.collect_steps(out);
        self.template_columns.collect_steps(out);
        self.row.collect_steps(out);
        self.column.collect_steps(out);
    }
}

/// The stepped layout and styling attributes of a box.
///
/// Every field defaults to unset; materialisation substitutes the
/// layout-engine defaults (0 padding, flex-shrink 1, …) for unset
/// values. Typical use is struct-update syntax over `Default`:
///
/// ```
/// use matinee::BoxArgs;
/// let args = BoxArgs {
///     width: 100.0.into(),
///     bg_color: "red".parse::<matinee::Color>().unwrap().into(),
///     ..Default::default()
/// };
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoxArgs {
    pub x: Value<Coord>,
    pub y: Value<Coord>,
    pub width: Value<Coord>,
    pub height: Value<Coord>,
    /// Hides the visual without removing the box from layout.
    pub show: Value<bool>,
    /// Removes the whole subtree from steps where false.
    pub active: Value<bool>,
    pub z_level: Value<i32>,
    pub bg_color: Value<Color>,
    pub row: Value<bool>,
    pub reverse: Value<bool>,
    pub p_left: Value<Length>,
    pub p_right: Value<Length>,
    pub p_top: Value<Length>,
    pub p_bottom: Value<Length>,
    pub m_left: Value<LengthAuto>,
    pub m_right: Value<LengthAuto>,
    pub m_top: Value<LengthAuto>,
    pub m_bottom: Value<LengthAuto>,
    pub flex_grow: Value<f64>,
    pub flex_shrink: Value<f64>,
    pub align_items: Value<AlignItems>,
    pub align_self: Value<AlignItems>,
    pub justify_self: Value<AlignItems>,
    pub align_content: Value<AlignContent>,
    pub justify_content: Value<AlignContent>,
    pub gap_x: Value<Length>,
    pub gap_y: Value<Length>,
    pub grid: Value<GridOptions>,
    pub border_radius: Value<f64>,
    pub url: Value<String>,
    pub name: String,
    pub debug_layout: DebugLayout,
}

impl matinee_core::CollectSteps for BoxArgs {
    fn collect_steps(&self, out: &mut std::collections::BTreeSet<matinee_core::Step>) {
        self.x.collect_steps(out);
        self.y.collect_steps(out);
        self.width.collect_steps(out);
        self.height.collect_steps(out);
        self.show.collect_steps(out);
        self.active.collect_steps(out);
        self.z_level.collect_steps(out);
        self.bg_color.collect_steps(out);
        self.row.collect_steps(out);
        self.reverse.collect_steps(out);
        self.p_left.collect_steps(out);
        self.p_right.collect_steps(out);
        self.p_top.collect_steps(out);
        self.p_bottom.collect_steps(out);
        self.m_left.collect_steps(out);
        self.m_right.collect_steps(out);
        self.m_top.collect_steps(out);
        self.m_bottom.collect_steps(out);
        self.flex_grow.collect_steps(out);
        self.flex_shrink.collect_steps(out);
        self.align_items.collect_steps(out);
        self.align_self.collect_steps(out);
        self.justify_self.collect_steps(out);
        self.align_content.collect_steps(out);
        self.justify_content.collect_steps(out);
        self.gap_x.collect_steps(out);
        self.gap_y.collect_steps(out);
        self.grid.collect_steps(out);
        self.border_radius.collect_steps(out);
        self.url.collect_steps(out);
    }
}

/// A child of a box: a nested box or a free-floating shape.
#[derive(Clone, Debug)]
pub enum Child {
    Node(Node),
    Rect(Rect),
    Oval(Oval),
    Path(Path),
}

impl From<Node> for Child {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

impl From<Rect> for Child {
    fn from(value: Rect) -> Self {
        Self::Rect(value)
    }
}

impl From<Oval> for Child {
    fn from(value: Oval) -> Self {
        Self::Oval(value)
    }
}

impl From<Path> for Child {
    fn from(value: Path) -> Self {
        Self::Path(value)
    }
}

/// Box content: either text or an image, never both.
#[derive(Clone, Debug)]
pub enum Content {
    Text(TextContent),
    Image(ImageContent),
}

pub(crate) struct NodeInner {
    pub(crate) id: NodeId,
    pub(crate) ids: IdSource,
    pub(crate) attrs: BoxArgs,
    pub(crate) content: Option<Content>,
    pub(crate) children: Vec<Value<Child>>,
    pub(crate) styles: Option<BTreeMap<String, Value<TextStyle>>>,
}

/// A shared handle to one box of the tree.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeInner>>);

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Node")
            .field("id", &inner.id)
            .field("name", &inner.attrs.name)
            .field("children", &inner.children.len())
            .finish()
    }
}

impl Node {
    pub(crate) fn with_args(ids: &IdSource, attrs: BoxArgs) -> Self {
        Self(Rc::new(RefCell::new(NodeInner {
            id: ids.next(),
            ids: ids.clone(),
            attrs,
            content: None,
            children: Vec::new(),
            styles: None,
        })))
    }

    /// The box's identity, as referenced by layout expressions.
    pub fn id(&self) -> NodeId {
        self.0.borrow().id
    }

    pub fn name(&self) -> String {
        self.0.borrow().attrs.name.clone()
    }

    pub(crate) fn ids(&self) -> IdSource {
        self.0.borrow().ids.clone()
    }

    pub(crate) fn borrow(&self) -> std::cell::Ref<'_, NodeInner> {
        self.0.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> std::cell::RefMut<'_, NodeInner> {
        self.0.borrow_mut()
    }

    pub(crate) fn set_content(&self, content: Content) {
        self.0.borrow_mut().content = Some(content);
    }

    /// Appends a child, possibly a stepped one.
    pub fn add_value(&self, child: Value<Child>) {
        self.0.borrow_mut().children.push(child);
    }

    /// A copy sharing all children handles but owning its own child
    /// list, so boxes can be appended without touching the original.
    pub(crate) fn shallow_copy(&self) -> Self {
        let inner = self.0.borrow();
        Self(Rc::new(RefCell::new(NodeInner {
            id: inner.id,
            ids: inner.ids.clone(),
            attrs: inner.attrs.clone(),
            content: inner.content.clone(),
            children: inner.children.clone(),
            styles: inner.styles.clone(),
        })))
    }

    /// Sets the box's margins; `all` is written first, then the axis
    /// shortcuts, then the individual sides.
    pub fn margin(&self, sides: Sides<LengthAuto>) -> &Self {
        let mut inner = self.0.borrow_mut();
        let attrs = &mut inner.attrs;
        sides.apply(
            [
                &mut attrs.m_left,
                &mut attrs.m_right,
                &mut attrs.m_top,
                &mut attrs.m_bottom,
            ],
        );
        drop(inner);
        self
    }

    /// Sets the box's padding; same precedence as [`margin`](Self::margin).
    pub fn padding(&self, sides: Sides<Length>) -> &Self {
        let mut inner = self.0.borrow_mut();
        let attrs = &mut inner.attrs;
        sides.apply(
            [
                &mut attrs.p_left,
                &mut attrs.p_right,
                &mut attrs.p_top,
                &mut attrs.p_bottom,
            ],
        );
        drop(inner);
        self
    }

    pub(crate) fn set_style_value(
        &self,
        name: &str,
        style: Value<TextStyle>,
    ) -> Result<(), Error> {
        let mut inner = self.0.borrow_mut();
        let table = inner.styles.get_or_insert_with(BTreeMap::new);
        apply_set_style(table, name, style)
    }

    pub(crate) fn update_style_value(&self, name: &str, style: TextStyle) -> Result<(), Error> {
        let mut inner = self.0.borrow_mut();
        let table = inner.styles.get_or_insert_with(BTreeMap::new);
        apply_update_style(table, name, style)
    }

    pub(crate) fn get_style_value(&self, name: &str) -> Option<Value<TextStyle>> {
        self.0
            .borrow()
            .styles
            .as_ref()
            .and_then(|table| table.get(name).cloned())
    }
}

/// Shared style-table writing rules: `set` replaces, except for the
/// name `"default"`, which always merges into the existing entry.
pub(crate) fn apply_set_style(
    table: &mut BTreeMap<String, Value<TextStyle>>,
    name: &str,
    style: Value<TextStyle>,
) -> Result<(), Error> {
    let mut invalid = None;
    style.for_each(|s| {
        if let Err(err) = s.validate() {
            invalid = Some(err);
        }
    });
    if let Some(err) = invalid {
        return Err(err.into());
    }
    if name == "default" {
        return match style {
            Value::Const(style) => apply_update_style(table, name, style),
            _ => Err(Error::StyleNotUpdatable(name.to_owned())),
        };
    }
    table.insert(name.to_owned(), style);
    Ok(())
}

/// Merges a plain style into an existing entry. A stepped existing
/// entry is rejected; replace it with `set_style` instead.
pub(crate) fn apply_update_style(
    table: &mut BTreeMap<String, Value<TextStyle>>,
    name: &str,
    style: TextStyle,
) -> Result<(), Error> {
    style.validate()?;
    match table.get(name) {
        None | Some(Value::Unset) => {
            table.insert(name.to_owned(), Value::Const(style));
        }
        Some(Value::Const(existing)) => {
            let merged = existing.merge(&style);
            table.insert(name.to_owned(), Value::Const(merged));
        }
        Some(Value::Steps(_)) => return Err(Error::StyleNotUpdatable(name.to_owned())),
    }
    Ok(())
}

/// The four sides of a box, written in `all` → `x`/`y` → side order so
/// later, more specific values win.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sides<T> {
    pub all: Option<T>,
    pub x: Option<T>,
    pub y: Option<T>,
    pub left: Option<T>,
    pub right: Option<T>,
    pub top: Option<T>,
    pub bottom: Option<T>,
}

impl<T: Clone> Sides<T> {
    pub fn all(value: impl Into<T>) -> Self {
        Self {
            all: Some(value.into()),
            ..Self::empty()
        }
    }

    pub fn xy(x: impl Into<T>, y: impl Into<T>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            all: None,
            x: None,
            y: None,
            left: None,
            right: None,
            top: None,
            bottom: None,
        }
    }

    #[must_use]
    pub fn with_left(mut self, value: impl Into<T>) -> Self {
        self.left = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_right(mut self, value: impl Into<T>) -> Self {
        self.right = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_top(mut self, value: impl Into<T>) -> Self {
        self.top = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_bottom(mut self, value: impl Into<T>) -> Self {
        self.bottom = Some(value.into());
        self
    }

    /// Writes into `[left, right, top, bottom]` slots.
    fn apply(self, [left, right, top, bottom]: [&mut Value<T>; 4]) {
        if let Some(v) = self.all {
            *left = Value::Const(v.clone());
            *right = Value::Const(v.clone());
            *top = Value::Const(v.clone());
            *bottom = Value::Const(v);
        }
        if let Some(v) = self.x {
            *left = Value::Const(v.clone());
            *right = Value::Const(v);
        }
        if let Some(v) = self.y {
            *top = Value::Const(v.clone());
            *bottom = Value::Const(v);
        }
        if let Some(v) = self.left {
            *left = Value::Const(v);
        }
        if let Some(v) = self.right {
            *right = Value::Const(v);
        }
        if let Some(v) = self.top {
            *top = Value::Const(v);
        }
        if let Some(v) = self.bottom {
            *bottom = Value::Const(v);
        }
    }
}

/// A style reference for text content: a named entry from the
/// surrounding scope or an inline style.
#[derive(Clone, Debug)]
pub enum StyleRef {
    Named(String),
    Style(TextStyle),
}

impl From<&str> for StyleRef {
    fn from(value: &str) -> Self {
        Self::Named(value.to_owned())
    }
}

impl From<String> for StyleRef {
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

impl From<TextStyle> for StyleRef {
    fn from(value: TextStyle) -> Self {
        Self::Style(value)
    }
}

/// Options for [`BoxBuilder::text`].
#[derive(Clone, Debug)]
pub struct TextArgs {
    pub style: Option<StyleRef>,
    pub align: Value<TextAlign>,
    /// Trim surrounding whitespace of constant text.
    pub strip: bool,
    /// Run the styled-text parser over the content.
    pub parse_styles: bool,
    pub delimiters: StyleDelimiters,
    pub box_args: BoxArgs,
}

impl Default for TextArgs {
    fn default() -> Self {
        Self {
            style: None,
            align: Value::Unset,
            strip: true,
            parse_styles: true,
            delimiters: StyleDelimiters::default(),
            box_args: BoxArgs::default(),
        }
    }
}

/// Options for [`BoxBuilder::code`].
#[derive(Clone, Debug)]
pub struct CodeArgs {
    pub language: Value<String>,
    pub theme: Value<String>,
    pub style: Option<StyleRef>,
    pub align: Value<TextAlign>,
    pub strip: bool,
    /// Styled-text parsing is off for code by default.
    pub parse_styles: bool,
    pub delimiters: StyleDelimiters,
    /// When set, lines ending in `<marker> SELECTOR` are step-gated.
    pub step_marker: Option<String>,
    pub box_args: BoxArgs,
}

impl Default for CodeArgs {
    fn default() -> Self {
        Self {
            language: Value::Unset,
            theme: Value::Unset,
            style: None,
            align: Value::Unset,
            strip: true,
            parse_styles: false,
            delimiters: StyleDelimiters::default(),
            step_marker: None,
            box_args: BoxArgs::default(),
        }
    }
}

/// Options for [`BoxBuilder::image`].
#[derive(Clone, Debug)]
pub struct ImageArgs {
    /// Let SVG step markers contribute to the slide's steps.
    pub enable_steps: bool,
    /// Shift the image's contributed steps forward.
    pub shift_steps: u32,
    pub box_args: BoxArgs,
}

impl Default for ImageArgs {
    fn default() -> Self {
        Self {
            enable_steps: true,
            shift_steps: 0,
            box_args: BoxArgs::default(),
        }
    }
}

/// The shared builder surface of slides and boxes.
///
/// All builders attach to [`node`](Self::node) and return the created
/// box, so trees are written top-down:
///
/// ```
/// # use matinee::{BoxArgs, Deck, DeckOptions, Resources, BoxBuilder};
/// # let mut deck = Deck::new(DeckOptions::default(), Resources::new()).unwrap();
/// # let slide = deck.new_slide(Default::default());
/// let column = slide.new_box(BoxArgs::default());
/// let item = column.new_box(BoxArgs { width: 40.0.into(), ..Default::default() });
/// ```
pub trait BoxBuilder {
    /// The box new children attach to.
    fn node(&self) -> Node;

    /// Creates a child box.
    fn new_box(&self, args: BoxArgs) -> Node {
        let parent = self.node();
        let child = Node::with_args(&parent.ids(), args);
        parent.add_value(Value::Const(Child::Node(child.clone())));
        child
    }

    /// Creates a child box spanning this box.
    fn overlay(&self, mut args: BoxArgs) -> Node {
        if args.x.is_unset() {
            args.x = Value::Const(Coord::Points(0.0));
        }
        if args.y.is_unset() {
            args.y = Value::Const(Coord::Points(0.0));
        }
        if args.width.is_unset() {
            args.width = Value::Const(Coord::Fraction(1.0));
        }
        if args.height.is_unset() {
            args.height = Value::Const(Coord::Fraction(1.0));
        }
        self.new_box(args)
    }

    /// Creates a child box with text content.
    fn text(&self, text: impl Into<Value<String>>, args: TextArgs) -> Result<Node, Error> {
        let mut text = text.into();
        if args.strip {
            if let Value::Const(s) = &text {
                text = Value::Const(s.trim().to_owned());
            }
        }
        if let Some(StyleRef::Style(style)) = &args.style {
            style.validate()?;
        }
        let node = self.new_box(args.box_args);
        node.set_content(Content::Text(TextContent {
            text,
            style: args.style,
            align: args.align,
            is_code: false,
            parse_styles: args.parse_styles,
            delimiters: args.delimiters,
            syntax_language: Value::Unset,
            syntax_theme: Value::Unset,
        }));
        Ok(node)
    }

    /// Creates a child box with syntax-highlighted code content,
    /// optionally step-gated per line.
    fn code(&self, text: impl Into<Value<String>>, args: CodeArgs) -> Result<Node, Error> {
        let mut text = text.into();
        if args.strip {
            if let Value::Const(s) = &text {
                text = Value::Const(s.trim().to_owned());
            }
        }
        if let Some(marker) = &args.step_marker {
            if let Value::Const(s) = &text {
                text = Value::Steps(parse_step_markers(s, marker)?);
            }
        }
        if let Some(StyleRef::Style(style)) = &args.style {
            style.validate()?;
        }
        let node = self.new_box(args.box_args);
        node.set_content(Content::Text(TextContent {
            text,
            style: args.style,
            align: args.align,
            is_code: true,
            parse_styles: args.parse_styles,
            delimiters: args.delimiters,
            syntax_language: args.language,
            syntax_theme: args.theme,
        }));
        Ok(node)
    }

    /// Creates a child box with image content.
    fn image(&self, source: impl Into<Value<ImageSource>>, args: ImageArgs) -> Node {
        let node = self.new_box(args.box_args);
        node.set_content(Content::Image(ImageContent {
            source: source.into(),
            enable_steps: args.enable_steps,
            shift_steps: args.shift_steps,
        }));
        node
    }

    /// Adds a shape or a pre-built box.
    fn add(&self, child: impl Into<Child>) {
        self.node().add_value(Value::Const(child.into()));
    }

    /// Adds a child that varies by step.
    fn add_stepped(&self, child: StepVal<Child>) {
        self.node().add_value(Value::Steps(child));
    }

    /// Draws a straight stroked line between two points.
    fn draw_line(&self, p1: Point, p2: Point, stroke: Stroke) {
        let path = Path::new()
            .with_stroke(stroke)
            .move_to(point_x(&p1), point_y(&p1))
            .line_to(point_x(&p2), point_y(&p2));
        self.add(path);
    }

    /// Registers a named text style on this box's scope.
    fn set_style(&self, name: &str, style: impl Into<Value<TextStyle>>) -> Result<(), Error> {
        self.node().set_style_value(name, style.into())
    }

    /// Merges into an existing named style of this box's scope.
    fn update_style(&self, name: &str, style: TextStyle) -> Result<(), Error> {
        self.node().update_style_value(name, style)
    }

    /// The style registered on this box (not the merged scope).
    fn get_style(&self, name: &str) -> Option<Value<TextStyle>> {
        self.node().get_style_value(name)
    }

    /// X coordinate of this box, optionally offset by a fraction of
    /// its width.
    fn x(&self, width_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::X(node);
        if width_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::Width {
                node,
                fraction: width_fraction,
            }
        }
    }

    /// Y coordinate of this box, optionally offset by a fraction of
    /// its height.
    fn y(&self, height_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::Y(node);
        if height_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::Height {
                node,
                fraction: height_fraction,
            }
        }
    }

    /// A point inside this box given as width/height fractions.
    fn p(&self, x: f64, y: f64) -> Point {
        Point {
            x: Value::Const(Coord::Expr(self.x(x))),
            y: Value::Const(Coord::Expr(self.y(y))),
        }
    }

    fn width(&self, fraction: f64) -> LayoutExpr {
        LayoutExpr::Width {
            node: self.node().id(),
            fraction,
        }
    }

    fn height(&self, fraction: f64) -> LayoutExpr {
        LayoutExpr::Height {
            node: self.node().id(),
            fraction,
        }
    }

    fn line_x(&self, line: u32, width_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::LineX { node, line };
        if width_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::LineWidth {
                node,
                line,
                fraction: width_fraction,
            }
        }
    }

    fn line_y(&self, line: u32, height_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::LineY { node, line };
        if height_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::LineHeight {
                node,
                line,
                fraction: height_fraction,
            }
        }
    }

    fn line_p(&self, line: u32, x: f64, y: f64) -> Point {
        Point {
            x: Value::Const(Coord::Expr(self.line_x(line, x))),
            y: Value::Const(Coord::Expr(self.line_y(line, y))),
        }
    }

    fn line_width(&self, line: u32, fraction: f64) -> LayoutExpr {
        LayoutExpr::LineWidth {
            node: self.node().id(),
            line,
            fraction,
        }
    }

    fn line_height(&self, line: u32, fraction: f64) -> LayoutExpr {
        LayoutExpr::LineHeight {
            node: self.node().id(),
            line,
            fraction,
        }
    }

    fn inline_x(&self, anchor: u32, width_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::InlineX { node, anchor };
        if width_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::InlineWidth {
                node,
                anchor,
                fraction: width_fraction,
            }
        }
    }

    fn inline_y(&self, anchor: u32, height_fraction: f64) -> LayoutExpr {
        let node = self.node().id();
        let expr = LayoutExpr::InlineY { node, anchor };
        if height_fraction == 0.0 {
            expr
        } else {
            expr + LayoutExpr::InlineHeight {
                node,
                anchor,
                fraction: height_fraction,
            }
        }
    }

    fn inline_p(&self, anchor: u32, x: f64, y: f64) -> Point {
        Point {
            x: Value::Const(Coord::Expr(self.inline_x(anchor, x))),
            y: Value::Const(Coord::Expr(self.inline_y(anchor, y))),
        }
    }

    fn inline_width(&self, anchor: u32, fraction: f64) -> LayoutExpr {
        LayoutExpr::InlineWidth {
            node: self.node().id(),
            anchor,
            fraction,
        }
    }

    fn inline_height(&self, anchor: u32, fraction: f64) -> LayoutExpr {
        LayoutExpr::InlineHeight {
            node: self.node().id(),
            anchor,
            fraction,
        }
    }

    /// A box covering `n_lines` text lines starting at `line`.
    fn line_box(&self, line: u32, n_lines: u32, mut args: BoxArgs) -> Node {
        let height = if n_lines == 1 {
            self.line_height(line, 1.0)
        } else {
            self.line_height(line, 1.0) * n_lines as f64
        };
        let width = if n_lines == 1 {
            self.line_width(line, 1.0)
        } else {
            LayoutExpr::max(
                (0..n_lines)
                    .map(|i| self.line_width(line + i, 1.0))
                    .collect(),
            )
        };
        args.x = Value::Const(Coord::Expr(self.line_x(line, 0.0)));
        args.y = Value::Const(Coord::Expr(self.line_y(line, 0.0)));
        args.width = Value::Const(Coord::Expr(width));
        args.height = Value::Const(Coord::Expr(height));
        self.new_box(args)
    }

    /// A box covering an inline text anchor.
    fn inline_box(&self, anchor: u32, mut args: BoxArgs) -> Node {
        args.x = Value::Const(Coord::Expr(self.inline_x(anchor, 0.0)));
        args.y = Value::Const(Coord::Expr(self.inline_y(anchor, 0.0)));
        args.width = Value::Const(Coord::Expr(self.inline_width(anchor, 1.0)));
        args.height = Value::Const(Coord::Expr(self.inline_height(anchor, 1.0)));
        self.new_box(args)
    }
}

fn point_x(point: &Point) -> Value<Coord> {
    point.x.clone()
}

fn point_y(point: &Point) -> Value<Coord> {
    point.y.clone()
}

impl BoxBuilder for Node {
    fn node(&self) -> Node {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Node {
        Node::with_args(&IdSource::new(), BoxArgs::default())
    }

    #[test]
    fn children_keep_declaration_order() {
        let parent = root();
        let a = parent.new_box(BoxArgs {
            name: "a".to_owned(),
            ..Default::default()
        });
        let b = parent.new_box(BoxArgs {
            name: "b".to_owned(),
            ..Default::default()
        });
        let inner = parent.borrow();
        let names: Vec<String> = inner
            .children
            .iter()
            .filter_map(|c| match c {
                Value::Const(Child::Node(n)) => Some(n.name()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn margin_precedence_all_then_axis_then_side() {
        let node = root();
        node.margin(
            Sides::all(LengthAuto::Points(10.0))
                .with_left(LengthAuto::Auto)
                .with_top(LengthAuto::Points(3.0)),
        );
        let inner = node.borrow();
        assert_eq!(inner.attrs.m_left, Value::Const(LengthAuto::Auto));
        assert_eq!(inner.attrs.m_right, Value::Const(LengthAuto::Points(10.0)));
        assert_eq!(inner.attrs.m_top, Value::Const(LengthAuto::Points(3.0)));
        assert_eq!(inner.attrs.m_bottom, Value::Const(LengthAuto::Points(10.0)));
    }

    #[test]
    fn overlay_defaults_span_the_parent() {
        let parent = root();
        let overlay = parent.overlay(BoxArgs::default());
        let inner = overlay.borrow();
        assert_eq!(inner.attrs.x, Value::Const(Coord::Points(0.0)));
        assert_eq!(inner.attrs.width, Value::Const(Coord::Fraction(1.0)));
    }

    #[test]
    fn update_style_merges_and_rejects_stepped() {
        let node = root();
        node.set_style("em", TextStyle::new().with_size(40.0)).unwrap();
        node.update_style("em", TextStyle::new().with_bold(true))
            .unwrap();
        let Some(Value::Const(style)) = node.get_style("em") else {
            panic!("expected a constant style");
        };
        assert_eq!(style.size, Value::Const(40.0));
        assert_eq!(style.bold, Value::Const(true));

        node.set_style(
            "stepped",
            Value::Steps(StepVal::from(TextStyle::new()).at(2, TextStyle::new().with_bold(true))),
        )
        .unwrap();
        assert!(matches!(
            node.update_style("stepped", TextStyle::new()),
            Err(Error::StyleNotUpdatable(_))
        ));
    }

    #[test]
    fn default_style_always_updates() {
        let node = root();
        node.set_style("default", TextStyle::new().with_size(20.0))
            .unwrap();
        node.set_style("default", TextStyle::new().with_bold(true))
            .unwrap();
        let Some(Value::Const(style)) = node.get_style("default") else {
            panic!("expected a constant style");
        };
        // Both writes survive: "default" merges instead of replacing.
        assert_eq!(style.size, Value::Const(20.0));
        assert_eq!(style.bold, Value::Const(true));
    }

    #[test]
    fn accessors_reference_this_node() {
        let node = root();
        assert_eq!(node.x(0.0), LayoutExpr::X(node.id()));
        let expr = node.x(0.5);
        assert!(matches!(expr, LayoutExpr::Add(_, _)));
    }

    #[test]
    fn invalid_style_is_rejected_at_set_time() {
        let node = root();
        assert!(node
            .set_style("bad", TextStyle::new().with_size(-3.0))
            .is_err());
    }
}
