// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matinee is a programmatic slide-deck compositor.
//!
//! An author builds a [`Deck`] of [`Slide`]s, each a tree of boxes with
//! layout attributes, text, images, and shapes. Every attribute may vary
//! by discrete [`Step`]; the engine discovers the steps a slide passes
//! through, materialises an immutable raw scene per step, submits it to
//! a [`LayoutEngine`], resolves deferred geometry expressions, and
//! renders one page per step through a [`RenderBackend`].
//!
//! ```
//! use matinee::{BoxBuilder, Deck, DeckOptions, Resources, TextArgs};
//!
//! let mut deck = Deck::new(DeckOptions::default(), Resources::new()).unwrap();
//! let slide = deck.new_slide(Default::default());
//! slide.text("Hello world!", TextArgs::default()).unwrap();
//! let pages = deck.build_pages().unwrap();
//! assert_eq!(pages.len(), 1);
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]

pub use matinee_core;
pub use matinee_text;

mod compile;
mod counters;
mod debug;
mod deck;
mod error;
mod expr;
mod image;
mod layout;
mod node;
mod raw;
mod render;
mod resources;
mod shape;
mod slide;
mod text;

pub use counters::{CounterStorage, PageCounter};
pub use deck::{Deck, DeckOptions};
pub use error::Error;
pub use expr::{Coord, LayoutExpr, NodeId};
pub use image::{ImageContent, ImageFormat, ImageSource};
pub use layout::{LayoutEngine, LayoutMap, NodeGeometry, RectGeometry};
pub use node::{
    BoxArgs, BoxBuilder, Child, CodeArgs, Content, DebugLayout, GridOptions, GridPlacement,
    ImageArgs, Node, Sides, StyleRef, TextArgs,
};
pub use raw::{
    DebugEntry, RawContent, RawGrid, RawImage, RawItem, RawNode, RawPage, RawPath, RawRect,
    RawShape, RawStroke, RawText,
};
pub use render::{OutputFormat, PageOutput, RenderBackend, RenderOptions};
pub use resources::Resources;
pub use shape::{Arrow, Oval, Path, PathCommand, Point, Rect, Stroke};
pub use slide::{PostprocessFn, Slide, SlideArgs};
pub use text::TextContent;

// The most commonly used names from the support crates.
pub use matinee_core::{
    parse_step_selector, AlignContent, AlignItems, CollectSteps, Color, Length, LengthAuto, Step,
    StepVal, TextAlign, Value,
};
pub use matinee_text::{
    default_code_style, default_text_style, FontStretch, FontWeight, ResolvedTextStyle,
    StyleDelimiters, TextStyle,
};
