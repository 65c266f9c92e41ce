// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The deck: slide collection, deck-level styles, and the render entry
//! point.

use std::collections::BTreeMap;
use std::rc::Rc;

use matinee_core::{Color, Value};
use matinee_text::{default_code_style, default_text_style, TextStyle};

use crate::compile;
use crate::node::{apply_set_style, apply_update_style, IdSource};
use crate::raw::RawPage;
use crate::render::{self, PageOutput, RenderBackend, RenderOptions};
use crate::resources::Resources;
use crate::slide::{Slide, SlideArgs};
use crate::{Error, LayoutEngine};

/// Deck-wide defaults.
#[derive(Clone, Debug)]
pub struct DeckOptions {
    /// Default slide width.
    pub width: f64,
    /// Default slide height.
    pub height: f64,
    /// Default slide background.
    pub bg_color: Color,
    /// Overlay merged into the built-in default text style.
    pub text_style: Option<TextStyle>,
    /// Replacement for the built-in code style.
    pub code_style: Option<TextStyle>,
    pub default_code_theme: String,
    pub default_code_language: Option<String>,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            bg_color: Color::WHITE,
            text_style: None,
            code_style: None,
            default_code_theme: "InspiredGitHub".to_owned(),
            default_code_language: None,
        }
    }
}

/// A set of slides sharing resources, styles, and defaults.
pub struct Deck {
    pub(crate) options: DeckOptions,
    pub(crate) styles: Rc<BTreeMap<String, Value<TextStyle>>>,
    pub(crate) slides: Vec<Slide>,
    pub(crate) resources: Resources,
    ids: IdSource,
}

impl std::fmt::Debug for Deck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deck")
            .field("slides", &self.slides.len())
            .field("styles", &self.styles.len())
            .finish()
    }
}

impl Deck {
    /// Creates a deck. The style table starts with `"default"` (the
    /// built-in default merged with `options.text_style`) and `"code"`.
    pub fn new(options: DeckOptions, resources: Resources) -> Result<Self, Error> {
        let mut styles = BTreeMap::new();
        let default = match &options.text_style {
            Some(style) => {
                style.validate()?;
                default_text_style().merge(style)
            }
            None => default_text_style(),
        };
        let code = match &options.code_style {
            Some(style) => {
                style.validate()?;
                style.clone()
            }
            None => default_code_style(),
        };
        styles.insert("default".to_owned(), Value::Const(default));
        styles.insert("code".to_owned(), Value::Const(code));
        Ok(Self {
            options,
            styles: Rc::new(styles),
            slides: Vec::new(),
            resources,
            ids: IdSource::new(),
        })
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    /// Registers a deck-level named style.
    pub fn set_style(
        &mut self,
        name: &str,
        style: impl Into<Value<TextStyle>>,
    ) -> Result<(), Error> {
        let table = Rc::make_mut(&mut self.styles);
        apply_set_style(table, name, style.into())
    }

    /// Merges into a deck-level named style.
    pub fn update_style(&mut self, name: &str, style: TextStyle) -> Result<(), Error> {
        let table = Rc::make_mut(&mut self.styles);
        apply_update_style(table, name, style)
    }

    pub fn get_style(&self, name: &str) -> Option<&Value<TextStyle>> {
        self.styles.get(name)
    }

    /// Appends a slide; unset size and background take the deck
    /// defaults.
    pub fn new_slide(&mut self, mut args: SlideArgs) -> Slide {
        if args.width.is_unset() {
            args.width = Value::Const(self.options.width);
        }
        if args.height.is_unset() {
            args.height = Value::Const(self.options.height);
        }
        if args.bg_color.is_unset() {
            args.bg_color = Value::Const(self.options.bg_color);
        }
        let slide = Slide::with_args(&self.ids, args);
        self.slides.push(slide.clone());
        slide
    }

    /// Creates a slide and immediately runs `build` on it; the
    /// closure-taking sibling of [`new_slide`](Self::new_slide).
    pub fn slide(&mut self, args: SlideArgs, build: impl FnOnce(&Slide)) -> Slide {
        let slide = self.new_slide(args);
        build(&slide);
        slide
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    /// Runs step discovery and page emission, producing the raw scene
    /// of every page in final order (without laying out or rendering).
    pub fn build_pages(&self) -> Result<Vec<RawPage>, Error> {
        compile::build_document(self)
    }

    /// Renders the whole deck.
    ///
    /// With `options.path` set, pages are written to disk (one PDF, or
    /// one file per page for SVG/PNG) and `None` is returned; without a
    /// path the encoded pages come back as `(index, step, bytes)`
    /// outputs.
    pub fn render(
        &self,
        engine: &dyn LayoutEngine,
        backend: &dyn RenderBackend,
        options: &RenderOptions,
    ) -> Result<Option<Vec<PageOutput>>, Error> {
        let pages = self.build_pages()?;
        render::render_document(pages, &self.resources, engine, backend, options)
    }
}
