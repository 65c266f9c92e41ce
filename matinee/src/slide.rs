// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slides: page templates that emit one page per visible step.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use matinee_core::{parse_step_selector, Color, Step, StepVal, Value};

use crate::compile;
use crate::counters::CounterStorage;
use crate::image::ImageManager;
use crate::node::{BoxArgs, BoxBuilder, IdSource, Node};
use crate::{Coord, Error};

/// A hook run on a shallow copy of the slide just before each of its
/// pages is materialised, typically to stamp counter values.
pub type PostprocessFn = dyn Fn(&Slide, &CounterStorage, &CounterStorage);

/// Options for creating a slide. Unset width, height, and background
/// fall back to the deck defaults (or, for subslides, the parent's).
#[derive(Clone, Debug, Default)]
pub struct SlideArgs {
    pub width: Value<f64>,
    pub height: Value<f64>,
    pub bg_color: Value<Color>,
    pub name: String,
    /// Steps the slide has even without stepped content.
    pub init_steps: Vec<Step>,
    /// Counters to advance besides `"global"`.
    pub counters: Vec<String>,
    /// Draw the step label strip under every page.
    pub debug_steps: bool,
    /// Draw layout frames over every box, in this color.
    pub debug_layout: Option<Color>,
}

impl SlideArgs {
    fn init_steps_or_default(&self) -> BTreeSet<Step> {
        if self.init_steps.is_empty() {
            [Step::from(1)].into_iter().collect()
        } else {
            self.init_steps.iter().cloned().collect()
        }
    }
}

pub(crate) struct SlideInner {
    pub(crate) width: Value<f64>,
    pub(crate) height: Value<f64>,
    pub(crate) bg_color: Value<Color>,
    pub(crate) name: String,
    pub(crate) counters: Vec<String>,
    pub(crate) debug_steps: bool,
    pub(crate) debug_layout: Option<Color>,
    pub(crate) init_steps: BTreeSet<Step>,
    pub(crate) extra_steps: BTreeSet<Step>,
    pub(crate) ignored_steps: Option<StepVal<bool>>,
    pub(crate) postprocess: Option<Rc<PostprocessFn>>,
    pub(crate) subslides: BTreeMap<Step, Vec<Slide>>,
    pub(crate) root: Node,
}

/// A shared handle to one slide.
#[derive(Clone)]
pub struct Slide(Rc<RefCell<SlideInner>>);

impl std::fmt::Debug for Slide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.0.borrow();
        f.debug_struct("Slide")
            .field("name", &inner.name)
            .field("init_steps", &inner.init_steps)
            .finish()
    }
}

impl Slide {
    pub(crate) fn with_args(ids: &IdSource, args: SlideArgs) -> Self {
        let root = Node::with_args(
            ids,
            BoxArgs {
                width: args.width.map(|w| Coord::Points(*w)),
                height: args.height.map(|h| Coord::Points(*h)),
                name: args.name.clone(),
                ..Default::default()
            },
        );
        Self(Rc::new(RefCell::new(SlideInner {
            init_steps: args.init_steps_or_default(),
            width: args.width,
            height: args.height,
            bg_color: args.bg_color,
            name: args.name,
            counters: args.counters,
            debug_steps: args.debug_steps,
            debug_layout: args.debug_layout,
            extra_steps: BTreeSet::new(),
            ignored_steps: None,
            postprocess: None,
            subslides: BTreeMap::new(),
            root,
        })))
    }

    pub(crate) fn borrow(&self) -> std::cell::Ref<'_, SlideInner> {
        self.0.borrow()
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// Forces an extra step into the slide's step set.
    pub fn insert_step(&self, step: Step) {
        self.0.borrow_mut().extra_steps.insert(step);
    }

    /// Drops every discovered step the selector matches.
    ///
    /// The predicate also applies to `init_steps` seeds.
    pub fn ignore_steps(&self, selector: &str) -> Result<(), Error> {
        let schedule = parse_step_selector(selector)?;
        self.0.borrow_mut().ignored_steps = Some(schedule);
        Ok(())
    }

    /// Installs the postprocess hook.
    pub fn set_postprocess(
        &self,
        hook: impl Fn(&Slide, &CounterStorage, &CounterStorage) + 'static,
    ) {
        self.0.borrow_mut().postprocess = Some(Rc::new(hook));
    }

    /// Nests a slide at an anchor step: its pages are emitted just
    /// before this slide's page at that step. Unset size and background
    /// inherit from this slide.
    pub fn new_slide_at(&self, step: Step, mut args: SlideArgs) -> Slide {
        let ids = self.node().ids();
        {
            let inner = self.0.borrow();
            if args.width.is_unset() {
                args.width = inner.width.clone();
            }
            if args.height.is_unset() {
                args.height = inner.height.clone();
            }
            if args.bg_color.is_unset() {
                args.bg_color = inner.bg_color.clone();
            }
        }
        let subslide = Slide::with_args(&ids, args);
        self.0
            .borrow_mut()
            .subslides
            .entry(step)
            .or_default()
            .push(subslide.clone());
        subslide
    }

    /// The ordered visible steps this slide will emit pages for.
    ///
    /// Performs a full step discovery, loading referenced images into a
    /// scratch table.
    pub fn get_steps(&self) -> Result<Vec<Step>, Error> {
        let mut images = ImageManager::new();
        compile::collect_slide_steps(self, &mut images)
    }

    /// A copy whose child list (and subtree handles) are shared but
    /// independently extendable; used for the postprocess hook.
    pub(crate) fn shallow_copy(&self) -> Slide {
        let inner = self.0.borrow();
        Self(Rc::new(RefCell::new(SlideInner {
            width: inner.width.clone(),
            height: inner.height.clone(),
            bg_color: inner.bg_color.clone(),
            name: inner.name.clone(),
            counters: inner.counters.clone(),
            debug_steps: inner.debug_steps,
            debug_layout: inner.debug_layout,
            init_steps: inner.init_steps.clone(),
            extra_steps: inner.extra_steps.clone(),
            ignored_steps: inner.ignored_steps.clone(),
            postprocess: None,
            subslides: inner.subslides.clone(),
            root: inner.root.shallow_copy(),
        })))
    }
}

impl BoxBuilder for Slide {
    fn node(&self) -> Node {
        self.0.borrow().root.clone()
    }
}
