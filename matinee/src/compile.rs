// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Step discovery and per-step scene materialisation.
//!
//! Compilation is two passes over the read-only tree. Discovery walks
//! every stepped attribute to gather the slide's step set (loading
//! referenced images along the way); emission then materialises an
//! immutable [`RawPage`] per visible step, interleaving subslides and
//! advancing counters as it goes.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use matinee_core::{CollectSteps, Color, Length, LengthAuto, Step, Value};
use matinee_text::TextStyle;

use crate::counters::CounterStorage;
use crate::debug;
use crate::deck::Deck;
use crate::image::ImageManager;
use crate::node::{Child, Content, DebugLayout, GridPlacement, Node};
use crate::raw::{DebugEntry, RawContent, RawGrid, RawItem, RawNode, RawPage};
use crate::slide::Slide;
use crate::Error;

/// Samples a visibility flag: unset means shown; a stepped schedule
/// with no boundary at or before the step means hidden.
pub(crate) fn show_at(value: &Value<bool>, step: &Step) -> bool {
    match value {
        Value::Unset => true,
        v => v.get(step).copied().unwrap_or(false),
    }
}

/// Context threaded through materialisation: the style scope stack
/// (deck table first), code defaults, the shared image table, the
/// current z-level, and the active debug-layout color.
#[derive(Clone)]
pub(crate) struct CompileCtx<'a> {
    pub(crate) styles: Vec<Rc<BTreeMap<String, Value<TextStyle>>>>,
    pub(crate) code_theme: String,
    pub(crate) code_language: Option<String>,
    pub(crate) images: &'a ImageManager,
    pub(crate) z_level: i32,
    pub(crate) debug_layout: Option<Color>,
}

impl CompileCtx<'_> {
    /// Resolves a named style by walking the scope stack outside-in,
    /// merging every matching entry at the given step.
    pub(crate) fn text_style(&self, name: &str, step: &Step) -> Option<TextStyle> {
        let mut result: Option<TextStyle> = None;
        for table in &self.styles {
            if let Some(entry) = table.get(name) {
                if let Some(style) = entry.get(step) {
                    result = Some(match result {
                        None => style.clone(),
                        Some(acc) => acc.merge(style),
                    });
                }
            }
        }
        result
    }
}

/// Materialises one box (and its subtree) at one step.
pub(crate) fn box_to_raw(
    node: &Node,
    step: &Step,
    ctx: &CompileCtx<'_>,
    debug_entries: &mut Vec<DebugEntry>,
) -> Result<RawNode, Error> {
    let inner = node.borrow();
    let attrs = &inner.attrs;

    let mut ctx = ctx.clone();
    if let Some(styles) = &inner.styles {
        ctx.styles.push(Rc::new(styles.clone()));
    }
    if let Some(z) = attrs.z_level.get(step) {
        ctx.z_level = *z;
    }

    let debug_color = match attrs.debug_layout {
        DebugLayout::Inherit => ctx.debug_layout,
        DebugLayout::Off => None,
        DebugLayout::Color(color) => Some(color),
    };
    if let Some(color) = debug_color {
        debug_entries.push(DebugEntry {
            node: inner.id,
            color,
            name: attrs.name.clone(),
        });
    }

    let content = match &inner.content {
        None => None,
        Some(Content::Text(text)) => text.to_raw(step, &ctx)?.map(RawContent::Text),
        Some(Content::Image(image)) => image.to_raw(step, ctx.images).map(RawContent::Image),
    };

    let grid = attrs.grid.get(step).map(|grid| RawGrid {
        template_rows: grid.template_rows.get(step).cloned().unwrap_or_default(),
        template_columns: grid.template_columns.get(step).cloned().unwrap_or_default(),
        row: grid.row.get(step).copied().unwrap_or(GridPlacement::Auto),
        column: grid.column.get(step).copied().unwrap_or(GridPlacement::Auto),
    });

    Ok(RawNode {
        node_id: inner.id,
        x: attrs.x.get(step).cloned(),
        y: attrs.y.get(step).cloned(),
        width: attrs.width.get(step).cloned(),
        height: attrs.height.get(step).cloned(),
        show: show_at(&attrs.show, step),
        z_level: ctx.z_level,
        bg_color: attrs.bg_color.get(step).copied(),
        border_radius: attrs.border_radius.get(step).copied().unwrap_or(0.0),
        row: attrs.row.get(step).copied().unwrap_or(false),
        reverse: attrs.reverse.get(step).copied().unwrap_or(false),
        p_left: attrs.p_left.get(step).copied().unwrap_or(Length::ZERO),
        p_right: attrs.p_right.get(step).copied().unwrap_or(Length::ZERO),
        p_top: attrs.p_top.get(step).copied().unwrap_or(Length::ZERO),
        p_bottom: attrs.p_bottom.get(step).copied().unwrap_or(Length::ZERO),
        m_left: margin_at(&attrs.m_left, step),
        m_right: margin_at(&attrs.m_right, step),
        m_top: margin_at(&attrs.m_top, step),
        m_bottom: margin_at(&attrs.m_bottom, step),
        flex_grow: attrs.flex_grow.get(step).copied().unwrap_or(0.0),
        flex_shrink: attrs.flex_shrink.get(step).copied().unwrap_or(1.0),
        align_items: attrs.align_items.get(step).copied(),
        align_self: attrs.align_self.get(step).copied(),
        justify_self: attrs.justify_self.get(step).copied(),
        align_content: attrs.align_content.get(step).copied(),
        justify_content: attrs.justify_content.get(step).copied(),
        gap_x: attrs.gap_x.get(step).copied().unwrap_or(Length::ZERO),
        gap_y: attrs.gap_y.get(step).copied().unwrap_or(Length::ZERO),
        grid,
        url: attrs.url.get(step).cloned(),
        name: attrs.name.clone(),
        content,
        children: children_to_raw(&inner.children, step, &ctx, debug_entries)?,
    })
}

fn margin_at(value: &Value<LengthAuto>, step: &Step) -> LengthAuto {
    value.get(step).copied().unwrap_or(LengthAuto::Points(0.0))
}

fn children_to_raw(
    children: &[Value<Child>],
    step: &Step,
    ctx: &CompileCtx<'_>,
    debug_entries: &mut Vec<DebugEntry>,
) -> Result<Vec<RawItem>, Error> {
    let mut items = Vec::new();
    for value in children {
        let Some(child) = value.get(step) else {
            continue;
        };
        match child {
            Child::Node(node) => {
                if show_at(&node.borrow().attrs.active, step) {
                    items.push(RawItem::Node(box_to_raw(node, step, ctx, debug_entries)?));
                }
            }
            Child::Rect(rect) => {
                if let Some(shape) = rect.to_raw(step, ctx.z_level) {
                    items.push(RawItem::Shape(shape));
                }
            }
            Child::Oval(oval) => {
                if let Some(shape) = oval.to_raw(step, ctx.z_level) {
                    items.push(RawItem::Shape(shape));
                }
            }
            Child::Path(path) => {
                if let Some(shape) = path.to_raw(step, ctx.z_level) {
                    items.push(RawItem::Shape(shape));
                }
            }
        }
    }
    Ok(items)
}

/// Materialises one page of a slide.
pub(crate) fn slide_to_raw(
    slide: &Slide,
    step: &Step,
    deck: &Deck,
    images: &ImageManager,
) -> Result<RawPage, Error> {
    let inner = slide.borrow();
    let width = inner
        .width
        .get(step)
        .copied()
        .unwrap_or(deck.options.width);
    let mut height = inner
        .height
        .get(step)
        .copied()
        .unwrap_or(deck.options.height);
    let bg_color = inner
        .bg_color
        .get(step)
        .copied()
        .unwrap_or(deck.options.bg_color);

    let ctx = CompileCtx {
        styles: vec![deck.styles.clone()],
        code_theme: deck.options.default_code_theme.clone(),
        code_language: deck.options.default_code_language.clone(),
        images,
        z_level: 0,
        debug_layout: inner.debug_layout,
    };

    let mut debug_entries = Vec::new();
    let mut root = box_to_raw(&inner.root, step, &ctx, &mut debug_entries)?;

    if inner.debug_steps {
        let ids = inner.root.ids();
        height += debug::DEBUG_STEPS_FRAME_HEIGHT;
        root = debug::wrap_with_step_strip(root, step, width, height, &ids);
    }

    Ok(RawPage {
        index: 0,
        step: step.clone(),
        width,
        height,
        bg_color,
        root,
        debug_entries,
    })
}

/// Discovers the ordered visible steps of a slide, loading referenced
/// images into the shared table.
pub(crate) fn collect_slide_steps(
    slide: &Slide,
    images: &mut ImageManager,
) -> Result<Vec<Step>, Error> {
    let inner = slide.borrow();
    let mut steps = inner.init_steps.clone();
    inner.width.collect_steps(&mut steps);
    inner.height.collect_steps(&mut steps);
    inner.bg_color.collect_steps(&mut steps);
    discover_node(&inner.root, images, &mut steps)?;
    steps.extend(inner.extra_steps.iter().cloned());
    steps.extend(inner.subslides.keys().cloned());

    let ignored = inner.ignored_steps.clone();
    Ok(steps
        .into_iter()
        .filter(|step| {
            step.is_visible()
                && !ignored
                    .as_ref()
                    .is_some_and(|schedule| schedule.get(step).copied().unwrap_or(false))
        })
        .collect())
}

fn discover_node(
    node: &Node,
    images: &mut ImageManager,
    out: &mut BTreeSet<Step>,
) -> Result<(), Error> {
    let inner = node.borrow();
    inner.attrs.collect_steps(out);
    if let Some(styles) = &inner.styles {
        styles.collect_steps(out);
    }
    match &inner.content {
        None => {}
        Some(Content::Text(text)) => text.collect_steps(out),
        Some(Content::Image(image)) => image.discover(images, out)?,
    }
    for value in &inner.children {
        match value {
            Value::Unset => {}
            Value::Const(child) => discover_child(child, images, out)?,
            Value::Steps(stepped) => {
                match stepped.named_steps() {
                    Some(named) => out.extend(named.iter().cloned()),
                    None => out.extend(stepped.key_steps().cloned()),
                }
                for key in stepped.key_steps().cloned().collect::<Vec<_>>() {
                    if let Some(child) = stepped.get(&key) {
                        discover_child(child, images, out)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn discover_child(
    child: &Child,
    images: &mut ImageManager,
    out: &mut BTreeSet<Step>,
) -> Result<(), Error> {
    match child {
        Child::Node(node) => discover_node(node, images, out),
        Child::Rect(rect) => {
            rect.collect_steps(out);
            Ok(())
        }
        Child::Oval(oval) => {
            oval.collect_steps(out);
            Ok(())
        }
        Child::Path(path) => {
            path.collect_steps(out);
            Ok(())
        }
    }
}

/// A slide's discovered steps plus the plans of its subslides.
pub(crate) struct SlidePlan {
    slide: Slide,
    steps: Vec<Step>,
    subplans: BTreeMap<Step, Vec<SlidePlan>>,
}

fn plan_slide(slide: &Slide, images: &mut ImageManager) -> Result<SlidePlan, Error> {
    let steps = collect_slide_steps(slide, images)?;
    let subslides = slide.borrow().subslides.clone();
    let mut subplans = BTreeMap::new();
    for (anchor, subs) in subslides {
        let plans = subs
            .iter()
            .map(|sub| plan_slide(sub, images))
            .collect::<Result<Vec<_>, _>>()?;
        subplans.insert(anchor, plans);
    }
    Ok(SlidePlan {
        slide: slide.clone(),
        steps,
        subplans,
    })
}

fn count_plan(plan: &SlidePlan, counters: &mut CounterStorage) {
    let names = plan.slide.borrow().counters.clone();
    counters.advance_slide(&names);
    for step in &plan.steps {
        if let Some(subs) = plan.subplans.get(step) {
            for sub in subs {
                count_plan(sub, counters);
            }
        }
        counters.advance_page(&names);
    }
}

fn emit_plan(
    plan: &SlidePlan,
    deck: &Deck,
    images: &ImageManager,
    current: &mut CounterStorage,
    total: &CounterStorage,
    pages: &mut Vec<RawPage>,
) -> Result<(), Error> {
    let names = plan.slide.borrow().counters.clone();
    current.advance_slide(&names);
    for step in &plan.steps {
        // Subslides anchored at this step come right before its page.
        if let Some(subs) = plan.subplans.get(step) {
            for sub in subs {
                emit_plan(sub, deck, images, current, total, pages)?;
            }
        }
        current.advance_page(&names);
        let hook = plan.slide.borrow().postprocess.clone();
        let page_slide = match hook {
            Some(hook) => {
                let copy = plan.slide.shallow_copy();
                hook(&copy, current, total);
                copy
            }
            None => plan.slide.clone(),
        };
        let mut page = slide_to_raw(&page_slide, step, deck, images)?;
        page.index = pages.len();
        tracing::debug!(
            page = page.index,
            step = %page.step,
            slide = %plan.slide.name(),
            "materialised page"
        );
        pages.push(page);
    }
    Ok(())
}

/// Runs discovery and emission for the whole deck, producing every
/// page's raw scene in final order.
pub(crate) fn build_document(deck: &Deck) -> Result<Vec<RawPage>, Error> {
    let mut images = ImageManager::new();
    let plans = deck
        .slides
        .iter()
        .map(|slide| plan_slide(slide, &mut images))
        .collect::<Result<Vec<_>, _>>()?;

    let mut total = CounterStorage::new();
    for plan in &plans {
        count_plan(plan, &mut total);
    }

    let mut current = CounterStorage::new();
    let mut pages = Vec::new();
    for plan in &plans {
        emit_plan(plan, deck, &images, &mut current, &total, &mut pages)?;
    }
    Ok(pages)
}
