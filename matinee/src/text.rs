// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text content of a box and its per-step materialisation.

use std::collections::BTreeSet;

use matinee_core::{CollectSteps, Step, TextAlign, Value};
use matinee_text::{
    parse_styled_text, ParseError, ResolvedTextStyle, StyleDelimiters, StyledLine, StyledSpan,
};

use crate::compile::CompileCtx;
use crate::node::StyleRef;
use crate::raw::RawText;
use crate::Error;

/// Text (or code) attached to a box.
#[derive(Clone, Debug)]
pub struct TextContent {
    pub text: Value<String>,
    pub style: Option<StyleRef>,
    pub align: Value<TextAlign>,
    pub is_code: bool,
    pub parse_styles: bool,
    pub delimiters: StyleDelimiters,
    pub syntax_language: Value<String>,
    pub syntax_theme: Value<String>,
}

impl TextContent {
    /// Materialises the text at one step: resolves the style chain
    /// (`default`, then `code` for code content, then the explicit
    /// style), parses inline styles when enabled, and hands the shaper
    /// everything it needs.
    pub(crate) fn to_raw(&self, step: &Step, ctx: &CompileCtx<'_>) -> Result<Option<RawText>, Error> {
        let Some(text) = self.text.get(step) else {
            return Ok(None);
        };

        let mut chain = ctx
            .text_style("default", step)
            .unwrap_or_else(matinee_text::default_text_style);
        if self.is_code {
            if let Some(code) = ctx.text_style("code", step) {
                chain = chain.merge(&code);
            }
        }
        match &self.style {
            None => {}
            Some(StyleRef::Named(name)) => {
                let style = ctx
                    .text_style(name, step)
                    .ok_or_else(|| ParseError::UnknownStyleName(name.clone()))?;
                chain = chain.merge(&style);
            }
            Some(StyleRef::Style(style)) => chain = chain.merge(style),
        }
        let base = chain.resolve_at(step, &ResolvedTextStyle::default());

        let (lines, styles, anchors) = if self.parse_styles {
            let parsed = parse_styled_text(
                text,
                self.delimiters,
                &base,
                |name| {
                    ctx.text_style(name, step)
                        .ok_or_else(|| ParseError::UnknownStyleName(name.to_owned()))
                },
                step,
            )?;
            (parsed.lines, parsed.styles, parsed.anchors)
        } else {
            let lines = text
                .split('\n')
                .map(|line| StyledLine {
                    text: line.to_owned(),
                    spans: vec![StyledSpan {
                        start: 0,
                        length: line.len() as u32,
                        style: 0,
                    }],
                })
                .collect();
            (lines, vec![base], Vec::new())
        };

        Ok(Some(RawText {
            lines,
            styles,
            anchors,
            align: self.align.get(step).copied().unwrap_or_default(),
            syntax_language: if self.is_code {
                self.syntax_language
                    .get(step)
                    .cloned()
                    .or_else(|| ctx.code_language.clone())
            } else {
                None
            },
            syntax_theme: if self.is_code {
                self.syntax_theme
                    .get(step)
                    .cloned()
                    .or_else(|| Some(ctx.code_theme.clone()))
            } else {
                None
            },
        }))
    }
}

impl CollectSteps for TextContent {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.text.collect_steps(out);
        self.align.collect_steps(out);
        self.syntax_language.collect_steps(out);
        self.syntax_theme.collect_steps(out);
        if let Some(StyleRef::Style(style)) = &self.style {
            style.collect_steps(out);
        }
    }
}
