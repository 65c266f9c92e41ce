// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use matinee::{Deck, OutputFormat, PageOutput, RenderOptions};
use matinee_dev::{BasicLayout, PlainBackend};

/// Renders every page of the deck to SVG through the dev stubs and
/// returns the outputs in page order.
pub(crate) fn render_svg(deck: &Deck) -> Vec<PageOutput> {
    deck.render(
        &BasicLayout,
        &PlainBackend,
        &RenderOptions {
            format: OutputFormat::Svg,
            ..Default::default()
        },
    )
    .expect("render should succeed")
    .expect("no path given, outputs returned")
}

pub(crate) fn page_text(output: &PageOutput) -> String {
    String::from_utf8(output.data.clone()).expect("svg output is UTF-8")
}
