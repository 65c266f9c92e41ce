// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use matinee::{
    parse_step_selector, BoxArgs, BoxBuilder, Coord, Deck, DeckOptions, Path, RawContent, RawItem,
    Resources, SlideArgs, Step, Stroke, TextArgs, TextStyle, Value,
};

use crate::util::{page_text, render_svg};

fn deck() -> Deck {
    Deck::new(DeckOptions::default(), Resources::new()).unwrap()
}

fn show(selector: &str) -> Value<bool> {
    Value::Steps(parse_step_selector(selector).unwrap())
}

#[test]
fn hello_world_renders_one_page() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    slide.text("Hello world!", TextArgs::default()).unwrap();

    let outputs = render_svg(&deck);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].step, Step::from(1));
    assert!(!outputs[0].data.is_empty());
    assert!(page_text(&outputs[0]).contains("Hello world!"));
}

#[test]
fn step_fragments_emit_one_page_per_step() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    for selector in ["1", "2+", "3+"] {
        slide.new_box(BoxArgs {
            show: show(selector),
            width: 10.0.into(),
            height: 10.0.into(),
            ..Default::default()
        });
    }

    let pages = deck.build_pages().unwrap();
    assert_eq!(pages.len(), 3);

    let expected = [
        [true, false, false],
        [true, true, false],
        [true, true, true],
    ];
    for (page, visibility) in pages.iter().zip(expected) {
        let shown: Vec<bool> = page
            .root
            .children
            .iter()
            .map(|child| match child {
                RawItem::Node(node) => node.show,
                RawItem::Shape(_) => panic!("no shapes on this slide"),
            })
            .collect();
        assert_eq!(shown, visibility, "at step {}", page.step);
    }
}

#[test]
fn nested_named_styles_stack() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    for name in ["a", "b", "c"] {
        slide
            .set_style(
                name,
                TextStyle::new().with_color("#ff0000".parse::<matinee::Color>().unwrap()),
            )
            .unwrap();
    }
    slide
        .text("L0~a{L1~b{L2~c{L3}}}L0", TextArgs::default())
        .unwrap();

    let pages = deck.build_pages().unwrap();
    let RawItem::Node(node) = &pages[0].root.children[0] else {
        panic!("expected the text box");
    };
    let Some(RawContent::Text(text)) = &node.content else {
        panic!("expected text content");
    };
    assert_eq!(text.lines.len(), 1);
    assert_eq!(text.lines[0].text, "L0L1L2L3L0");
    let styles: Vec<u32> = text.lines[0].spans.iter().map(|s| s.style).collect();
    assert_eq!(styles, vec![0, 1, 2, 3, 0]);
}

#[test]
fn layout_expression_arrow_hits_resolved_geometry() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs {
        width: 200.0.into(),
        height: 200.0.into(),
        ..Default::default()
    });
    let b1 = slide.new_box(BoxArgs {
        x: 10.0.into(),
        y: 20.0.into(),
        width: 50.0.into(),
        height: 40.0.into(),
        ..Default::default()
    });
    let b2 = slide.new_box(BoxArgs {
        x: 100.0.into(),
        y: 100.0.into(),
        width: 20.0.into(),
        height: 20.0.into(),
        ..Default::default()
    });

    let start = b2.p(0.0, 0.5);
    let path = Path::new()
        .with_stroke(Stroke::new("black".parse().unwrap()))
        .move_to(start.x, start.y)
        .line_to(Coord::Expr(b2.x(0.0) - 30.0), Coord::Expr(b1.y(0.5)));
    slide.add(path);

    let outputs = render_svg(&deck);
    // b2 at (100, 100) 20x20; b1 at (10, 20) 50x40.
    assert!(page_text(&outputs[0]).contains(r#"d="M 100 110 L 70 40""#));
}
