// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use matinee::{
    BoxArgs, BoxBuilder, Color, CounterStorage, Deck, DeckOptions, OutputFormat, RenderOptions,
    Resources, Slide, SlideArgs, Step, TextArgs,
};
use matinee_dev::{BasicLayout, PlainBackend};

use crate::util::{page_text, render_svg};

fn deck() -> Deck {
    Deck::new(DeckOptions::default(), Resources::new()).unwrap()
}

#[test]
fn subslides_interleave_before_their_anchor_step() {
    let mut deck = deck();
    let parent = deck.new_slide(SlideArgs {
        init_steps: vec![Step::from(1), Step::from(2), Step::from(3)],
        ..Default::default()
    });
    let sub = parent.new_slide_at(
        Step::from(3),
        SlideArgs {
            width: 500.0.into(),
            height: 300.0.into(),
            init_steps: vec![Step::from(1), Step::from(2)],
            ..Default::default()
        },
    );
    sub.text("nested", TextArgs::default()).unwrap();

    let pages = deck.build_pages().unwrap();
    let sequence: Vec<(f64, Step)> = pages.iter().map(|p| (p.width, p.step.clone())).collect();
    assert_eq!(
        sequence,
        vec![
            (1024.0, Step::from(1)),
            (1024.0, Step::from(2)),
            (500.0, Step::from(1)),
            (500.0, Step::from(2)),
            (1024.0, Step::from(3)),
        ]
    );
    let indexes: Vec<usize> = pages.iter().map(|p| p.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
}

#[test]
fn global_counters_reach_the_postprocess_hook() {
    let mut deck = deck();
    deck.new_slide(SlideArgs::default());
    let middle = deck.new_slide(SlideArgs {
        init_steps: vec![Step::from(1), Step::from(2)],
        ..Default::default()
    });
    middle.set_postprocess(
        |slide: &Slide, current: &CounterStorage, total: &CounterStorage| {
            let text = format!(
                "{}/{} {}/{}",
                current.global().slide,
                total.global().slide,
                current.global().page,
                total.global().page,
            );
            slide.text(text, TextArgs::default()).unwrap();
        },
    );
    deck.new_slide(SlideArgs::default());

    let outputs = render_svg(&deck);
    assert_eq!(outputs.len(), 4);
    assert!(page_text(&outputs[1]).contains("2/3 2/4"));
    assert!(page_text(&outputs[2]).contains("2/3 3/4"));
    // The stamp never leaks onto other slides or future steps.
    assert!(!page_text(&outputs[0]).contains("/4"));
    assert!(!page_text(&outputs[3]).contains("/4"));
}

#[test]
fn insert_and_ignore_steps_shape_the_step_set() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    slide.new_box(BoxArgs {
        show: matinee::Value::Steps(matinee::parse_step_selector("1-4").unwrap()),
        ..Default::default()
    });
    slide.insert_step(Step::from(6));
    slide.ignore_steps("3").unwrap();

    assert_eq!(
        slide.get_steps().unwrap(),
        vec![Step::from(1), Step::from(2), Step::from(4), Step::from(6)]
    );
}

#[test]
fn code_lines_are_step_gated() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    slide
        .code(
            "fn main() {\n    boot(); %%2+\n}",
            matinee::CodeArgs {
                step_marker: Some("%%".to_owned()),
                ..Default::default()
            },
        )
        .unwrap();

    let pages = deck.build_pages().unwrap();
    assert_eq!(pages.len(), 2);

    let code_text = |page: &matinee::RawPage| -> Vec<String> {
        let matinee::RawItem::Node(node) = &page.root.children[0] else {
            panic!("expected the code box");
        };
        let Some(matinee::RawContent::Text(text)) = &node.content else {
            panic!("expected code content");
        };
        assert_eq!(text.syntax_theme.as_deref(), Some("InspiredGitHub"));
        text.lines.iter().map(|l| l.text.clone()).collect()
    };
    assert_eq!(code_text(&pages[0]), vec!["fn main() {", "}"]);
    assert_eq!(code_text(&pages[1]), vec!["fn main() {", "    boot(); ", "}"]);
}

#[test]
fn images_register_and_materialise() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pic.png");
    let mut png = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    png.extend_from_slice(&13_u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&640_u32.to_be_bytes());
    png.extend_from_slice(&480_u32.to_be_bytes());
    std::fs::write(&path, png).unwrap();

    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs::default());
    slide.image(path, matinee::ImageArgs::default());

    let pages = deck.build_pages().unwrap();
    let matinee::RawItem::Node(node) = &pages[0].root.children[0] else {
        panic!("expected the image box");
    };
    let Some(matinee::RawContent::Image(image)) = &node.content else {
        panic!("expected image content");
    };
    assert_eq!(image.width, Some(640.0));
    assert_eq!(image.height, Some(480.0));
    assert_eq!(image.step, Some(Step::from(1)));
}

#[test]
fn debug_layout_frame_matches_resolved_geometry() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs {
        debug_layout: Some(Color::MAGENTA),
        ..Default::default()
    });
    slide.new_box(BoxArgs {
        x: 10.0.into(),
        y: 20.0.into(),
        width: 50.0.into(),
        height: 40.0.into(),
        name: "hero".to_owned(),
        ..Default::default()
    });

    let outputs = render_svg(&deck);
    let svg = page_text(&outputs[0]);
    assert!(svg.contains(r#"<rect x="10" y="20" width="50" height="40" fill="none" stroke="#ff00ff""#));
    assert!(svg.contains("hero [50x40]"));
}

#[test]
fn debug_steps_strip_extends_the_page() {
    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs {
        debug_steps: true,
        ..Default::default()
    });
    slide.text("content", TextArgs::default()).unwrap();

    let pages = deck.build_pages().unwrap();
    assert_eq!(pages[0].height, 768.0 + 20.0);
    let outputs = render_svg(&deck);
    let svg = page_text(&outputs[0]);
    // The strip carries the step label in the extended region.
    assert!(svg.contains(">1</text>"));
}

#[test]
fn missing_font_fails_the_render() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("OnlyFont.ttf"), b"stub").unwrap();

    let mut resources = Resources::new();
    resources.load_fonts_dir(dir.path()).unwrap();
    let mut deck = Deck::new(DeckOptions::default(), resources).unwrap();
    let slide = deck.new_slide(SlideArgs::default());
    slide
        .text(
            "x",
            TextArgs {
                style: Some(matinee::TextStyle::new().with_font("NotInstalled").into()),
                ..Default::default()
            },
        )
        .unwrap();

    let result = deck.render(
        &BasicLayout,
        &PlainBackend,
        &RenderOptions {
            format: OutputFormat::Svg,
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(matinee::Error::FontNotFound(_))));
}

#[test]
fn pdf_written_to_disk_combines_pages() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("deck.pdf");

    let mut deck = deck();
    let slide = deck.new_slide(SlideArgs {
        init_steps: vec![Step::from(1), Step::from(2)],
        ..Default::default()
    });
    slide.text("pages", TextArgs::default()).unwrap();

    let returned = deck
        .render(
            &BasicLayout,
            &PlainBackend,
            &RenderOptions {
                path: Some(file.clone()),
                format: OutputFormat::Pdf,
                compression_level: 3,
                ..Default::default()
            },
        )
        .unwrap();
    assert!(returned.is_none());
    let written = std::fs::read_to_string(&file).unwrap();
    assert!(written.starts_with("%matinee-document pages=2 compression=3"));
}
