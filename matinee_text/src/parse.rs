// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The inline styled-text parser.
//!
//! `~name{…}` applies the named style to the bracketed content; blocks
//! nest, and the effective style of a run is the stack of open names
//! merged left-to-right over the base style. `~~` escapes a literal
//! `~`. An all-digits name declares an inline anchor instead of a
//! style. Delimiters are configurable per text.

use matinee_core::Step;

use crate::{
    InlineAnchor, ParseError, ResolvedTextStyle, StyledLine, StyledSpan, StyledText, TextStyle,
};

/// The three delimiter characters of the styled-text syntax: escape,
/// opening bracket, closing bracket.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StyleDelimiters {
    pub escape: char,
    pub open: char,
    pub close: char,
}

impl Default for StyleDelimiters {
    fn default() -> Self {
        Self {
            escape: '~',
            open: '{',
            close: '}',
        }
    }
}

enum StackEntry {
    Style(String),
    Anchor(usize),
}

struct Parser<'a> {
    base: &'a ResolvedTextStyle,
    step: &'a Step,
    stack: Vec<StackEntry>,
    /// Unique stacks of open style names, parallel to `styles`.
    stacks: Vec<Vec<String>>,
    styles: Vec<ResolvedTextStyle>,
    anchors: Vec<InlineAnchor>,
    overlays: Vec<(String, TextStyle)>,
}

impl Parser<'_> {
    fn overlay(&self, name: &str) -> Option<&TextStyle> {
        self.overlays
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    fn flush(&mut self, buffer: &mut String, raw_line: &mut String, spans: &mut Vec<StyledSpan>) {
        if buffer.is_empty() {
            return;
        }
        let names: Vec<String> = self
            .stack
            .iter()
            .filter_map(|entry| match entry {
                StackEntry::Style(name) => Some(name.clone()),
                StackEntry::Anchor(_) => None,
            })
            .collect();
        let style = match self.stacks.iter().position(|s| *s == names) {
            Some(index) => index,
            None => {
                let mut merged = TextStyle::new();
                for name in &names {
                    let overlay = self.overlay(name).expect("overlay cached at push");
                    merged = merged.merge(overlay);
                }
                self.styles.push(merged.resolve_at(self.step, self.base));
                self.stacks.push(names);
                self.styles.len() - 1
            }
        };
        spans.push(StyledSpan {
            start: raw_line.len() as u32,
            length: buffer.len() as u32,
            style: style as u32,
        });
        raw_line.push_str(buffer);
        buffer.clear();
    }
}

/// Parses styled text into lines, spans, a unique style table, and the
/// declared inline anchors.
///
/// `provider` resolves a style name to its (possibly stepped) overlay;
/// it is consulted once per distinct name and should return
/// [`ParseError::UnknownStyleName`] for names with no definition.
pub fn parse_styled_text(
    text: &str,
    delimiters: StyleDelimiters,
    base: &ResolvedTextStyle,
    mut provider: impl FnMut(&str) -> Result<TextStyle, ParseError>,
    step: &Step,
) -> Result<StyledText, ParseError> {
    let mut parser = Parser {
        base,
        step,
        stack: Vec::new(),
        stacks: Vec::new(),
        styles: Vec::new(),
        anchors: Vec::new(),
        overlays: Vec::new(),
    };
    let escape_len = delimiters.escape.len_utf8();
    let open_len = delimiters.open.len_utf8();
    let close_len = delimiters.close.len_utf8();

    let mut lines = Vec::new();
    let mut line_count = 0;
    for (line_no, line) in text.split('\n').enumerate() {
        line_count = line_no + 1;
        let mut spans = Vec::new();
        let mut raw_line = String::new();
        let mut buffer = String::new();
        let mut last_pos = 0;
        loop {
            let rest = &line[last_pos..];
            let escape_pos = rest.find(delimiters.escape);
            let close_pos = rest.find(delimiters.close);
            let (rel, is_escape) = match (escape_pos, close_pos) {
                (None, None) => {
                    buffer.push_str(rest);
                    parser.flush(&mut buffer, &mut raw_line, &mut spans);
                    break;
                }
                (Some(e), None) => (e, true),
                (None, Some(c)) => (c, false),
                (Some(e), Some(c)) => {
                    if e < c {
                        (e, true)
                    } else {
                        (c, false)
                    }
                }
            };
            let abs = last_pos + rel;
            buffer.push_str(&line[last_pos..abs]);

            if is_escape {
                let after = abs + escape_len;
                if line[after..].starts_with(delimiters.escape) {
                    buffer.push(delimiters.escape);
                    last_pos = after + escape_len;
                    continue;
                }
                parser.flush(&mut buffer, &mut raw_line, &mut spans);
                let Some(open_rel) = line[after..].find(delimiters.open) else {
                    return Err(ParseError::UnterminatedStyle { line: line_no + 1 });
                };
                let name = &line[after..after + open_rel];
                if name.is_empty() {
                    return Err(ParseError::UnknownStyleName(String::new()));
                }
                if name.bytes().all(|b| b.is_ascii_digit()) {
                    let id = name
                        .parse::<u32>()
                        .map_err(|_| ParseError::UnknownStyleName(name.to_owned()))?;
                    let offset = raw_line.len() as u32;
                    parser.stack.push(StackEntry::Anchor(parser.anchors.len()));
                    parser.anchors.push(InlineAnchor {
                        id,
                        line: line_no as u32,
                        start: offset,
                        end: offset,
                    });
                } else {
                    if parser.overlay(name).is_none() {
                        let overlay = provider(name)?;
                        parser.overlays.push((name.to_owned(), overlay));
                    }
                    parser.stack.push(StackEntry::Style(name.to_owned()));
                }
                last_pos = after + open_rel + open_len;
            } else {
                parser.flush(&mut buffer, &mut raw_line, &mut spans);
                match parser.stack.pop() {
                    None => return Err(ParseError::UnbalancedBracket { line: line_no + 1 }),
                    Some(StackEntry::Style(_)) => {}
                    Some(StackEntry::Anchor(index)) => {
                        if parser.anchors[index].line == line_no as u32 {
                            parser.anchors[index].end = raw_line.len() as u32;
                        }
                    }
                }
                last_pos = abs + close_len;
            }
        }
        // Anchors still open when their line ends are clamped to it.
        for entry in &parser.stack {
            if let StackEntry::Anchor(index) = entry {
                if parser.anchors[*index].line == line_no as u32 {
                    parser.anchors[*index].end = raw_line.len() as u32;
                }
            }
        }
        lines.push(StyledLine {
            text: raw_line,
            spans,
        });
    }

    if !parser.stack.is_empty() {
        return Err(ParseError::UnterminatedStyle { line: line_count });
    }

    Ok(StyledText {
        lines,
        styles: parser.styles,
        anchors: parser.anchors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use matinee_core::Color;

    fn base() -> ResolvedTextStyle {
        ResolvedTextStyle::default()
    }

    fn color_provider(name: &str) -> Result<TextStyle, ParseError> {
        match name {
            "a" | "b" | "c" => Ok(TextStyle::new().with_color(Color::MAGENTA)),
            "big" => Ok(TextStyle::new().with_size(64.0)),
            other => Err(ParseError::UnknownStyleName(other.to_owned())),
        }
    }

    fn parse(text: &str) -> Result<StyledText, ParseError> {
        parse_styled_text(
            text,
            StyleDelimiters::default(),
            &base(),
            color_provider,
            &Step::from(1),
        )
    }

    #[test]
    fn plain_text_is_one_base_span_per_line() {
        let parsed = parse("hello\nworld").unwrap();
        assert_eq!(parsed.lines.len(), 2);
        for (line, source) in parsed.lines.iter().zip(["hello", "world"]) {
            assert_eq!(line.text, source);
            assert_eq!(line.spans.len(), 1);
            assert_eq!(line.spans[0].style, 0);
        }
        assert_eq!(parsed.styles.len(), 1);
        assert_eq!(parsed.styles[0], base());
    }

    #[test]
    fn nested_styles_produce_stacked_spans() {
        let parsed = parse("L0~a{L1~b{L2~c{L3}}}L0").unwrap();
        assert_eq!(parsed.lines.len(), 1);
        let line = &parsed.lines[0];
        assert_eq!(line.text, "L0L1L2L3L0");
        let indexes: Vec<u32> = line.spans.iter().map(|s| s.style).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 0]);
        assert_eq!(parsed.styles.len(), 4);
    }

    #[test]
    fn spans_cover_every_byte() {
        let parsed = parse("héllo ~big{wörld} étc").unwrap();
        for line in &parsed.lines {
            let total: u32 = line.spans.iter().map(|s| s.length).sum();
            assert_eq!(total as usize, line.text.len());
        }
    }

    #[test]
    fn doubled_delimiter_escapes() {
        let parsed = parse("a~~b").unwrap();
        assert_eq!(parsed.lines[0].text, "a~b");
        assert_eq!(parsed.lines[0].spans.len(), 1);
    }

    #[test]
    fn numeric_name_declares_anchor() {
        let parsed = parse("ab~7{cd}e").unwrap();
        assert_eq!(parsed.lines[0].text, "abcde");
        assert_eq!(parsed.anchors.len(), 1);
        let anchor = parsed.anchors[0];
        assert_eq!(anchor.id, 7);
        assert_eq!((anchor.line, anchor.start, anchor.end), (0, 2, 4));
        // The anchored run keeps the surrounding style.
        assert_eq!(parsed.styles.len(), 1);
    }

    #[test]
    fn styles_spanning_lines_keep_the_stack() {
        let parsed = parse("x~a{y\nz}w").unwrap();
        assert_eq!(parsed.lines[1].spans[0].style, 1);
        assert_eq!(parsed.lines[1].spans[1].style, 0);
    }

    #[test]
    fn anchor_spanning_lines_clamps_to_opening_line() {
        let parsed = parse("ab~3{cd\nef}g").unwrap();
        let anchor = parsed.anchors[0];
        assert_eq!((anchor.line, anchor.start, anchor.end), (0, 2, 4));
    }

    #[test]
    fn errors() {
        assert!(matches!(
            parse("x~a{y"),
            Err(ParseError::UnterminatedStyle { line: 1 })
        ));
        assert!(matches!(
            parse("x~a y"),
            Err(ParseError::UnterminatedStyle { line: 1 })
        ));
        assert!(matches!(
            parse("x}y"),
            Err(ParseError::UnbalancedBracket { line: 1 })
        ));
        assert!(matches!(
            parse("~nope{x}"),
            Err(ParseError::UnknownStyleName(_))
        ));
    }
}
