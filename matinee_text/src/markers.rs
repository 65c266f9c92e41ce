// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-line step gating for code blocks.
//!
//! A line ending in `<marker> SELECTOR` is only present at the steps
//! the selector matches; the marker and everything after it are
//! stripped. A mode prefix separated by `;` adjusts the behavior:
//! `n` inverts the selector, `e` keeps an empty line in place of a
//! hidden one, `en` does both. A marker with an empty selector inherits
//! the previous gated line's selector and mode.

use std::collections::{BTreeMap, BTreeSet};

use matinee_core::{parse_step_selector, Step, StepVal};

use crate::ParseError;

const MODES: [&str; 3] = ["e", "n", "en"];

#[derive(Clone)]
struct Gate {
    schedule: StepVal<bool>,
    negate: bool,
    add_empty: bool,
}

impl Gate {
    fn shows(&self, step: &Step) -> bool {
        self.negate ^ self.schedule.get(step).copied().unwrap_or(false)
    }
}

struct GatedLine {
    text: String,
    gate: Option<Gate>,
}

/// Parses step markers out of a code block, producing the text visible
/// at each step.
///
/// The result always has a value at step 1; its named steps are the
/// union of the line selectors' named steps.
pub fn parse_step_markers(text: &str, marker: &str) -> Result<StepVal<String>, ParseError> {
    assert!(!marker.is_empty(), "step marker must not be empty");

    let mut lines: Vec<GatedLine> = Vec::new();
    let mut steps: BTreeSet<Step> = BTreeSet::new();
    let mut named: BTreeSet<Step> = BTreeSet::new();
    let mut previous: Option<Gate> = None;

    for line in text.split('\n') {
        let Some(at) = line.rfind(marker) else {
            lines.push(GatedLine {
                text: line.to_owned(),
                gate: None,
            });
            continue;
        };
        let content = &line[..at];
        let rest = &line[at + marker.len()..];

        let (mode, selector) = match rest.split_once(';') {
            Some((mode, selector)) => {
                let mode = mode.trim();
                if !MODES.contains(&mode) {
                    return Err(ParseError::InvalidModeFlag(mode.to_owned()));
                }
                (mode, selector)
            }
            None => ("", rest),
        };

        let gate = if selector.trim().is_empty() {
            match &previous {
                Some(gate) => gate.clone(),
                None => {
                    // A bare marker with nothing to inherit gates nothing.
                    lines.push(GatedLine {
                        text: content.to_owned(),
                        gate: None,
                    });
                    continue;
                }
            }
        } else {
            Gate {
                schedule: parse_step_selector(selector.trim())?,
                negate: mode.contains('n'),
                add_empty: mode.contains('e'),
            }
        };

        steps.extend(gate.schedule.key_steps().cloned());
        if let Some(n) = gate.schedule.named_steps() {
            named.extend(n.iter().cloned());
        }
        previous = Some(gate.clone());
        lines.push(GatedLine {
            text: content.to_owned(),
            gate: Some(gate),
        });
    }

    steps.insert(Step::from(1));
    let mut values: BTreeMap<Step, String> = BTreeMap::new();
    for step in steps {
        let mut visible = Vec::new();
        for line in &lines {
            match &line.gate {
                None => visible.push(line.text.as_str()),
                Some(gate) => {
                    if gate.shows(&step) {
                        visible.push(line.text.as_str());
                    } else if gate.add_empty {
                        visible.push("");
                    }
                }
            }
        }
        values.insert(step, visible.join("\n"));
    }

    Ok(values
        .into_iter()
        .collect::<StepVal<String>>()
        .with_named_steps(named))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ungated_text_is_constant() {
        let gated = parse_step_markers("a\nb", "%%").unwrap();
        assert_eq!(gated.get(&Step::from(1)), Some(&"a\nb".to_owned()));
        assert_eq!(gated.key_steps().count(), 1);
    }

    #[test]
    fn lines_appear_at_their_steps() {
        let gated = parse_step_markers("a\nb %%2+\nc %%3", "%%").unwrap();
        assert_eq!(gated.get(&Step::from(1)), Some(&"a".to_owned()));
        assert_eq!(gated.get(&Step::from(2)), Some(&"a\nb ".to_owned()));
        assert_eq!(gated.get(&Step::from(3)), Some(&"a\nb \nc ".to_owned()));
        assert_eq!(gated.get(&Step::from(4)), Some(&"a\nb ".to_owned()));
    }

    #[test]
    fn empty_mode_keeps_blank_line() {
        let gated = parse_step_markers("a\nb %%e; 2+", "%%").unwrap();
        assert_eq!(gated.get(&Step::from(1)), Some(&"a\n".to_owned()));
        assert_eq!(gated.get(&Step::from(2)), Some(&"a\nb ".to_owned()));
    }

    #[test]
    fn negate_mode_inverts_the_predicate() {
        let gated = parse_step_markers("a %%n; 2+", "%%").unwrap();
        assert_eq!(gated.get(&Step::from(1)), Some(&"a ".to_owned()));
        assert_eq!(gated.get(&Step::from(2)), Some(&String::new()));
    }

    #[test]
    fn empty_selector_inherits_previous() {
        let gated = parse_step_markers("a %%2+\nb %%", "%%").unwrap();
        assert_eq!(gated.get(&Step::from(1)), Some(&String::new()));
        assert_eq!(gated.get(&Step::from(2)), Some(&"a \nb ".to_owned()));
    }

    #[test]
    fn named_steps_are_unioned() {
        let gated = parse_step_markers("a %%1-2\nb %%4", "%%").unwrap();
        let named: Vec<Step> = gated.named_steps().unwrap().iter().cloned().collect();
        assert_eq!(named, vec![Step::from(1), Step::from(2), Step::from(4)]);
    }

    #[test]
    fn bad_mode_is_rejected() {
        assert!(matches!(
            parse_step_markers("a %%x; 2", "%%"),
            Err(ParseError::InvalidModeFlag(_))
        ));
    }
}
