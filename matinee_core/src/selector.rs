// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The step-selector mini-language.
//!
//! A selector is a comma-separated list of items, optionally ending in
//! `+`:
//!
//! - `2` — true exactly at step 2 (and its sub-steps).
//! - `1-3` — true from 1 through 3, false from 4.
//! - `2+` — true from 2 onwards (the `+` drops the closing boundary of
//!   the last item).
//! - `!5` — nothing from the first sub-step of 5 onwards; 5 itself is
//!   unaffected.
//! - `3?` — like `3`, but the marker is declared without being named,
//!   so it does not force a page of its own.
//!
//! Steps use the dotted form (`2.5.1`). The result is a boolean
//! schedule whose named-step set holds the emission-worthy boundaries.

use std::collections::BTreeSet;

use crate::{Step, StepError, StepVal};

/// Parses a step selector into a boolean schedule with named steps.
///
/// ```
/// use matinee_core::{parse_step_selector, Step};
/// let sel = parse_step_selector("1-3,5+").unwrap();
/// assert_eq!(sel.get(&Step::from(2)), Some(&true));
/// assert_eq!(sel.get(&Step::from(4)), Some(&false));
/// assert_eq!(sel.get(&Step::from(9)), Some(&true));
/// ```
pub fn parse_step_selector(input: &str) -> Result<StepVal<bool>, StepError> {
    let text = input.trim();
    let (body, open_ended) = match text.strip_suffix('+') {
        Some(body) => (body, true),
        None => (text, false),
    };
    if body.trim().is_empty() {
        return Err(StepError::StepSyntax(input.to_owned()));
    }

    let items: Vec<&str> = body.split(',').collect();
    let last_index = items.len() - 1;

    let mut declared = BTreeSet::new();
    let mut named = BTreeSet::new();
    let mut positives: Vec<StepVal<bool>> = Vec::new();
    let mut masks: Vec<Step> = Vec::new();

    fn declare(
        step: &Step,
        quiet: bool,
        declared: &mut BTreeSet<Step>,
        named: &mut BTreeSet<Step>,
    ) -> Result<(), StepError> {
        if !declared.insert(step.clone()) {
            return Err(StepError::DuplicateStepBinding(step.clone()));
        }
        if !quiet {
            named.insert(step.clone());
        }
        Ok(())
    }

    for (index, raw) in items.iter().enumerate() {
        let item = raw.trim();
        if item.is_empty() {
            return Err(StepError::StepSyntax(input.to_owned()));
        }
        let closes = !(open_ended && index == last_index);

        if let Some(rest) = item.strip_prefix('!') {
            let step = parse_positive_step(rest.trim(), input)?;
            masks.push(step.first_substep());
            continue;
        }

        let (item, quiet) = match item.strip_suffix('?') {
            Some(stripped) => (stripped.trim_end(), true),
            None => (item, false),
        };

        if let Some((a_text, b_text)) = item.split_once('-') {
            if quiet {
                // The grammar only allows `?` on a single step.
                return Err(StepError::StepSyntax(input.to_owned()));
            }
            let a = parse_positive_step(a_text.trim(), input)?;
            let b = parse_positive_step(b_text.trim(), input)?;
            if b < a {
                return Err(StepError::StepSyntax(input.to_owned()));
            }
            if a.components().len() == 1 && b.components().len() == 1 {
                for n in a.first()..=b.first() {
                    declare(&Step::from(n), false, &mut declared, &mut named)?;
                }
            } else {
                declare(&a, false, &mut declared, &mut named)?;
                if b != a {
                    declare(&b, false, &mut declared, &mut named)?;
                }
            }
            let mut schedule = StepVal::new().at(a, true);
            if closes {
                schedule.set(b.succ(), false);
            }
            positives.push(schedule);
        } else {
            let step = parse_positive_step(item, input)?;
            declare(&step, quiet, &mut declared, &mut named)?;
            let mut schedule = StepVal::new().at(step.clone(), true);
            if closes {
                schedule.set(step.succ(), false);
            }
            positives.push(schedule);
        }
    }

    // OR the positive items together over the union of their boundaries.
    let keys: BTreeSet<Step> = positives
        .iter()
        .flat_map(|p| p.key_steps().cloned())
        .collect();
    let mut schedule = StepVal::new();
    let mut previous = None;
    for key in keys {
        let value = positives
            .iter()
            .any(|p| p.get(&key).copied().unwrap_or(false));
        if previous != Some(value) {
            schedule.set(key, value);
            previous = Some(value);
        }
    }

    // Exclusive bounds: everything from the mask point on is false.
    for mask in masks {
        let trailing: Vec<Step> = schedule
            .key_steps()
            .filter(|k| **k > mask)
            .cloned()
            .collect();
        let mut pruned = StepVal::new();
        for key in schedule.key_steps() {
            if !trailing.contains(key) {
                if let Some(v) = schedule.get(key) {
                    pruned.set(key.clone(), *v);
                }
            }
        }
        pruned.set(mask, false);
        schedule = pruned;
    }

    Ok(schedule.with_named_steps(named))
}

fn parse_positive_step(text: &str, whole: &str) -> Result<Step, StepError> {
    let step: Step = text
        .parse()
        .map_err(|_| StepError::StepSyntax(whole.to_owned()))?;
    if step.first() < 1 {
        return Err(StepError::NonPositiveStep(step));
    }
    Ok(step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(sel: &StepVal<bool>) -> Vec<Step> {
        sel.named_steps().unwrap().iter().cloned().collect()
    }

    #[test]
    fn single_step() {
        let sel = parse_step_selector("2").unwrap();
        assert_eq!(sel.get(&Step::from(1)), None);
        assert_eq!(sel.get(&Step::from(2)), Some(&true));
        assert_eq!(sel.get(&Step::new(&[2, 3])), Some(&true));
        assert_eq!(sel.get(&Step::from(3)), Some(&false));
        assert_eq!(named(&sel), vec![Step::from(2)]);
    }

    #[test]
    fn range() {
        let sel = parse_step_selector("1-3").unwrap();
        assert_eq!(sel.get(&Step::from(1)), Some(&true));
        assert_eq!(sel.get(&Step::from(3)), Some(&true));
        assert_eq!(sel.get(&Step::from(4)), Some(&false));
        assert_eq!(
            named(&sel),
            vec![Step::from(1), Step::from(2), Step::from(3)]
        );
    }

    #[test]
    fn open_ended() {
        let sel = parse_step_selector("2+").unwrap();
        assert_eq!(sel.key_steps().count(), 1);
        assert_eq!(sel.get(&Step::from(100)), Some(&true));
        assert_eq!(named(&sel), vec![Step::from(2)]);
    }

    #[test]
    fn list_merges_adjacent_items() {
        let sel = parse_step_selector("1,2").unwrap();
        assert_eq!(sel.get(&Step::from(1)), Some(&true));
        assert_eq!(sel.get(&Step::from(2)), Some(&true));
        assert_eq!(sel.get(&Step::from(3)), Some(&false));
        assert_eq!(named(&sel), vec![Step::from(1), Step::from(2)]);
    }

    #[test]
    fn list_with_gap() {
        let sel = parse_step_selector("1-3,5").unwrap();
        assert_eq!(sel.get(&Step::from(4)), Some(&false));
        assert_eq!(sel.get(&Step::from(5)), Some(&true));
        assert_eq!(sel.get(&Step::from(6)), Some(&false));
        assert_eq!(named(&sel).len(), 4);
    }

    #[test]
    fn exclusive_bound_hides_substeps_only() {
        let sel = parse_step_selector("!5").unwrap();
        let keys: Vec<Step> = sel.key_steps().cloned().collect();
        assert_eq!(keys, vec![Step::new(&[5, 0])]);
        assert_eq!(sel.get(&Step::new(&[5, 0])), Some(&false));
        assert!(named(&sel).is_empty());
    }

    #[test]
    fn exclusive_bound_masks_later_boundaries() {
        let sel = parse_step_selector("2+,!5").unwrap();
        assert_eq!(sel.get(&Step::from(5)), Some(&true));
        assert_eq!(sel.get(&Step::new(&[5, 1])), Some(&false));
        assert_eq!(sel.get(&Step::from(6)), Some(&false));
    }

    #[test]
    fn quiet_marker_is_declared_but_not_named() {
        let sel = parse_step_selector("2?").unwrap();
        assert_eq!(sel.get(&Step::from(2)), Some(&true));
        assert!(named(&sel).is_empty());
    }

    #[test]
    fn sublevel_steps() {
        let sel = parse_step_selector("2.5.1").unwrap();
        assert_eq!(sel.get(&Step::new(&[2, 5, 1])), Some(&true));
        assert_eq!(sel.get(&Step::new(&[2, 5, 2])), Some(&false));
        assert_eq!(sel.get(&Step::from(3)), Some(&false));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse_step_selector(""),
            Err(StepError::StepSyntax(_))
        ));
        assert!(matches!(
            parse_step_selector("1,,3"),
            Err(StepError::StepSyntax(_))
        ));
        assert!(matches!(
            parse_step_selector("0"),
            Err(StepError::NonPositiveStep(_))
        ));
        assert!(matches!(
            parse_step_selector("2,2"),
            Err(StepError::DuplicateStepBinding(_))
        ));
        assert!(matches!(
            parse_step_selector("1-3,2"),
            Err(StepError::DuplicateStepBinding(_))
        ));
        assert!(matches!(
            parse_step_selector("3-1"),
            Err(StepError::StepSyntax(_))
        ));
    }
}
