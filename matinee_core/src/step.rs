// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;

use smallvec::{smallvec, SmallVec};

use crate::StepError;

/// A discrete state of a slide: a non-empty sequence of non-negative
/// indices, compared lexicographically.
///
/// A bare index `n` and the sequence `(n,)` are the same step; the
/// canonical representation is always the sequence, so `Step::from(2)`
/// and `Step::new(&[2])` compare equal. Sub-steps extend the sequence:
/// `2 < 2.1 < 2.5.1 < 3`. Note that `(5,) < (5, 0)` — appending a
/// component always moves strictly later.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step(SmallVec<[u32; 2]>);

impl Step {
    /// Creates a step from its components.
    ///
    /// # Panics
    ///
    /// Panics if `components` is empty; an empty step does not exist.
    pub fn new(components: &[u32]) -> Self {
        assert!(!components.is_empty(), "a step has at least one component");
        Self(SmallVec::from_slice(components))
    }

    /// The step's components.
    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// The first (coarsest) component.
    pub fn first(&self) -> u32 {
        self.0[0]
    }

    /// Whether this step produces a page: the first component is ≥ 1.
    pub fn is_visible(&self) -> bool {
        self.0[0] >= 1
    }

    /// The step whose last component is incremented by one.
    ///
    /// This is the earliest step strictly after `self` and all of its
    /// sub-steps, used as the "turns false" boundary of selector items.
    pub fn succ(&self) -> Self {
        let mut v = self.0.clone();
        *v.last_mut().unwrap() += 1;
        Self(v)
    }

    /// The step with a `0` component appended: the earliest sub-step of
    /// `self`, strictly after `self` itself.
    pub fn first_substep(&self) -> Self {
        let mut v = self.0.clone();
        v.push(0);
        Self(v)
    }

    /// Shifts the first component forward by `by`, preserving the tail.
    pub fn shift(&self, by: u32) -> Self {
        let mut v = self.0.clone();
        v[0] += by;
        Self(v)
    }

    /// Undoes [`shift`](Self::shift): moves the first component back by
    /// `by`, or returns `None` if it would drop below 1.
    pub fn unshift(&self, by: u32) -> Option<Self> {
        if self.0[0] <= by {
            return None;
        }
        let mut v = self.0.clone();
        v[0] -= by;
        Some(Self(v))
    }
}

impl From<u32> for Step {
    fn from(value: u32) -> Self {
        Self(smallvec![value])
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step({self})")
    }
}

impl FromStr for Step {
    type Err = StepError;

    /// Parses the dotted form, e.g. `"2"` or `"2.5.1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = SmallVec::new();
        for part in s.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(StepError::StepSyntax(s.to_owned()));
            }
            components.push(
                part.parse::<u32>()
                    .map_err(|_| StepError::StepSyntax(s.to_owned()))?,
            );
        }
        if components.is_empty() {
            return Err(StepError::StepSyntax(s.to_owned()));
        }
        Ok(Self(components))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_and_sequence_are_the_same_step() {
        assert_eq!(Step::from(2), Step::new(&[2]));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Step::from(2) < Step::new(&[2, 0]));
        assert!(Step::new(&[2, 0]) < Step::new(&[2, 1]));
        assert!(Step::new(&[2, 9, 9]) < Step::from(3));
        assert!(Step::from(1) < Step::from(2));
    }

    #[test]
    fn visibility() {
        assert!(Step::from(1).is_visible());
        assert!(!Step::from(0).is_visible());
        assert!(!Step::new(&[0, 7]).is_visible());
        assert!(Step::new(&[1, 0]).is_visible());
    }

    #[test]
    fn succ_and_substep() {
        assert_eq!(Step::from(2).succ(), Step::from(3));
        assert_eq!(Step::new(&[2, 5]).succ(), Step::new(&[2, 6]));
        assert_eq!(Step::from(5).first_substep(), Step::new(&[5, 0]));
        assert!(Step::from(5) < Step::from(5).first_substep());
        assert!(Step::from(5).first_substep() < Step::from(6));
    }

    #[test]
    fn unshift_below_one_is_none() {
        assert_eq!(Step::from(2).unshift(2), None);
        assert_eq!(Step::from(2).unshift(1), Some(Step::from(1)));
        assert_eq!(Step::new(&[3, 4]).unshift(1), Some(Step::new(&[2, 4])));
    }

    #[test]
    fn display_round_trip() {
        let s = Step::new(&[2, 5, 1]);
        assert_eq!(s.to_string(), "2.5.1");
        assert_eq!("2.5.1".parse::<Step>().unwrap(), s);
        assert!("".parse::<Step>().is_err());
        assert!("2..1".parse::<Step>().is_err());
        assert!("2.x".parse::<Step>().is_err());
    }

    proptest! {
        #[test]
        fn shift_unshift_round_trip(first in 1_u32..1000, tail in proptest::collection::vec(0_u32..50, 0..3), by in 0_u32..100) {
            let mut components = vec![first];
            components.extend(tail);
            let s = Step::new(&components);
            prop_assert_eq!(s.shift(by).unshift(by), Some(s));
        }

        #[test]
        fn ordering_matches_component_slices(a in proptest::collection::vec(0_u32..9, 1..4), b in proptest::collection::vec(0_u32..9, 1..4)) {
            let sa = Step::new(&a);
            let sb = Step::new(&b);
            prop_assert_eq!(sa.cmp(&sb), a.cmp(&b));
        }
    }
}
