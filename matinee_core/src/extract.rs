// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::{BTreeMap, BTreeSet};

use crate::{Color, Length, LengthAuto, Step, StepVal, Value};
use crate::{AlignContent, AlignItems, TextAlign};

/// Collects the steps a value contributes to slide step discovery.
///
/// A [`StepVal`] contributes its named steps if declared, otherwise its
/// key steps, and then recurses into its values so stepped model nodes
/// nested inside stepped containers still surface their own steps.
/// Adding a stepped value anywhere in a tree never removes steps from
/// the collected set.
pub trait CollectSteps {
    /// Adds this value's steps to `out`.
    fn collect_steps(&self, out: &mut BTreeSet<Step>);
}

impl<T: CollectSteps> CollectSteps for StepVal<T> {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        match self.named_steps() {
            Some(named) => out.extend(named.iter().cloned()),
            None => out.extend(self.key_steps().cloned()),
        }
        for key in self.key_steps().cloned().collect::<Vec<_>>() {
            if let Some(value) = self.get(&key) {
                value.collect_steps(out);
            }
        }
    }
}

impl<T: CollectSteps> CollectSteps for Value<T> {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        match self {
            Self::Unset => {}
            Self::Const(v) => v.collect_steps(out),
            Self::Steps(sv) => sv.collect_steps(out),
        }
    }
}

impl<T: CollectSteps> CollectSteps for Option<T> {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        if let Some(v) = self {
            v.collect_steps(out);
        }
    }
}

impl<T: CollectSteps> CollectSteps for Vec<T> {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        for v in self {
            v.collect_steps(out);
        }
    }
}

impl<K, T: CollectSteps> CollectSteps for BTreeMap<K, T> {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        for v in self.values() {
            v.collect_steps(out);
        }
    }
}

/// Leaf values carry no steps of their own.
macro_rules! impl_collect_steps_leaf {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CollectSteps for $ty {
                fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
            }
        )*
    };
}

impl_collect_steps_leaf!(
    bool, u16, u32, u64, i32, i64, f32, f64, usize, String, Color, Length, LengthAuto,
    AlignItems, AlignContent, TextAlign,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_steps_win_over_keys() {
        let sv: StepVal<bool> = StepVal::new()
            .at(1, true)
            .at(4, false)
            .with_named_steps([Step::from(1), Step::from(2)].into_iter().collect());
        let mut out = BTreeSet::new();
        sv.collect_steps(&mut out);
        assert_eq!(out, [Step::from(1), Step::from(2)].into_iter().collect());
    }

    #[test]
    fn keys_used_without_named_steps() {
        let sv: StepVal<i32> = StepVal::new().at(2, 0).at(5, 1);
        let mut out = BTreeSet::new();
        sv.collect_steps(&mut out);
        assert_eq!(out, [Step::from(2), Step::from(5)].into_iter().collect());
    }

    #[test]
    fn adding_values_is_monotone() {
        let a: Vec<StepVal<i32>> = vec![StepVal::new().at(2, 0)];
        let mut before = BTreeSet::new();
        a.collect_steps(&mut before);

        let b: Vec<StepVal<i32>> = vec![StepVal::new().at(2, 0), StepVal::new().at(7, 1)];
        let mut after = BTreeSet::new();
        b.collect_steps(&mut after);

        assert!(after.is_superset(&before));
    }
}
