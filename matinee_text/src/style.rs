// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeSet;

use matinee_core::{CollectSteps, Color, Step, Value};

use crate::StyleError;

/// A font weight in 1..=1000; 400 is normal, 700 is bold.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct FontWeight(u16);

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);

    /// Validates the CSS weight range.
    pub fn new(value: u16) -> Result<Self, StyleError> {
        if (1..=1000).contains(&value) {
            Ok(Self(value))
        } else {
            Err(StyleError::InvalidWeight(value))
        }
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The nine-step font stretch scale.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub enum FontStretch {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    #[default]
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

impl FromStr for FontStretch {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ultra-condensed" => Self::UltraCondensed,
            "extra-condensed" => Self::ExtraCondensed,
            "condensed" => Self::Condensed,
            "semi-condensed" => Self::SemiCondensed,
            "normal" => Self::Normal,
            "semi-expanded" => Self::SemiExpanded,
            "expanded" => Self::Expanded,
            "extra-expanded" => Self::ExtraExpanded,
            "ultra-expanded" => Self::UltraExpanded,
            _ => return Err(StyleError::InvalidFontStretch(s.to_owned())),
        })
    }
}

/// An authoring-time text style: every field optional and steppable.
///
/// Merging overlays the right-hand style: any field the other style
/// sets (constant or stepped) replaces this style's field; unset fields
/// are preserved.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct TextStyle {
    pub font: Value<String>,
    pub color: Value<Color>,
    pub size: Value<f32>,
    pub line_spacing: Value<f32>,
    pub italic: Value<bool>,
    pub stretch: Value<FontStretch>,
    pub weight: Value<FontWeight>,
    /// When true, overrides `weight` with 700 at resolution time.
    pub bold: Value<bool>,
    pub underline: Value<bool>,
    pub line_through: Value<bool>,
}

impl TextStyle {
    /// A style with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_font(mut self, font: impl Into<String>) -> Self {
        self.font = Value::Const(font.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<Value<Color>>) -> Self {
        self.color = color.into();
        self
    }

    #[must_use]
    pub fn with_size(mut self, size: impl Into<Value<f32>>) -> Self {
        self.size = size.into();
        self
    }

    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Value::Const(bold);
        self
    }

    #[must_use]
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Value::Const(italic);
        self
    }

    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = Value::Const(weight);
        self
    }

    /// Checks the numeric ranges of every set field.
    pub fn validate(&self) -> Result<(), StyleError> {
        let mut bad_size = None;
        self.size.for_each(|v| {
            if *v < 0.0 {
                bad_size = Some(*v);
            }
        });
        if let Some(v) = bad_size {
            return Err(StyleError::InvalidSize(v));
        }
        let mut bad_spacing = None;
        self.line_spacing.for_each(|v| {
            if *v < 0.0 {
                bad_spacing = Some(*v);
            }
        });
        if let Some(v) = bad_spacing {
            return Err(StyleError::InvalidLineSpacing(v));
        }
        Ok(())
    }

    /// Overlays `other` on top of `self`.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        fn pick<T: Clone>(left: &Value<T>, right: &Value<T>) -> Value<T> {
            if right.is_unset() {
                left.clone()
            } else {
                right.clone()
            }
        }
        Self {
            font: pick(&self.font, &other.font),
            color: pick(&self.color, &other.color),
            size: pick(&self.size, &other.size),
            line_spacing: pick(&self.line_spacing, &other.line_spacing),
            italic: pick(&self.italic, &other.italic),
            stretch: pick(&self.stretch, &other.stretch),
            weight: pick(&self.weight, &other.weight),
            bold: pick(&self.bold, &other.bold),
            underline: pick(&self.underline, &other.underline),
            line_through: pick(&self.line_through, &other.line_through),
        }
    }

    /// Samples every field at `step`, filling gaps from `base`.
    pub fn resolve_at(&self, step: &Step, base: &ResolvedTextStyle) -> ResolvedTextStyle {
        let bold = self.bold.get(step).copied().unwrap_or(base.bold);
        let weight = if bold {
            FontWeight::BOLD.value()
        } else {
            self.weight
                .get(step)
                .map(FontWeight::value)
                .unwrap_or(base.weight)
        };
        ResolvedTextStyle {
            font: self.font.get(step).cloned().unwrap_or_else(|| base.font.clone()),
            color: self.color.get(step).copied().unwrap_or(base.color),
            size: self.size.get(step).copied().unwrap_or(base.size),
            line_spacing: self
                .line_spacing
                .get(step)
                .copied()
                .unwrap_or(base.line_spacing),
            italic: self.italic.get(step).copied().unwrap_or(base.italic),
            stretch: self.stretch.get(step).copied().unwrap_or(base.stretch),
            weight,
            bold,
            underline: self.underline.get(step).copied().unwrap_or(base.underline),
            line_through: self
                .line_through
                .get(step)
                .copied()
                .unwrap_or(base.line_through),
        }
    }
}

impl CollectSteps for TextStyle {
    fn collect_steps(&self, out: &mut BTreeSet<Step>) {
        self.font.collect_steps(out);
        self.color.collect_steps(out);
        self.size.collect_steps(out);
        self.line_spacing.collect_steps(out);
        self.italic.collect_steps(out);
        self.stretch.collect_steps(out);
        self.weight.collect_steps(out);
        self.bold.collect_steps(out);
        self.underline.collect_steps(out);
        self.line_through.collect_steps(out);
    }
}

impl CollectSteps for FontStretch {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

impl CollectSteps for FontWeight {
    fn collect_steps(&self, _out: &mut BTreeSet<Step>) {}
}

/// A fully-determined text style, as handed to the shaper and renderer.
#[derive(Clone, PartialEq, Debug)]
pub struct ResolvedTextStyle {
    pub font: String,
    pub color: Color,
    pub size: f32,
    pub line_spacing: f32,
    pub italic: bool,
    pub stretch: FontStretch,
    /// Effective weight; 700 whenever `bold` is set.
    pub weight: u16,
    pub bold: bool,
    pub underline: bool,
    pub line_through: bool,
}

impl Default for ResolvedTextStyle {
    fn default() -> Self {
        Self {
            font: "sans-serif".to_owned(),
            color: Color::BLACK,
            size: 32.0,
            line_spacing: 1.2,
            italic: false,
            stretch: FontStretch::Normal,
            weight: FontWeight::NORMAL.value(),
            bold: false,
            underline: false,
            line_through: false,
        }
    }
}

/// The deck-level default style: every field set.
pub fn default_text_style() -> TextStyle {
    TextStyle {
        font: Value::Const("sans-serif".to_owned()),
        color: Value::Const(Color::BLACK),
        size: Value::Const(32.0),
        line_spacing: Value::Const(1.2),
        italic: Value::Const(false),
        stretch: Value::Const(FontStretch::Normal),
        weight: Value::Const(FontWeight::NORMAL),
        bold: Value::Const(false),
        underline: Value::Const(false),
        line_through: Value::Const(false),
    }
}

/// The deck-level default style for code blocks.
pub fn default_code_style() -> TextStyle {
    TextStyle::new().with_font("monospace")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_laws() {
        let default = default_text_style();
        let empty = TextStyle::new();
        assert_eq!(default.merge(&default), default);
        assert_eq!(default.merge(&empty), default);
        assert_eq!(empty.merge(&default), default);
    }

    #[test]
    fn right_hand_side_wins() {
        let red = TextStyle::new().with_color(Color::MAGENTA).with_size(10.0);
        let big = TextStyle::new().with_size(64.0);
        let merged = red.merge(&big);
        assert_eq!(merged.size, Value::Const(64.0));
        assert_eq!(merged.color, Value::Const(Color::MAGENTA));
    }

    #[test]
    fn bold_forces_weight_700() {
        let style = TextStyle::new().with_bold(true);
        let resolved = style.resolve_at(&Step::from(1), &ResolvedTextStyle::default());
        assert_eq!(resolved.weight, 700);
        assert!(resolved.bold);
    }

    #[test]
    fn stepped_field_resolves_per_step() {
        let style = TextStyle::new().with_size(matinee_core::StepVal::new().at(1, 10.0).at(3, 20.0));
        let base = ResolvedTextStyle::default();
        assert_eq!(style.resolve_at(&Step::from(2), &base).size, 10.0);
        assert_eq!(style.resolve_at(&Step::from(3), &base).size, 20.0);
    }

    #[test]
    fn weight_range_is_validated() {
        assert!(FontWeight::new(0).is_err());
        assert!(FontWeight::new(1001).is_err());
        assert_eq!(FontWeight::new(400).unwrap(), FontWeight::NORMAL);
    }

    #[test]
    fn negative_size_rejected() {
        let style = TextStyle::new().with_size(-1.0);
        assert!(matches!(style.validate(), Err(StyleError::InvalidSize(_))));
    }
}
