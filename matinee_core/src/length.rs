// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;

use crate::ValueError;

/// A length in points or as a fraction of the parent extent.
///
/// `"30"` parses to points, `"25%"` to the fraction `0.25`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Length {
    Points(f32),
    Fraction(f32),
}

impl Length {
    pub const ZERO: Self = Self::Points(0.0);

    /// Resolves against the parent extent.
    pub fn resolve(&self, base: f32) -> f32 {
        match self {
            Self::Points(v) => *v,
            Self::Fraction(f) => f * base,
        }
    }
}

impl Default for Length {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f32> for Length {
    fn from(value: f32) -> Self {
        Self::Points(value)
    }
}

impl From<i32> for Length {
    fn from(value: i32) -> Self {
        Self::Points(value as f32)
    }
}

impl FromStr for Length {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_length(s).ok_or_else(|| ValueError::InvalidLength(s.to_owned()))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Points(v) => write!(f, "{v}"),
            Self::Fraction(fr) => write!(f, "{}%", fr * 100.0),
        }
    }
}

/// A [`Length`] that additionally allows `auto` (used by margins).
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub enum LengthAuto {
    #[default]
    Auto,
    Points(f32),
    Fraction(f32),
}

impl From<Length> for LengthAuto {
    fn from(value: Length) -> Self {
        match value {
            Length::Points(v) => Self::Points(v),
            Length::Fraction(f) => Self::Fraction(f),
        }
    }
}

impl From<f32> for LengthAuto {
    fn from(value: f32) -> Self {
        Self::Points(value)
    }
}

impl From<i32> for LengthAuto {
    fn from(value: i32) -> Self {
        Self::Points(value as f32)
    }
}

impl FromStr for LengthAuto {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "auto" {
            return Ok(Self::Auto);
        }
        parse_length(s)
            .map(Into::into)
            .ok_or_else(|| ValueError::InvalidLength(s.to_owned()))
    }
}

pub(crate) fn parse_length(s: &str) -> Option<Length> {
    let text = s.trim();
    if let Some(number) = text.strip_suffix('%') {
        let value: f32 = number.trim().parse().ok()?;
        if value.is_finite() {
            return Some(Length::Fraction(value / 100.0));
        }
        return None;
    }
    let value: f32 = text.parse().ok()?;
    value.is_finite().then_some(Length::Points(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_points_and_percent() {
        assert_eq!("12".parse::<Length>().unwrap(), Length::Points(12.0));
        assert_eq!("12.5".parse::<Length>().unwrap(), Length::Points(12.5));
        assert_eq!("25%".parse::<Length>().unwrap(), Length::Fraction(0.25));
        assert!("12%%".parse::<Length>().is_err());
        assert!("auto".parse::<Length>().is_err());
        assert!("x".parse::<Length>().is_err());
    }

    #[test]
    fn auto_only_for_length_auto() {
        assert_eq!("auto".parse::<LengthAuto>().unwrap(), LengthAuto::Auto);
        assert_eq!(
            "50%".parse::<LengthAuto>().unwrap(),
            LengthAuto::Fraction(0.5)
        );
    }

    #[test]
    fn resolve_against_base() {
        assert_eq!(Length::Points(7.0).resolve(100.0), 7.0);
        assert_eq!(Length::Fraction(0.25).resolve(200.0), 50.0);
    }
}
