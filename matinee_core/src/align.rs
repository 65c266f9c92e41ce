// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;

use crate::ValueError;

/// Alignment of items along the cross axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlignItems {
    Start,
    End,
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
    Baseline,
}

impl AlignItems {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::FlexStart => "flex-start",
            Self::FlexEnd => "flex-end",
            Self::Center => "center",
            Self::Stretch => "stretch",
            Self::Baseline => "baseline",
        }
    }
}

impl FromStr for AlignItems {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "start" => Self::Start,
            "end" => Self::End,
            "flex-start" => Self::FlexStart,
            "flex-end" => Self::FlexEnd,
            "center" => Self::Center,
            "stretch" => Self::Stretch,
            "baseline" => Self::Baseline,
            _ => return Err(ValueError::InvalidAlign(s.to_owned())),
        })
    }
}

impl fmt::Display for AlignItems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alignment of content along the main axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AlignContent {
    Start,
    End,
    FlexStart,
    FlexEnd,
    Center,
    Stretch,
    SpaceBetween,
    SpaceEvenly,
    SpaceAround,
}

impl AlignContent {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::FlexStart => "flex-start",
            Self::FlexEnd => "flex-end",
            Self::Center => "center",
            Self::Stretch => "stretch",
            Self::SpaceBetween => "space-between",
            Self::SpaceEvenly => "space-evenly",
            Self::SpaceAround => "space-around",
        }
    }
}

impl FromStr for AlignContent {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "start" => Self::Start,
            "end" => Self::End,
            "flex-start" => Self::FlexStart,
            "flex-end" => Self::FlexEnd,
            "center" => Self::Center,
            "stretch" => Self::Stretch,
            "space-between" => Self::SpaceBetween,
            "space-evenly" => Self::SpaceEvenly,
            "space-around" => Self::SpaceAround,
            _ => return Err(ValueError::InvalidAlign(s.to_owned())),
        })
    }
}

impl fmt::Display for AlignContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment of text lines inside their box.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

impl FromStr for TextAlign {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "start" => Self::Start,
            "center" => Self::Center,
            "end" => Self::End,
            _ => return Err(ValueError::InvalidAlign(s.to_owned())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_sets() {
        assert_eq!("baseline".parse::<AlignItems>().unwrap(), AlignItems::Baseline);
        assert!("space-between".parse::<AlignItems>().is_err());
        assert_eq!(
            "space-between".parse::<AlignContent>().unwrap(),
            AlignContent::SpaceBetween
        );
        assert!("middle".parse::<TextAlign>().is_err());
    }
}
