// Copyright 2026 the Matinee Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use core::str::FromStr;

use peniko::color::palette;

use crate::ValueError;

/// An sRGB color with alpha.
///
/// Parses every CSS color form the underlying parser understands
/// (`"white"`, `"#ff00ff"`, `"rgb(…)"`, …).
#[derive(Clone, Copy, Debug)]
pub struct Color(peniko::Color);

impl Color {
    pub const BLACK: Self = Self(palette::css::BLACK);
    pub const WHITE: Self = Self(palette::css::WHITE);
    pub const MAGENTA: Self = Self(palette::css::MAGENTA);

    /// Wraps a backend color.
    pub fn new(color: peniko::Color) -> Self {
        Self(color)
    }

    /// The backend color, for handing to renderers.
    pub fn inner(&self) -> peniko::Color {
        self.0
    }

    /// The color quantized to 8-bit RGBA channels.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.0.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.0.components == other.0.components
    }
}

impl FromStr for Color {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        peniko::color::parse_color(s)
            .map(|c| Self(c.to_alpha_color()))
            .map_err(|_| ValueError::InvalidColor(s.to_owned()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_hex() {
        assert_eq!("white".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#ff00ff".parse::<Color>().unwrap(), Color::MAGENTA);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "no-such-color".parse::<Color>(),
            Err(ValueError::InvalidColor(_))
        ));
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Color::MAGENTA.to_string(), "#ff00ff");
    }
}
