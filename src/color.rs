/*
 *  color.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	LED color presets and HSL handling
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use std::fmt;
use embedded_graphics::pixelcolor::Rgb888;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_COLOR_INDEX;

/// An HSL triple: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub const fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self { hue, saturation, lightness }
    }

    /// Convert to 8-bit RGB
    pub fn to_rgb888(&self) -> Rgb888 {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let to8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb888::new(to8(r), to8(g), to8(b))
    }

    /// RGB scaled towards black by `opacity` (0..=1).
    pub fn to_rgb888_dimmed(&self, opacity: f32) -> Rgb888 {
        dim(self.to_rgb888(), opacity)
    }
}

/// CSS style `hsl(h, s%, l%)`, channels rounded to integers.
impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue.round() as i32,
            self.saturation.round() as i32,
            self.lightness.round() as i32
        )
    }
}

/// Blend a color towards black.
pub fn dim(color: Rgb888, opacity: f32) -> Rgb888 {
    use embedded_graphics::pixelcolor::RgbColor;
    let k = opacity.clamp(0.0, 1.0);
    let f = |v: u8| (v as f32 * k).round() as u8;
    Rgb888::new(f(color.r()), f(color.g()), f(color.b()))
}

/// A selectable LED color, as persisted in the settings blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedColor {
    pub hue: u16,
    pub saturation: u8,
    pub lightness: u8,
    pub name: String,
}

const PRESETS: [(&str, u16, u8, u8); 10] = [
    ("Red", 0, 100, 50),
    ("Orange", 30, 100, 50),
    ("Yellow", 60, 100, 50),
    ("Green", 120, 100, 50),
    ("Cyan", 180, 100, 50),
    ("Blue", 210, 100, 50),
    ("Purple", 270, 100, 50),
    ("Magenta", 300, 100, 50),
    ("Pink", 330, 100, 50),
    ("White", 0, 0, 100),
];

impl LedColor {
    pub fn new(name: &str, hue: u16, saturation: u8, lightness: u8) -> Self {
        Self { hue, saturation, lightness, name: name.to_string() }
    }

    /// All built-in presets in palette order.
    pub fn presets() -> Vec<LedColor> {
        PRESETS.iter().map(|&(n, h, s, l)| LedColor::new(n, h, s, l)).collect()
    }

    /// Look up a preset by name, ignoring case.
    pub fn named(name: &str) -> Option<LedColor> {
        PRESETS
            .iter()
            .find(|(n, ..)| n.eq_ignore_ascii_case(name.trim()))
            .map(|&(n, h, s, l)| LedColor::new(n, h, s, l))
    }

    pub fn hsl(&self) -> Hsl {
        Hsl::new(self.hue as f32, self.saturation as f32, self.lightness as f32)
    }
}

impl Default for LedColor {
    fn default() -> Self {
        let (n, h, s, l) = PRESETS[DEFAULT_COLOR_INDEX];
        LedColor::new(n, h, s, l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    #[test]
    fn test_primary_conversions() {
        assert_eq!(Hsl::new(0.0, 100.0, 50.0).to_rgb888(), Rgb888::new(255, 0, 0));
        assert_eq!(Hsl::new(120.0, 100.0, 50.0).to_rgb888(), Rgb888::new(0, 255, 0));
        assert_eq!(Hsl::new(180.0, 100.0, 50.0).to_rgb888(), Rgb888::new(0, 255, 255));
        assert_eq!(Hsl::new(0.0, 0.0, 100.0).to_rgb888(), Rgb888::WHITE);
        assert_eq!(Hsl::new(360.0, 100.0, 50.0).to_rgb888(), Rgb888::new(255, 0, 0));
    }

    #[test]
    fn test_css_format_rounds_channels() {
        let hsl = Hsl::new(179.6, 99.5, 50.2);
        assert_eq!(hsl.to_string(), "hsl(180, 100%, 50%)");
    }

    #[test]
    fn test_dim_scales_channels() {
        let c = dim(Rgb888::new(200, 100, 0), 0.5);
        assert_eq!(c, Rgb888::new(100, 50, 0));
        assert_eq!(dim(Rgb888::WHITE, 0.0), Rgb888::BLACK);
    }

    #[test]
    fn test_presets() {
        assert_eq!(LedColor::presets().len(), 10);
        assert_eq!(LedColor::default().name, "Cyan");
        let green = LedColor::named("green").unwrap();
        assert_eq!((green.hue, green.saturation, green.lightness), (120, 100, 50));
        assert!(LedColor::named("teal").is_none());
    }
}
