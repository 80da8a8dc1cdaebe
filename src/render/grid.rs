/*
 *  render/grid.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	LED dot-matrix overlay
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

use embedded_graphics::pixelcolor::Rgb888;

use crate::color::dim;
use crate::constants::{GRID_DIM, GRID_DOT_RADIUS, GRID_PITCH};
use super::framebuf::FrameBuf;

/// Canvas height the stock pitch and radius are drawn for.
const GRID_REFERENCE_HEIGHT: f32 = 128.0;

/// Every `pitch` pixels there is a round dot of `radius`; whatever falls
/// between dots is dimmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOverlay {
    pitch: u32,
    radius: f32,
}

impl GridOverlay {
    pub fn new(pitch: u32, radius: f32) -> Self {
        Self { pitch: pitch.max(2), radius: radius.max(0.5) }
    }

    /// Stock 6 px / 2.5 px grid, scaled to the canvas height.
    pub fn for_canvas(height: u32) -> Self {
        let k = (height as f32 / GRID_REFERENCE_HEIGHT).max(0.5);
        Self::new((GRID_PITCH as f32 * k).round() as u32, GRID_DOT_RADIUS * k)
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        let p = self.pitch as usize;
        let centre = self.pitch as f32 / 2.0;
        let dx = (x % p) as f32 + 0.5 - centre;
        let dy = (y % p) as f32 + 0.5 - centre;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    pub fn apply(&self, fb: &mut FrameBuf<Rgb888>) {
        fb.map_pixels(|x, y, c| if self.is_lit(x, y) { c } else { dim(c, GRID_DIM) });
    }
}
