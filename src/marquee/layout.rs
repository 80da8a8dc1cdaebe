/*
 *  marquee/layout.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Tiling of repeated text copies for a seamless loop
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::constants::{LOOP_SPACING_RATIO, MIN_COPY_COUNT, MIN_SPEED_PX_PER_SEC};

/// Inputs of one scroll cycle. A change to text, speed or viewport width
/// starts a new cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MarqueeConfig {
    pub text: String,
    pub speed_px_per_sec: f32,
    pub viewport_width: f32,
    pub measured_text_width: f32,
}

impl MarqueeConfig {
    pub fn new(text: impl Into<String>, speed_px_per_sec: f32, viewport_width: f32) -> Self {
        Self {
            text: text.into(),
            speed_px_per_sec: clamp_speed(speed_px_per_sec),
            viewport_width: viewport_width.max(0.0),
            measured_text_width: 0.0,
        }
    }

    pub fn loop_spacing(&self) -> f32 {
        loop_spacing(self.viewport_width)
    }

    pub fn tile_layout(&self) -> TileLayout {
        compute_tile_layout(self.measured_text_width, self.viewport_width)
    }
}

/// Derived tiling of the text across the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileLayout {
    pub measured_text_width: f32,
    pub loop_spacing: f32,
    /// Pitch after which the tiling repeats.
    pub pattern_width: f32,
    pub copy_count: usize,
}

impl TileLayout {
    /// Whether a real measurement is in; the timed loop waits for one.
    pub fn is_measured(&self) -> bool {
        self.measured_text_width > 0.0
    }

    /// X position of copy `index` given the scroll offset.
    pub fn tile_x(&self, offset: f32, index: usize) -> f32 {
        offset + index as f32 * self.pattern_width
    }
}

pub fn loop_spacing(viewport_width: f32) -> f32 {
    viewport_width.max(0.0) * LOOP_SPACING_RATIO
}

/// Speeds that are not positive (or not numbers) run at the minimum speed.
pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_finite() && speed > 0.0 { speed } else { MIN_SPEED_PX_PER_SEC }
}

/// Number of copies needed so the loop seam never shows on screen.
///
/// Until the first copy has been measured the width is 0 and two copies
/// are used.
pub fn compute_tile_layout(measured_text_width: f32, viewport_width: f32) -> TileLayout {
    let measured = if measured_text_width.is_finite() { measured_text_width.max(0.0) } else { 0.0 };
    let viewport = if viewport_width.is_finite() { viewport_width.max(0.0) } else { 0.0 };
    let spacing = loop_spacing(viewport);
    let pattern_width = measured + spacing;

    let copy_count = if measured > 0.0 {
        let fill = (viewport / pattern_width).ceil() as usize + 1;
        fill.max(MIN_COPY_COUNT)
    } else {
        MIN_COPY_COUNT
    };

    TileLayout { measured_text_width: measured, loop_spacing: spacing, pattern_width, copy_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmeasured_falls_back_to_two_copies() {
        let layout = compute_tile_layout(0.0, 360.0);
        assert_eq!(layout.copy_count, 2);
        assert!(!layout.is_measured());
        assert!((layout.pattern_width - 108.0).abs() < 1e-3);
    }

    #[test]
    fn test_reference_layout() {
        let layout = compute_tile_layout(300.0, 360.0);
        assert!((layout.loop_spacing - 108.0).abs() < 1e-3);
        assert!((layout.pattern_width - 408.0).abs() < 1e-3);
        assert_eq!(layout.copy_count, 2);
    }

    #[test]
    fn test_short_text_fills_viewport() {
        let layout = compute_tile_layout(10.0, 360.0);
        // pattern 118 -> ceil(3.05) + 1
        assert_eq!(layout.copy_count, 5);
    }

    #[test]
    fn test_copy_count_invariants() {
        for viewport in [1.0f32, 64.0, 128.0, 256.0, 360.0, 1080.0, 2400.0] {
            for measured in [0.0f32, 0.5, 1.0, 7.0, 60.0, 300.0, 999.0, 5000.0] {
                let layout = compute_tile_layout(measured, viewport);
                assert!(layout.copy_count >= 2, "{measured} in {viewport}");
                if layout.is_measured() {
                    let covered = layout.copy_count as f32 * layout.pattern_width;
                    assert!(covered + 1e-3 >= viewport + layout.pattern_width, "{measured} in {viewport}");
                }
            }
        }
    }

    #[test]
    fn test_tile_positions() {
        let layout = compute_tile_layout(300.0, 360.0);
        assert_eq!(layout.tile_x(-8.0, 0), -8.0);
        assert!((layout.tile_x(-8.0, 1) - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_is_clamped() {
        assert_eq!(clamp_speed(0.0), 1.0);
        assert_eq!(clamp_speed(-50.0), 1.0);
        assert_eq!(clamp_speed(f32::NAN), 1.0);
        assert_eq!(clamp_speed(150.0), 150.0);
        assert_eq!(MarqueeConfig::new("X", -1.0, 100.0).speed_px_per_sec, 1.0);
    }
}
