/*
 *  marquee/zoom.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pinch zoom of the marquee font size
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

use log::debug;

/// Font size under pinch control. Scale factors are relative to the size
/// committed when the previous pinch ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    base_font_size: f32,
    committed_font_size: f32,
    live_font_size: f32,
    pinching: bool,
}

impl ZoomState {
    pub fn new(base_font_size: f32) -> Self {
        Self {
            base_font_size,
            committed_font_size: base_font_size,
            live_font_size: base_font_size,
            pinching: false,
        }
    }

    /// Live preview while the pinch is active.
    pub fn on_pinch_update(&mut self, scale_factor: f32) -> f32 {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return self.live_font_size;
        }
        self.pinching = true;
        self.live_font_size = self.committed_font_size * scale_factor;
        self.live_font_size
    }

    /// Keep the released size as the baseline of the next pinch.
    pub fn on_pinch_end(&mut self) -> f32 {
        self.pinching = false;
        self.committed_font_size = self.live_font_size;
        debug!("zoom committed at {:.1}", self.committed_font_size);
        self.committed_font_size
    }

    pub fn font_size(&self) -> f32 {
        self.live_font_size
    }

    pub fn committed_font_size(&self) -> f32 {
        self.committed_font_size
    }

    pub fn base_font_size(&self) -> f32 {
        self.base_font_size
    }

    pub fn is_pinching(&self) -> bool {
        self.pinching
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinches_compose_multiplicatively() {
        let mut zoom = ZoomState::new(100.0);
        assert_eq!(zoom.on_pinch_update(2.0), 200.0);
        zoom.on_pinch_end();
        assert_eq!(zoom.on_pinch_update(1.5), 300.0);
        zoom.on_pinch_end();
        assert_eq!(zoom.font_size(), 300.0);
        assert_eq!(zoom.base_font_size(), 100.0);
    }

    #[test]
    fn test_update_is_relative_to_commit_not_previous_update() {
        let mut zoom = ZoomState::new(100.0);
        zoom.on_pinch_update(2.0);
        zoom.on_pinch_update(0.5);
        assert_eq!(zoom.font_size(), 50.0);
        assert_eq!(zoom.committed_font_size(), 100.0);
        assert!(zoom.is_pinching());
    }

    #[test]
    fn test_bad_factors_are_ignored() {
        let mut zoom = ZoomState::new(100.0);
        zoom.on_pinch_update(1.2);
        assert_eq!(zoom.on_pinch_update(0.0), 120.0);
        assert_eq!(zoom.on_pinch_update(f32::NAN), 120.0);
        assert_eq!(zoom.on_pinch_update(-3.0), 120.0);
    }
}
