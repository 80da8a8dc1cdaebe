/*
 *  marquee/tint.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Animated HSL channels of the LED color
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

use std::time::Instant;
use log::debug;

use crate::animation::{AnimationSlot, Easing, Timing};
use crate::color::{Hsl, LedColor};
use crate::constants::COLOR_TRANSITION;

/// Hue, saturation and lightness animate independently and are only
/// combined into a color when a frame is sampled.
#[derive(Debug)]
pub struct ColorState {
    hue: AnimationSlot,
    saturation: AnimationSlot,
    lightness: AnimationSlot,
    target: LedColor,
}

impl ColorState {
    pub fn new(initial: LedColor) -> Self {
        let hsl = initial.hsl();
        Self {
            hue: AnimationSlot::new("hue", hsl.hue),
            saturation: AnimationSlot::new("saturation", hsl.saturation),
            lightness: AnimationSlot::new("lightness", hsl.lightness),
            target: initial,
        }
    }

    /// Interpolate each channel from where it is now towards `preset`.
    pub fn set_target(&mut self, preset: LedColor, now: Instant) {
        let to = preset.hsl();
        let channels = [
            (&mut self.hue, to.hue),
            (&mut self.saturation, to.saturation),
            (&mut self.lightness, to.lightness),
        ];
        for (slot, target) in channels {
            let from = slot.value(now);
            slot.start(Timing::once(from, target, COLOR_TRANSITION, Easing::Linear), now);
        }
        debug!("color -> {} ({})", preset.name, to);
        self.target = preset;
    }

    /// Snap to `preset` without a transition.
    pub fn jump_to(&mut self, preset: LedColor) {
        let to = preset.hsl();
        self.hue.reset(to.hue);
        self.saturation.reset(to.saturation);
        self.lightness.reset(to.lightness);
        self.target = preset;
    }

    pub fn current(&self, now: Instant) -> Hsl {
        Hsl::new(self.hue.value(now), self.saturation.value(now), self.lightness.value(now))
    }

    pub fn target(&self) -> &LedColor {
        &self.target
    }

    pub fn is_animating(&self) -> bool {
        self.hue.is_running() || self.saturation.is_running() || self.lightness.is_running()
    }

    pub fn settle(&mut self, now: Instant) {
        self.hue.settle(now);
        self.saturation.settle(now);
        self.lightness.settle(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_transition_is_linear_over_500ms() {
        let now = Instant::now();
        let mut color = ColorState::new(LedColor::named("Red").unwrap());
        color.set_target(LedColor::named("White").unwrap(), now);

        assert_eq!(color.current(now), Hsl::new(0.0, 100.0, 50.0));
        let mid = color.current(now + Duration::from_millis(250));
        assert!((mid.saturation - 50.0).abs() < 1e-3);
        assert!((mid.lightness - 75.0).abs() < 1e-3);
        assert_eq!(color.current(now + Duration::from_millis(500)), Hsl::new(0.0, 0.0, 100.0));
    }

    #[test]
    fn test_retarget_starts_from_animated_value() {
        let now = Instant::now();
        let mut color = ColorState::new(LedColor::named("Red").unwrap());
        color.set_target(LedColor::named("Green").unwrap(), now);
        let later = now + Duration::from_millis(250);
        color.set_target(LedColor::named("Red").unwrap(), later);
        assert!((color.current(later).hue - 60.0).abs() < 1e-3);
        assert_eq!(color.target().name, "Red");
    }

    #[test]
    fn test_settles_when_done() {
        let now = Instant::now();
        let mut color = ColorState::new(LedColor::default());
        color.set_target(LedColor::named("Blue").unwrap(), now);
        assert!(color.is_animating());
        color.settle(now + Duration::from_millis(600));
        assert!(!color.is_animating());
        assert_eq!(color.current(now).hue, 210.0);
    }
}
