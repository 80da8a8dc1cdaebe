/*
 *  marquee/blink.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Shared blink oscillator for text and border opacity
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
use crate::constants::{BLINK_LEG, BLINK_LOW_OPACITY, BLINK_RESET};

/// One oscillator drives both text and border; each flag decides whether
/// its element follows it.
#[derive(Debug)]
pub struct BlinkState {
    text_blinking: bool,
    border_blinking: bool,
    oscillating: bool,
    opacity: AnimationSlot,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl BlinkState {
    pub fn new() -> Self {
        Self {
            text_blinking: false,
            border_blinking: false,
            oscillating: false,
            opacity: AnimationSlot::new("blink", 1.0),
        }
    }

    /// Start the oscillator when either flag is on, ease it back to 1 when
    /// both are off. An already oscillating run is left alone.
    pub fn set_flags(&mut self, text_blinking: bool, border_blinking: bool, now: Instant) {
        self.text_blinking = text_blinking;
        self.border_blinking = border_blinking;
        let wanted = text_blinking || border_blinking;

        if wanted && !self.oscillating {
            self.opacity.start(
                Timing::looping(1.0, BLINK_LOW_OPACITY, BLINK_LEG, Easing::InOutQuad, true),
                now,
            );
            self.oscillating = true;
            debug!("blink oscillator on (text {text_blinking}, border {border_blinking})");
        } else if !wanted && self.oscillating {
            let from = self.opacity.value(now);
            self.opacity.start(Timing::once(from, 1.0, BLINK_RESET, Easing::InOutQuad), now);
            self.oscillating = false;
            debug!("blink oscillator off");
        }
    }

    pub fn is_oscillating(&self) -> bool {
        self.oscillating
    }

    pub fn text_blinking(&self) -> bool {
        self.text_blinking
    }

    pub fn border_blinking(&self) -> bool {
        self.border_blinking
    }

    /// Raw oscillator value, including the fade back to 1.
    pub fn shared_opacity(&self, now: Instant) -> f32 {
        self.opacity.value(now)
    }

    pub fn text_opacity(&self, now: Instant) -> f32 {
        if self.text_blinking { self.shared_opacity(now) } else { 1.0 }
    }

    pub fn border_opacity(&self, now: Instant) -> f32 {
        if self.border_blinking { self.shared_opacity(now) } else { 1.0 }
    }

    pub fn settle(&mut self, now: Instant) {
        self.opacity.settle(now);
    }

    pub fn generation(&self) -> u64 {
        self.opacity.generation()
    }

    pub fn cancel(&mut self) {
        self.opacity.reset(1.0);
        self.oscillating = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_starts_only_when_a_flag_is_set() {
        let now = Instant::now();
        let mut blink = BlinkState::new();
        blink.set_flags(false, false, now);
        assert!(!blink.is_oscillating());
        assert_eq!(blink.generation(), 0);

        blink.set_flags(true, false, now);
        assert!(blink.is_oscillating());
        assert!((blink.text_opacity(now + ms(500)) - 0.4).abs() < 1e-4);
        assert_eq!(blink.border_opacity(now + ms(500)), 1.0);
    }

    #[test]
    fn test_flag_swap_keeps_single_oscillator() {
        let now = Instant::now();
        let mut blink = BlinkState::new();
        blink.set_flags(true, false, now);
        blink.set_flags(true, true, now + ms(100));
        blink.set_flags(false, true, now + ms(200));
        assert_eq!(blink.generation(), 1);
        assert!(blink.is_oscillating());
        assert_eq!(blink.text_opacity(now + ms(500)), 1.0);
        assert!((blink.border_opacity(now + ms(500)) - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_stops_and_returns_to_full_opacity() {
        let now = Instant::now();
        let mut blink = BlinkState::new();
        blink.set_flags(true, true, now);
        let off = now + ms(500);
        blink.set_flags(false, false, off);
        assert!(!blink.is_oscillating());
        assert!(blink.shared_opacity(off) < 0.5);
        assert_eq!(blink.shared_opacity(off + ms(300)), 1.0);
        blink.settle(off + ms(300));
        assert_eq!(blink.shared_opacity(off + ms(10_000)), 1.0);
    }
}
