/*
 *  marquee/scroll.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Horizontal offset loop of the marquee
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

use std::time::{Duration, Instant};
use log::{debug, info};

use crate::animation::{AnimationSlot, Easing, Timing};
use super::layout::{clamp_speed, TileLayout};

/// One endless linear run of the offset from 0 to `-pattern_width`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCycle {
    pub start_offset: f32,
    pub end_offset: f32,
    pub duration: Duration,
}

impl ScrollCycle {
    /// Build the cycle for `layout` at `speed` px/s (clamped to >= 1).
    pub fn new(layout: &TileLayout, speed: f32) -> Self {
        let speed = clamp_speed(speed);
        let secs = layout.pattern_width.max(0.0) as f64 / speed as f64;
        Self {
            start_offset: 0.0,
            end_offset: -layout.pattern_width,
            duration: Duration::from_secs_f64(secs),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    pub fn timing(&self) -> Timing {
        Timing::looping(self.start_offset, self.end_offset, self.duration, Easing::Linear, false)
    }
}

/// Owns the single running scroll cycle.
#[derive(Debug)]
pub struct ScrollAnimator {
    slot: AnimationSlot,
    current: Option<ScrollCycle>,
}

impl Default for ScrollAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollAnimator {
    pub fn new() -> Self {
        Self { slot: AnimationSlot::new("scroll", 0.0), current: None }
    }

    /// Cancel the running cycle, reset the offset to 0 and, when the text
    /// has been measured, schedule the new cycle.
    pub fn restart(&mut self, layout: &TileLayout, speed: f32, now: Instant) -> Option<ScrollCycle> {
        self.slot.reset(0.0);
        self.current = None;
        if !layout.is_measured() || layout.pattern_width <= 0.0 {
            debug!("scroll waiting for a text measurement");
            return None;
        }
        let cycle = ScrollCycle::new(layout, speed);
        self.slot.start(cycle.timing(), now);
        info!(
            "scroll cycle: pattern {:.1}px, {} copies, {:.0}ms",
            layout.pattern_width, layout.copy_count, cycle.duration_ms()
        );
        self.current = Some(cycle);
        Some(cycle)
    }

    pub fn cancel(&mut self) {
        self.slot.reset(0.0);
        self.current = None;
    }

    pub fn offset(&self, now: Instant) -> f32 {
        self.slot.value(now)
    }

    pub fn cycle(&self) -> Option<ScrollCycle> {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.slot.is_running()
    }

    pub fn generation(&self) -> u64 {
        self.slot.generation()
    }
}
