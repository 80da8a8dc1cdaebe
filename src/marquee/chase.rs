/*
 *  marquee/chase.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Comet trail running around the LED border
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

use std::f32::consts::PI;
use std::time::Instant;
use log::debug;

use crate::animation::{AnimationSlot, Easing, Timing};
use crate::constants::{CHASE_HEAD_SIZE, CHASE_LOOP, CHASE_SEGMENT_LAG, CHASE_TRAIL_LENGTH};

/// Size of the rounded border box the trail runs around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderBox {
    pub width: f32,
    pub height: f32,
    pub radius: f32,
}

impl BorderBox {
    pub fn new(width: f32, height: f32, radius: f32) -> Self {
        Self { width: width.max(0.0), height: height.max(0.0), radius: radius.max(0.0) }
    }

    /// Straight edges less the corners, plus a full circle of corner arcs.
    pub fn perimeter(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            return 0.0;
        }
        2.0 * (self.width + self.height) - 8.0 * self.radius + 2.0 * PI * self.radius
    }
}

/// One dash of the trail, head first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub index: usize,
    pub opacity: f32,
    /// Dash offset along the perimeter; the dash starts at `-dash_offset`.
    pub dash_offset: f32,
    pub length: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChaseFrame {
    pub perimeter: f32,
    pub segments: Vec<TrailSegment>,
}

/// Runs iff the border is shown, chase is enabled and the box has a
/// perimeter.
#[derive(Debug)]
pub struct BorderChase {
    progress: AnimationSlot,
    bounds: BorderBox,
    enabled: bool,
}

impl BorderChase {
    pub fn new(bounds: BorderBox) -> Self {
        Self { progress: AnimationSlot::new("chase", 0.0), bounds, enabled: false }
    }

    pub fn bounds(&self) -> BorderBox {
        self.bounds
    }

    /// Update the box; a running chase restarts for the new perimeter.
    pub fn set_bounds(&mut self, bounds: BorderBox, now: Instant) {
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        self.apply(now);
    }

    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        self.apply(now);
    }

    fn apply(&mut self, now: Instant) {
        let perimeter = self.bounds.perimeter();
        if self.enabled && perimeter > 0.0 {
            self.progress.start(
                Timing::looping(0.0, -perimeter, CHASE_LOOP, Easing::Linear, false),
                now,
            );
            debug!("border chase running, perimeter {:.1}", perimeter);
        } else {
            self.cancel();
        }
    }

    pub fn cancel(&mut self) {
        if self.progress.is_running() {
            debug!("border chase stopped");
        }
        self.progress.reset(0.0);
    }

    pub fn is_running(&self) -> bool {
        self.progress.is_running()
    }

    pub fn progress(&self, now: Instant) -> f32 {
        self.progress.value(now)
    }

    /// Trail segments for this instant, or `None` while stopped.
    pub fn frame(&self, now: Instant) -> Option<ChaseFrame> {
        if !self.is_running() {
            return None;
        }
        let progress = self.progress(now);
        let segments = (0..CHASE_TRAIL_LENGTH)
            .map(|i| TrailSegment {
                index: i,
                opacity: (1.0 - i as f32 / CHASE_TRAIL_LENGTH as f32).max(0.0),
                dash_offset: progress + i as f32 * CHASE_SEGMENT_LAG,
                length: CHASE_HEAD_SIZE,
            })
            .collect();
        Some(ChaseFrame { perimeter: self.bounds.perimeter(), segments })
    }
}
