/*
 *  gesture.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Touch gesture recognition: pinch and double tap racing for a sequence
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

use std::collections::HashMap;
use std::time::Instant;
use log::debug;

use crate::constants::{DOUBLE_TAP_SLOP_PX, DOUBLE_TAP_TIMEOUT, TAP_MAX_DURATION, TOUCH_SLOP_PX};

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &TouchPoint) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    Down { pointer: PointerId, position: TouchPoint, at: Instant },
    Move { pointer: PointerId, position: TouchPoint, at: Instant },
    Up { pointer: PointerId, at: Instant },
    Cancel { at: Instant },
}

/// What the marquee engine consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Scale relative to the distance when the second finger landed.
    PinchUpdate { scale: f32 },
    PinchEnd,
    DoubleTap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CompletedTap {
    position: TouchPoint,
    lifted: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Claim {
    /// Nobody owns the sequence yet; a single finger may still be a tap.
    Open { down_at: Instant, origin: TouchPoint, moved_too_far: bool },
    Pinch { a: PointerId, b: PointerId, start_distance: f32 },
    /// The pinch ended or the tap failed; wait for every finger to lift.
    Spent,
}

/// Arbitrates the pinch and double-tap recognizers. Whichever recognizes a
/// touch sequence first owns it; the other never fires for it.
#[derive(Debug, Default)]
pub struct GestureArbiter {
    pointers: HashMap<PointerId, TouchPoint>,
    claim: Option<Claim>,
    first_tap: Option<CompletedTap>,
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self.claim, Some(Claim::Pinch { .. }))
    }

    pub fn handle(&mut self, event: TouchEvent) -> Option<GestureEvent> {
        match event {
            TouchEvent::Down { pointer, position, at } => self.on_down(pointer, position, at),
            TouchEvent::Move { pointer, position, .. } => self.on_move(pointer, position),
            TouchEvent::Up { pointer, at } => self.on_up(pointer, at),
            TouchEvent::Cancel { .. } => self.on_cancel(),
        }
    }

    fn on_down(&mut self, pointer: PointerId, position: TouchPoint, at: Instant) -> Option<GestureEvent> {
        self.pointers.insert(pointer, position);

        match self.claim {
            None => {
                if let Some(tap) = self.first_tap {
                    let late = at.saturating_duration_since(tap.lifted) > DOUBLE_TAP_TIMEOUT;
                    if late || tap.position.distance(&position) > DOUBLE_TAP_SLOP_PX {
                        self.first_tap = None;
                    }
                }
                self.claim = Some(Claim::Open { down_at: at, origin: position, moved_too_far: false });
            }
            Some(Claim::Open { .. }) if self.pointers.len() >= 2 => {
                // a second finger means this sequence can only be a pinch
                let mut ids = self.pointers.keys().copied().collect::<Vec<_>>();
                ids.sort_unstable();
                let (a, b) = (ids[0], ids[1]);
                let start_distance = self.distance_between(a, b);
                self.first_tap = None;
                self.claim = Some(Claim::Pinch { a, b, start_distance });
                debug!("pinch claimed the touch sequence");
            }
            Some(_) => {}
        }
        None
    }

    fn on_move(&mut self, pointer: PointerId, position: TouchPoint) -> Option<GestureEvent> {
        if let Some(p) = self.pointers.get_mut(&pointer) {
            *p = position;
        } else {
            return None;
        }

        match self.claim {
            Some(Claim::Open { down_at, origin, .. }) => {
                if origin.distance(&position) > TOUCH_SLOP_PX {
                    self.claim = Some(Claim::Open { down_at, origin, moved_too_far: true });
                }
                None
            }
            Some(Claim::Pinch { a, b, start_distance }) if pointer == a || pointer == b => {
                let scale = if start_distance > 0.0 {
                    self.distance_between(a, b) / start_distance
                } else {
                    1.0
                };
                Some(GestureEvent::PinchUpdate { scale })
            }
            _ => None,
        }
    }

    fn on_up(&mut self, pointer: PointerId, at: Instant) -> Option<GestureEvent> {
        if self.pointers.remove(&pointer).is_none() {
            return None;
        }

        let out = match self.claim {
            Some(Claim::Open { down_at, origin, moved_too_far }) => {
                let quick = at.saturating_duration_since(down_at) <= TAP_MAX_DURATION;
                if quick && !moved_too_far {
                    self.register_tap(origin, at)
                } else {
                    self.first_tap = None;
                    None
                }
            }
            Some(Claim::Pinch { a, b, .. }) if pointer == a || pointer == b => {
                self.claim = Some(Claim::Spent);
                debug!("pinch ended");
                Some(GestureEvent::PinchEnd)
            }
            _ => None,
        };

        if self.pointers.is_empty() {
            self.claim = None;
        }
        out
    }

    fn on_cancel(&mut self) -> Option<GestureEvent> {
        let was_pinching = self.is_pinching();
        self.pointers.clear();
        self.claim = None;
        self.first_tap = None;
        was_pinching.then_some(GestureEvent::PinchEnd)
    }

    fn register_tap(&mut self, position: TouchPoint, lifted: Instant) -> Option<GestureEvent> {
        match self.first_tap.take() {
            Some(_) => {
                debug!("double tap recognized");
                Some(GestureEvent::DoubleTap)
            }
            None => {
                self.first_tap = Some(CompletedTap { position, lifted });
                None
            }
        }
    }

    fn distance_between(&self, a: PointerId, b: PointerId) -> f32 {
        match (self.pointers.get(&a), self.pointers.get(&b)) {
            (Some(pa), Some(pb)) => pa.distance(pb),
            _ => 0.0,
        }
    }
}
