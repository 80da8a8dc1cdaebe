/*
 *  animation.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Time driven value animations and the owned slot that runs them
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

use std::time::{Duration, Instant};
use log::debug;

/// Easing curves applied to the normalised progress of a leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Quadratic ease in and out, the default "ease" of the host scheduler.
    InOutQuad,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// Loop forever; with `reverse` every odd leg runs `to -> from`.
    Infinite { reverse: bool },
}

/// A single timed run from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    pub from: f32,
    pub to: f32,
    pub duration: Duration,
    pub easing: Easing,
    pub repeat: Repeat,
}

impl Timing {
    pub fn once(from: f32, to: f32, duration: Duration, easing: Easing) -> Self {
        Self { from, to, duration, easing, repeat: Repeat::Once }
    }

    pub fn looping(from: f32, to: f32, duration: Duration, easing: Easing, reverse: bool) -> Self {
        Self { from, to, duration, easing, repeat: Repeat::Infinite { reverse } }
    }

    /// Value of the run `elapsed` after it started.
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return self.to;
        }
        // f64 keeps long running loops from drifting
        let legs = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        let progress = match self.repeat {
            Repeat::Once => legs.min(1.0) as f32,
            Repeat::Infinite { reverse } => {
                let leg = legs.floor();
                let frac = (legs - leg) as f32;
                if reverse && (leg as u64) % 2 == 1 { 1.0 - frac } else { frac }
            }
        };
        let eased = self.easing.apply(progress);
        self.from + (self.to - self.from) * eased
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        match self.repeat {
            Repeat::Once => elapsed >= self.duration,
            Repeat::Infinite { .. } => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug)]
struct Run {
    timing: Timing,
    started: Instant,
}

/// Owns at most one running animation of a single value.
///
/// Starting always cancels whatever was in flight first, so runs never
/// stack. Each start bumps `generation`, which lets callers tell one run
/// from the next.
#[derive(Debug)]
pub struct AnimationSlot {
    name: &'static str,
    resting: f32,
    run: Option<Run>,
    generation: u64,
}

impl AnimationSlot {
    pub fn new(name: &'static str, resting: f32) -> Self {
        Self { name, resting, run: None, generation: 0 }
    }

    pub fn state(&self) -> SlotState {
        if self.run.is_some() { SlotState::Running } else { SlotState::Idle }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Current value; a finished one-shot run reads as its end value.
    pub fn value(&self, now: Instant) -> f32 {
        match &self.run {
            Some(run) => run.timing.value_at(now.saturating_duration_since(run.started)),
            None => self.resting,
        }
    }

    /// Cancel any run then start `timing` at `now`.
    pub fn start(&mut self, timing: Timing, now: Instant) -> u64 {
        self.cancel(now);
        self.resting = timing.from;
        self.run = Some(Run { timing, started: now });
        self.generation += 1;
        debug!("{} started run {} ({:?})", self.name, self.generation, timing.duration);
        self.generation
    }

    /// Stop the run, freezing the value where it currently is.
    pub fn cancel(&mut self, now: Instant) {
        if self.run.is_some() {
            self.resting = self.value(now);
            self.run = None;
            debug!("{} canceled at {:.2}", self.name, self.resting);
        }
    }

    /// Cancel and jump straight to `value`.
    pub fn reset(&mut self, value: f32) {
        if self.run.take().is_some() {
            debug!("{} reset to {:.2}", self.name, value);
        }
        self.resting = value;
    }

    /// Retire a finished one-shot run so the slot reads as idle.
    pub fn settle(&mut self, now: Instant) {
        if let Some(run) = self.run {
            if run.timing.is_finished(now.saturating_duration_since(run.started)) {
                self.resting = run.timing.to;
                self.run = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_linear_once_clamps_at_end() {
        let t = Timing::once(0.0, 10.0, ms(1000), Easing::Linear);
        assert_eq!(t.value_at(ms(0)), 0.0);
        assert!((t.value_at(ms(500)) - 5.0).abs() < 1e-4);
        assert_eq!(t.value_at(ms(5000)), 10.0);
        assert!(t.is_finished(ms(1000)));
    }

    #[test]
    fn test_infinite_wraps_without_reverse() {
        let t = Timing::looping(0.0, -100.0, ms(1000), Easing::Linear, false);
        assert!((t.value_at(ms(1250)) + 25.0).abs() < 1e-3);
        assert!(!t.is_finished(ms(100_000)));
    }

    #[test]
    fn test_infinite_reverse_runs_back() {
        let t = Timing::looping(1.0, 0.4, ms(500), Easing::Linear, true);
        assert!((t.value_at(ms(500)) - 0.4).abs() < 1e-4);
        assert!((t.value_at(ms(750)) - 0.7).abs() < 1e-4);
        assert!((t.value_at(ms(1000)) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_in_out_quad_is_symmetric() {
        assert_eq!(Easing::InOutQuad.apply(0.0), 0.0);
        assert_eq!(Easing::InOutQuad.apply(1.0), 1.0);
        assert!((Easing::InOutQuad.apply(0.5) - 0.5).abs() < 1e-6);
        assert!(Easing::InOutQuad.apply(0.25) < 0.25);
    }

    #[test]
    fn test_slot_start_cancels_previous() {
        let now = Instant::now();
        let mut slot = AnimationSlot::new("probe", 0.0);
        let first = slot.start(Timing::looping(0.0, -10.0, ms(100), Easing::Linear, false), now);
        let second = slot.start(Timing::looping(0.0, -20.0, ms(100), Easing::Linear, false), now + ms(50));
        assert_eq!(second, first + 1);
        assert_eq!(slot.state(), SlotState::Running);
        assert_eq!(slot.value(now + ms(50)), 0.0);
    }

    #[test]
    fn test_slot_cancel_freezes_value() {
        let now = Instant::now();
        let mut slot = AnimationSlot::new("probe", 0.0);
        slot.start(Timing::once(0.0, 10.0, ms(100), Easing::Linear), now);
        slot.cancel(now + ms(50));
        assert_eq!(slot.state(), SlotState::Idle);
        assert!((slot.value(now + ms(500)) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_slot_settles_finished_run() {
        let now = Instant::now();
        let mut slot = AnimationSlot::new("probe", 1.0);
        slot.start(Timing::once(0.4, 1.0, ms(300), Easing::InOutQuad), now);
        slot.settle(now + ms(100));
        assert!(slot.is_running());
        slot.settle(now + ms(300));
        assert!(!slot.is_running());
        assert_eq!(slot.value(now + ms(301)), 1.0);
    }
}
