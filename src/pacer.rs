/*
 *  pacer.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Frame pacing for the render loop
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
use std::time::Duration;
use tokio::time::Instant;

fn frame_for(fps: u32) -> Duration {
    Duration::from_micros((1_000_000u32 / fps.max(1)) as u64)
}

pub struct Pacer {
    next_deadline: Instant,
    frame: Duration,
}

impl Pacer {
    pub fn new(target_fps: u32) -> Self {
        Self { next_deadline: Instant::now(), frame: frame_for(target_fps) }
    }

    #[inline]
    pub fn set_fps(&mut self, fps: u32) {
        self.frame = frame_for(fps);
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Returns true if we should flush at `now`; if true, it also schedules
    /// the next deadline.
    #[inline]
    pub fn should_flush_at(&mut self, now: Instant) -> bool {
        if now >= self.next_deadline {
            self.next_deadline = now + self.frame;
            true
        } else {
            false
        }
    }

    /// Sleep until the next deadline, then claim it.
    pub async fn tick(&mut self) -> Instant {
        tokio::time::sleep_until(self.next_deadline).await;
        let now = Instant::now();
        self.should_flush_at(now);
        now
    }
}

/// A [`Pacer`] that lowers its rate when presenting frames gets slow.
pub struct AutoPacer {
    pacer: Pacer,
    ema_ms: f32,     // moving avg of flush time
    alpha: f32,      // smoothing (0.1 ~ 0.3)
    headroom: f32,   // >1.0 to avoid saturation (e.g. 1.25)
    max_fps: u32,    // user cap
    min_fps: u32,    // floor
}

impl AutoPacer {
    pub fn new(initial_fps: u32, max_fps: u32, min_fps: u32) -> Self {
        Self {
            pacer: Pacer::new(initial_fps),
            ema_ms: 0.0,
            alpha: 0.2,
            headroom: 1.25,
            max_fps: max_fps.max(1),
            min_fps: min_fps.clamp(1, max_fps.max(1)),
        }
    }

    pub fn frame(&self) -> Duration {
        self.pacer.frame()
    }

    pub async fn tick(&mut self) -> Instant {
        self.pacer.tick().await
    }

    /// Call immediately after a frame has been presented.
    pub fn record_flush_ms(&mut self, flush_ms: f32) {
        self.ema_ms = if self.ema_ms == 0.0 {
            flush_ms
        } else {
            self.alpha * flush_ms + (1.0 - self.alpha) * self.ema_ms
        };
        if self.ema_ms > 0.0 {
            let safe_fps = (1000.0 / (self.ema_ms * self.headroom))
                .clamp(self.min_fps as f32, self.max_fps as f32) as u32;
            self.pacer.set_fps(safe_fps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_pacer_deadlines() {
        let mut pacer = Pacer::new(25);
        assert_eq!(pacer.frame(), Duration::from_millis(40));
        let t0 = Instant::now();
        assert!(pacer.should_flush_at(t0));
        assert!(!pacer.should_flush_at(t0 + Duration::from_millis(39)));
        assert!(pacer.should_flush_at(t0 + Duration::from_millis(40)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_waits_one_frame() {
        let mut pacer = Pacer::new(10);
        let first = pacer.tick().await;
        let second = pacer.tick().await;
        assert_eq!(second - first, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_pacer_backs_off() {
        let mut auto = AutoPacer::new(60, 60, 10);
        auto.record_flush_ms(40.0);
        // 40 ms * 1.25 headroom leaves 20 fps
        assert_eq!(auto.frame(), Duration::from_millis(50));
        auto.record_flush_ms(1000.0);
        assert_eq!(auto.frame(), Duration::from_millis(100));
        assert_eq!(AutoPacer::new(30, 30, 0).frame(), frame_for(30));
    }
}
