/*
 *  marquee/engine.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee engine: tiling, scroll loop, zoom, color and opacity per frame
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
use log::{debug, info};

use crate::color::{Hsl, LedColor};
use crate::gesture::GestureEvent;
use crate::settings::Settings;
use super::blink::BlinkState;
use super::chase::{BorderBox, BorderChase, ChaseFrame};
use super::layout::{clamp_speed, compute_tile_layout, MarqueeConfig, TileLayout};
use super::scroll::{ScrollAnimator, ScrollCycle};
use super::tint::ColorState;
use super::zoom::ZoomState;

/// Signals the engine raises towards the host screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    OpenConfiguration,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameState {
    pub offset: f32,
    pub font_size: f32,
    pub color: Hsl,
    /// Same value as `color`; kept apart so renderers can treat it separately.
    pub glow: Hsl,
    pub text_opacity: f32,
    pub border_opacity: f32,
    pub copy_count: usize,
    pub pattern_width: f32,
    pub show_border: bool,
    pub chase: Option<ChaseFrame>,
}

impl FrameState {
    /// X position of every tile, left to right.
    pub fn tiles(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.copy_count).map(move |i| self.offset + i as f32 * self.pattern_width)
    }
}

pub struct MarqueeEngine {
    config: MarqueeConfig,
    layout: TileLayout,
    scroll: ScrollAnimator,
    zoom: ZoomState,
    color: ColorState,
    blink: BlinkState,
    chase: BorderChase,
    show_border: bool,
    border_chase: bool,
    /// Measurement taken mid-pinch, applied once the pinch is released.
    pending_measure: Option<f32>,
}

impl MarqueeEngine {
    pub fn new(settings: &Settings, viewport_width: f32, base_font_size: f32, now: Instant) -> Self {
        let config = MarqueeConfig::new(settings.text.clone(), settings.speed, viewport_width);
        let layout = config.tile_layout();
        let mut color = ColorState::new(LedColor::default());
        color.jump_to(settings.selected_color.clone());

        let mut engine = Self {
            config,
            layout,
            scroll: ScrollAnimator::new(),
            zoom: ZoomState::new(base_font_size),
            color,
            blink: BlinkState::new(),
            chase: BorderChase::new(BorderBox::new(0.0, 0.0, 0.0)),
            show_border: settings.show_border,
            border_chase: settings.is_border_chase,
            pending_measure: None,
        };
        engine.blink.set_flags(settings.is_text_blinking, settings.is_border_blinking, now);
        engine.start_scroll_cycle(now);
        engine
    }

    pub fn config(&self) -> &MarqueeConfig {
        &self.config
    }

    pub fn layout(&self) -> TileLayout {
        self.layout
    }

    pub fn text(&self) -> &str {
        &self.config.text
    }

    pub fn speed(&self) -> f32 {
        self.config.speed_px_per_sec
    }

    pub fn font_size(&self) -> f32 {
        self.zoom.font_size()
    }

    pub fn zoom(&self) -> &ZoomState {
        &self.zoom
    }

    pub fn blink(&self) -> &BlinkState {
        &self.blink
    }

    pub fn color_target(&self) -> &LedColor {
        self.color.target()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_running()
    }

    pub fn scroll_cycle(&self) -> Option<ScrollCycle> {
        self.scroll.cycle()
    }

    pub fn scroll_generation(&self) -> u64 {
        self.scroll.generation()
    }

    pub fn is_chasing(&self) -> bool {
        self.chase.is_running()
    }

    /// Recompute the tiling from the current measurement and viewport.
    pub fn compute_tile_layout(&mut self) -> TileLayout {
        self.layout = compute_tile_layout(self.config.measured_text_width, self.config.viewport_width);
        self.layout
    }

    /// Cancel the running cycle, reset to 0 and schedule a fresh one.
    pub fn start_scroll_cycle(&mut self, now: Instant) -> Option<ScrollCycle> {
        self.scroll.restart(&self.layout, self.config.speed_px_per_sec, now)
    }

    fn relayout_and_restart(&mut self, now: Instant) {
        let before = self.layout;
        let after = self.compute_tile_layout();
        if before != after || !self.scroll.is_running() {
            self.start_scroll_cycle(now);
        }
    }

    /// New text needs a new measurement before the loop runs again.
    pub fn set_text(&mut self, text: &str, now: Instant) {
        if self.config.text == text {
            return;
        }
        debug!("marquee text changed ({} chars)", text.chars().count());
        self.config.text = text.to_string();
        self.config.measured_text_width = 0.0;
        self.pending_measure = None;
        self.compute_tile_layout();
        self.start_scroll_cycle(now);
    }

    pub fn set_speed(&mut self, speed: f32, now: Instant) {
        let speed = clamp_speed(speed);
        if speed == self.config.speed_px_per_sec {
            return;
        }
        self.config.speed_px_per_sec = speed;
        self.start_scroll_cycle(now);
    }

    /// Resizes (rotation included) rebuild the layout and restart the loop.
    pub fn set_viewport(&mut self, viewport_width: f32, now: Instant) {
        let width = viewport_width.max(0.0);
        if width == self.config.viewport_width {
            return;
        }
        info!("viewport {:.0} -> {:.0}", self.config.viewport_width, width);
        self.config.viewport_width = width;
        self.compute_tile_layout();
        self.start_scroll_cycle(now);
    }

    /// Width of one laid out copy, as measured by the renderer.
    pub fn on_text_measured(&mut self, width: f32, now: Instant) {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        if self.zoom.is_pinching() {
            self.pending_measure = Some(width);
            return;
        }
        if width == self.config.measured_text_width {
            return;
        }
        self.config.measured_text_width = width;
        self.relayout_and_restart(now);
    }

    pub fn on_pinch_update(&mut self, scale_factor: f32) -> f32 {
        self.zoom.on_pinch_update(scale_factor)
    }

    pub fn on_pinch_end(&mut self, now: Instant) -> f32 {
        let size = self.zoom.on_pinch_end();
        if let Some(width) = self.pending_measure.take() {
            self.on_text_measured(width, now);
        }
        size
    }

    /// Open the configuration, unless a pinch owns the touch sequence.
    pub fn on_double_tap(&mut self) -> Option<EngineSignal> {
        if self.zoom.is_pinching() {
            return None;
        }
        Some(EngineSignal::OpenConfiguration)
    }

    pub fn handle_gesture(&mut self, event: GestureEvent, now: Instant) -> Option<EngineSignal> {
        match event {
            GestureEvent::PinchUpdate { scale } => {
                self.on_pinch_update(scale);
                None
            }
            GestureEvent::PinchEnd => {
                self.on_pinch_end(now);
                None
            }
            GestureEvent::DoubleTap => self.on_double_tap(),
        }
    }

    pub fn set_color_target(&mut self, preset: LedColor, now: Instant) {
        self.color.set_target(preset, now);
    }

    pub fn set_blink_flags(&mut self, text_blinking: bool, border_blinking: bool, now: Instant) {
        self.blink.set_flags(text_blinking, border_blinking, now);
    }

    pub fn set_border(&mut self, show_border: bool, chase: bool, now: Instant) {
        self.show_border = show_border;
        self.border_chase = chase;
        self.chase.set_enabled(show_border && chase, now);
    }

    pub fn set_border_box(&mut self, bounds: BorderBox, now: Instant) {
        self.chase.set_bounds(bounds, now);
        self.chase.set_enabled(self.show_border && self.border_chase, now);
    }

    /// Bring every engine input in line with `settings`.
    pub fn apply_settings(&mut self, settings: &Settings, now: Instant) {
        self.set_text(&settings.text, now);
        self.set_speed(settings.speed, now);
        if self.color.target() != &settings.selected_color {
            self.set_color_target(settings.selected_color.clone(), now);
        }
        self.set_blink_flags(settings.is_text_blinking, settings.is_border_blinking, now);
        self.set_border(settings.show_border, settings.is_border_chase, now);
    }

    /// Sample every animated value at `now`.
    pub fn frame(&mut self, now: Instant) -> FrameState {
        self.color.settle(now);
        self.blink.settle(now);
        let color = self.color.current(now);
        FrameState {
            offset: self.scroll.offset(now),
            font_size: self.zoom.font_size(),
            color,
            glow: color,
            text_opacity: self.blink.text_opacity(now),
            border_opacity: self.blink.border_opacity(now),
            copy_count: self.layout.copy_count,
            pattern_width: self.layout.pattern_width,
            show_border: self.show_border,
            chase: self.chase.frame(now),
        }
    }

    /// Cancel every running cycle; called when the screen goes away.
    pub fn teardown(&mut self) {
        self.scroll.cancel();
        self.blink.cancel();
        self.chase.cancel();
        info!("marquee engine torn down");
    }
}
