/*
 *  app.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	The marquee screen: settings, engine, gestures, persistence and canvas
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

use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use crate::command::{BlinkTarget, Command, HELP};
use crate::config::Config;
use crate::constants::MAX_CANVAS_SIDE;
use crate::gesture::{GestureArbiter, PointerId, TouchEvent, TouchPoint};
use crate::marquee::{EngineSignal, FrameState, MarqueeEngine};
use crate::persist::SettingsPersister;
use crate::render::{FrameBuf, Renderer};
use crate::settings::{chrome_visible, snap_speed, OrientationLock, Settings, SettingsPatch};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::term::TerminalSink;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Reply(String),
    Quit,
}

/// Pick the settings store the config asks for.
pub fn open_store(cfg: &Config) -> Arc<dyn KeyValueStore> {
    if !cfg.persist() {
        info!("settings persistence disabled, using memory store");
        return Arc::new(MemoryStore::new());
    }
    let dir = cfg.storage_dir().map(|d| d.to_path_buf()).unwrap_or_else(FileStore::default_dir);
    info!("settings stored under {}", dir.display());
    Arc::new(FileStore::new(dir))
}

pub struct MarqueeApp {
    settings: Settings,
    engine: MarqueeEngine,
    arbiter: GestureArbiter,
    persister: SettingsPersister,
    renderer: Renderer,
    fb: FrameBuf<Rgb888>,
    viewport: Size,
    border_radius: f32,
    grid: bool,
    config_open: bool,
    next_pointer: PointerId,
}

impl MarqueeApp {
    pub fn new(cfg: &Config, persister: SettingsPersister, now: Instant) -> Self {
        let mut settings = Settings::default();
        if let Some(text) = cfg.initial_text() {
            settings.text = text.to_string();
        }
        let viewport = Size::new(cfg.width(), cfg.height());
        let renderer = Renderer::new(viewport.width, viewport.height, cfg.border_radius(), cfg.grid());
        let mut engine = MarqueeEngine::new(&settings, viewport.width as f32, cfg.base_font_size(), now);
        engine.set_border(settings.show_border, settings.is_border_chase, now);
        engine.set_border_box(renderer.border_box(), now);

        Self {
            settings,
            engine,
            arbiter: GestureArbiter::new(),
            persister,
            fb: FrameBuf::new(viewport.width, viewport.height, Rgb888::BLACK),
            renderer,
            viewport,
            border_radius: cfg.border_radius(),
            grid: cfg.grid(),
            config_open: false,
            next_pointer: 1,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &MarqueeEngine {
        &self.engine
    }

    pub fn persister(&self) -> &SettingsPersister {
        &self.persister
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn is_config_open(&self) -> bool {
        self.config_open
    }

    pub fn framebuffer(&self) -> &FrameBuf<Rgb888> {
        &self.fb
    }

    /// Merge the result of the startup load, unless the user got there first.
    pub fn accept_loaded(&mut self, patch: Option<SettingsPatch>, now: Instant) -> bool {
        let mut loaded = self.settings.clone();
        if !self.persister.accept_loaded(patch, &mut loaded) {
            return false;
        }
        self.settings = loaded;
        self.engine.apply_settings(&self.settings, now);
        self.apply_orientation(now);
        true
    }

    fn edit(&mut self, now: Instant, change: impl FnOnce(&mut Settings)) {
        change(&mut self.settings);
        self.engine.apply_settings(&self.settings, now);
        self.apply_orientation(now);
        self.persister.record_edit(&self.settings);
    }

    pub fn execute(&mut self, command: Command, now: Instant) -> Outcome {
        debug!("command {:?}", command);
        match command {
            Command::Text(text) => self.edit(now, |s| s.text = text),
            Command::Speed(speed) => self.edit(now, |s| s.speed = snap_speed(speed)),
            Command::Color(color) => self.edit(now, |s| s.selected_color = color),
            Command::Border(on) => self.edit(now, |s| s.show_border = on),
            Command::Chase(on) => self.edit(now, |s| s.is_border_chase = on),
            Command::Blink(BlinkTarget::Text, on) => self.edit(now, |s| s.is_text_blinking = on),
            Command::Blink(BlinkTarget::Border, on) => self.edit(now, |s| s.is_border_blinking = on),
            Command::Landscape(on) => self.edit(now, |s| s.is_landscape_locked = on),
            Command::Pinch(scale) => {
                self.synthesize_pinch(scale, now);
                return Outcome::Reply(format!("font size {:.0}", self.engine.font_size()));
            }
            Command::Tap => return self.synthesize_double_tap(now),
            Command::Resize { width, height } => {
                if width == 0 || height == 0 || width > MAX_CANVAS_SIDE || height > MAX_CANVAS_SIDE {
                    return Outcome::Reply(format!("canvas must be 1..={MAX_CANVAS_SIDE} on each side"));
                }
                self.resize(Size::new(width, height), now);
            }
            Command::Close => self.config_open = false,
            Command::Status => return Outcome::Reply(self.status_line()),
            Command::Help => return Outcome::Reply(HELP.to_string()),
            Command::Quit => return Outcome::Quit,
        }
        Outcome::Continue
    }

    /// Feed raw touches through the arbiter into the engine.
    pub fn touch(&mut self, event: TouchEvent, now: Instant) -> Option<EngineSignal> {
        let gesture = self.arbiter.handle(event)?;
        let signal = self.engine.handle_gesture(gesture, now);
        if signal == Some(EngineSignal::OpenConfiguration) {
            info!("configuration opened");
            self.config_open = true;
        }
        signal
    }

    fn pointer(&mut self) -> PointerId {
        let id = self.next_pointer;
        self.next_pointer += 1;
        id
    }

    fn centre(&self) -> TouchPoint {
        TouchPoint::new(self.viewport.width as f32 / 2.0, self.viewport.height as f32 / 2.0)
    }

    fn synthesize_pinch(&mut self, scale: f32, now: Instant) {
        let c = self.centre();
        let span = 100.0;
        let (a, b) = (self.pointer(), self.pointer());
        let left = TouchPoint::new(c.x - span / 2.0, c.y);
        let events = [
            TouchEvent::Down { pointer: a, position: left, at: now },
            TouchEvent::Down { pointer: b, position: TouchPoint::new(c.x + span / 2.0, c.y), at: now },
            TouchEvent::Move { pointer: b, position: TouchPoint::new(left.x + span * scale, c.y), at: now },
            TouchEvent::Up { pointer: a, at: now },
            TouchEvent::Up { pointer: b, at: now },
        ];
        for event in events {
            self.touch(event, now);
        }
    }

    fn synthesize_double_tap(&mut self, now: Instant) -> Outcome {
        let c = self.centre();
        let mut opened = false;
        for start in [Duration::ZERO, Duration::from_millis(150)] {
            let pointer = self.pointer();
            let down = now + start;
            self.touch(TouchEvent::Down { pointer, position: c, at: down }, now);
            let signal = self.touch(TouchEvent::Up { pointer, at: down + Duration::from_millis(50) }, now);
            opened |= signal == Some(EngineSignal::OpenConfiguration);
        }
        if opened {
            Outcome::Reply(format!("settings: {}", self.status_line()))
        } else {
            Outcome::Continue
        }
    }

    fn resize(&mut self, size: Size, now: Instant) {
        let size = match self.settings.orientation_lock() {
            OrientationLock::Landscape if size.height > size.width => Size::new(size.height, size.width),
            _ => size,
        };
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        self.renderer = Renderer::new(size.width, size.height, self.border_radius, self.grid);
        self.fb = FrameBuf::new(size.width, size.height, Rgb888::BLACK);
        self.engine.set_viewport(size.width as f32, now);
        self.engine.set_border_box(self.renderer.border_box(), now);
    }

    fn apply_orientation(&mut self, now: Instant) {
        self.resize(self.viewport, now);
    }

    /// Sample the engine, draw into the canvas and report the measurement
    /// back for the next frame.
    pub fn render_frame(&mut self, now: Instant) -> FrameState {
        let state = self.engine.frame(now);
        let measured = self.renderer.render(&mut self.fb, self.engine.text(), &state);
        self.engine.on_text_measured(measured, now);
        state
    }

    /// Line under the canvas: the settings panel while open, otherwise the
    /// header in portrait only.
    pub fn footer(&self) -> Option<String> {
        if self.config_open {
            return Some(format!("settings: {} ('close' to dismiss)", self.status_line()));
        }
        chrome_visible(self.viewport.width as f32, self.viewport.height as f32)
            .then(|| format!("LED Scroller | {}", self.settings.text))
    }

    pub fn status_line(&self) -> String {
        let s = &self.settings;
        format!(
            "text=\"{}\" speed={} color={} border={} chase={} blink(text={}, border={}) landscape={} font={:.0} canvas={}x{}",
            s.text,
            s.speed,
            s.selected_color.name,
            s.show_border,
            s.is_border_chase,
            s.is_text_blinking,
            s.is_border_blinking,
            s.is_landscape_locked,
            self.engine.font_size(),
            self.viewport.width,
            self.viewport.height,
        )
    }

    /// Draw the canvas, with the footer when one is due.
    pub fn present<W: Write>(&self, sink: &mut TerminalSink<W>) -> io::Result<()> {
        sink.present(&self.fb, self.footer().as_deref())
    }

    /// End a run however the frame loop finished: restore the terminal, then
    /// shut down, then hand back the loop's `result`.
    pub async fn close<W: Write, E>(
        self,
        sink: Option<&mut TerminalSink<W>>,
        result: Result<(), E>,
    ) -> Result<(), E> {
        if let Some(sink) = sink {
            if let Err(e) = sink.leave() {
                warn!("terminal restore failed: {}", e);
            }
        }
        self.shutdown().await;
        result
    }

    /// Stop every animation and flush pending settings.
    pub async fn shutdown(mut self) {
        self.engine.teardown();
        if !self.persister.has_edits() && !self.persister.is_loaded() {
            warn!("shutting down before stored settings loaded");
        }
        self.persister.shutdown().await;
    }
}
