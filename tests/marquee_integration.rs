/*
 *  tests/marquee_integration.rs
 *
 *  Integration tests for the marquee library
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;

use ledmarquee::app::{MarqueeApp, Outcome};
use ledmarquee::command::Command;
use ledmarquee::config::{load_with, Cli};
use ledmarquee::constants::SETTINGS_KEY;
use ledmarquee::gesture::{GestureArbiter, GestureEvent, TouchEvent, TouchPoint};
use ledmarquee::marquee::{compute_tile_layout, BlinkState, MarqueeEngine, ScrollCycle, ZoomState};
use ledmarquee::persist::SettingsPersister;
use ledmarquee::render::{FrameBuf, Renderer};
use ledmarquee::settings::Settings;
use ledmarquee::storage::{FileStore, KeyValueStore, MemoryStore};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn test_copy_count_covers_viewport() {
    for viewport in [1.0_f32, 120.0, 360.0, 1280.0] {
        for measured in [0.0_f32, 1.0, 40.0, 300.0, 5000.0] {
            let layout = compute_tile_layout(measured, viewport);
            assert!(layout.copy_count >= 2);
            assert!(layout.pattern_width * layout.copy_count as f32 >= 2.0 * viewport);
        }
    }
    assert_eq!(compute_tile_layout(0.0, 360.0).copy_count, 2);

    let layout = compute_tile_layout(300.0, 360.0);
    assert!((layout.pattern_width - 408.0).abs() < 1e-3);
    assert_eq!(layout.copy_count, 2);
}

#[test]
fn test_duration_falls_with_speed() {
    let layout = compute_tile_layout(300.0, 360.0);
    let slow = ScrollCycle::new(&layout, 50.0).duration_ms();
    let fast = ScrollCycle::new(&layout, 200.0).duration_ms();
    assert!(fast < slow);
    assert_eq!(ScrollCycle::new(&layout, 0.0).duration_ms(), ScrollCycle::new(&layout, 1.0).duration_ms());
}

#[test]
fn test_pinch_compounds() {
    let mut zoom = ZoomState::new(100.0);
    zoom.on_pinch_update(2.0);
    zoom.on_pinch_end();
    zoom.on_pinch_update(1.5);
    zoom.on_pinch_end();
    assert_eq!(zoom.font_size(), 300.0);
}

#[test]
fn test_blink_oscillator_starts_and_stops() {
    let t0 = Instant::now();
    let mut blink = BlinkState::new();
    blink.set_flags(true, false, t0);
    assert!(blink.is_oscillating());
    assert!(blink.text_opacity(t0 + ms(500)) < 0.5);
    assert_eq!(blink.border_opacity(t0 + ms(500)), 1.0);

    blink.set_flags(false, false, t0 + ms(500));
    assert!(!blink.is_oscillating());
    assert_eq!(blink.shared_opacity(t0 + ms(900)), 1.0);
}

#[test]
fn test_engine_scrolls_one_pattern_per_cycle() {
    let t0 = Instant::now();
    let mut engine = MarqueeEngine::new(&Settings::default(), 360.0, 100.0, t0);
    engine.on_text_measured(300.0, t0);
    let cycle = engine.scroll_cycle().unwrap();
    assert!((cycle.duration_ms() - 4080.0).abs() < 1.0);

    let half = engine.frame(t0 + ms(2040));
    assert!((half.offset + 204.0).abs() < 0.5);
    // the loop wraps back to the start
    let wrapped = engine.frame(t0 + ms(4080 + 1020));
    assert!((wrapped.offset + 102.0).abs() < 0.5);
}

#[test]
fn test_gesture_to_engine() {
    let t0 = Instant::now();
    let mut arbiter = GestureArbiter::new();
    let mut engine = MarqueeEngine::new(&Settings::default(), 360.0, 100.0, t0);

    let events = [
        TouchEvent::Down { pointer: 7, position: TouchPoint::new(100.0, 40.0), at: t0 },
        TouchEvent::Down { pointer: 8, position: TouchPoint::new(140.0, 40.0), at: t0 },
        TouchEvent::Move { pointer: 8, position: TouchPoint::new(180.0, 40.0), at: t0 + ms(20) },
        TouchEvent::Up { pointer: 8, at: t0 + ms(40) },
        TouchEvent::Up { pointer: 7, at: t0 + ms(45) },
    ];
    let gestures: Vec<GestureEvent> = events.into_iter().filter_map(|e| arbiter.handle(e)).collect();
    assert_eq!(gestures, vec![GestureEvent::PinchUpdate { scale: 2.0 }, GestureEvent::PinchEnd]);
    for g in gestures {
        assert_eq!(engine.handle_gesture(g, t0), None);
    }
    assert_eq!(engine.font_size(), 200.0);
}

#[test]
fn test_renderer_feeds_measurement_back() {
    let t0 = Instant::now();
    let renderer = Renderer::new(256, 64, 8.0, true);
    let mut fb = FrameBuf::new(256, 64, Rgb888::BLACK);
    let mut engine = MarqueeEngine::new(&Settings::with_text("LED"), 256.0, 100.0, t0);

    let frame = engine.frame(t0);
    let measured = renderer.render(&mut fb, engine.text(), &frame);
    engine.on_text_measured(measured, t0);
    assert!(engine.is_scrolling());
    assert_eq!(engine.layout().measured_text_width, measured);
    assert!(fb.as_slice().iter().any(|c| *c != Rgb888::BLACK));
    assert_eq!(renderer.size(), Size::new(256, 64));
}

#[tokio::test]
async fn test_settings_survive_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_with(&Cli { grid: Some(false), ..Cli::default() }, None).unwrap();
    let now = Instant::now();

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
    let mut first = MarqueeApp::new(&cfg, SettingsPersister::new(store.clone()), now);
    first.execute(Command::Text("PERSISTED".into()), now);
    first.execute("chase on".parse().unwrap(), now);
    first.shutdown().await;

    let mut second = MarqueeApp::new(&cfg, SettingsPersister::new(store.clone()), now);
    let patch = second.persister().spawn_load().await.unwrap();
    assert!(second.accept_loaded(patch, now));
    assert_eq!(second.settings().text, "PERSISTED");
    assert!(second.settings().is_border_chase);
    assert!(second.engine().is_chasing());
    assert_eq!(second.execute(Command::Quit, now), Outcome::Quit);
}

#[tokio::test]
async fn test_empty_text_runs() {
    let store = Arc::new(MemoryStore::new());
    let cfg = load_with(&Cli::default(), None).unwrap();
    let now = Instant::now();
    let mut app = MarqueeApp::new(&cfg, SettingsPersister::new(store.clone()), now);
    app.execute(Command::Text(String::new()), now);
    let frame = app.render_frame(now + ms(16));
    assert_eq!(frame.copy_count, 2);
    app.shutdown().await;

    let json = store.get(SETTINGS_KEY).unwrap().unwrap();
    assert!(json.contains("\"text\":\"\""));
}
