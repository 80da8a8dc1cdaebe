/*
 *  constants.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
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

// marquee
pub const DEFAULT_TEXT: &str = "BONJOUR 2025";
pub const DEFAULT_SPEED_PX_PER_SEC: f32 = 100.0;
/// Floor applied to any non-positive or non-finite speed.
pub const MIN_SPEED_PX_PER_SEC: f32 = 1.0;
pub const SPEED_SLIDER_MIN: f32 = 20.0;
pub const SPEED_SLIDER_MAX: f32 = 800.0;
pub const SPEED_SLIDER_STEP: f32 = 20.0;
/// Gap between tiled copies, as a fraction of the viewport width.
pub const LOOP_SPACING_RATIO: f32 = 0.3;
/// Copies rendered before the first text measurement arrives.
pub const MIN_COPY_COUNT: usize = 2;
pub const DEFAULT_FONT_SIZE: f32 = 100.0;

// color
pub const COLOR_TRANSITION: Duration = Duration::from_millis(500);
pub const DEFAULT_COLOR_INDEX: usize = 4; // cyan

// blink
pub const BLINK_LEG: Duration = Duration::from_millis(500);
/// Opacity at the bottom of the blink oscillator leg.
pub const BLINK_LOW_OPACITY: f32 = 0.4;
pub const BLINK_RESET: Duration = Duration::from_millis(300);

// border chase
pub const CHASE_LOOP: Duration = Duration::from_millis(3000);
pub const CHASE_TRAIL_LENGTH: usize = 12;
pub const CHASE_HEAD_SIZE: f32 = 30.0;
pub const CHASE_SEGMENT_LAG: f32 = 5.0;
pub const DEFAULT_BORDER_RADIUS: f32 = 16.0;

// gestures
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(500);
/// Maximum gap between the first tap lifting and the second tap landing.
pub const DOUBLE_TAP_TIMEOUT: Duration = Duration::from_millis(300);
pub const TOUCH_SLOP_PX: f32 = 10.0;
pub const DOUBLE_TAP_SLOP_PX: f32 = 100.0;

// persistence
/// Storage key of the persisted settings blob.
pub const SETTINGS_KEY: &str = "@led_scroller_settings_v1";
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

// led grid overlay
pub const GRID_PITCH: u32 = 6;
pub const GRID_DOT_RADIUS: f32 = 2.5;
/// Brightness multiplier for pixels between LED dots.
pub const GRID_DIM: f32 = 0.2;

// renderer
/// Tallest glyph drawn, as a multiple of the canvas height. Larger font
/// sizes are drawn at this height.
pub const MAX_GLYPH_CANVAS_RATIO: f32 = 4.0;

// host
pub const DEFAULT_DISPLAY_WIDTH: u32 = 256;
pub const DEFAULT_DISPLAY_HEIGHT: u32 = 64;
pub const DEFAULT_FPS: u32 = 30;
/// Largest canvas side accepted from config or `resize`.
pub const MAX_CANVAS_SIDE: u32 = 4096;
