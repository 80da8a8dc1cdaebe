/*
 *  marquee/mod.rs
 *
 *  LedMarquee - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Marquee animation and gesture composition
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

pub mod blink;
pub mod chase;
pub mod engine;
pub mod layout;
pub mod scroll;
pub mod tint;
pub mod zoom;

pub use blink::BlinkState;
pub use chase::{BorderBox, BorderChase, ChaseFrame, TrailSegment};
pub use engine::{EngineSignal, FrameState, MarqueeEngine};
pub use layout::{clamp_speed, compute_tile_layout, MarqueeConfig, TileLayout};
pub use scroll::{ScrollAnimator, ScrollCycle};
pub use tint::ColorState;
pub use zoom::ZoomState;
