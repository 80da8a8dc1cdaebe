/*
 *  lib.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Scrolling LED marquee: engine, gestures, persistence and rendering
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

pub mod animation;
pub mod app;
pub mod color;
pub mod command;
pub mod config;
pub mod constants;
pub mod gesture;
pub mod marquee;
pub mod pacer;
pub mod persist;
pub mod render;
pub mod settings;
pub mod storage;
pub mod term;

pub use app::{MarqueeApp, Outcome};
pub use marquee::{FrameState, MarqueeEngine};
pub use settings::Settings;
