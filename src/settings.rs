/*
 *  settings.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	User settings of the marquee screen and their JSON form
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

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::color::LedColor;
use crate::constants::{
    DEFAULT_SPEED_PX_PER_SEC, DEFAULT_TEXT, SPEED_SLIDER_MAX, SPEED_SLIDER_MIN, SPEED_SLIDER_STEP,
};

/// Everything the user can change on the marquee screen. Always written in
/// full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub text: String,
    pub speed: f32,
    pub selected_color: LedColor,
    pub is_landscape_locked: bool,
    pub show_border: bool,
    pub is_text_blinking: bool,
    pub is_border_blinking: bool,
    pub is_border_chase: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            speed: DEFAULT_SPEED_PX_PER_SEC,
            selected_color: LedColor::default(),
            is_landscape_locked: false,
            show_border: true,
            is_text_blinking: false,
            is_border_blinking: false,
            is_border_chase: false,
        }
    }
}

/// A stored blob as read back: every field may be missing. A field holding
/// the wrong kind of value reads as missing and the rest still load.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub speed: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub selected_color: Option<LedColor>,
    #[serde(deserialize_with = "lenient")]
    pub is_landscape_locked: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub show_border: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub is_text_blinking: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub is_border_blinking: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub is_border_chase: Option<bool>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!("ignoring stored settings field: {}", e);
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationLock {
    Unlocked,
    Landscape,
}

impl Settings {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// Overlay the fields present in `patch`; absent ones keep their value.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.text               { self.text = v; }
        if let Some(v) = patch.speed              { self.speed = v; }
        if let Some(v) = patch.selected_color     { self.selected_color = v; }
        if let Some(v) = patch.is_landscape_locked { self.is_landscape_locked = v; }
        if let Some(v) = patch.show_border        { self.show_border = v; }
        if let Some(v) = patch.is_text_blinking   { self.is_text_blinking = v; }
        if let Some(v) = patch.is_border_blinking { self.is_border_blinking = v; }
        if let Some(v) = patch.is_border_chase    { self.is_border_chase = v; }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn parse_patch(json: &str) -> Result<SettingsPatch, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn orientation_lock(&self) -> OrientationLock {
        if self.is_landscape_locked { OrientationLock::Landscape } else { OrientationLock::Unlocked }
    }
}

/// Snap a requested speed onto the slider's 20..=800 px/s grid.
pub fn snap_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return SPEED_SLIDER_MIN;
    }
    let clamped = speed.clamp(SPEED_SLIDER_MIN, SPEED_SLIDER_MAX);
    (clamped / SPEED_SLIDER_STEP).round() * SPEED_SLIDER_STEP
}

/// Header and footer are only shown in portrait.
pub fn chrome_visible(viewport_width: f32, viewport_height: f32) -> bool {
    viewport_width <= viewport_height
}
