/*
 *  config.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Host configuration: YAML file, layered with command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BORDER_RADIUS, DEFAULT_DISPLAY_HEIGHT, DEFAULT_DISPLAY_WIDTH, DEFAULT_FONT_SIZE,
    DEFAULT_FPS, MAX_CANVAS_SIDE,
};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level host configuration. Every field is optional so files and
/// flags can be layered; the accessors fill in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>, // e.g., "info" | "debug"
    /// Log frames instead of drawing them to the terminal
    pub headless: Option<bool>,
    pub display: Option<DisplayConfig>,
    pub storage: Option<StorageConfig>,
    pub marquee: Option<MarqueeOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<u32>,
    /// LED dot-matrix overlay
    pub grid: Option<bool>,
    pub border_radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
    /// false keeps settings in memory only
    pub persist: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarqueeOptions {
    /// Text shown until stored settings load
    pub initial_text: Option<String>,
    pub base_font_size: Option<f32>,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "ledmarquee", version, about = "Scrolling LED marquee for the terminal")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug log level
    #[arg(long, short = 'v', alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(long, action = ArgAction::Set)]
    pub grid: Option<bool>,
    #[arg(long)]
    pub border_radius: Option<f32>,
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub storage_dir: Option<PathBuf>,
    /// keep settings in memory only
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_persist: bool,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub font_size: Option<f32>,
    /// no terminal output, frames are logged at debug level
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    /// stop after this many frames
    #[arg(long)]
    pub frames: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

impl Config {
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    pub fn headless(&self) -> bool {
        self.headless.unwrap_or(false)
    }

    fn display_opt<T>(&self, f: impl Fn(&DisplayConfig) -> Option<T>) -> Option<T> {
        self.display.as_ref().and_then(f)
    }

    pub fn width(&self) -> u32 {
        self.display_opt(|d| d.width).unwrap_or(DEFAULT_DISPLAY_WIDTH)
    }

    pub fn height(&self) -> u32 {
        self.display_opt(|d| d.height).unwrap_or(DEFAULT_DISPLAY_HEIGHT)
    }

    pub fn fps(&self) -> u32 {
        self.display_opt(|d| d.fps).unwrap_or(DEFAULT_FPS)
    }

    pub fn grid(&self) -> bool {
        self.display_opt(|d| d.grid).unwrap_or(true)
    }

    pub fn border_radius(&self) -> f32 {
        self.display_opt(|d| d.border_radius).unwrap_or(DEFAULT_BORDER_RADIUS)
    }

    pub fn storage_dir(&self) -> Option<&Path> {
        self.storage.as_ref().and_then(|s| s.dir.as_deref())
    }

    pub fn persist(&self) -> bool {
        self.storage.as_ref().and_then(|s| s.persist).unwrap_or(true)
    }

    pub fn initial_text(&self) -> Option<&str> {
        self.marquee.as_ref().and_then(|m| m.initial_text.as_deref())
    }

    pub fn base_font_size(&self) -> f32 {
        self.marquee.as_ref().and_then(|m| m.base_font_size).unwrap_or(DEFAULT_FONT_SIZE)
    }
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli, find_config_file())?;
    Ok((cfg, cli))
}

/// Layer defaults, the YAML file (explicit path or `found`) and `cli`.
pub fn load_with(cli: &Cli, found: Option<PathBuf>) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = found {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Pretty YAML of the effective config.
pub fn dump_config(cfg: &Config) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(cfg)?)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/ledmarquee/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/ledmarquee/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/ledmarquee.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["ledmarquee.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    // an empty file is an empty config
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(s)?)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.headless.is_some()  { dst.headless = src.headless; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.storage, src.storage) {
        (None, Some(c)) => dst.storage = Some(c),
        (Some(d), Some(s)) => {
            if s.dir.is_some()     { d.dir = s.dir; }
            if s.persist.is_some() { d.persist = s.persist; }
        }
        _ => {}
    }
    match (&mut dst.marquee, src.marquee) {
        (None, Some(c)) => dst.marquee = Some(c),
        (Some(d), Some(s)) => {
            if s.initial_text.is_some()   { d.initial_text = s.initial_text; }
            if s.base_font_size.is_some() { d.base_font_size = s.base_font_size; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()         { dst.width = src.width; }
    if src.height.is_some()        { dst.height = src.height; }
    if src.fps.is_some()           { dst.fps = src.fps; }
    if src.grid.is_some()          { dst.grid = src.grid; }
    if src.border_radius.is_some() { dst.border_radius = src.border_radius; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }
    if cli.headless            { cfg.headless = Some(true); }

    merge_display(
        cfg.display.get_or_insert_with(DisplayConfig::default),
        DisplayConfig {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            grid: cli.grid,
            border_radius: cli.border_radius,
        },
    );

    let storage = cfg.storage.get_or_insert_with(StorageConfig::default);
    if cli.storage_dir.is_some() { storage.dir = cli.storage_dir.clone(); }
    if cli.no_persist            { storage.persist = Some(false); }

    let marquee = cfg.marquee.get_or_insert_with(MarqueeOptions::default);
    if cli.text.is_some()      { marquee.initial_text = cli.text.clone(); }
    if cli.font_size.is_some() { marquee.base_font_size = cli.font_size; }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        let sides = [display.width, display.height];
        if sides.iter().flatten().any(|side| !(1..=MAX_CANVAS_SIDE).contains(side)) {
            return Err(ConfigError::Validation(format!(
                "display width/height must be 1..={MAX_CANVAS_SIDE}"
            )));
        }
        if let Some(fps) = display.fps {
            if !(1..=120).contains(&fps) {
                return Err(ConfigError::Validation("display fps must be 1..=120".into()));
            }
        }
        if let Some(r) = display.border_radius {
            if !r.is_finite() || r < 0.0 {
                return Err(ConfigError::Validation("display border_radius must be >= 0".into()));
            }
        }
    }
    if let Some(size) = cfg.marquee.as_ref().and_then(|m| m.base_font_size) {
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigError::Validation("marquee base_font_size must be > 0".into()));
        }
    }
    match cfg.log_level() {
        "error" | "warn" | "info" | "debug" | "trace" | "off" => Ok(()),
        other => Err(ConfigError::Validation(format!("unknown log_level '{other}'"))),
    }
}
