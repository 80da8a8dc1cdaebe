/*
 *  command.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Line commands read from stdin while the marquee runs
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

use std::str::FromStr;
use thiserror::Error;

use crate::color::LedColor;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{command}' needs {what}")]
    MissingArgument { command: &'static str, what: &'static str },
    #[error("'{0}' is not a number")]
    InvalidNumber(String),
    #[error("expected on|off, got '{0}'")]
    InvalidSwitch(String),
    #[error("unknown color '{0}'")]
    UnknownColor(String),
    #[error("blink target must be text|border, got '{0}'")]
    InvalidBlinkTarget(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkTarget {
    Text,
    Border,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Text(String),
    Speed(f32),
    Color(LedColor),
    Border(bool),
    Chase(bool),
    Blink(BlinkTarget, bool),
    Landscape(bool),
    /// Two fingers spreading (or closing) by this factor, then lifting.
    Pinch(f32),
    /// A quick double tap in the middle of the display.
    Tap,
    Resize { width: u32, height: u32 },
    /// Close the configuration opened by a double tap.
    Close,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "commands: text <s> | speed <n> | color <name> | border on|off | chase on|off | \
blink text|border on|off | landscape on|off | pinch <scale> | tap | resize <w> <h> | close | status | help | quit";

fn switch(word: Option<&str>, command: &'static str) -> Result<bool, CommandError> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("on" | "true" | "1" | "yes") => Ok(true),
        Some("off" | "false" | "0" | "no") => Ok(false),
        Some(other) => Err(CommandError::InvalidSwitch(other.to_string())),
        None => Err(CommandError::MissingArgument { command, what: "on|off" }),
    }
}

fn number<T: FromStr>(word: Option<&str>, command: &'static str, what: &'static str) -> Result<T, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument { command, what })?;
    word.parse().map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest),
            None => (trimmed, ""),
        };
        if verb.is_empty() {
            return Err(CommandError::Empty);
        }
        let mut args = rest.split_whitespace();

        match verb.to_ascii_lowercase().as_str() {
            // the text is taken verbatim, spaces included; bare `text` clears it
            "text" => Ok(Command::Text(rest.to_string())),
            "speed" => number(args.next(), "speed", "a speed in px/s").map(Command::Speed),
            "color" | "colour" => {
                let name = args.next().ok_or(CommandError::MissingArgument { command: "color", what: "a color name" })?;
                LedColor::named(name)
                    .map(Command::Color)
                    .ok_or_else(|| CommandError::UnknownColor(name.to_string()))
            }
            "border" => switch(args.next(), "border").map(Command::Border),
            "chase" => switch(args.next(), "chase").map(Command::Chase),
            "blink" => {
                let target = match args.next().map(str::to_ascii_lowercase).as_deref() {
                    Some("text") => BlinkTarget::Text,
                    Some("border") => BlinkTarget::Border,
                    Some(other) => return Err(CommandError::InvalidBlinkTarget(other.to_string())),
                    None => return Err(CommandError::MissingArgument { command: "blink", what: "text|border" }),
                };
                switch(args.next(), "blink").map(|on| Command::Blink(target, on))
            }
            "landscape" => switch(args.next(), "landscape").map(Command::Landscape),
            "pinch" => number(args.next(), "pinch", "a scale factor").map(Command::Pinch),
            "tap" => Ok(Command::Tap),
            "resize" => {
                let width = number(args.next(), "resize", "<w> <h>")?;
                let height = number(args.next(), "resize", "<w> <h>")?;
                Ok(Command::Resize { width, height })
            }
            "close" => Ok(Command::Close),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
