/*
 *  term.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	ANSI truecolor presenter: two pixel rows per text row using half blocks
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

use std::fmt::Write as _;
use std::io::{self, Write};

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

use crate::render::FrameBuf;

const UPPER_HALF: char = '\u{2580}';
const RESET: &str = "\x1b[0m";

/// Frame as ANSI text: cursor home, one line per two pixel rows, upper half
/// block with the top pixel as foreground and the bottom as background.
pub fn encode_frame(fb: &FrameBuf<Rgb888>) -> String {
    let (w, h) = (fb.width(), fb.height());
    let mut out = String::with_capacity(w * h.div_ceil(2) * 20 + 16);
    out.push_str("\x1b[H");

    for y in (0..h).step_by(2) {
        let mut last: Option<(Rgb888, Rgb888)> = None;
        for x in 0..w {
            let top = fb.get(x, y).unwrap_or(Rgb888::BLACK);
            let bottom = fb.get(x, y + 1).unwrap_or(Rgb888::BLACK);
            if last != Some((top, bottom)) {
                let _ = write!(
                    out,
                    "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
                    top.r(), top.g(), top.b(), bottom.r(), bottom.g(), bottom.b()
                );
                last = Some((top, bottom));
            }
            out.push(UPPER_HALF);
        }
        out.push_str(RESET);
        out.push('\n');
    }
    out
}

/// Owns the terminal while the marquee runs.
pub struct TerminalSink<W: Write> {
    out: W,
    active: bool,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, active: false }
    }

    /// Clear the screen and hide the cursor.
    pub fn enter(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x1b[2J\x1b[?25l")?;
        self.active = true;
        self.out.flush()
    }

    /// Draw a frame; `footer` is printed under it when the chrome is shown.
    pub fn present(&mut self, fb: &FrameBuf<Rgb888>, footer: Option<&str>) -> io::Result<()> {
        let mut frame = encode_frame(fb);
        if let Some(line) = footer {
            // erase to end of line so a shorter footer leaves no residue
            let _ = write!(frame, "{line}\x1b[K\n");
        } else {
            frame.push_str("\x1b[K\n");
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }

    /// Restore the cursor and colors.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.out.write_all(format!("{RESET}\x1b[?25h\n").as_bytes())?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> Drop for TerminalSink<W> {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}
