/*
 *  render/mod.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Draws a marquee frame into an embedded-graphics target
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

pub mod framebuf;
pub mod grid;

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_7X13, FONT_9X15},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle, RoundedRectangle},
    text::{Baseline, Text},
};

use crate::color::dim;
use crate::constants::{DEFAULT_FONT_SIZE, MAX_GLYPH_CANVAS_RATIO};
use crate::marquee::{BorderBox, ChaseFrame, FrameState};

pub use framebuf::{FrameBuf, Scaled};
pub use grid::GridOverlay;

/// Smallest to largest; the pick is upscaled past the last one.
const FONT_LADDER: [&MonoFont<'static>; 6] =
    [&FONT_4X6, &FONT_5X8, &FONT_6X10, &FONT_7X13, &FONT_9X15, &FONT_10X20];

/// Glow halo strength relative to the text.
const GLOW_LEVEL: f32 = 0.35;

/// A mono font and the integer factor it is drawn at.
#[derive(Clone, Copy)]
pub struct FontChoice {
    pub font: &'static MonoFont<'static>,
    pub scale: u32,
}

impl FontChoice {
    /// Largest ladder font that fits `glyph_height` once upscaled.
    pub fn for_height(glyph_height: f32) -> Self {
        let target = if glyph_height.is_finite() { glyph_height.max(1.0) } else { 1.0 };
        let tallest = FONT_LADDER[FONT_LADDER.len() - 1].character_size.height as f32;
        let scale = (target / tallest).ceil().max(1.0) as u32;
        let base = target / scale as f32;
        let font = FONT_LADDER
            .iter()
            .rev()
            .find(|f| f.character_size.height as f32 <= base)
            .copied()
            .unwrap_or(FONT_LADDER[0]);
        Self { font, scale }
    }

    pub fn height(&self) -> u32 {
        self.font.character_size.height.saturating_mul(self.scale)
    }

    /// Laid out width of `text`, in canvas pixels.
    pub fn measure(&self, text: &str) -> f32 {
        let style = MonoTextStyle::new(self.font, Rgb888::WHITE);
        let bbox = Text::with_baseline(text, Point::zero(), style, Baseline::Top).bounding_box();
        bbox.size.width as f32 * self.scale as f32
    }
}

impl core::fmt::Debug for FontChoice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontChoice")
            .field("cell", &self.font.character_size)
            .field("scale", &self.scale)
            .finish()
    }
}

/// Paints frames for a fixed canvas size.
#[derive(Debug, Clone)]
pub struct Renderer {
    size: Size,
    border_radius: f32,
    grid: Option<GridOverlay>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, border_radius: f32, grid: bool) -> Self {
        Self {
            size: Size::new(width, height),
            border_radius: border_radius.max(0.0),
            grid: grid.then(|| GridOverlay::for_canvas(height)),
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    /// The box the border and its chase run around.
    pub fn border_box(&self) -> BorderBox {
        let radius = self.border_radius.min(self.size.height as f32 / 2.0);
        BorderBox::new(self.size.width as f32, self.size.height as f32, radius)
    }

    /// Font size 100 fills half the canvas height; glyphs stop growing at
    /// `MAX_GLYPH_CANVAS_RATIO` canvas heights.
    pub fn font_for(&self, font_size: f32) -> FontChoice {
        let px_per_unit = self.size.height as f32 / (2.0 * DEFAULT_FONT_SIZE);
        let tallest = self.size.height as f32 * MAX_GLYPH_CANVAS_RATIO;
        FontChoice::for_height((font_size * px_per_unit).clamp(0.0, tallest))
    }

    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        self.font_for(font_size).measure(text)
    }

    /// Text tiles, border and chase. Returns the measured width of one copy
    /// so the caller can feed it back to the engine.
    pub fn draw<D>(&self, target: &mut D, text: &str, frame: &FrameState) -> Result<f32, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let measured = self.draw_text_layer(target, text, frame)?;
        self.draw_decorations(target, frame)?;
        Ok(measured)
    }

    /// Like [`Renderer::draw`], with the grid overlay laid over the text.
    pub fn render(&self, fb: &mut FrameBuf<Rgb888>, text: &str, frame: &FrameState) -> f32 {
        let measured = self.draw_text_layer(fb, text, frame).unwrap_or_else(|never| match never {});
        if let Some(grid) = &self.grid {
            grid.apply(fb);
        }
        self.draw_decorations(fb, frame).unwrap_or_else(|never| match never {});
        measured
    }

    fn draw_text_layer<D>(&self, target: &mut D, text: &str, frame: &FrameState) -> Result<f32, D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        target.clear(Rgb888::BLACK)?;
        let choice = self.font_for(frame.font_size);
        let measured = choice.measure(text);
        self.draw_tiles(target, text, frame, choice, measured)?;
        Ok(measured)
    }

    fn draw_decorations<D>(&self, target: &mut D, frame: &FrameState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if frame.show_border {
            self.draw_border(target, frame)?;
        }
        if let Some(chase) = &frame.chase {
            self.draw_chase(target, frame, chase)?;
        }
        Ok(())
    }

    fn draw_tiles<D>(
        &self,
        target: &mut D,
        text: &str,
        frame: &FrameState,
        choice: FontChoice,
        measured: f32,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if text.is_empty() || frame.text_opacity <= 0.0 {
            return Ok(());
        }
        let main = MonoTextStyle::new(choice.font, frame.color.to_rgb888_dimmed(frame.text_opacity));
        let glow = MonoTextStyle::new(
            choice.font,
            frame.glow.to_rgb888_dimmed(frame.text_opacity * GLOW_LEVEL),
        );
        let y = (self.size.height as i32 - choice.height() as i32) / 2;
        let width = self.size.width as f32;

        for x in frame.tiles() {
            if x + measured < 0.0 || x >= width {
                continue;
            }
            let origin = Point::new(x.round() as i32, y);
            for halo in [Point::new(-1, 0), Point::new(1, 0), Point::new(0, -1), Point::new(0, 1)] {
                let mut view = Scaled::new(target, origin + halo, choice.scale);
                Text::with_baseline(text, Point::zero(), glow, Baseline::Top).draw(&mut view)?;
            }
            let mut view = Scaled::new(target, origin, choice.scale);
            Text::with_baseline(text, Point::zero(), main, Baseline::Top).draw(&mut view)?;
        }
        Ok(())
    }

    fn draw_border<D>(&self, target: &mut D, frame: &FrameState) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        let color = frame.color.to_rgb888_dimmed(frame.border_opacity);
        let r = self.border_box().radius.round() as u32;
        RoundedRectangle::with_equal_corners(Rectangle::new(Point::zero(), self.size), Size::new(r, r))
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(target)
    }

    /// Tail first so the head paints last.
    fn draw_chase<D>(&self, target: &mut D, frame: &FrameState, chase: &ChaseFrame) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb888>,
    {
        if chase.perimeter <= 0.0 {
            return Ok(());
        }
        let base = frame.color.to_rgb888();
        let walk = self.outline_length() as f32;
        let k = walk / chase.perimeter;

        for seg in chase.segments.iter().rev() {
            let color = dim(base, seg.opacity * frame.border_opacity);
            let start = (-seg.dash_offset).rem_euclid(chase.perimeter) * k;
            let steps = (seg.length * k).ceil().max(1.0) as u32;
            let pixels = (0..steps).map(|s| Pixel(self.outline_point(start + s as f32), color));
            target.draw_iter(pixels)?;
        }
        Ok(())
    }

    fn outline_length(&self) -> u32 {
        let (w, h) = (self.size.width.saturating_sub(1), self.size.height.saturating_sub(1));
        (2 * (w + h)).max(1)
    }

    /// Point `distance` pixels clockwise from the top-left corner along the
    /// canvas edge.
    fn outline_point(&self, distance: f32) -> Point {
        let (w, h) = (self.size.width.saturating_sub(1), self.size.height.saturating_sub(1));
        let d = (distance.max(0.0) as u32) % self.outline_length();
        let (w, h, d) = (w as i32, h as i32, d as i32);
        if d < w {
            Point::new(d, 0)
        } else if d < w + h {
            Point::new(w, d - w)
        } else if d < 2 * w + h {
            Point::new(w - (d - w - h), h)
        } else {
            Point::new(0, h - (d - 2 * w - h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Hsl;
    use crate::constants::GRID_DIM;
    use crate::marquee::TrailSegment;

    fn frame(offset: f32, pattern_width: f32) -> FrameState {
        let cyan = Hsl::new(180.0, 100.0, 50.0);
        FrameState {
            offset,
            font_size: 100.0,
            color: cyan,
            glow: cyan,
            text_opacity: 1.0,
            border_opacity: 1.0,
            copy_count: 2,
            pattern_width,
            show_border: false,
            chase: None,
        }
    }

    fn lit(fb: &FrameBuf<Rgb888>) -> usize {
        fb.as_slice().iter().filter(|c| **c != Rgb888::BLACK).count()
    }

    #[test]
    fn test_font_ladder() {
        let small = FontChoice::for_height(10.0);
        assert_eq!(small.scale, 1);
        assert_eq!(small.height(), 10);

        let big = FontChoice::for_height(32.0);
        assert_eq!(big.scale, 2);
        assert_eq!(big.height(), 30);

        assert_eq!(FontChoice::for_height(0.0).height(), 6);
        assert_eq!(FontChoice::for_height(f32::NAN).scale, 1);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let r = Renderer::new(256, 64, 8.0, false);
        assert_eq!(r.measure("", 100.0), 0.0);
        let one = r.measure("AB", 100.0);
        let two = r.measure("AB", 200.0);
        assert!(one > 0.0);
        assert!(two > one);
        // 9x15 upscaled twice: two glyph cells of 9 px
        assert_eq!(one, 36.0);
    }

    #[test]
    fn test_huge_font_is_capped_to_canvas() {
        let r = Renderer::new(256, 64, 8.0, false);
        let capped = r.font_for(1e8);
        assert!(capped.height() <= 4 * 64);
        assert_eq!(capped.height(), r.font_for(f32::MAX).height());
        assert_eq!(r.font_for(1e8).height(), r.font_for(10_000.0).height());

        let measured = r.measure("BONJOUR 2025", 1e8);
        assert!(measured.is_finite() && measured > 0.0);

        let mut fb = FrameBuf::new(256, 64, Rgb888::BLACK);
        let mut f = frame(0.0, measured + 80.0);
        f.font_size = 1e8;
        assert_eq!(r.render(&mut fb, "BONJOUR 2025", &f), measured);
        assert!(lit(&fb) > 0);
    }

    #[test]
    fn test_render_draws_text_and_reports_width() {
        let r = Renderer::new(128, 32, 4.0, false);
        let mut fb = FrameBuf::new(128, 32, Rgb888::BLACK);
        let measured = r.render(&mut fb, "HI", &frame(10.0, 100.0));
        assert_eq!(measured, r.measure("HI", 100.0));
        assert!(lit(&fb) > 0);

        // tiles pushed fully off canvas leave it dark
        r.render(&mut fb, "HI", &frame(-500.0, 100.0));
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_zero_opacity_hides_text() {
        let r = Renderer::new(64, 16, 0.0, false);
        let mut fb = FrameBuf::new(64, 16, Rgb888::BLACK);
        let mut f = frame(0.0, 40.0);
        f.text_opacity = 0.0;
        r.render(&mut fb, "HI", &f);
        assert_eq!(lit(&fb), 0);
    }

    #[test]
    fn test_border_outline() {
        let r = Renderer::new(32, 16, 0.0, false);
        let mut fb = FrameBuf::new(32, 16, Rgb888::BLACK);
        let mut f = frame(0.0, 40.0);
        f.show_border = true;
        r.render(&mut fb, "", &f);
        assert_ne!(fb.get(0, 0), Some(Rgb888::BLACK));
        assert_ne!(fb.get(31, 15), Some(Rgb888::BLACK));
        assert_eq!(fb.get(5, 5), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_chase_head_on_outline() {
        let r = Renderer::new(32, 16, 0.0, false);
        let mut fb = FrameBuf::new(32, 16, Rgb888::BLACK);
        let mut f = frame(0.0, 40.0);
        let perimeter = r.border_box().perimeter();
        f.chase = Some(ChaseFrame {
            perimeter,
            segments: vec![TrailSegment { index: 0, opacity: 1.0, dash_offset: 0.0, length: 4.0 }],
        });
        r.render(&mut fb, "", &f);
        let outline = r.outline_length() as f32;
        let expected = (4.0 * outline / perimeter).ceil() as usize;
        assert_eq!(lit(&fb), expected);
        assert_ne!(fb.get(0, 0), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_outline_walk_wraps() {
        let r = Renderer::new(10, 5, 0.0, false);
        assert_eq!(r.outline_length(), 26);
        assert_eq!(r.outline_point(0.0), Point::new(0, 0));
        assert_eq!(r.outline_point(9.0), Point::new(9, 0));
        assert_eq!(r.outline_point(13.0), Point::new(9, 4));
        assert_eq!(r.outline_point(22.0), Point::new(0, 4));
        assert_eq!(r.outline_point(26.0), Point::new(0, 0));
    }

    #[test]
    fn test_grid_dims_between_dots() {
        let plain = Renderer::new(128, 128, 0.0, false);
        let gridded = Renderer::new(128, 128, 0.0, true);
        assert!(gridded.has_grid());

        let f = frame(0.0, 400.0);
        let mut a = FrameBuf::new(128, 128, Rgb888::BLACK);
        let mut b = FrameBuf::new(128, 128, Rgb888::BLACK);
        plain.render(&mut a, "W", &f);
        gridded.render(&mut b, "W", &f);

        let full = f.color.to_rgb888();
        let mut pairs = a.as_slice().iter().zip(b.as_slice());
        assert!(pairs.clone().any(|(p, g)| *p == full && *g == dim(full, GRID_DIM)));
        assert!(pairs.clone().any(|(p, g)| *p == full && *g == full));
        assert!(pairs.all(|(p, g)| *p == *g || *g == dim(*p, GRID_DIM)));
    }
}
