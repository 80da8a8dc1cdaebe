/*
 *  render/framebuf.rs
 *
 *  LedMarquee - worth the squeeze
 *	(c) 2020-26 Stuart Hunter
 *
 *	Runtime-sized framebuffer draw target, plus an integer upscaling view
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

use core::convert::Infallible;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct FrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> FrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    pub fn as_slice(&self) -> &[C] { &self.buf }

    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    pub fn get(&self, x: usize, y: usize) -> Option<C> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    /// Rewrite every pixel in place; `f` gets (x, y, color).
    pub fn map_pixels(&mut self, mut f: impl FnMut(usize, usize, C) -> C) {
        let w = self.w;
        for (i, c) in self.buf.iter_mut().enumerate() {
            *c = f(i % w, i / w, *c);
        }
    }

    /// Row slices, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[C]> {
        self.buf.chunks(self.w.max(1)).take(self.h)
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for FrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for FrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // colors run row-major over `area`; only the part on the buffer is walked
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        let width = area.size.width as usize;
        let skip_left = (visible.top_left.x - area.top_left.x) as usize;
        let skip_top = (visible.top_left.y - area.top_left.y) as usize;
        let run = visible.size.width as usize;
        let (x0, y0) = (visible.top_left.x as usize, visible.top_left.y as usize);

        let mut it = colors.into_iter().skip(skip_top * width);
        for y in y0..y0 + visible.size.height as usize {
            let row = y * self.w + x0;
            for (dx, c) in it.by_ref().take(width).enumerate() {
                if dx >= skip_left && dx < skip_left + run {
                    self.buf[row + dx - skip_left] = c;
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let visible = area.intersection(&self.bounding_box());
        if visible.is_zero_sized() {
            return Ok(());
        }
        let (x0, y0) = (visible.top_left.x as usize, visible.top_left.y as usize);
        let run = visible.size.width as usize;
        for y in y0..y0 + visible.size.height as usize {
            let start = y * self.w + x0;
            self.buf[start..start + run].fill(color);
        }
        Ok(())
    }
}

/// Draws every incoming pixel as a `scale` x `scale` block at `origin`.
/// Lets the small mono fonts fill a tall canvas.
pub struct Scaled<'a, D> {
    inner: &'a mut D,
    origin: Point,
    scale: u32,
}

impl<'a, D> Scaled<'a, D> {
    pub fn new(inner: &'a mut D, origin: Point, scale: u32) -> Self {
        Self { inner, origin, scale: scale.max(1) }
    }
}

impl<D: DrawTarget> OriginDimensions for Scaled<'_, D> {
    fn size(&self) -> Size {
        let Size { width, height } = self.inner.bounding_box().size;
        Size::new(width.div_ceil(self.scale), height.div_ceil(self.scale))
    }
}

impl<D: DrawTarget> DrawTarget for Scaled<'_, D> {
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let s = self.scale as i32;
        let block = Size::new(self.scale, self.scale);
        for Pixel(p, c) in pixels {
            let top_left = Point::new(
                self.origin.x.saturating_add(p.x.saturating_mul(s)),
                self.origin.y.saturating_add(p.y.saturating_mul(s)),
            );
            self.inner.fill_solid(&Rectangle::new(top_left, block), c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::Rgb888;

    #[test]
    fn test_out_of_bounds_pixels_are_dropped() {
        let mut fb = FrameBuf::new(4, 3, Rgb888::BLACK);
        fb.draw_iter([Pixel(Point::new(-1, 0), Rgb888::RED), Pixel(Point::new(3, 2), Rgb888::RED)])
            .unwrap();
        assert_eq!(fb.get(3, 2), Some(Rgb888::RED));
        assert_eq!(fb.as_slice().iter().filter(|c| **c == Rgb888::RED).count(), 1);
        assert_eq!(fb.get(4, 0), None);
    }

    #[test]
    fn test_fill_clips_negative_origin() {
        let mut fb = FrameBuf::new(4, 4, Rgb888::BLACK);
        fb.fill_solid(&Rectangle::new(Point::new(-2, -2), Size::new(4, 4)), Rgb888::GREEN)
            .unwrap();
        assert_eq!(fb.get(0, 0), Some(Rgb888::GREEN));
        assert_eq!(fb.get(1, 1), Some(Rgb888::GREEN));
        assert_eq!(fb.get(2, 0), Some(Rgb888::BLACK));
        assert_eq!(fb.get(0, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_fill_contiguous_keeps_color_order_when_clipped() {
        let mut fb = FrameBuf::new(3, 3, Rgb888::BLACK);
        // 3x3 area hanging off the top left corner by one pixel each way
        let colors = (0..9u8).map(|i| Rgb888::new(i, 0, 0));
        fb.fill_contiguous(&Rectangle::new(Point::new(-1, -1), Size::new(3, 3)), colors)
            .unwrap();
        assert_eq!(fb.get(0, 0), Some(Rgb888::new(4, 0, 0)));
        assert_eq!(fb.get(1, 0), Some(Rgb888::new(5, 0, 0)));
        assert_eq!(fb.get(0, 1), Some(Rgb888::new(7, 0, 0)));
        assert_eq!(fb.get(1, 1), Some(Rgb888::new(8, 0, 0)));
        assert_eq!(fb.get(2, 2), Some(Rgb888::BLACK));
    }

    #[test]
    fn test_fill_solid_clips_huge_area() {
        let mut fb = FrameBuf::new(4, 2, Rgb888::BLACK);
        let area = Rectangle::new(Point::new(-1_000_000, -1_000_000), Size::new(3_000_000, 3_000_000));
        fb.fill_solid(&area, Rgb888::BLUE).unwrap();
        assert!(fb.as_slice().iter().all(|c| *c == Rgb888::BLUE));

        let mut fb = FrameBuf::new(4, 2, Rgb888::BLACK);
        fb.fill_solid(&Rectangle::new(Point::new(10, 0), Size::new(5, 5)), Rgb888::BLUE).unwrap();
        assert!(fb.as_slice().iter().all(|c| *c == Rgb888::BLACK));
    }

    #[test]
    fn test_scaled_view_draws_blocks() {
        let mut fb = FrameBuf::new(8, 8, Rgb888::BLACK);
        let mut view = Scaled::new(&mut fb, Point::new(2, 0), 3);
        Pixel(Point::zero(), Rgb888::WHITE).draw(&mut view).unwrap();
        for y in 0..3 {
            for x in 2..5 {
                assert_eq!(fb.get(x, y), Some(Rgb888::WHITE));
            }
        }
        assert_eq!(fb.get(5, 0), Some(Rgb888::BLACK));
        assert_eq!(fb.rows().count(), 8);
    }
}
