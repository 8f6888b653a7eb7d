//! Drawing primitives over any 32-bit pixel grid.
//!
//! The backbuffer and every window's client buffer expose the same
//! operations: implement [`Raster`] and [`Painter`] comes for free. Writes are
//! clipped to [`Raster::clip`] and reported back through
//! [`Raster::touch_rows`] so the backbuffer can mark scanlines dirty.

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_graphics::mono_font::{MonoFont, MonoTextStyleBuilder};
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::Drawable;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Point as EgPoint, Size};
use embedded_graphics_core::pixelcolor::Rgb888;
use embedded_graphics_core::primitives::Rectangle;
use embedded_graphics_core::Pixel;

use super::color::{blend_argb, shade_argb, Color};
use crate::error::GfxError;
use crate::geometry::Rect;

pub trait Raster {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Row-major, `width * height` words.
    fn pixels(&self) -> &[u32];
    fn pixels_mut(&mut self) -> &mut [u32];

    /// Rows `y0..y1` were just written.
    fn touch_rows(&mut self, _y0: u32, _y1: u32) {}

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Writable region, always inside `bounds()`.
    fn clip(&self) -> Rect {
        self.bounds()
    }
}

// Integer square root for no_std environments
fn isqrt(n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

pub trait Painter: Raster {
    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if !self.clip().contains(x, y) {
            return;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        self.pixels_mut()[idx] = color.to_argb();
        self.touch_rows(y as u32, y as u32 + 1);
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Color> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        Some(Color::from_argb(self.pixels()[idx]))
    }

    /// Darken one pixel in place by `amount` out of 255.
    fn shade_pixel(&mut self, x: i32, y: i32, amount: u8) {
        if amount == 0 || !self.clip().contains(x, y) {
            return;
        }
        let idx = y as usize * self.width() as usize + x as usize;
        let px = &mut self.pixels_mut()[idx];
        *px = shade_argb(*px, amount);
        self.touch_rows(y as u32, y as u32 + 1);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(r) = rect.intersect(&self.clip()) else {
            return;
        };
        let w = self.width() as usize;
        let px = color.to_argb();
        let pixels = self.pixels_mut();
        for row in r.y..r.bottom() {
            let start = row as usize * w + r.x as usize;
            pixels[start..start + r.w as usize].fill(px);
        }
        self.touch_rows(r.y as u32, r.bottom() as u32);
    }

    fn clear(&mut self, color: Color) {
        self.fill_rect(self.bounds(), color);
    }

    fn hline(&mut self, x: i32, y: i32, len: u32, color: Color) {
        self.fill_rect(Rect::new(x, y, len, 1), color);
    }

    fn vline(&mut self, x: i32, y: i32, len: u32, color: Color) {
        self.fill_rect(Rect::new(x, y, 1, len), color);
    }

    /// Bresenham line, both endpoints inclusive. The segment is clipped
    /// before stepping, so only visible pixels are visited.
    fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let clip = self.clip();
        if y0 == y1 {
            let a = x0.min(x1).max(clip.x);
            let b = x0.max(x1).min(clip.right() - 1);
            if a <= b {
                self.hline(a, y0, (b - a + 1) as u32, color);
            }
            return;
        }
        if x0 == x1 {
            let a = y0.min(y1).max(clip.y);
            let b = y0.max(y1).min(clip.bottom() - 1);
            if a <= b {
                self.vline(x0, a, (b - a + 1) as u32, color);
            }
            return;
        }

        let Some(((x0, y0), (x1, y1))) = clip_segment(clip, (x0, y0), (x1, y1)) else {
            return;
        };
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// One-pixel outline.
    fn rect(&mut self, r: Rect, color: Color) {
        if r.is_empty() {
            return;
        }
        self.hline(r.x, r.y, r.w, color);
        self.hline(r.x, r.bottom() - 1, r.w, color);
        self.vline(r.x, r.y, r.h, color);
        self.vline(r.right() - 1, r.y, r.h, color);
    }

    /// Two-tone 3D edge: light top/left and dark bottom/right when raised,
    /// swapped when sunken.
    fn bevel(&mut self, r: Rect, raised: bool, light: Color, dark: Color) {
        if r.is_empty() {
            return;
        }
        let (tl, br) = if raised { (light, dark) } else { (dark, light) };
        self.hline(r.x, r.y, r.w, tl);
        self.vline(r.x, r.y, r.h, tl);
        self.hline(r.x, r.bottom() - 1, r.w, br);
        self.vline(r.right() - 1, r.y, r.h, br);
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, radius: u32, color: Color) {
        let r = radius.min(i16::MAX as u32) as i32;
        for dy in -r..=r {
            let dx = isqrt(r * r - dy * dy);
            self.hline(cx.saturating_sub(dx), cy.saturating_add(dy), (2 * dx + 1) as u32, color);
        }
    }

    /// Vertical gradient from `top` on the first row to `bottom` on the last.
    fn fill_gradient(&mut self, rect: Rect, top: Color, bottom: Color) {
        let Some(vis) = rect.intersect(&self.clip()) else {
            return;
        };
        let steps = rect.h.saturating_sub(1).max(1);
        for y in vis.y..vis.bottom() {
            let i = (y as i64 - rect.y as i64) as u32;
            self.hline(vis.x, y, vis.w, top.mix(&bottom, i, steps));
        }
    }

    /// Render `text` with its top-left corner at (`x`, `y`). `bg` of `None`
    /// leaves the pixels between glyph strokes untouched. Returns the x
    /// coordinate just past the last glyph.
    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &MonoFont<'_>,
        fg: Color,
        bg: Option<Color>,
    ) -> i32 {
        let mut builder = MonoTextStyleBuilder::new()
            .font(font)
            .text_color(fg.to_rgb888());
        if let Some(bg) = bg {
            builder = builder.background_color(bg.to_rgb888());
        }
        let style = builder.build();
        let mut target = RasterTarget(self);
        match Text::with_baseline(text, EgPoint::new(x, y), style, Baseline::Top).draw(&mut target) {
            Ok(next) => next.x,
            Err(never) => match never {},
        }
    }

    /// Move the `src` region so its top-left lands on (`dst_x`, `dst_y`).
    /// Overlapping source and destination are handled: rows are visited in
    /// the order that never overwrites a row before it has been read.
    fn copy_rect(&mut self, src: Rect, dst_x: i32, dst_y: i32) {
        let Some(s) = src.intersect(&self.bounds()) else {
            return;
        };
        let (ox, oy) = (dst_x.saturating_sub(src.x), dst_y.saturating_sub(src.y));
        let Some(dst) = s.translate(ox, oy).intersect(&self.clip()) else {
            return;
        };
        let s = dst.translate(ox.saturating_neg(), oy.saturating_neg());
        let w = self.width() as usize;
        let run = dst.w as usize;
        let pixels = self.pixels_mut();
        let mut copy_row = |i: i32| {
            let from = (s.y + i) as usize * w + s.x as usize;
            let to = (dst.y + i) as usize * w + dst.x as usize;
            pixels.copy_within(from..from + run, to);
        };
        if dst.y > s.y {
            (0..dst.h as i32).rev().for_each(&mut copy_row);
        } else {
            (0..dst.h as i32).for_each(&mut copy_row);
        }
        self.touch_rows(dst.y as u32, dst.bottom() as u32);
    }

    /// Composite an image with per-pixel alpha at (`x`, `y`). Rows whose
    /// visible source pixels are all fully transparent are left clean.
    fn blit(&mut self, x: i32, y: i32, image: ImageRef<'_>) {
        let target = Rect::new(x, y, image.width, image.height);
        let Some(dst) = target.intersect(&self.clip()) else {
            return;
        };
        let w = self.width() as usize;
        let iw = image.width as usize;
        let run = dst.w as usize;
        let src_x = (dst.x as i64 - x as i64) as usize;
        for row in dst.y..dst.bottom() {
            let from = (row as i64 - y as i64) as usize * iw + src_x;
            let to = row as usize * w + dst.x as usize;
            let src = &image.pixels[from..from + run];
            let mut wrote = false;
            for (d, &sp) in self.pixels_mut()[to..to + run].iter_mut().zip(src) {
                if sp >> 24 == 0 {
                    continue;
                }
                *d = blend_argb(sp, *d);
                wrote = true;
            }
            if wrote {
                self.touch_rows(row as u32, row as u32 + 1);
            }
        }
    }
}

impl<T: Raster + ?Sized> Painter for T {}

const OUT_LEFT: u8 = 1;
const OUT_RIGHT: u8 = 2;
const OUT_TOP: u8 = 4;
const OUT_BOTTOM: u8 = 8;

/// Cohen-Sutherland: cut the segment down to the part inside `clip`.
fn clip_segment(clip: Rect, p0: (i32, i32), p1: (i32, i32)) -> Option<((i32, i32), (i32, i32))> {
    if clip.is_empty() {
        return None;
    }
    let (xmin, ymin) = (clip.x as i64, clip.y as i64);
    let (xmax, ymax) = (clip.right() as i64 - 1, clip.bottom() as i64 - 1);
    let outcode = |(x, y): (i64, i64)| {
        let mut c = 0;
        if x < xmin {
            c |= OUT_LEFT;
        } else if x > xmax {
            c |= OUT_RIGHT;
        }
        if y < ymin {
            c |= OUT_TOP;
        } else if y > ymax {
            c |= OUT_BOTTOM;
        }
        c
    };
    // products of two 33-bit spans need 128 bits
    let along = |a0: i64, da: i64, num: i64, den: i64| a0 + (da as i128 * num as i128 / den as i128) as i64;

    let (mut a, mut b) = ((p0.0 as i64, p0.1 as i64), (p1.0 as i64, p1.1 as i64));
    let (mut ca, mut cb) = (outcode(a), outcode(b));
    loop {
        if ca | cb == 0 {
            return Some(((a.0 as i32, a.1 as i32), (b.0 as i32, b.1 as i32)));
        }
        if ca & cb != 0 {
            return None;
        }
        let out = if ca != 0 { ca } else { cb };
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let p = if out & OUT_TOP != 0 {
            (along(a.0, dx, ymin - a.1, dy), ymin)
        } else if out & OUT_BOTTOM != 0 {
            (along(a.0, dx, ymax - a.1, dy), ymax)
        } else if out & OUT_RIGHT != 0 {
            (xmax, along(a.1, dy, xmax - a.0, dx))
        } else {
            (xmin, along(a.1, dy, xmin - a.0, dx))
        };
        if out == ca {
            a = p;
            ca = outcode(a);
        } else {
            b = p;
            cb = outcode(b);
        }
    }
}

/// Width in pixels `text` occupies when drawn with `font`.
pub fn text_width(font: &MonoFont<'_>, text: &str) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n * font.character_size.width + (n - 1) * font.character_spacing
}

// =============================================================================
// EMBEDDED-GRAPHICS ADAPTER
// =============================================================================

/// Lets embedded-graphics primitives and fonts render into a [`Raster`].
pub struct RasterTarget<'a, R: Raster + ?Sized>(pub &'a mut R);

impl<R: Raster + ?Sized> DrawTarget for RasterTarget<'_, R> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.0.set_pixel(p.x, p.y, Color::from(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let r = Rect::new(area.top_left.x, area.top_left.y, area.size.width, area.size.height);
        self.0.fill_rect(r, Color::from(color));
        Ok(())
    }
}

impl<R: Raster + ?Sized> OriginDimensions for RasterTarget<'_, R> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

// =============================================================================
// CANVAS AND IMAGES
// =============================================================================

/// Client-relative drawing surface over a window's own buffer.
pub struct Canvas<'a> {
    width: u32,
    height: u32,
    pixels: &'a mut [u32],
}

impl<'a> Canvas<'a> {
    /// A buffer shorter than `width * height` yields an empty canvas.
    pub fn new(width: u32, height: u32, pixels: &'a mut [u32]) -> Self {
        if pixels.len() < width as usize * height as usize {
            return Self { width: 0, height: 0, pixels };
        }
        Self { width, height, pixels }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Raster for Canvas<'_> {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn pixels(&self) -> &[u32] {
        &*self.pixels
    }
    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut *self.pixels
    }
}

/// Borrowed ARGB pixels, the source operand of [`Painter::blit`].
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u32],
}

impl<'a> ImageRef<'a> {
    pub fn new(width: u32, height: u32, pixels: &'a [u32]) -> Option<Self> {
        (pixels.len() >= width as usize * height as usize).then_some(Self {
            width,
            height,
            pixels,
        })
    }
}

/// Owned ARGB image, e.g. a decoded wallpaper.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Image {
    pub fn new(width: u32, height: u32, fill: Color) -> Result<Self, GfxError> {
        let len = width as usize * height as usize;
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| GfxError::ResourceExhausted)?;
        pixels.resize(len, fill.to_argb());
        Ok(Self { width, height, pixels })
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, GfxError> {
        if pixels.len() != width as usize * height as usize {
            return Err(GfxError::InvalidArgument);
        }
        Ok(Self { width, height, pixels })
    }

    pub fn view(&self) -> ImageRef<'_> {
        ImageRef {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

impl Raster for Image {
    fn width(&self) -> u32 {
        self.width
    }
    fn height(&self) -> u32 {
        self.height
    }
    fn pixels(&self) -> &[u32] {
        &self.pixels
    }
    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use embedded_graphics::mono_font::ascii::FONT_6X10;

    fn image(w: u32, h: u32) -> Image {
        Image::new(w, h, Color::BLACK).unwrap()
    }

    #[test]
    fn set_pixel_out_of_range_is_ignored() {
        let mut img = image(4, 4);
        img.set_pixel(-1, 0, Color::WHITE);
        img.set_pixel(4, 0, Color::WHITE);
        img.set_pixel(0, 4, Color::WHITE);
        assert!(img.pixels().iter().all(|p| *p == Color::BLACK.to_argb()));
        assert_eq!(img.get_pixel(4, 4), None);
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut img = image(4, 4);
        img.fill_rect(Rect::new(-2, 2, 10, 10), Color::RED);
        assert_eq!(img.get_pixel(0, 1), Some(Color::BLACK));
        assert_eq!(img.get_pixel(0, 2), Some(Color::RED));
        assert_eq!(img.get_pixel(3, 3), Some(Color::RED));
    }

    #[test]
    fn line_hits_both_endpoints() {
        let mut img = image(8, 8);
        img.line(1, 1, 6, 4, Color::WHITE);
        assert_eq!(img.get_pixel(1, 1), Some(Color::WHITE));
        assert_eq!(img.get_pixel(6, 4), Some(Color::WHITE));
        let lit = img.pixels().iter().filter(|p| **p == Color::WHITE.to_argb()).count();
        assert_eq!(lit, 6);
    }

    #[test]
    fn line_reversed_direction() {
        let mut img = image(8, 8);
        img.line(6, 7, 0, 0, Color::WHITE);
        assert_eq!(img.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(img.get_pixel(6, 7), Some(Color::WHITE));
    }

    #[test]
    fn line_with_extreme_endpoints_is_clipped() {
        let mut img = image(8, 8);
        img.line(i32::MIN, 3, i32::MAX, 3, Color::WHITE);
        assert!((0..8).all(|x| img.get_pixel(x, 3) == Some(Color::WHITE)));
        img.line(2, i32::MIN, 2, i32::MAX, Color::RED);
        assert!((0..8).all(|y| img.get_pixel(2, y) == Some(Color::RED)));

        let mut img = image(8, 8);
        img.line(-1_000_000_000, -1_000_000_000, 1_000_000_000, 1_000_000_000, Color::WHITE);
        assert!((0..8).all(|i| img.get_pixel(i, i) == Some(Color::WHITE)));
        let lit = img.pixels().iter().filter(|p| **p == Color::WHITE.to_argb()).count();
        assert_eq!(lit, 8);

        let mut img = image(8, 8);
        img.line(i32::MIN, i32::MIN, -5, 2, Color::WHITE);
        img.line(i32::MAX, 0, i32::MIN, i32::MAX, Color::WHITE);
        assert!(img.pixels().iter().all(|p| *p == Color::BLACK.to_argb()));
    }

    #[test]
    fn extreme_origins_do_not_overflow() {
        let mut img = image(4, 4);
        img.fill_gradient(Rect::new(i32::MIN, i32::MIN, u32::MAX, u32::MAX), Color::WHITE, Color::BLACK);
        assert_eq!(img.get_pixel(0, 0).map(|c| c.r), Some(127));
        img.fill_circle(i32::MAX, i32::MIN, u32::MAX, Color::RED);
        img.copy_rect(Rect::new(i32::MIN, 0, 4, 4), i32::MAX, 0);
        let src = vec![Color::RED.to_argb(); 4];
        img.blit(i32::MIN, i32::MAX, ImageRef::new(2, 2, &src).unwrap());
    }

    #[test]
    fn bevel_raised_and_sunken() {
        let light = Color::WHITE;
        let dark = Color::DARK_GRAY;
        let mut img = image(6, 6);
        img.bevel(Rect::new(0, 0, 6, 6), true, light, dark);
        assert_eq!(img.get_pixel(2, 0), Some(light));
        assert_eq!(img.get_pixel(0, 2), Some(light));
        assert_eq!(img.get_pixel(2, 5), Some(dark));
        assert_eq!(img.get_pixel(5, 2), Some(dark));
        img.bevel(Rect::new(0, 0, 6, 6), false, light, dark);
        assert_eq!(img.get_pixel(2, 0), Some(dark));
        assert_eq!(img.get_pixel(5, 2), Some(light));
    }

    #[test]
    fn copy_rect_overlapping_down_right() {
        let mut img = image(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                img.set_pixel(x, y, Color::new(x as u8, y as u8, 0));
            }
        }
        let before = img.clone();
        img.copy_rect(Rect::new(0, 0, 4, 4), 1, 1);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(img.get_pixel(x + 1, y + 1), before.get_pixel(x, y));
            }
        }
        // untouched column
        assert_eq!(img.get_pixel(0, 3), before.get_pixel(0, 3));
    }

    #[test]
    fn copy_rect_overlapping_up_left() {
        let mut img = image(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                img.set_pixel(x, y, Color::new(x as u8, y as u8, 9));
            }
        }
        let before = img.clone();
        img.copy_rect(Rect::new(2, 2, 4, 4), 0, 1);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(img.get_pixel(x, y + 1), before.get_pixel(x + 2, y + 2));
            }
        }
    }

    #[test]
    fn blit_alpha_modes() {
        let mut img = image(3, 1);
        let src = vec![
            Color::with_alpha(200, 0, 0, 255).to_argb(),
            Color::with_alpha(200, 0, 0, 0).to_argb(),
            Color::with_alpha(255, 0, 0, 128).to_argb(),
        ];
        img.blit(0, 0, ImageRef::new(3, 1, &src).unwrap());
        assert_eq!(img.get_pixel(0, 0), Some(Color::new(200, 0, 0)));
        assert_eq!(img.get_pixel(1, 0), Some(Color::BLACK));
        assert_eq!(img.get_pixel(2, 0), Some(Color::new(128, 0, 0)));
    }

    #[test]
    fn blit_clips_negative_origin() {
        let mut img = image(2, 2);
        let src = vec![Color::WHITE.to_argb(); 4];
        img.blit(-1, -1, ImageRef::new(2, 2, &src).unwrap());
        assert_eq!(img.get_pixel(0, 0), Some(Color::WHITE));
        assert_eq!(img.get_pixel(1, 1), Some(Color::BLACK));
    }

    #[test]
    fn transparent_text_keeps_background() {
        let mut img = Image::new(20, 12, Color::BLUE).unwrap();
        let end = img.draw_text(0, 0, "Hi", &FONT_6X10, Color::WHITE, None);
        assert_eq!(end, 12);
        assert!(img.pixels().iter().any(|p| *p == Color::WHITE.to_argb()));
        assert!(img.pixels().iter().any(|p| *p == Color::BLUE.to_argb()));
        assert!(!img.pixels().iter().any(|p| *p == Color::BLACK.to_argb()));
    }

    #[test]
    fn opaque_text_paints_cell_background() {
        let mut img = Image::new(6, 10, Color::BLUE).unwrap();
        img.draw_text(0, 0, "-", &FONT_6X10, Color::WHITE, Some(Color::BLACK));
        assert!(!img.pixels().iter().any(|p| *p == Color::BLUE.to_argb()));
    }

    #[test]
    fn text_width_counts_spacing() {
        assert_eq!(text_width(&FONT_6X10, ""), 0);
        assert_eq!(text_width(&FONT_6X10, "abc"), 18);
    }

    #[test]
    fn short_canvas_buffer_is_empty() {
        let mut buf = vec![0u32; 3];
        let c = Canvas::new(2, 2, &mut buf);
        assert!(c.is_empty());
    }
}
