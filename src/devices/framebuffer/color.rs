//! Color representation and manipulation
//!
//! Pixels are stored as packed `0xAARRGGBB` words everywhere inside the
//! crate (backbuffer, window buffers, images). The hardware layout is only
//! applied at flush time.
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const RED: Color = Color::new(255, 0, 0);
    pub const GREEN: Color = Color::new(0, 255, 0);
    pub const BLUE: Color = Color::new(0, 0, 255);
    pub const GRAY: Color = Color::new(128, 128, 128);
    pub const DARK_GRAY: Color = Color::new(64, 64, 64);
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);
    pub const TRANSPARENT: Color = Color::with_alpha(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
            a: 255,
        }
    }

    #[inline]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub const fn from_argb(px: u32) -> Self {
        Self {
            r: (px >> 16) as u8,
            g: (px >> 8) as u8,
            b: px as u8,
            a: (px >> 24) as u8,
        }
    }

    /// Darken by `amount` out of 255 (0 = unchanged, 255 = black). Alpha is kept.
    pub fn darken(&self, amount: u8) -> Color {
        let keep = 255 - amount as u32;
        Color::with_alpha(
            (self.r as u32 * keep / 255) as u8,
            (self.g as u32 * keep / 255) as u8,
            (self.b as u32 * keep / 255) as u8,
            self.a,
        )
    }

    /// Lighten by `amount` out of 255 (0 = unchanged, 255 = white).
    pub fn lighten(&self, amount: u8) -> Color {
        let up = |c: u8| (c as u32 + (255 - c as u32) * amount as u32 / 255) as u8;
        Color::with_alpha(up(self.r), up(self.g), up(self.b), self.a)
    }

    /// Linear mix, `t` of `den` towards `other`.
    pub fn mix(&self, other: &Color, t: u32, den: u32) -> Color {
        if den == 0 {
            return *self;
        }
        let t = t.min(den);
        let (t, den) = (t as u64, den as u64);
        let lerp = |a: u8, b: u8| ((a as u64 * (den - t) + b as u64 * t) / den) as u8;
        Color::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }

    pub fn to_rgb888(self) -> Rgb888 {
        Rgb888::new(self.r, self.g, self.b)
    }
}

impl From<Rgb888> for Color {
    fn from(c: Rgb888) -> Self {
        Color::new(c.r(), c.g(), c.b())
    }
}

/// Composite `src` over `dst` using the source alpha:
/// `src * a / 255 + dst * (255 - a) / 255` per channel.
/// The destination alpha is preserved.
#[inline]
pub fn blend_argb(src: u32, dst: u32) -> u32 {
    let a = src >> 24;
    match a {
        255 => src,
        0 => dst,
        _ => {
            let inv = 255 - a;
            let ch = |shift: u32| {
                let s = (src >> shift) & 0xFF;
                let d = (dst >> shift) & 0xFF;
                (s * a / 255 + d * inv / 255) << shift
            };
            (dst & 0xFF00_0000) | ch(16) | ch(8) | ch(0)
        }
    }
}

/// Darken a packed pixel by `amount` out of 255, keeping its alpha.
#[inline]
pub fn shade_argb(px: u32, amount: u8) -> u32 {
    Color::from_argb(px).darken(amount).to_argb()
}
