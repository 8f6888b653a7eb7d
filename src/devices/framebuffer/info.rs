//! Hardware surface descriptor
//!
//! Describes the linear framebuffer the display driver handed over: its
//! geometry and the bit layout of one pixel. Channel order is whatever the
//! driver reports, nothing here assumes RGB or BGR.

use bootloader_api::info::{FrameBufferInfo, PixelFormat};

use crate::error::GfxError;

/// Bit position and width of one color channel inside a hardware pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub position: u8,
    pub size: u8,
}

impl Channel {
    pub const fn new(position: u8, size: u8) -> Self {
        Self { position, size }
    }

    /// Scale an 8-bit intensity to this channel's width and shift it into place.
    #[inline]
    pub fn pack(&self, value: u8) -> u32 {
        let v = value as u32;
        let scaled = match self.size {
            0 => return 0,
            s if s >= 8 => v << (s - 8),
            s => v >> (8 - s),
        };
        scaled << self.position
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayInfo {
    pub width: usize,
    pub height: usize,
    /// Scanline stride in pixels.
    pub stride: usize,
    /// 24 or 32.
    pub bits_per_pixel: u8,
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
}

impl DisplayInfo {
    #[inline]
    pub fn bytes_per_pixel(&self) -> usize {
        self.bits_per_pixel as usize / 8
    }

    /// Scanline length in bytes.
    #[inline]
    pub fn pitch(&self) -> usize {
        self.stride * self.bytes_per_pixel()
    }

    /// Bytes of hardware memory the descriptor addresses.
    pub fn required_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        (self.height - 1) * self.pitch() + self.width * self.bytes_per_pixel()
    }

    /// Reject depths other than 24/32 bpp, zero sizes, short strides and
    /// channels that do not fit into the pixel.
    pub fn validate(&self) -> Result<(), GfxError> {
        if self.bits_per_pixel != 24 && self.bits_per_pixel != 32 {
            return Err(GfxError::InvalidArgument);
        }
        if self.width == 0 || self.height == 0 || self.stride < self.width {
            return Err(GfxError::InvalidArgument);
        }
        for ch in [self.red, self.green, self.blue] {
            if ch.position as u32 + ch.size as u32 > self.bits_per_pixel as u32 {
                return Err(GfxError::InvalidArgument);
            }
        }
        Ok(())
    }

    /// Convert a packed `0xAARRGGBB` pixel into the hardware layout.
    #[inline]
    pub fn pack(&self, argb: u32) -> u32 {
        self.red.pack((argb >> 16) as u8)
            | self.green.pack((argb >> 8) as u8)
            | self.blue.pack(argb as u8)
    }
}

impl TryFrom<FrameBufferInfo> for DisplayInfo {
    type Error = GfxError;

    fn try_from(info: FrameBufferInfo) -> Result<Self, Self::Error> {
        let bits_per_pixel = (info.bytes_per_pixel * 8) as u8;
        // Positions are bit offsets inside the little-endian pixel word, so a
        // byte order of R, G, B puts red at bit 0.
        let (red, green, blue) = match info.pixel_format {
            PixelFormat::Rgb => (Channel::new(0, 8), Channel::new(8, 8), Channel::new(16, 8)),
            PixelFormat::Bgr => (Channel::new(16, 8), Channel::new(8, 8), Channel::new(0, 8)),
            PixelFormat::Unknown {
                red_position,
                green_position,
                blue_position,
            } => (
                Channel::new(red_position, 8),
                Channel::new(green_position, 8),
                Channel::new(blue_position, 8),
            ),
            _ => return Err(GfxError::InvalidArgument),
        };
        let desc = DisplayInfo {
            width: info.width,
            height: info.height,
            stride: info.stride,
            bits_per_pixel,
            red,
            green,
            blue,
        };
        desc.validate()?;
        Ok(desc)
    }
}
