//! Double-buffered display surface
//!
//! All drawing lands in a software backbuffer of packed `0xAARRGGBB` words.
//! Each write marks its scanline dirty; [`DisplaySurface::flush`] then
//! transfers only those scanlines to hardware memory, repacking every pixel
//! into the channel layout and depth the driver reported.
//!
//! ```text
//! draw ──▶ backbuffer (u32 ARGB) ──▶ DirtyLines
//!                                       │ flush()
//!                                       ▼
//!                      hardware memory (24/32 bpp, driver layout)
//! ```
//!
//! Transient overlays (the pointer) are written straight to hardware with
//! [`DisplaySurface::overlay_pixel`] and erased by re-sending clean rows with
//! [`DisplaySurface::flush_lines`].

use alloc::vec::Vec;

use bootloader_api::info::FrameBuffer;
use log::{debug, info};

use super::color::Color;
use super::dirty::DirtyLines;
use super::info::DisplayInfo;
use super::raster::Raster;
use crate::error::GfxError;
use crate::geometry::Rect;

pub struct DisplaySurface {
    info: DisplayInfo,
    backbuffer: Vec<u32>,
    dirty: DirtyLines,
    clip: Rect,
    hardware: &'static mut [u8],
}

fn alloc_backbuffer(len: usize) -> Result<Vec<u32>, GfxError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| GfxError::ResourceExhausted)?;
    buf.resize(len, Color::BLACK.to_argb());
    Ok(buf)
}

impl DisplaySurface {
    /// Allocate the backbuffer and dirty set for `info`. Fails on unsupported
    /// depth, hardware memory too short for the descriptor, or allocation
    /// failure; nothing is left half-built.
    pub fn new(info: DisplayInfo, hardware: &'static mut [u8]) -> Result<Self, GfxError> {
        info.validate()?;
        if hardware.len() < info.required_len() {
            return Err(GfxError::InvalidArgument);
        }
        let backbuffer = alloc_backbuffer(info.width * info.height)?;
        let dirty = DirtyLines::new(info.height)?;
        info!(
            "display: {}x{} stride {} @ {} bpp",
            info.width, info.height, info.stride, info.bits_per_pixel
        );
        Ok(Self {
            clip: Rect::new(0, 0, info.width as u32, info.height as u32),
            info,
            backbuffer,
            dirty,
            hardware,
        })
    }

    /// Take over the framebuffer the bootloader set up.
    pub fn from_boot_framebuffer(fb: &'static mut FrameBuffer) -> Result<Self, GfxError> {
        let info = DisplayInfo::try_from(fb.info())?;
        Self::new(info, fb.buffer_mut())
    }

    /// Replace the surface wholesale after a resolution change. On failure
    /// the current surface stays untouched.
    pub fn reinit(&mut self, info: DisplayInfo, hardware: &'static mut [u8]) -> Result<(), GfxError> {
        *self = Self::new(info, hardware)?;
        Ok(())
    }

    pub fn info(&self) -> &DisplayInfo {
        &self.info
    }

    /// Raw hardware memory, for inspection.
    pub fn hardware(&self) -> &[u8] {
        self.hardware
    }

    pub fn dirty_lines(&self) -> &DirtyLines {
        &self.dirty
    }

    /// Restrict drawing to `rect` (clamped to the surface).
    pub fn set_clip(&mut self, rect: Rect) {
        self.clip = rect.intersect(&self.bounds()).unwrap_or_default();
    }

    pub fn reset_clip(&mut self) {
        self.clip = self.bounds();
    }

    /// Mark every scanline `rect` covers, without writing pixels.
    pub fn mark_dirty(&mut self, rect: Rect) {
        if let Some(r) = rect.intersect(&self.bounds()) {
            self.dirty.set_range(r.y as usize, r.bottom() as usize);
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.set_range(0, self.info.height);
    }

    /// Transfer dirty scanlines and clear the dirty set. Returns the number
    /// of scanlines written.
    pub fn flush(&mut self) -> usize {
        if !self.dirty.any() {
            return 0;
        }
        let mut written = 0;
        for y in 0..self.info.height {
            if self.dirty.is_set(y) {
                self.write_line(y);
                written += 1;
            }
        }
        self.dirty.clear();
        debug!("flush: {} lines", written);
        written
    }

    /// Transfer scanlines `y0..y1` whether dirty or not. The dirty set is
    /// neither consulted nor modified.
    pub fn flush_lines(&mut self, y0: usize, y1: usize) {
        for y in y0..y1.min(self.info.height) {
            self.write_line(y);
        }
    }

    /// Transfer every scanline. Afterwards hardware and backbuffer agree, so
    /// the dirty set is cleared.
    pub fn flush_all(&mut self) {
        self.flush_lines(0, self.info.height);
        self.dirty.clear();
    }

    /// Write one pixel straight to hardware memory, bypassing the backbuffer.
    pub fn overlay_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.info.width || y as usize >= self.info.height {
            return;
        }
        let bpp = self.info.bytes_per_pixel();
        let off = y as usize * self.info.pitch() + x as usize * bpp;
        let packed = self.info.pack(color.to_argb()).to_le_bytes();
        self.hardware[off..off + bpp].copy_from_slice(&packed[..bpp]);
    }

    fn write_line(&mut self, y: usize) {
        let info = self.info;
        let bpp = info.bytes_per_pixel();
        let src = &self.backbuffer[y * info.width..(y + 1) * info.width];
        let dst = &mut self.hardware[y * info.pitch()..y * info.pitch() + info.width * bpp];
        for (px, out) in src.iter().zip(dst.chunks_exact_mut(bpp)) {
            let packed = info.pack(*px).to_le_bytes();
            out.copy_from_slice(&packed[..bpp]);
        }
    }
}

impl Raster for DisplaySurface {
    fn width(&self) -> u32 {
        self.info.width as u32
    }

    fn height(&self) -> u32 {
        self.info.height as u32
    }

    fn pixels(&self) -> &[u32] {
        &self.backbuffer
    }

    fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.backbuffer
    }

    fn touch_rows(&mut self, y0: u32, y1: u32) {
        self.dirty.set_range(y0 as usize, y1 as usize);
    }

    fn clip(&self) -> Rect {
        self.clip
    }
}
