//! # Framebuffer Graphics Module
//!
//! Provides the display surface and every pixel-level drawing primitive.
//!
//! ## Modules
//!
//! - `surface`: `DisplaySurface`, the backbuffer with dirty-line flush
//! - `raster`: `Raster`/`Painter` primitives shared by backbuffer and window buffers
//! - `info`: hardware surface descriptor (`DisplayInfo`)
//! - `dirty`: per-scanline dirty set
//! - `color`: `Color` type and pixel blending
//!
//! ## Dirty Line System
//!
//! 1. Drawing operations modify the backbuffer (not real framebuffer)
//! 2. Each touched scanline is flagged
//! 3. `flush()` only repacks and copies flagged scanlines to hardware
//!
//! This keeps memory bandwidth proportional to what actually changed,
//! which is the common case for a desktop where one window repaints.

pub mod color;
pub mod dirty;
pub mod info;
pub mod raster;
pub mod surface;

pub use color::Color;
pub use info::{Channel, DisplayInfo};
pub use raster::{text_width, Canvas, Image, ImageRef, Painter, Raster, RasterTarget};
pub use surface::DisplaySurface;
