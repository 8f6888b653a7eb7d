//! Device Subsystem
//!
//! - `drivers`: PS/2 keyboard and mouse, tick counter
//! - `framebuffer`: backbuffered display surface and drawing primitives
//! - `input`: typed events, the event queue and the sampling event system
//! - `mouse_cursor`: pointer overlay

pub mod drivers;
pub mod framebuffer;
pub mod input;
pub mod mouse_cursor;
