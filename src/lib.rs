//! Windowing and rendering core of the graphical shell.
//!
//! ```text
//!  PS/2 + timer IRQs ─▶ devices::drivers ─▶ devices::input::EventSystem
//!                                                   │ Event
//!                                                   ▼
//!                                          wm::WindowManager
//!                                                   │ composite
//!                                                   ▼
//!                               devices::framebuffer::DisplaySurface ─▶ hardware
//! ```
//!
//! [`desktop::Desktop`] ties the three together for the run loop.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod desktop;
pub mod devices;
pub mod error;
pub mod geometry;
#[cfg(target_arch = "x86_64")]
pub mod logging;
pub mod ui;
pub mod wm;

pub use config::DesktopConfig;
pub use desktop::Desktop;
pub use devices::framebuffer::{Color, DisplayInfo, DisplaySurface, Painter, Raster};
pub use devices::input::{Event, EventKind, EventSystem, InputDevices};
pub use error::{GfxError, GfxResult};
pub use geometry::{Point, Rect};
pub use ui::Theme;
pub use wm::{WindowFlags, WindowHandler, WindowId, WindowManager};
