//! # Window Manager
//!
//! - `window`: `Window` records, flags, handles and the `WindowHandler` trait
//! - `decor`: frame geometry, hit testing, shadow and title bar drawing
//! - `manager`: `WindowManager`, stacking, focus, dispatch and compositing

pub mod decor;
pub mod manager;
pub mod window;

pub use decor::{Button, Hit};
pub use manager::WindowManager;
pub use window::{client_rect, Reply, Window, WindowFlags, WindowHandler, WindowId};
