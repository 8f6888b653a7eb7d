//! # Look and Feel
//!
//! Colors the desktop and window decorations are painted with. Themes are
//! plain values; swap one in at any time and the next composite uses it.
//!
//! ## Example
//!
//! ```ignore
//! use crate::ui::Theme;
//!
//! let mut theme = Theme::dark_modern();
//! theme.desktop = Color::from_hex(0x004080);
//! wm.set_theme(theme);
//! ```

pub mod theme;
pub use theme::Theme;
