//! Desktop metrics and input thresholds.
//!
//! Colors live in [`crate::ui::Theme`]; this is everything else an owner
//! might want to tune without touching code.

/// Bounded event queue capacity.
pub const EVENT_QUEUE_CAPACITY: usize = 64;

/// Upper bound for the window title, in bytes.
pub const TITLE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopConfig {
    /// Frame border on all four sides of a decorated window.
    pub border_width: u32,
    pub title_bar_height: u32,
    /// Radius of the close/maximize/minimize indicators and their hit circles.
    pub button_radius: u32,
    /// Center-to-center distance between indicators.
    pub button_spacing: u32,
    /// Gap between the right border and the close indicator's edge.
    pub button_margin: u32,
    /// Drop shadow extent past the right and bottom edges.
    pub shadow_size: u32,
    /// Darkening applied right next to the window, out of 255.
    pub shadow_strength: u8,
    /// Strip kept free at the bottom of the screen when maximizing.
    pub status_bar_height: u32,
    /// Bottom-right square that starts a resize.
    pub resize_grip: u32,
    pub min_window_width: u32,
    pub min_window_height: u32,
    pub max_windows: usize,
    /// Two releases closer together than this (in timer ticks) may form a
    /// double-click.
    pub double_click_ticks: u64,
    /// Maximum per-axis pointer travel between the two releases.
    pub double_click_distance: i32,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            border_width: 1,
            title_bar_height: 24,
            button_radius: 6,
            button_spacing: 20,
            button_margin: 8,
            shadow_size: 6,
            shadow_strength: 96,
            status_bar_height: 28,
            resize_grip: 12,
            min_window_width: 96,
            min_window_height: 48,
            max_windows: 32,
            double_click_ticks: 500,
            double_click_distance: 5,
        }
    }
}
