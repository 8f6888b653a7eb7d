use crate::devices::framebuffer::color::Color;

/// Desktop and window decoration colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Fill behind all windows when no wallpaper is set.
    pub desktop: Color,
    /// Default client background for new windows.
    pub window_background: Color,
    pub border: Color,
    pub border_focused: Color,
    /// Title bar gradient, top to bottom.
    pub title_focused: (Color, Color),
    pub title_unfocused: (Color, Color),
    pub title_text: Color,
    pub title_text_unfocused: Color,
    pub title_shadow: Color,
    pub close: Color,
    pub maximize: Color,
    pub minimize: Color,
    /// Cursor outline and fill.
    pub cursor: (Color, Color),
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_modern()
    }
}

impl Theme {
    pub fn dark_modern() -> Self {
        Self {
            desktop: Color::from_hex(0x121212),
            window_background: Color::from_hex(0x1E1E1E),
            border: Color::from_hex(0x3A3A3A),
            border_focused: Color::from_hex(0x2196F3),
            title_focused: (Color::from_hex(0x2196F3), Color::from_hex(0x1565C0)),
            title_unfocused: (Color::from_hex(0x424242), Color::from_hex(0x303030)),
            title_text: Color::from_hex(0xFFFFFF),
            title_text_unfocused: Color::from_hex(0xB0B0B0),
            title_shadow: Color::from_hex(0x000000),
            close: Color::from_hex(0xF44336),
            maximize: Color::from_hex(0x4CAF50),
            minimize: Color::from_hex(0xFF9800),
            cursor: (Color::BLACK, Color::WHITE),
        }
    }

    pub fn light_modern() -> Self {
        Self {
            desktop: Color::from_hex(0xF5F5F5),
            window_background: Color::from_hex(0xFFFFFF),
            border: Color::from_hex(0xBDBDBD),
            border_focused: Color::from_hex(0x1976D2),
            title_focused: (Color::from_hex(0x42A5F5), Color::from_hex(0x1976D2)),
            title_unfocused: (Color::from_hex(0xE0E0E0), Color::from_hex(0xBDBDBD)),
            title_text: Color::from_hex(0xFFFFFF),
            title_text_unfocused: Color::from_hex(0x212121),
            title_shadow: Color::from_hex(0x757575),
            close: Color::from_hex(0xD32F2F),
            maximize: Color::from_hex(0x388E3C),
            minimize: Color::from_hex(0xF57C00),
            cursor: (Color::BLACK, Color::WHITE),
        }
    }
}
