//! Window decorations: frame geometry, hit testing and drawing.
//!
//! ```text
//!  ┌───────────────────────────────────────────────┐ ← border
//!  │  drag region            Title        (-) (+) (x)│ ← title bar
//!  ├───────────────────────────────────────────────┤
//!  │                                                 │
//!  │                   client area                   │
//!  │                                              ◢ │ ← resize grip
//!  └───────────────────────────────────────────────┘▒
//!                                                   ▒▒ ← shadow
//! ```
//!
//! Buttons sit at fixed offsets from the right edge, close outermost.
//! Each is a circle tested by squared distance and only exists when the
//! window carries the matching capability flag.

use embedded_graphics::mono_font::MonoFont;

use super::window::{Window, WindowFlags};
use crate::config::DesktopConfig;
use crate::devices::framebuffer::raster::{text_width, Painter, Raster};
use crate::geometry::{Point, Rect};
use crate::ui::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Close,
    Maximize,
    Minimize,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::Close, Button::Maximize, Button::Minimize];

    fn slot(self) -> i32 {
        match self {
            Button::Close => 0,
            Button::Maximize => 1,
            Button::Minimize => 2,
        }
    }

    pub fn capability(self) -> WindowFlags {
        match self {
            Button::Close => WindowFlags::CLOSABLE,
            Button::Maximize => WindowFlags::MAXIMIZABLE,
            Button::Minimize => WindowFlags::MINIMIZABLE,
        }
    }
}

/// Which part of a window a screen point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Button(Button),
    ResizeGrip,
    TitleBar,
    Client,
    /// Border, or the title strip under the button row between buttons.
    Frame,
}

/// Title strip beneath the top border.
pub fn title_bar(rect: Rect, config: &DesktopConfig) -> Rect {
    let b = config.border_width;
    Rect::new(
        rect.x + b as i32,
        rect.y + b as i32,
        rect.w.saturating_sub(2 * b),
        config.title_bar_height,
    )
}

pub fn button_center(rect: Rect, config: &DesktopConfig, button: Button) -> Point {
    let close_x = rect.right()
        - config.border_width as i32
        - config.button_margin as i32
        - config.button_radius as i32;
    Point::new(
        close_x - button.slot() * config.button_spacing as i32,
        rect.y + config.border_width as i32 + config.title_bar_height as i32 / 2,
    )
}

/// Left edge of the button row; the drag region ends here.
pub fn button_row_left(rect: Rect, config: &DesktopConfig) -> i32 {
    button_center(rect, config, Button::Minimize).x - config.button_radius as i32
}

fn button_hit(rect: Rect, config: &DesktopConfig, button: Button, x: i32, y: i32) -> bool {
    let c = button_center(rect, config, button);
    let (dx, dy) = (x as i64 - c.x as i64, y as i64 - c.y as i64);
    let r = config.button_radius as i64;
    dx * dx + dy * dy <= r * r
}

/// Bottom-right square that starts an interactive resize.
pub fn resize_grip(rect: Rect, config: &DesktopConfig) -> Rect {
    let g = config.resize_grip.min(rect.w).min(rect.h);
    Rect::new(rect.right() - g as i32, rect.bottom() - g as i32, g, g)
}

/// Classify screen point (`x`, `y`), assumed inside `win.rect()`.
pub fn hit_test(win: &Window, x: i32, y: i32, config: &DesktopConfig) -> Hit {
    let rect = win.rect();
    if !win.has(WindowFlags::DECORATED) {
        return if win.client().contains(x, y) { Hit::Client } else { Hit::Frame };
    }

    for button in Button::ALL {
        if win.has(button.capability()) && button_hit(rect, config, button, x, y) {
            return Hit::Button(button);
        }
    }

    if win.has(WindowFlags::RESIZABLE)
        && !win.has(WindowFlags::MAXIMIZED)
        && resize_grip(rect, config).contains(x, y)
    {
        return Hit::ResizeGrip;
    }

    if title_bar(rect, config).contains(x, y) {
        return if x < button_row_left(rect, config) { Hit::TitleBar } else { Hit::Frame };
    }

    if win.client().contains(x, y) {
        Hit::Client
    } else {
        Hit::Frame
    }
}

/// Outer rectangle grown by the shadow extent.
pub fn bounds_with_shadow(rect: Rect, config: &DesktopConfig) -> Rect {
    Rect::new(
        rect.x,
        rect.y,
        rect.w.saturating_add(config.shadow_size),
        rect.h.saturating_add(config.shadow_size),
    )
}

// =============================================================================
// DRAWING
// =============================================================================

/// Darken what is already on `target` along the right and bottom edges of
/// `rect`, strongest against the window and fading out over `shadow_size`.
pub fn draw_shadow<R: Raster + ?Sized>(target: &mut R, rect: Rect, config: &DesktopConfig) {
    let size = config.shadow_size as i32;
    if size == 0 || rect.is_empty() {
        return;
    }
    let strength = config.shadow_strength as i32;
    let falloff = |d: i32| (strength * (size - d) / size) as u8;

    let clip = target.clip();
    let extent = config.shadow_size;

    // right strip, offset down so the shadow reads as dropped
    let right = Rect::new(rect.right(), rect.y + size, extent, rect.h.saturating_sub(extent));
    if let Some(r) = right.intersect(&clip) {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                target.shade_pixel(x, y, falloff(x - rect.right()));
            }
        }
    }
    // bottom strip
    let bottom = Rect::new(rect.x + size, rect.bottom(), rect.w.saturating_sub(extent), extent);
    if let Some(r) = bottom.intersect(&clip) {
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                target.shade_pixel(x, y, falloff(y - rect.bottom()));
            }
        }
    }
    // corner, radial
    for dy in 0..size {
        for dx in 0..size {
            let dist = libm::sqrtf((dx * dx + dy * dy) as f32);
            if dist < size as f32 {
                let amount = (strength as f32 * (1.0 - dist / size as f32)) as u8;
                target.shade_pixel(rect.right() + dx, rect.bottom() + dy, amount);
            }
        }
    }
}

/// Border, gradient title bar, buttons and title text. `hover` lightens the
/// button under the pointer.
pub fn draw_frame<R: Raster + ?Sized>(
    target: &mut R,
    win: &Window,
    config: &DesktopConfig,
    theme: &Theme,
    font: &MonoFont<'_>,
    hover: Option<Button>,
) {
    let rect = win.rect();
    let focused = win.is_focused();

    let border = if focused { theme.border_focused } else { theme.border };
    for i in 0..config.border_width {
        target.rect(rect.inset(i, i, i, i), border);
    }

    let bar = title_bar(rect, config);
    let (top, bottom) = if focused { theme.title_focused } else { theme.title_unfocused };
    target.fill_gradient(bar, top, bottom);

    for button in Button::ALL {
        if !win.has(button.capability()) {
            continue;
        }
        let base = match button {
            Button::Close => theme.close,
            Button::Maximize => theme.maximize,
            Button::Minimize => theme.minimize,
        };
        let color = if hover == Some(button) { base.lighten(64) } else { base };
        let c = button_center(rect, config, button);
        target.fill_circle(c.x, c.y, config.button_radius, color);
    }

    draw_title(target, win.title(), bar, button_row_left(rect, config), theme, font, focused);
}

fn draw_title<R: Raster + ?Sized>(
    target: &mut R,
    title: &str,
    bar: Rect,
    limit: i32,
    theme: &Theme,
    font: &MonoFont<'_>,
    focused: bool,
) {
    const PAD: i32 = 6;
    let advance = (font.character_size.width + font.character_spacing) as i32;
    let room = limit - bar.x - 2 * PAD;
    if room <= 0 || advance == 0 || title.is_empty() {
        return;
    }
    let fits = (room + font.character_spacing as i32) / advance;
    let end = title
        .char_indices()
        .nth(fits as usize)
        .map_or(title.len(), |(i, _)| i);
    let text = &title[..end];

    let tw = text_width(font, text) as i32;
    let x = (bar.x + (bar.w as i32 - tw) / 2).clamp(bar.x + PAD, (limit - PAD - tw).max(bar.x + PAD));
    let y = bar.y + (bar.h as i32 - font.character_size.height as i32) / 2;

    let fg = if focused { theme.title_text } else { theme.title_text_unfocused };
    if focused {
        target.draw_text(x + 1, y + 1, text, font, theme.title_shadow, None);
    }
    target.draw_text(x, y, text, font, fg, None);
}
