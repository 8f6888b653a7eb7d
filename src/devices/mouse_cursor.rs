//! # Mouse Cursor
//!
//! The pointer is an overlay: it is written straight into hardware memory
//! after a flush and never touches the backbuffer. Erasing it re-sends the
//! clean scanlines it covered with [`DisplaySurface::flush_lines`].

use crate::devices::framebuffer::color::Color;
use crate::devices::framebuffer::surface::DisplaySurface;
use crate::geometry::{Point, Rect};

// =============================================================================
// CURSOR BITMAP (12x19 arrow)
// =============================================================================

pub const CURSOR_WIDTH: usize = 12;
pub const CURSOR_HEIGHT: usize = 19;

/// 0 = transparent, 1 = outline, 2 = fill
#[rustfmt::skip]
const CURSOR_BITMAP: [[u8; CURSOR_WIDTH]; CURSOR_HEIGHT] = [
    [1,0,0,0,0,0,0,0,0,0,0,0],
    [1,1,0,0,0,0,0,0,0,0,0,0],
    [1,2,1,0,0,0,0,0,0,0,0,0],
    [1,2,2,1,0,0,0,0,0,0,0,0],
    [1,2,2,2,1,0,0,0,0,0,0,0],
    [1,2,2,2,2,1,0,0,0,0,0,0],
    [1,2,2,2,2,2,1,0,0,0,0,0],
    [1,2,2,2,2,2,2,1,0,0,0,0],
    [1,2,2,2,2,2,2,2,1,0,0,0],
    [1,2,2,2,2,2,2,2,2,1,0,0],
    [1,2,2,2,2,2,2,2,2,2,1,0],
    [1,2,2,2,2,2,2,1,1,1,1,1],
    [1,2,2,2,1,2,2,1,0,0,0,0],
    [1,2,2,1,0,1,2,2,1,0,0,0],
    [1,2,1,0,0,1,2,2,1,0,0,0],
    [1,1,0,0,0,0,1,2,2,1,0,0],
    [1,0,0,0,0,0,1,2,2,1,0,0],
    [0,0,0,0,0,0,0,1,2,2,1,0],
    [0,0,0,0,0,0,0,1,1,1,1,0],
];

pub struct Cursor {
    pos: Point,
    visible: bool,
    /// Where the overlay currently sits in hardware memory, if anywhere.
    drawn_at: Option<Point>,
    outline: Color,
    fill: Color,
}

impl Cursor {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            pos: Point::new(x, y),
            visible: true,
            drawn_at: None,
            outline: Color::BLACK,
            fill: Color::WHITE,
        }
    }

    /// Takes effect the next time the cursor is drawn.
    pub fn set_colors(&mut self, outline: Color, fill: Color) {
        self.outline = outline;
        self.fill = fill;
    }

    pub fn position(&self) -> Point {
        self.pos
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.pos = Point::new(x, y);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// True when hardware memory doesn't show the cursor where it should be.
    pub fn needs_redraw(&self) -> bool {
        match self.drawn_at {
            Some(at) => !self.visible || at != self.pos,
            None => self.visible,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, CURSOR_WIDTH as u32, CURSOR_HEIGHT as u32)
    }

    /// Restore the scanlines under the last drawn overlay from the backbuffer.
    pub fn erase(&mut self, surface: &mut DisplaySurface) {
        if let Some(at) = self.drawn_at.take() {
            let y0 = at.y.max(0) as usize;
            let y1 = (at.y + CURSOR_HEIGHT as i32).max(0) as usize;
            surface.flush_lines(y0, y1);
        }
    }

    pub fn draw(&mut self, surface: &mut DisplaySurface) {
        if !self.visible {
            return;
        }
        for (row, bits) in CURSOR_BITMAP.iter().enumerate() {
            for (col, &bit) in bits.iter().enumerate() {
                let color = match bit {
                    1 => self.outline,
                    2 => self.fill,
                    _ => continue,
                };
                surface.overlay_pixel(self.pos.x + col as i32, self.pos.y + row as i32, color);
            }
        }
        self.drawn_at = Some(self.pos);
    }
}
