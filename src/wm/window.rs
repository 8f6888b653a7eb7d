//! Window records and the owner-facing capability trait.

use alloc::boxed::Box;
use alloc::vec::Vec;

use bitflags::bitflags;
use heapless::String;

use crate::config::{DesktopConfig, TITLE_CAPACITY};
use crate::devices::framebuffer::color::Color;
use crate::devices::framebuffer::raster::Canvas;
use crate::devices::input::events::{Event, EventKind};
use crate::error::GfxError;
use crate::geometry::Rect;

/// Stable handle into the window arena. A slot reused after `destroy` gets
/// a new generation, so stale handles never alias a newer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId {
    pub(super) index: u32,
    pub(super) generation: u32,
}

impl WindowId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u16 {
        const VISIBLE = 1 << 0;
        const FOCUSED = 1 << 1;
        const MOVABLE = 1 << 2;
        const RESIZABLE = 1 << 3;
        const CLOSABLE = 1 << 4;
        const MINIMIZABLE = 1 << 5;
        const MAXIMIZABLE = 1 << 6;
        const DECORATED = 1 << 7;
        const MODAL = 1 << 8;
        const TOPMOST = 1 << 9;
        const MINIMIZED = 1 << 10;
        const MAXIMIZED = 1 << 11;

        /// An ordinary application window.
        const DEFAULT = Self::VISIBLE.bits()
            | Self::MOVABLE.bits()
            | Self::RESIZABLE.bits()
            | Self::CLOSABLE.bits()
            | Self::MINIMIZABLE.bits()
            | Self::MAXIMIZABLE.bits()
            | Self::DECORATED.bits();
    }
}

/// What a handler did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ignored,
    Consumed,
    /// Ask the window manager to destroy this window once the handler returns.
    Destroy,
}

/// Implemented by whoever owns a window.
pub trait WindowHandler {
    /// Draw the client area. The canvas has already been cleared to the
    /// window background; coordinates are client-relative.
    fn paint(&mut self, _canvas: &mut Canvas<'_>) {}

    /// React to an event routed to this window. Mouse coordinates are
    /// client-relative.
    ///
    /// `WindowClose` only asks; the default accepts by replying
    /// [`Reply::Destroy`]. Return anything else to veto.
    fn handle(&mut self, _window: &mut Window, event: &Event) -> Reply {
        default_reply(event)
    }
}

pub(super) fn default_reply(event: &Event) -> Reply {
    match event.kind {
        EventKind::WindowClose => Reply::Destroy,
        _ => Reply::Ignored,
    }
}

pub struct Window {
    pub(super) id: WindowId,
    pub(super) title: String<TITLE_CAPACITY>,
    pub(super) rect: Rect,
    pub(super) client: Rect,
    pub(super) flags: WindowFlags,
    pub(super) background: Color,
    pub(super) buffer: Vec<u32>,
    pub(super) dirty: bool,
    pub(super) saved: Option<Rect>,
    pub(super) handler: Option<Box<dyn WindowHandler>>,
}

impl core::fmt::Debug for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &self.title.as_str())
            .field("rect", &self.rect)
            .field("flags", &self.flags)
            .finish()
    }
}

impl Window {
    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Outer rectangle, decorations included.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Client rectangle in screen coordinates.
    pub fn client(&self) -> Rect {
        self.client
    }

    pub fn flags(&self) -> WindowFlags {
        self.flags
    }

    pub fn has(&self, flag: WindowFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Visible and not minimized.
    pub fn is_shown(&self) -> bool {
        self.flags.contains(WindowFlags::VISIBLE) && !self.flags.contains(WindowFlags::MINIMIZED)
    }

    pub fn is_focused(&self) -> bool {
        self.flags.contains(WindowFlags::FOCUSED)
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Rectangle to return to when un-maximizing.
    pub fn saved_rect(&self) -> Option<Rect> {
        self.saved
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Request a repaint on the next redraw pass.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }

    /// Client-relative drawing into this window's own buffer.
    pub fn canvas(&mut self) -> Canvas<'_> {
        Canvas::new(self.client.w, self.client.h, &mut self.buffer)
    }

    pub(super) fn set_title(&mut self, title: &str) {
        self.title = truncated(title);
    }
}

/// Copy as many whole characters as fit.
pub(super) fn truncated(title: &str) -> String<TITLE_CAPACITY> {
    let mut s = String::new();
    for ch in title.chars() {
        if s.push(ch).is_err() {
            break;
        }
    }
    s
}

/// Outer rectangle minus border and title bar when decorated.
pub fn client_rect(rect: Rect, flags: WindowFlags, config: &DesktopConfig) -> Rect {
    if !flags.contains(WindowFlags::DECORATED) {
        return rect;
    }
    let b = config.border_width;
    rect.inset(b, b + config.title_bar_height, b, b)
}

/// A `w * h` buffer filled with `fill`, or `ResourceExhausted`.
pub(super) fn alloc_buffer(w: u32, h: u32, fill: Color) -> Result<Vec<u32>, GfxError> {
    let len = w as usize * h as usize;
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| GfxError::ResourceExhausted)?;
    buf.resize(len, fill.to_argb());
    Ok(buf)
}
