//! # Input Event Types
//!
//! Every event carries a timestamp (timer ticks), an optional target window
//! and a variant payload:
//!
//! - mouse variants carry absolute position, delta, the button that changed
//!   and the full button/modifier state
//! - key variants carry the key code, the literal character when printable,
//!   and the modifier state
//! - window variants are notifications the window manager delivers to owners

use bitflags::bitflags;

use crate::geometry::Rect;
use crate::wm::WindowId;

bitflags! {
    /// Pointer buttons as reported by the driver: bit 0 left, bit 1 right,
    /// bit 2 middle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CTRL = 0x02;
        const ALT = 0x04;
    }
}

/// Decoded key. Values below [`KeyCode::SPECIAL_BASE`] are ASCII; the range
/// above it is reserved for keys without a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const SPECIAL_BASE: u16 = 0x100;

    pub const BACKSPACE: KeyCode = KeyCode(0x08);
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0A);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);

    pub const UP: KeyCode = KeyCode(0x100);
    pub const DOWN: KeyCode = KeyCode(0x101);
    pub const LEFT: KeyCode = KeyCode(0x102);
    pub const RIGHT: KeyCode = KeyCode(0x103);
    pub const HOME: KeyCode = KeyCode(0x104);
    pub const END: KeyCode = KeyCode(0x105);
    pub const PAGE_UP: KeyCode = KeyCode(0x106);
    pub const PAGE_DOWN: KeyCode = KeyCode(0x107);
    pub const INSERT: KeyCode = KeyCode(0x108);
    pub const DELETE: KeyCode = KeyCode(0x109);
    pub const F1: KeyCode = KeyCode(0x110);

    /// `F1`..`F12`; `n` outside 1..=12 clamps.
    pub const fn function(n: u8) -> KeyCode {
        let n = if n < 1 { 1 } else if n > 12 { 12 } else { n };
        KeyCode(Self::F1.0 + n as u16 - 1)
    }

    pub fn from_char(ch: char) -> Option<KeyCode> {
        ch.is_ascii().then_some(KeyCode(ch as u16))
    }

    #[inline]
    pub fn is_special(self) -> bool {
        self.0 >= Self::SPECIAL_BASE
    }

    /// The literal character for printable ASCII (32..=126).
    #[inline]
    pub fn printable(self) -> Option<char> {
        (32..=126).contains(&self.0).then_some(self.0 as u8 as char)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseData {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    /// The button this event is about; empty for moves.
    pub button: MouseButtons,
    /// All buttons held after the event.
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyData {
    pub code: KeyCode,
    pub ch: Option<char>,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MouseMove(MouseData),
    MouseDown(MouseData),
    MouseUp(MouseData),
    MouseClick(MouseData),
    MouseDblClick(MouseData),
    KeyDown(KeyData),
    KeyUp(KeyData),
    KeyChar(KeyData),
    WindowClose,
    WindowFocus,
    WindowBlur,
    /// New outer rectangle.
    WindowResize(Rect),
    /// New outer rectangle.
    WindowMove(Rect),
    WindowPaint,
    Timer(u32),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub window: Option<WindowId>,
    pub kind: EventKind,
}

impl Event {
    pub const fn new(kind: EventKind, timestamp: u64) -> Self {
        Self {
            timestamp,
            window: None,
            kind,
        }
    }

    pub fn to(mut self, window: WindowId) -> Self {
        self.window = Some(window);
        self
    }

    pub fn mouse(&self) -> Option<&MouseData> {
        match &self.kind {
            EventKind::MouseMove(m)
            | EventKind::MouseDown(m)
            | EventKind::MouseUp(m)
            | EventKind::MouseClick(m)
            | EventKind::MouseDblClick(m) => Some(m),
            _ => None,
        }
    }

    pub fn mouse_mut(&mut self) -> Option<&mut MouseData> {
        match &mut self.kind {
            EventKind::MouseMove(m)
            | EventKind::MouseDown(m)
            | EventKind::MouseUp(m)
            | EventKind::MouseClick(m)
            | EventKind::MouseDblClick(m) => Some(m),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&KeyData> {
        match &self.kind {
            EventKind::KeyDown(k) | EventKind::KeyUp(k) | EventKind::KeyChar(k) => Some(k),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_range() {
        assert_eq!(KeyCode(31).printable(), None);
        assert_eq!(KeyCode(32).printable(), Some(' '));
        assert_eq!(KeyCode(126).printable(), Some('~'));
        assert_eq!(KeyCode(127).printable(), None);
        assert_eq!(KeyCode::UP.printable(), None);
        assert!(KeyCode::UP.is_special());
    }

    #[test]
    fn function_keys_are_contiguous() {
        assert_eq!(KeyCode::function(1), KeyCode::F1);
        assert_eq!(KeyCode::function(12).0, KeyCode::F1.0 + 11);
        assert_eq!(KeyCode::function(40), KeyCode::function(12));
    }

    #[test]
    fn mouse_accessor_covers_all_pointer_variants() {
        let m = MouseData { x: 3, ..Default::default() };
        for kind in [
            EventKind::MouseMove(m),
            EventKind::MouseDown(m),
            EventKind::MouseUp(m),
            EventKind::MouseClick(m),
            EventKind::MouseDblClick(m),
        ] {
            assert_eq!(Event::new(kind, 0).mouse().map(|m| m.x), Some(3));
        }
        assert!(Event::new(EventKind::Quit, 0).mouse().is_none());
    }
}
