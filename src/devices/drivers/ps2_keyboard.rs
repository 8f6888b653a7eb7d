//! # PS/2 Keyboard Driver
//!
//! Handles PS/2 keyboard input via IRQ1 interrupt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    IRQ1     ┌──────────────┐
//! │  Keyboard   │────────────▶│  SCANCODES   │
//! │  (Port 60)  │             │  (ByteRing)  │
//! └─────────────┘             └──────┬───────┘
//!                                    │  drained by the run loop
//!                                    ▼
//!                         ┌──────────────────┐
//!                         │ ScancodeDecoder  │
//!                         │ - 0xE0 prefix    │
//!                         │ - Modifiers      │
//!                         │ - Caps lock      │
//!                         └────────┬─────────┘
//!                                  ▼
//!                               KeyCode
//! ```
//!
//! Scancode set 1. Bit 7 marks a release; only presses produce key codes,
//! releases just update modifier state.

use super::ring::ByteRing;
use crate::devices::input::events::{KeyCode, Modifiers};

pub const RING_SIZE: usize = 256;

/// Raw scancodes from the IRQ1 handler.
pub static SCANCODES: ByteRing<RING_SIZE> = ByteRing::new();

#[inline]
pub fn enqueue_scancode(scancode: u8) {
    SCANCODES.push(scancode);
}

/// IRQ1 body: read the pending scancode from the data port.
#[cfg(target_arch = "x86_64")]
pub fn handle_interrupt() {
    use x86_64::instructions::port::Port;

    let scancode = unsafe { Port::<u8>::new(0x60).read() };
    enqueue_scancode(scancode);
}

// =============================================================================
// KEYMAP (US layout, set 1, 0x00..0x39)
// =============================================================================

#[rustfmt::skip]
const NORMAL: &[u8; 0x3A] =
    b"\0\x1b1234567890-=\x08\tqwertyuiop[]\n\0asdfghjkl;'`\0\\zxcvbnm,./\0*\0 ";
#[rustfmt::skip]
const SHIFTED: &[u8; 0x3A] =
    b"\0\x1b!@#$%^&*()_+\x08\tQWERTYUIOP{}\n\0ASDFGHJKL:\"~\0|ZXCVBNM<>?\0*\0 ";

const LSHIFT: u8 = 0x2A;
const RSHIFT: u8 = 0x36;
const CTRL: u8 = 0x1D;
const ALT: u8 = 0x38;
const CAPS_LOCK: u8 = 0x3A;

pub struct ScancodeDecoder {
    extended: bool,
    left_shift: bool,
    right_shift: bool,
    ctrl: bool,
    alt: bool,
    caps_lock: bool,
}

impl Default for ScancodeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScancodeDecoder {
    pub const fn new() -> Self {
        Self {
            extended: false,
            left_shift: false,
            right_shift: false,
            ctrl: false,
            alt: false,
            caps_lock: false,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        let mut m = Modifiers::empty();
        m.set(Modifiers::SHIFT, self.shift());
        m.set(Modifiers::CTRL, self.ctrl);
        m.set(Modifiers::ALT, self.alt);
        m
    }

    pub fn process_scancode(&mut self, scancode: u8) -> Option<KeyCode> {
        if scancode == 0xE0 {
            self.extended = true;
            return None;
        }

        let released = scancode & 0x80 != 0;
        let code = scancode & 0x7F;

        if core::mem::take(&mut self.extended) {
            return self.extended_key(code, released);
        }

        match code {
            LSHIFT => {
                self.left_shift = !released;
                return None;
            }
            RSHIFT => {
                self.right_shift = !released;
                return None;
            }
            CTRL => {
                self.ctrl = !released;
                return None;
            }
            ALT => {
                self.alt = !released;
                return None;
            }
            _ => {}
        }

        if released {
            return None;
        }

        match code {
            CAPS_LOCK => {
                self.caps_lock = !self.caps_lock;
                None
            }
            0x3B..=0x44 => Some(KeyCode::function(code - 0x3B + 1)),
            0x57 => Some(KeyCode::function(11)),
            0x58 => Some(KeyCode::function(12)),
            _ => self.ascii(code).map(|b| KeyCode(b as u16)),
        }
    }

    fn extended_key(&mut self, code: u8, released: bool) -> Option<KeyCode> {
        // right-hand ctrl/alt share the plain codes
        match code {
            CTRL => {
                self.ctrl = !released;
                return None;
            }
            ALT => {
                self.alt = !released;
                return None;
            }
            _ => {}
        }
        if released {
            return None;
        }
        let key = match code {
            0x48 => KeyCode::UP,
            0x50 => KeyCode::DOWN,
            0x4B => KeyCode::LEFT,
            0x4D => KeyCode::RIGHT,
            0x47 => KeyCode::HOME,
            0x4F => KeyCode::END,
            0x49 => KeyCode::PAGE_UP,
            0x51 => KeyCode::PAGE_DOWN,
            0x52 => KeyCode::INSERT,
            0x53 => KeyCode::DELETE,
            0x1C => KeyCode::ENTER,
            0x35 => KeyCode(b'/' as u16),
            _ => return None,
        };
        Some(key)
    }

    fn shift(&self) -> bool {
        self.left_shift || self.right_shift
    }

    fn ascii(&self, code: u8) -> Option<u8> {
        let table = if self.shift() { SHIFTED } else { NORMAL };
        let mut byte = *table.get(code as usize)?;
        if byte == 0 {
            return None;
        }
        if self.caps_lock && byte.is_ascii_alphabetic() {
            byte ^= 0x20;
        }
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(dec: &mut ScancodeDecoder, codes: &[u8]) -> alloc::vec::Vec<KeyCode> {
        codes.iter().filter_map(|c| dec.process_scancode(*c)).collect()
    }

    #[test]
    fn letters_and_shift() {
        let mut d = ScancodeDecoder::new();
        // a, shift down, a, shift up, a
        let keys = feed(&mut d, &[0x1E, 0x9E, 0x2A, 0x1E, 0xAA, 0x1E]);
        assert_eq!(
            keys,
            [KeyCode(b'a' as u16), KeyCode(b'A' as u16), KeyCode(b'a' as u16)]
        );
    }

    #[test]
    fn shifted_digits_and_punctuation() {
        let mut d = ScancodeDecoder::new();
        let keys = feed(&mut d, &[0x2A, 0x02, 0x0B, 0x28, 0x2B]);
        let chars: alloc::string::String = keys.iter().filter_map(|k| k.printable()).collect();
        assert_eq!(chars, "!)\"|");
    }

    #[test]
    fn space_bar_and_keypad_star() {
        let mut d = ScancodeDecoder::new();
        let keys = feed(&mut d, &[0x39, 0xB9, 0x37, 0x38, 0xB8]);
        assert_eq!(keys, [KeyCode(b' ' as u16), KeyCode(b'*' as u16)]);
        assert_eq!(keys[0].printable(), Some(' '));
    }

    #[test]
    fn either_shift_holds_while_the_other_releases() {
        let mut d = ScancodeDecoder::new();
        // left down, right down, left up, a, right up, a
        let keys = feed(&mut d, &[0x2A, 0x36, 0xAA, 0x1E, 0xB6, 0x1E]);
        assert_eq!(keys, [KeyCode(b'A' as u16), KeyCode(b'a' as u16)]);
        assert!(d.modifiers().is_empty());
    }

    #[test]
    fn caps_lock_only_affects_letters() {
        let mut d = ScancodeDecoder::new();
        let keys = feed(&mut d, &[0x3A, 0xBA, 0x10, 0x02]);
        assert_eq!(keys, [KeyCode(b'Q' as u16), KeyCode(b'1' as u16)]);
    }

    #[test]
    fn extended_navigation_keys() {
        let mut d = ScancodeDecoder::new();
        let keys = feed(&mut d, &[0xE0, 0x48, 0xE0, 0xC8, 0xE0, 0x53, 0xE0, 0x47]);
        assert_eq!(keys, [KeyCode::UP, KeyCode::DELETE, KeyCode::HOME]);
    }

    #[test]
    fn control_keys_and_function_row() {
        let mut d = ScancodeDecoder::new();
        let keys = feed(&mut d, &[0x01, 0x0E, 0x1C, 0x3B, 0x44, 0x58]);
        assert_eq!(
            keys,
            [
                KeyCode::ESCAPE,
                KeyCode::BACKSPACE,
                KeyCode::ENTER,
                KeyCode::function(1),
                KeyCode::function(10),
                KeyCode::function(12),
            ]
        );
    }

    #[test]
    fn modifier_state_tracks_press_and_release() {
        let mut d = ScancodeDecoder::new();
        feed(&mut d, &[0x1D, 0xE0, 0x38]);
        assert_eq!(d.modifiers(), Modifiers::CTRL | Modifiers::ALT);
        feed(&mut d, &[0x9D, 0xE0, 0xB8]);
        assert!(d.modifiers().is_empty());
    }
}
