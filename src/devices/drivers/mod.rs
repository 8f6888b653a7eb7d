//! Device Drivers
//!
//! - PS/2 Keyboard (IRQ1)
//! - PS/2 Mouse (IRQ12)
//! - Tick counter (timer IRQ)
//!
//! Interrupt handlers only push raw bytes into lock-free rings.
//! [`Ps2Devices`] drains and decodes them when the event system samples.

pub mod ps2_keyboard;
pub mod ps2_mouse;
pub mod ring;
pub mod timer;

pub use ps2_keyboard::{enqueue_scancode, ScancodeDecoder};
pub use ps2_mouse::{enqueue_mouse_byte, MouseDecoder, MousePacket, MouseState};
pub use ring::ByteRing;

use crate::devices::input::events::{KeyCode, Modifiers};
use crate::devices::input::source::{InputDevices, MouseSnapshot};

/// The PS/2 keyboard and mouse plus the system timer, as one input source.
pub struct Ps2Devices {
    scancodes: &'static ByteRing<{ ps2_keyboard::RING_SIZE }>,
    mouse_bytes: &'static ByteRing<{ ps2_mouse::RING_SIZE }>,
    keyboard: ScancodeDecoder,
    decoder: MouseDecoder,
    pointer: MouseState,
}

impl Ps2Devices {
    /// Read from the global IRQ rings; the pointer starts centred.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rings(&ps2_keyboard::SCANCODES, &ps2_mouse::MOUSE_BYTES, width, height)
    }

    pub fn with_rings(
        scancodes: &'static ByteRing<{ ps2_keyboard::RING_SIZE }>,
        mouse_bytes: &'static ByteRing<{ ps2_mouse::RING_SIZE }>,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            scancodes,
            mouse_bytes,
            keyboard: ScancodeDecoder::new(),
            decoder: MouseDecoder::new(),
            pointer: MouseState::new(width, height),
        }
    }

    fn drain_mouse(&mut self) {
        while let Some(byte) = self.mouse_bytes.pop() {
            if let Some(packet) = self.decoder.process_byte(byte) {
                self.pointer.apply(&packet);
            }
        }
    }
}

impl InputDevices for Ps2Devices {
    fn ticks(&self) -> u64 {
        timer::ticks()
    }

    fn mouse(&mut self) -> MouseSnapshot {
        self.drain_mouse();
        self.pointer.snapshot()
    }

    fn clear_mouse_changed(&mut self) {
        self.pointer.clear_changed();
    }

    fn next_key(&mut self) -> Option<KeyCode> {
        while let Some(scancode) = self.scancodes.pop() {
            if let Some(key) = self.keyboard.process_scancode(scancode) {
                return Some(key);
            }
        }
        None
    }

    fn modifiers(&self) -> Modifiers {
        self.keyboard.modifiers()
    }

    fn set_bounds(&mut self, width: usize, height: usize) {
        self.pointer.set_bounds(width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::input::events::MouseButtons;

    static KBD: ByteRing<{ ps2_keyboard::RING_SIZE }> = ByteRing::new();
    static MOUSE: ByteRing<{ ps2_mouse::RING_SIZE }> = ByteRing::new();

    #[test]
    fn drains_rings_through_decoders() {
        let mut dev = Ps2Devices::with_rings(&KBD, &MOUSE, 640, 480);
        for b in [0x2A, 0x23, 0xAA, 0x17] {
            KBD.push(b);
        }
        for b in [0x09, 4, 0] {
            MOUSE.push(b);
        }

        let snap = dev.mouse();
        assert_eq!((snap.x, snap.y, snap.dx), (324, 240, 4));
        assert_eq!(snap.buttons, MouseButtons::LEFT);
        dev.clear_mouse_changed();
        assert_eq!(dev.mouse().dx, 0);

        assert_eq!(dev.next_key(), Some(KeyCode(b'H' as u16)));
        assert_eq!(dev.next_key(), Some(KeyCode(b'i' as u16)));
        assert_eq!(dev.next_key(), None);
        assert!(dev.modifiers().is_empty());
    }
}
