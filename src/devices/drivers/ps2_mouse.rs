//! PS/2 Mouse Driver
//!
//! Handles IRQ12 and decodes 3-byte packets into relative movement and
//! button state, then folds packets into an absolute, screen-clamped
//! pointer position.
//!
//! # Architecture
//! - [`MOUSE_BYTES`] ring filled by the IRQ12 handler
//! - [`MouseDecoder`] turns byte triples into [`MousePacket`]s
//! - [`MouseState`] accumulates packets between samples
//!
//! # Usage
//! ```ignore
//! // In IRQ12 handler:
//! ps2_mouse::handle_interrupt();
//!
//! // In the run loop:
//! while let Some(byte) = MOUSE_BYTES.pop() {
//!     if let Some(packet) = decoder.process_byte(byte) {
//!         state.apply(&packet);
//!     }
//! }
//! ```

use super::ring::ByteRing;
use crate::devices::input::events::MouseButtons;
use crate::devices::input::source::MouseSnapshot;

// =============================================================================
// RING BUFFER FOR RAW MOUSE BYTES
// =============================================================================

pub const RING_SIZE: usize = 256;

pub static MOUSE_BYTES: ByteRing<RING_SIZE> = ByteRing::new();

#[inline]
pub fn enqueue_mouse_byte(byte: u8) {
    MOUSE_BYTES.push(byte);
}

// =============================================================================
// PACKET DECODER
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MousePacket {
    pub dx: i16,
    /// Screen orientation: positive is down.
    pub dy: i16,
    pub buttons: MouseButtons,
}

/// Standard PS/2 mice send 3-byte packets:
/// - Byte 0: status (buttons, always-one bit 3, sign bits, overflow bits)
/// - Byte 1: X movement
/// - Byte 2: Y movement
pub struct MouseDecoder {
    buffer: [u8; 3],
    index: usize,
}

impl Default for MouseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseDecoder {
    pub const fn new() -> Self {
        Self {
            buffer: [0; 3],
            index: 0,
        }
    }

    pub fn process_byte(&mut self, byte: u8) -> Option<MousePacket> {
        // bit 3 of the status byte is always set; anything else means we lost sync
        if self.index == 0 && byte & 0x08 == 0 {
            return None;
        }

        self.buffer[self.index] = byte;
        self.index += 1;

        if self.index == 3 {
            self.index = 0;
            Some(self.decode())
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    fn decode(&self) -> MousePacket {
        let status = self.buffer[0];
        let axis = |raw: u8, sign: u8, overflow: u8| -> i16 {
            let negative = status & sign != 0;
            if status & overflow != 0 {
                if negative { -256 } else { 255 }
            } else if negative {
                raw as i16 - 256
            } else {
                raw as i16
            }
        };

        MousePacket {
            dx: axis(self.buffer[1], 0x10, 0x40),
            // device reports up as positive
            dy: -axis(self.buffer[2], 0x20, 0x80),
            buttons: MouseButtons::from_bits_truncate(status & 0x07),
        }
    }
}

// =============================================================================
// POINTER STATE
// =============================================================================

/// Absolute pointer position plus the movement accumulated since the last
/// sample.
#[derive(Debug, Clone, Copy)]
pub struct MouseState {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    buttons: MouseButtons,
    moved: bool,
    width: i32,
    height: i32,
}

impl MouseState {
    /// Start centred on a `width` x `height` screen.
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1) as i32, height.max(1) as i32);
        Self {
            x: width / 2,
            y: height / 2,
            dx: 0,
            dy: 0,
            buttons: MouseButtons::empty(),
            moved: false,
            width,
            height,
        }
    }

    pub fn set_bounds(&mut self, width: usize, height: usize) {
        self.width = width.max(1) as i32;
        self.height = height.max(1) as i32;
        self.x = self.x.clamp(0, self.width - 1);
        self.y = self.y.clamp(0, self.height - 1);
    }

    /// Fold one packet in. The reported delta is the distance actually
    /// travelled after clamping to the screen.
    pub fn apply(&mut self, packet: &MousePacket) {
        let nx = (self.x + packet.dx as i32).clamp(0, self.width - 1);
        let ny = (self.y + packet.dy as i32).clamp(0, self.height - 1);
        if nx != self.x || ny != self.y {
            self.dx += nx - self.x;
            self.dy += ny - self.y;
            self.x = nx;
            self.y = ny;
            self.moved = true;
        }
        self.buttons = packet.buttons;
    }

    pub fn snapshot(&self) -> MouseSnapshot {
        MouseSnapshot {
            x: self.x,
            y: self.y,
            dx: self.dx,
            dy: self.dy,
            buttons: self.buttons,
            moved: self.moved,
        }
    }

    pub fn clear_changed(&mut self) {
        self.dx = 0;
        self.dy = 0;
        self.moved = false;
    }
}

// =============================================================================
// INITIALIZATION
// =============================================================================

#[cfg(target_arch = "x86_64")]
mod controller {
    use x86_64::instructions::port::Port;

    use crate::error::GfxError;

    const DATA: u16 = 0x60;
    const STATUS: u16 = 0x64;

    fn wait(mask: u8, set: bool) -> Result<(), GfxError> {
        for _ in 0..100_000 {
            let status = unsafe { Port::<u8>::new(STATUS).read() };
            if (status & mask != 0) == set {
                return Ok(());
            }
        }
        Err(GfxError::CapabilityNotPresent)
    }

    fn command(cmd: u8) -> Result<(), GfxError> {
        wait(0x02, false)?;
        unsafe { Port::<u8>::new(STATUS).write(cmd) };
        Ok(())
    }

    fn write(data: u8) -> Result<(), GfxError> {
        wait(0x02, false)?;
        unsafe { Port::<u8>::new(DATA).write(data) };
        Ok(())
    }

    fn read() -> Result<u8, GfxError> {
        wait(0x01, true)?;
        Ok(unsafe { Port::<u8>::new(DATA).read() })
    }

    fn mouse_command(cmd: u8) -> Result<(), GfxError> {
        command(0xD4)?;
        write(cmd)?;
        match read()? {
            0xFA => Ok(()),
            _ => Err(GfxError::CapabilityNotPresent),
        }
    }

    pub fn init() -> Result<(), GfxError> {
        // enable the auxiliary port
        command(0xA8)?;
        command(0x20)?;
        let config = read()?;
        // IRQ12 on, aux clock on
        command(0x60)?;
        write((config | 0x02) & !0x20)?;
        mouse_command(0xF6)?;
        mouse_command(0xF4)?;
        Ok(())
    }

    pub fn read_data() -> u8 {
        unsafe { Port::<u8>::new(DATA).read() }
    }
}

/// Enable the auxiliary port and start streaming packets.
#[cfg(target_arch = "x86_64")]
pub fn init() -> Result<(), crate::error::GfxError> {
    controller::init().map_err(|e| {
        log::warn!("ps/2 mouse: no response from controller");
        e
    })?;
    MOUSE_BYTES.clear();
    log::info!("ps/2 mouse: streaming");
    Ok(())
}

/// IRQ12 body.
#[cfg(target_arch = "x86_64")]
pub fn handle_interrupt() {
    enqueue_mouse_byte(controller::read_data());
}
