//! The seam between the event system and the input drivers.
//!
//! Drivers fill their state from interrupt handlers; the event system only
//! ever samples it, synchronously, from the run loop.

use super::events::{KeyCode, Modifiers, MouseButtons};

/// Aggregate pointer state since the last `clear_mouse_changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseSnapshot {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    pub buttons: MouseButtons,
    pub moved: bool,
}

pub trait InputDevices {
    /// Monotonic timer ticks.
    fn ticks(&self) -> u64;

    fn mouse(&mut self) -> MouseSnapshot;

    /// Reset the accumulated delta and the moved flag after a sample.
    fn clear_mouse_changed(&mut self);

    /// Next decoded key from the keyboard FIFO.
    fn next_key(&mut self) -> Option<KeyCode>;

    fn modifiers(&self) -> Modifiers;

    /// The screen changed size; pointer clamping should follow.
    fn set_bounds(&mut self, _width: usize, _height: usize) {}
}
