//! Error type shared by the display, window and event subsystems.
//!
//! Nothing in this crate is fatal: every failure is reported as a value and
//! the caller decides whether to retry, degrade, or ignore it.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxError {
    /// A buffer or table allocation could not be satisfied.
    ResourceExhausted,
    /// Out-of-range geometry, unknown window handle, or unsupported pixel depth.
    InvalidArgument,
    /// The window lacks the capability flag the request needs.
    CapabilityNotPresent,
    /// The bounded event queue is saturated.
    QueueFull,
    /// No usable display was handed over at startup.
    NoDisplay,
}

impl fmt::Display for GfxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GfxError::ResourceExhausted => "out of memory",
            GfxError::InvalidArgument => "invalid argument",
            GfxError::CapabilityNotPresent => "capability not present",
            GfxError::QueueFull => "event queue full",
            GfxError::NoDisplay => "no usable display",
        };
        f.write_str(msg)
    }
}

pub type GfxResult<T> = Result<T, GfxError>;
