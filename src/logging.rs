//! `log` backend writing to COM1.

use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;
use uart_16550::SerialPort;

use crate::error::GfxError;

pub static SERIAL: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(0x3F8) });

pub struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut serial = SERIAL.lock();
        let _ = writeln!(serial, "[{:<5}] {}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {}
}

/// Initialise the UART and install the serial logger. Fails if another
/// logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), GfxError> {
    SERIAL.lock().init();
    log::set_logger(&LOGGER).map_err(|_| GfxError::InvalidArgument)?;
    log::set_max_level(level);
    Ok(())
}
