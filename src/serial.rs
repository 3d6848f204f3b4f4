//! Serial log output on COM1.
//!
//! Every subsystem logs through `serial_println!` with a short tag
//! (`[heap]`, `[idt]`, `[mode]`, ...). Host test builds swallow the output
//! so nothing touches I/O ports outside the target.

use core::fmt;
use spin::Mutex;
use uart_16550::SerialPort;

use crate::ports;

pub static SERIAL: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(ports::COM1) });

pub fn init() {
    SERIAL.lock().init();
}

#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => ($crate::serial::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($($arg:tt)*) => ($crate::serial_print!("{}\n", format_args!($($arg)*)));
}

#[doc(hidden)]
#[cfg(not(test))]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        let _ = SERIAL.lock().write_fmt(args);
    });
}

#[doc(hidden)]
#[cfg(test)]
pub fn _print(_args: fmt::Arguments) {}

/// Used on fault and panic paths: never waits for the lock, the interrupted
/// code may be holding it.
pub fn emergency_print(args: fmt::Arguments) {
    use core::fmt::Write;

    if let Some(mut serial) = SERIAL.try_lock() {
        let _ = serial.write_fmt(args);
        let _ = serial.write_str("\n");
    }
}
