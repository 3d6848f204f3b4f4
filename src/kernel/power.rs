//! Halting and power-off.
use x86_64::instructions::{hlt, interrupts};

use crate::devices::framebuffer::screen::emergency_write_line;
use crate::{ports, serial_println};

/// Disables interrupts and halts. NMIs can still wake the CPU, hence the
/// loop.
pub fn halt_forever() -> ! {
    loop {
        interrupts::disable();
        hlt();
    }
}

/// Asks QEMU to exit through its debug-exit device. On real hardware, or a
/// QEMU started without the device, the write is ignored and the machine
/// halts with an error on screen.
pub fn shutdown() -> ! {
    serial_println!("[power] requesting shutdown");
    unsafe { ports::write::<u8>(ports::QEMU_DEBUG_EXIT, 0) };

    serial_println!("[power] shutdown signal ignored, halting");
    emergency_write_line("Error: Shutdown signal sent, should have exited.", 0);
    halt_forever()
}
