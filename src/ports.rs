//! Port I/O.
//!
//! Thin, stateless wrappers over `x86_64`'s `Port<T>` plus the name of every
//! port the kernel touches.

use x86_64::instructions::port::{Port, PortRead, PortWrite};

pub const PIC1_COMMAND: u16 = 0x20;
pub const PIC1_DATA: u16 = 0x21;
pub const PIC2_COMMAND: u16 = 0xA0;
pub const PIC2_DATA: u16 = 0xA1;
pub const PIC_EOI: u8 = 0x20;

pub const KEYBOARD_DATA: u16 = 0x60;

pub const PIT_CHANNEL0: u16 = 0x40;
pub const PIT_CHANNEL2: u16 = 0x42;
pub const PIT_COMMAND: u16 = 0x43;
pub const SPEAKER_CONTROL: u16 = 0x61;

/// `isa-debug-exit` device configured on the QEMU command line.
pub const QEMU_DEBUG_EXIT: u16 = 0x501;

pub const COM1: u16 = 0x3F8;

/// Unused POST diagnostic port; writing to it takes about a microsecond.
pub const POST_DELAY: u16 = 0x80;

/// Reads one byte or word from `port`.
///
/// # Safety
/// Port reads can have side effects on the device (e.g. popping the
/// keyboard controller's output buffer).
#[inline]
pub unsafe fn read<T: PortRead>(port: u16) -> T {
    Port::<T>::new(port).read()
}

/// Writes one byte or word to `port`.
///
/// # Safety
/// The caller must know what the device does with the value.
#[inline]
pub unsafe fn write<T: PortWrite>(port: u16, value: T) {
    Port::<T>::new(port).write(value)
}

/// Gives slow ISA devices time to latch the previous write.
#[inline]
pub fn io_wait() {
    unsafe { write::<u8>(POST_DELAY, 0) }
}
