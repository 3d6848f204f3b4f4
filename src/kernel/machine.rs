//! Machine services the terminal commands and visual apps rely on.
//!
//! Routing them through a trait keeps the command layer free of port I/O,
//! so it runs unchanged against a fake in host tests.

use crate::devices::drivers::speaker;
use crate::interrupts::timer;
use crate::kernel::power;
use crate::memory::{allocators::HeapStats, ALLOCATOR};

pub trait Machine {
    /// Milliseconds since the timer started.
    fn uptime_ms(&self) -> u64;

    fn sleep_ms(&mut self, ms: u64);

    fn beep(&mut self, frequency: u32, duration_ms: u64);

    /// Does not return on hardware.
    fn shutdown(&mut self);

    fn heap_stats(&self) -> Option<HeapStats> {
        None
    }
}

/// The real machine.
pub struct Hardware;

impl Machine for Hardware {
    fn uptime_ms(&self) -> u64 {
        timer::uptime_ms()
    }

    fn sleep_ms(&mut self, ms: u64) {
        timer::sleep_ms(ms);
    }

    fn beep(&mut self, frequency: u32, duration_ms: u64) {
        speaker::beep(frequency, duration_ms);
    }

    fn shutdown(&mut self) {
        power::shutdown()
    }

    fn heap_stats(&self) -> Option<HeapStats> {
        ALLOCATOR.stats()
    }
}
