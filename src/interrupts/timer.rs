//! Programmable interval timer, channel 0.
//!
//! The tick handler only bumps a counter; every time query is derived from
//! it with exact integer math.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::interrupts::pic::{self, InterruptIndex};
use crate::ports;

pub const PIT_INPUT_HZ: u32 = 1_193_182;
/// Channel 0, lobyte/hibyte, mode 2 (rate generator).
const PIT_MODE_RATE_GENERATOR: u8 = 0x34;

static TICKS: AtomicU64 = AtomicU64::new(0);
/// Achieved rate; zero until `init` has run.
static FREQUENCY_HZ: AtomicU32 = AtomicU32::new(0);

/// Reload value for a requested rate, rounded to nearest and clamped to
/// what the 16-bit counter can hold.
pub const fn divisor_for(hz: u32) -> u16 {
    if hz == 0 {
        return u16::MAX;
    }
    let divisor = (PIT_INPUT_HZ + hz / 2) / hz;
    if divisor < 1 {
        1
    } else if divisor > u16::MAX as u32 {
        u16::MAX
    } else {
        divisor as u16
    }
}

/// Rate the PIT actually runs at for a given reload value.
pub const fn achieved_hz(divisor: u16) -> u32 {
    let hz = PIT_INPUT_HZ / divisor as u32;
    if hz == 0 {
        1
    } else {
        hz
    }
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Ticks needed to cover at least `ms` milliseconds.
pub const fn ticks_for_ms(ms: u64, hz: u32) -> u64 {
    if ms == 0 || hz == 0 {
        return 0;
    }
    let g = gcd(hz as u64, 1000);
    let num = hz as u64 / g;
    let den = 1000 / g;
    ms.saturating_mul(num).div_ceil(den)
}

/// Whole milliseconds elapsed after `ticks` ticks.
pub const fn ms_for_ticks(ticks: u64, hz: u32) -> u64 {
    if hz == 0 {
        return 0;
    }
    let g = gcd(hz as u64, 1000);
    let num = 1000 / g;
    let den = hz as u64 / g;
    ticks.saturating_mul(num) / den
}

/// Tick count at which a sleep of `ms` started at `now` ends. Saturates
/// instead of wrapping, so absurd requests simply never expire.
pub const fn deadline_after(now: u64, ms: u64, hz: u32) -> u64 {
    now.saturating_add(ticks_for_ms(ms, hz))
}

/// Programs channel 0 and opens IRQ0. Returns the achieved rate.
pub fn init(requested_hz: u32) -> u32 {
    let divisor = divisor_for(requested_hz);
    unsafe {
        ports::write(ports::PIT_COMMAND, PIT_MODE_RATE_GENERATOR);
        ports::write(ports::PIT_CHANNEL0, (divisor & 0xFF) as u8);
        ports::io_wait();
        ports::write(ports::PIT_CHANNEL0, (divisor >> 8) as u8);
    }
    let hz = achieved_hz(divisor);
    FREQUENCY_HZ.store(hz, Ordering::Release);
    pic::unmask(InterruptIndex::Timer.irq());
    hz
}

pub(crate) fn on_tick() {
    TICKS.fetch_add(1, Ordering::Relaxed);
}

pub fn ticks() -> u64 {
    TICKS.load(Ordering::Relaxed)
}

pub fn frequency() -> u32 {
    FREQUENCY_HZ.load(Ordering::Acquire)
}

pub fn uptime_ms() -> u64 {
    ms_for_ticks(ticks(), frequency())
}

/// Halts until at least `ms` milliseconds have passed. Returns at once if
/// the timer has not been started.
pub fn sleep_ms(ms: u64) {
    let hz = frequency();
    if hz == 0 {
        return;
    }
    let deadline = deadline_after(ticks(), ms, hz);
    while ticks() < deadline {
        x86_64::instructions::interrupts::enable_and_hlt();
    }
}
