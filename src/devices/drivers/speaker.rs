//! PC speaker on PIT channel 2.
use crate::interrupts::timer;
use crate::ports;

/// The speaker path divides the nominal 1.19318 MHz clock.
const SPEAKER_INPUT_HZ: u32 = 1_193_180;
/// Channel 2, lobyte/hibyte, mode 3 (square wave).
const PIT_MODE_SQUARE_WAVE: u8 = 0xB6;
/// Timer 2 gate and speaker data enable on port 0x61.
const SPEAKER_GATE_BITS: u8 = 0x03;

pub const fn divisor_for(frequency: u32) -> u16 {
    if frequency == 0 {
        return u16::MAX;
    }
    let divisor = SPEAKER_INPUT_HZ / frequency;
    if divisor < 1 {
        1
    } else if divisor > u16::MAX as u32 {
        u16::MAX
    } else {
        divisor as u16
    }
}

/// Starts a tone. A zero frequency silences the speaker instead.
pub fn play(frequency: u32) {
    if frequency == 0 {
        stop();
        return;
    }
    let divisor = divisor_for(frequency);
    unsafe {
        ports::write(ports::PIT_COMMAND, PIT_MODE_SQUARE_WAVE);
        ports::write(ports::PIT_CHANNEL2, (divisor & 0xFF) as u8);
        ports::io_wait();
        ports::write(ports::PIT_CHANNEL2, (divisor >> 8) as u8);

        let gate: u8 = ports::read(ports::SPEAKER_CONTROL);
        if gate & SPEAKER_GATE_BITS != SPEAKER_GATE_BITS {
            ports::write(ports::SPEAKER_CONTROL, gate | SPEAKER_GATE_BITS);
        }
    }
}

pub fn stop() {
    unsafe {
        let gate: u8 = ports::read(ports::SPEAKER_CONTROL);
        ports::write(ports::SPEAKER_CONTROL, gate & !SPEAKER_GATE_BITS);
    }
}

/// Blocking tone: plays, sleeps on the tick counter, stops.
pub fn beep(frequency: u32, duration_ms: u64) {
    play(frequency);
    timer::sleep_ms(duration_ms);
    stop();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_divisor() {
        assert_eq!(divisor_for(1000), 1193);
        assert_eq!(divisor_for(440), 2711);
        assert_eq!(divisor_for(1), u16::MAX);
        assert_eq!(divisor_for(0), u16::MAX);
        assert_eq!(divisor_for(u32::MAX), 1);
    }
}
