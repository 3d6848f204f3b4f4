//! Host-side stand-ins for the screen and the machine.
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::devices::framebuffer::{ColorCode, TextScreen};
use crate::kernel::Machine;
use crate::memory::allocators::HeapStats;

pub struct MemoryScreen {
    cells: [[(u8, ColorCode); SCREEN_WIDTH]; SCREEN_HEIGHT],
    pub puts: usize,
}

impl MemoryScreen {
    pub fn new() -> Self {
        Self {
            cells: [[(b' ', ColorCode::DEFAULT); SCREEN_WIDTH]; SCREEN_HEIGHT],
            puts: 0,
        }
    }

    pub fn cell(&self, col: usize, row: usize) -> u8 {
        self.cells[row][col].0
    }

    pub fn color(&self, col: usize, row: usize) -> ColorCode {
        self.cells[row][col].1
    }

    /// Row contents with trailing blanks removed.
    pub fn row_text(&self, row: usize) -> String {
        let text: String = self.cells[row].iter().map(|&(ch, _)| ch as char).collect();
        text.trim_end().to_string()
    }

    pub fn contains(&self, needle: &str) -> bool {
        (0..SCREEN_HEIGHT).any(|row| self.row_text(row).contains(needle))
    }
}

impl TextScreen for MemoryScreen {
    fn put(&mut self, ch: u8, color: ColorCode, col: usize, row: usize) {
        if col < SCREEN_WIDTH && row < SCREEN_HEIGHT {
            self.cells[row][col] = (ch, color);
            self.puts += 1;
        }
    }
}

#[derive(Default)]
pub struct FakeMachine {
    pub now_ms: u64,
    pub sleeps: Vec<u64>,
    pub beeps: Vec<(u32, u64)>,
    pub shutdowns: usize,
    pub stats: Option<HeapStats>,
}

impl Machine for FakeMachine {
    fn uptime_ms(&self) -> u64 {
        self.now_ms
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
        self.now_ms += ms;
    }

    fn beep(&mut self, frequency: u32, duration_ms: u64) {
        self.beeps.push((frequency, duration_ms));
        self.now_ms += duration_ms;
    }

    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }

    fn heap_stats(&self) -> Option<HeapStats> {
        self.stats
    }
}
