//! Ring of fixed-width history lines.
//!
//! Each written line starts in a fresh slot whose column 0 holds
//! [`COMMAND_MARKER`]; text that does not fit in the remaining columns
//! continues in further slots with a blank column 0. Writing always snaps
//! the view back to the newest line.

use crate::config::{SCREEN_WIDTH, SCROLLBACK_LINES, VISIBLE_ROWS};
use crate::devices::framebuffer::screen::displayable;
use crate::devices::framebuffer::{ColorCode, TextScreen};

pub const COMMAND_MARKER: u8 = b'>';
const TEXT_COLUMNS: usize = SCREEN_WIDTH - 1;

pub struct Scrollback {
    lines: [[u8; SCREEN_WIDTH]; SCROLLBACK_LINES],
    /// Slot of the newest line.
    head: usize,
    /// How many lines the view is shifted back from the newest.
    offset: usize,
    color: ColorCode,
}

impl Scrollback {
    pub const fn new() -> Self {
        Self {
            lines: [[b' '; SCREEN_WIDTH]; SCROLLBACK_LINES],
            head: 0,
            offset: 0,
            color: ColorCode::DEFAULT,
        }
    }

    pub const fn max_offset() -> usize {
        SCROLLBACK_LINES - VISIBLE_ROWS
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Appends `text`. Only the first slot carries the command marker;
    /// slots opened by `\n` or by wrapping start with a blank.
    pub fn write_line(&mut self, text: &str) {
        let mut marker = COMMAND_MARKER;
        for segment in text.split('\n') {
            self.write_segment(segment.as_bytes(), marker);
            marker = b' ';
        }
        self.offset = 0;
    }

    fn write_segment(&mut self, text: &[u8], marker: u8) {
        self.advance(marker);
        let mut col = 1;
        for &byte in text {
            if col == SCREEN_WIDTH {
                self.advance(b' ');
                col = 1;
            }
            self.lines[self.head][col] = displayable(byte);
            col += 1;
        }
    }

    fn advance(&mut self, marker: u8) {
        self.head = (self.head + 1) % SCROLLBACK_LINES;
        let slot = &mut self.lines[self.head];
        *slot = [b' '; SCREEN_WIDTH];
        slot[0] = marker;
    }

    /// Slot `age` lines back from the newest (0 = newest).
    pub fn line(&self, age: usize) -> Option<&[u8; SCREEN_WIDTH]> {
        (age < SCROLLBACK_LINES)
            .then(|| &self.lines[(self.head + SCROLLBACK_LINES - age) % SCROLLBACK_LINES])
    }

    /// Slot contents as text with trailing blanks removed.
    pub fn line_text(&self, age: usize) -> &str {
        self.line(age)
            .and_then(|line| core::str::from_utf8(line).ok())
            .map_or("", str::trim_end)
    }

    /// Moves the view by `delta` lines (positive = older), clamped to the
    /// stored history. Returns whether the view changed.
    pub fn scroll(&mut self, delta: isize) -> bool {
        let target = (self.offset as isize + delta).clamp(0, Self::max_offset() as isize) as usize;
        let changed = target != self.offset;
        self.offset = target;
        changed
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Draws the visible window into rows `0..VISIBLE_ROWS`, newest at the
    /// bottom.
    pub fn render(&self, screen: &mut dyn TextScreen) {
        for row in 0..VISIBLE_ROWS {
            let age = self.offset + (VISIBLE_ROWS - 1 - row);
            if let Some(line) = self.line(age) {
                screen.write_row(line, self.color, row);
            }
        }
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new()
    }
}
