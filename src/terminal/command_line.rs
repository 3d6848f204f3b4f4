//! Editable command line on the bottom row.
use crate::config::{COMMAND_LINE_CAPACITY, SCREEN_WIDTH};
use crate::devices::framebuffer::{ColorCode, TextScreen};

pub const PROMPT: u8 = b'>';
const PROMPT_WIDTH: usize = 1;

pub struct CommandLine {
    buf: [u8; COMMAND_LINE_CAPACITY],
    /// Next write position; never below `PROMPT_WIDTH`.
    cursor: usize,
}

impl CommandLine {
    pub const fn new() -> Self {
        let mut buf = [b' '; COMMAND_LINE_CAPACITY];
        buf[0] = PROMPT;
        Self {
            buf,
            cursor: PROMPT_WIDTH,
        }
    }

    /// Appends a printable ASCII character. Returns false when full or the
    /// character cannot be shown.
    pub fn insert(&mut self, ch: char) -> bool {
        if self.cursor >= COMMAND_LINE_CAPACITY || !(ch.is_ascii_graphic() || ch == ' ') {
            return false;
        }
        self.buf[self.cursor] = ch as u8;
        self.cursor += 1;
        true
    }

    /// Removes the last character; the prompt cannot be erased.
    pub fn backspace(&mut self) -> bool {
        if self.cursor <= PROMPT_WIDTH {
            return false;
        }
        self.cursor -= 1;
        self.buf[self.cursor] = b' ';
        true
    }

    /// Typed text, without the prompt.
    pub fn input(&self) -> &str {
        core::str::from_utf8(&self.buf[PROMPT_WIDTH..self.cursor]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cursor - PROMPT_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Draws the line on `row`. When the text is wider than the screen the
    /// prompt stays in column 0 and the tail of the input follows it.
    pub fn render(&self, screen: &mut dyn TextScreen, row: usize, color: ColorCode) {
        let mut visible = [b' '; SCREEN_WIDTH];
        let width = screen.width().min(SCREEN_WIDTH);
        if self.cursor <= width {
            visible[..width].copy_from_slice(&self.buf[..width]);
        } else {
            visible[0] = PROMPT;
            let start = self.cursor - (width - PROMPT_WIDTH);
            visible[PROMPT_WIDTH..width].copy_from_slice(&self.buf[start..self.cursor]);
        }
        screen.write_row(&visible[..width], color, row);
    }
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::new()
    }
}
