//! Character-cell screen.
//!
//! Everything above the drivers draws through [`TextScreen`]: a grid of
//! `width() x height()` cells addressed by column and row, row 0 at the
//! top. [`FramebufferScreen`] renders it to the boot framebuffer; tests use
//! an in-memory grid.

use embedded_graphics::{
    mono_font::{ascii::FONT_10X20, MonoTextStyleBuilder},
    prelude::*,
    text::{Baseline, Text},
};

use super::color::ColorCode;
use super::framebuffer::{FramebufferWriter, FRAMEBUFFER};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub const CELL_WIDTH: usize = 10;
pub const CELL_HEIGHT: usize = 20;

/// Printable ASCII passes through; anything else shows as `?`.
pub const fn displayable(byte: u8) -> u8 {
    match byte {
        0x20..=0x7E => byte,
        _ => b'?',
    }
}

pub trait TextScreen {
    fn put(&mut self, ch: u8, color: ColorCode, col: usize, row: usize);

    fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    /// Writes `text` from column 0 and blanks the rest of the row.
    fn write_row(&mut self, text: &[u8], color: ColorCode, row: usize) {
        for col in 0..self.width() {
            let ch = text.get(col).copied().unwrap_or(b' ');
            self.put(ch, color, col, row);
        }
    }

    fn write_str_at(&mut self, text: &str, color: ColorCode, col: usize, row: usize) {
        for (i, byte) in text.bytes().enumerate() {
            if col + i >= self.width() {
                break;
            }
            self.put(byte, color, col + i, row);
        }
    }

    fn clear(&mut self, color: ColorCode) {
        for row in 0..self.height() {
            self.write_row(&[], color, row);
        }
    }
}

/// Pixel position of cell (0, 0): the grid is centred, or pinned to the
/// corner when the framebuffer is smaller than the grid.
fn grid_origin(fb: &FramebufferWriter) -> Point {
    let grid_w = SCREEN_WIDTH * CELL_WIDTH;
    let grid_h = SCREEN_HEIGHT * CELL_HEIGHT;
    Point::new(
        (fb.width.saturating_sub(grid_w) / 2) as i32,
        (fb.height.saturating_sub(grid_h) / 2) as i32,
    )
}

fn draw_cell(
    fb: &mut FramebufferWriter,
    origin: Point,
    ch: u8,
    color: ColorCode,
    col: usize,
    row: usize,
) {
    if col >= SCREEN_WIDTH || row >= SCREEN_HEIGHT {
        return;
    }
    let background = color.background().to_rgb888();
    let x = origin.x + (col * CELL_WIDTH) as i32;
    let y = origin.y + (row * CELL_HEIGHT) as i32;
    fb.fill_rect(x, y, CELL_WIDTH as u32, CELL_HEIGHT as u32, background);

    let glyph = displayable(ch);
    if glyph == b' ' {
        return;
    }
    let style = MonoTextStyleBuilder::new()
        .font(&FONT_10X20)
        .text_color(color.foreground().to_rgb888())
        .background_color(background)
        .build();
    let buf = [glyph];
    if let Ok(text) = core::str::from_utf8(&buf) {
        Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(fb)
            .ok();
    }
}

/// Text screen backed by the global framebuffer. Draw calls are dropped
/// if the framebuffer was never initialized.
pub struct FramebufferScreen {
    origin: Point,
}

impl FramebufferScreen {
    pub fn new() -> Option<Self> {
        let guard = FRAMEBUFFER.lock();
        let fb = guard.as_ref()?;
        Some(Self {
            origin: grid_origin(fb),
        })
    }
}

impl TextScreen for FramebufferScreen {
    fn put(&mut self, ch: u8, color: ColorCode, col: usize, row: usize) {
        if let Some(fb) = FRAMEBUFFER.lock().as_mut() {
            draw_cell(fb, self.origin, ch, color, col, row);
        }
    }

    fn write_row(&mut self, text: &[u8], color: ColorCode, row: usize) {
        if let Some(fb) = FRAMEBUFFER.lock().as_mut() {
            for col in 0..SCREEN_WIDTH {
                let ch = text.get(col).copied().unwrap_or(b' ');
                draw_cell(fb, self.origin, ch, color, col, row);
            }
        }
    }
}

/// Fault path: paints one row without waiting on the framebuffer lock.
pub fn emergency_write_line(text: &str, row: usize) {
    if let Some(mut guard) = FRAMEBUFFER.try_lock() {
        if let Some(fb) = guard.as_mut() {
            let origin = grid_origin(fb);
            let color = ColorCode::new(super::Color::White, super::Color::Red);
            let bytes = text.as_bytes();
            for col in 0..SCREEN_WIDTH {
                let ch = bytes.get(col).copied().unwrap_or(b' ');
                draw_cell(fb, origin, ch, color, col, row);
            }
        }
    }
}
