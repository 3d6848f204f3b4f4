//! Compile-time kernel configuration.

/// Requested PIT channel 0 rate. One tick per millisecond.
pub const TIMER_HZ: u32 = 1000;

/// Screen geometry in character cells.
pub const SCREEN_WIDTH: usize = 80;
pub const SCREEN_HEIGHT: usize = 25;

/// Key events retained between main-loop drains. Must be a power of two.
pub const KEY_QUEUE_CAPACITY: usize = 32;

/// Terminal history slots, each `SCREEN_WIDTH` cells wide.
pub const SCROLLBACK_LINES: usize = 32;
/// Rows 0..VISIBLE_ROWS show history, the row below stays blank, the last
/// row holds the command line.
pub const VISIBLE_ROWS: usize = SCREEN_HEIGHT - 2;
pub const COMMAND_ROW: usize = SCREEN_HEIGHT - 1;
pub const COMMAND_LINE_CAPACITY: usize = SCREEN_WIDTH + 64;

pub const MAX_TOKENS: usize = 8;
pub const MAX_COMMANDS: usize = 64;

/// Kernel heap arena, embedded in the kernel image.
pub const HEAP_SIZE: usize = 1024 * 1024;

pub const SNAKE_BOARD_WIDTH: i32 = 40;
pub const SNAKE_BOARD_HEIGHT: i32 = 20;
pub const SNAKE_STEP_MS: u64 = 200;

pub const DEFAULT_BEEP_HZ: u32 = 1000;
pub const DEFAULT_BEEP_MS: u64 = 200;
