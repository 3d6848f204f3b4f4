//! # Framebuffer Graphics Module
//!
//! The bootloader hands over a linear pixel framebuffer. The kernel draws a
//! fixed 80x25 grid of character cells on it, each cell a `FONT_10X20`
//! glyph, centred on the screen.
//!
//! - `framebuffer`: `FramebufferWriter`, an embedded-graphics `DrawTarget`
//! - `color`: 16-entry text-mode palette and per-cell `ColorCode`
//! - `screen`: the `TextScreen` cell interface and its framebuffer backing

pub mod color;
pub mod framebuffer;
pub mod screen;

pub use color::{Color, ColorCode};
pub use screen::{FramebufferScreen, TextScreen};
