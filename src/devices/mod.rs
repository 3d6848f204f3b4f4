//! Device Subsystem
//!
//! - `drivers`: PS/2 keyboard and PC speaker
//! - `framebuffer`: character-cell screen on the linear framebuffer
//! - `input`: key codes produced by the keyboard driver

pub mod drivers;
pub mod framebuffer;
pub mod input;
