//! Device Drivers
//!
//! - PS/2 Keyboard (IRQ1)
//! - PC speaker (PIT channel 2)

pub mod ps2_keyboard;
pub mod speaker;

pub use ps2_keyboard::{dequeue_key, DecoderState, ScancodeDecoder, KEY_QUEUE};
