//! # Input Device Module
//!
//! ```text
//! ┌──────────────┐  scancodes  ┌──────────────────┐  KeyCode  ┌───────────┐
//! │  PS/2 IRQ1   │────────────▶│ ScancodeDecoder  │──────────▶│ KEY_QUEUE │
//! └──────────────┘             └──────────────────┘           └───────────┘
//! ```
//!
//! A [`KeyCode`] is the set-1 make code of a pressed key. Extended keys
//! (prefixed by `0xE0`) keep their make code with the top bit set, so the
//! arrows land on 0xC8/0xD0/0xCB/0xCD and never collide with plain keys.

pub mod events;

pub use events::*;
