//! # Data Structures Module
//!
//! - `key_queue`: lock-free single-producer/single-consumer ring that
//!   carries key events from the keyboard interrupt to the main loop

pub mod key_queue;

pub use key_queue::KeyQueue;
