//! # cellkernel
//!
//! A small x86_64 kernel: interrupt-driven keyboard input, a scrollback
//! terminal with a command registry, a first-fit heap and a mode dispatcher
//! that hands the screen to real-time "visual" applications.
//!
//! ## Event flow
//!
//! ```text
//! IRQ1 ──▶ interrupts::dispatch ──▶ ScancodeDecoder ──▶ KEY_QUEUE
//!                                                         │
//!                       main loop (drains the queue) ◀────┘
//!                                   │
//!                                   ▼
//!                           ModeDispatcher
//!                         ┌─────────┴─────────┐
//!                         ▼                   ▼
//!                   TerminalApp          VisualApp (snake, ...)
//! ```
//!
//! The library is `no_std` on the target; under `cfg(test)` it links `std`
//! so the hardware-independent parts run as ordinary host unit tests.

#![cfg_attr(not(test), no_std)]
#![feature(abi_x86_interrupt)]

extern crate alloc;

pub mod serial;

pub mod app;
pub mod apps;
pub mod cmd_executor;
pub mod config;
pub mod data_structures;
pub mod devices;
pub mod interrupts;
pub mod kernel;
pub mod memory;
pub mod ports;
pub mod terminal;
pub mod test_env;

#[cfg(test)]
pub(crate) mod testing;
