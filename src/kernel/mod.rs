//! Kernel initialization and bootstrap module
use core::fmt;

use crate::memory::allocators::AllocError;

pub mod init;
pub mod machine;
pub mod power;
pub mod status;

pub use init::{init_display, init_kernel};
pub use machine::{Hardware, Machine};
pub use status::{register_component, update_component_status, InitStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    Heap(AllocError),
    NoFramebuffer,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Heap(err) => write!(f, "heap: {}", err),
            InitError::NoFramebuffer => write!(f, "bootloader provided no framebuffer"),
        }
    }
}
