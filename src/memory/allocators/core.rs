//! Core utilities and error types for allocators
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Zero-sized request, or an arena that cannot hold one header.
    InvalidSize,
    Uninitialized,
    AlreadyInitialized,
    OutOfMemory,
    /// Offset outside the arena.
    InvalidAddress,
    /// No block header at this offset.
    BadMagic,
    DoubleFree,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidSize => write!(f, "invalid size"),
            AllocError::Uninitialized => write!(f, "heap not initialized"),
            AllocError::AlreadyInitialized => write!(f, "heap already initialized"),
            AllocError::OutOfMemory => write!(f, "out of memory"),
            AllocError::InvalidAddress => write!(f, "address outside the heap"),
            AllocError::BadMagic => write!(f, "not a heap block"),
            AllocError::DoubleFree => write!(f, "block already free"),
        }
    }
}

#[inline]
pub const fn align_up(addr: usize, align: usize) -> usize {
    (addr + align - 1) & !(align - 1)
}
