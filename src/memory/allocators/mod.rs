//! # Memory Allocators
//!
//! ### FreeListHeap
//! - Every block carries a 16-byte header (next, size, flags, magic)
//! - Free blocks form a singly linked list sorted by address
//! - First-fit allocation; a block is split only when the remainder can
//!   hold a header plus `MIN_DATA_SIZE` bytes
//! - Freeing coalesces with both address neighbours, so no two free
//!   blocks are ever adjacent
//!
//! The heap works on offsets into a borrowed arena, which makes it usable
//! both as the kernel's global allocator and on a plain buffer in tests.

mod core;
pub mod free_list;

pub use self::core::{align_up, AllocError};
pub use free_list::{FreeBlock, FreeListHeap, HeapStats, BLOCK_MAGIC, HEADER_SIZE, MIN_DATA_SIZE};
