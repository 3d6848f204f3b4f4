//! Kernel heap.
//!
//! The arena is a static buffer inside the kernel image; [`LockedHeap`]
//! wraps the free-list heap behind a spin lock and serves `alloc`.

pub mod allocators;

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::addr_of_mut;
use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::config::HEAP_SIZE;
use crate::serial_println;
use allocators::{align_up, AllocError, FreeListHeap, HeapStats};

/// Payload alignment the heap guarantees: arena base, header size and every
/// rounded request are multiples of it.
pub const HEAP_ALIGN: usize = 16;

#[repr(align(4096))]
struct HeapBuffer([u8; HEAP_SIZE]);
static mut HEAP_BUFFER: HeapBuffer = HeapBuffer([0; HEAP_SIZE]);
static HEAP_BUFFER_TAKEN: AtomicBool = AtomicBool::new(false);

#[cfg_attr(not(test), global_allocator)]
pub static ALLOCATOR: LockedHeap = LockedHeap::new();

struct HeapState {
    heap: FreeListHeap<'static>,
    base: usize,
}

pub struct LockedHeap {
    inner: Mutex<HeapState>,
}

impl LockedHeap {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(HeapState {
                heap: FreeListHeap::new(),
                base: 0,
            }),
        }
    }

    pub fn init(&self, arena: &'static mut [u8]) -> Result<(), AllocError> {
        let base = arena.as_ptr() as usize;
        if base % HEAP_ALIGN != 0 {
            return Err(AllocError::InvalidAddress);
        }
        let mut state = self.inner.lock();
        state.heap.init(arena)?;
        state.base = base;
        Ok(())
    }

    pub fn stats(&self) -> Option<HeapStats> {
        let state = self.inner.lock();
        state.heap.is_initialized().then(|| state.heap.stats())
    }
}

impl Default for LockedHeap {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl GlobalAlloc for LockedHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > HEAP_ALIGN {
            return core::ptr::null_mut();
        }
        let size = align_up(layout.size().max(1), HEAP_ALIGN);
        let mut state = self.inner.lock();
        match state.heap.allocate(size) {
            Ok(offset) => (state.base + offset) as *mut u8,
            Err(_) => core::ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        let mut state = self.inner.lock();
        let offset = (ptr as usize).wrapping_sub(state.base);
        if let Err(err) = state.heap.free(offset) {
            serial_println!("[heap] ignored free of {:p}: {}", ptr, err);
        }
    }
}

/// Hands the static arena to the global allocator. Only the first call
/// gets the buffer.
pub fn init_heap() -> Result<(), AllocError> {
    if HEAP_BUFFER_TAKEN.swap(true, Ordering::AcqRel) {
        return Err(AllocError::AlreadyInitialized);
    }
    let arena: &'static mut [u8] = unsafe { &mut (*addr_of_mut!(HEAP_BUFFER)).0 };
    let start = arena.as_ptr() as usize;
    ALLOCATOR.init(arena)?;
    serial_println!(
        "[heap] {:#x} - {:#x} ({} KiB)",
        start,
        start + HEAP_SIZE,
        HEAP_SIZE / 1024
    );
    Ok(())
}
