//! # Test Environment
//!
//! Checks the `selftest` command runs on the live kernel. Each check builds
//! its own instance of the structure under test (a scratch heap carved from
//! the kernel heap, a private key queue, a fresh decoder) so running them
//! never disturbs the global state.
//!
//! ```text
//! > selftest
//! [ok] heap first-fit and coalescing
//! [ok] key queue overwrite
//! [ok] scancode decoder
//! 3/3 checks passed
//! ```

use alloc::format;
use alloc::vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use crate::cmd_executor::Shell;
use crate::data_structures::KeyQueue;
use crate::devices::drivers::ScancodeDecoder;
use crate::devices::input::KeyCode;
use crate::memory::allocators::{AllocError, FreeListHeap};
use crate::serial_println;

static TEST_EXECUTION_COUNT: AtomicUsize = AtomicUsize::new(0);

type Check = fn() -> Result<(), &'static str>;

const CHECKS: [(&str, Check); 3] = [
    ("heap first-fit and coalescing", check_heap),
    ("key queue overwrite", check_key_queue),
    ("scancode decoder", check_decoder),
];

/// Runs every check, reporting through `shell`. Returns the failure count.
pub fn run_all(shell: &mut Shell<'_>) -> usize {
    let run = TEST_EXECUTION_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    serial_println!("[selftest] run {}", run);

    let mut failures = 0;
    for (name, check) in CHECKS {
        match check() {
            Ok(()) => shell.write_line(&format!("[ok] {}", name)),
            Err(reason) => {
                failures += 1;
                serial_println!("[selftest] {} failed: {}", name, reason);
                shell.write_line(&format!("[FAIL] {}: {}", name, reason));
            }
        }
    }
    shell.write_line(&format!("{}/{} checks passed", CHECKS.len() - failures, CHECKS.len()));
    failures
}

fn check_heap() -> Result<(), &'static str> {
    let mut arena = vec![0u8; 2048];
    let mut heap = FreeListHeap::new();
    heap.init(&mut arena).map_err(|_| "init failed")?;
    let initial = heap.stats();

    let a = heap.allocate(100).map_err(|_| "first allocation failed")?;
    let b = heap.allocate(200).map_err(|_| "second allocation failed")?;
    let c = heap.allocate(300).map_err(|_| "third allocation failed")?;
    if !(a < b && b < c) {
        return Err("blocks not handed out in address order");
    }

    heap.free(b).map_err(|_| "free of middle block failed")?;
    if heap.allocate(150) != Ok(b) {
        return Err("first fit did not reuse the freed hole");
    }
    heap.free(b).map_err(|_| "re-free failed")?;
    if heap.free(b) != Err(AllocError::DoubleFree) {
        return Err("double free not detected");
    }
    heap.free(a).map_err(|_| "free of first block failed")?;
    heap.free(c).map_err(|_| "free of last block failed")?;

    if heap.stats() != initial {
        return Err("heap not restored after freeing everything");
    }
    Ok(())
}

fn check_key_queue() -> Result<(), &'static str> {
    let queue: KeyQueue<4> = KeyQueue::new();
    if queue.dequeue().is_some() {
        return Err("new queue not empty");
    }
    for n in 1..=5 {
        queue.enqueue(KeyCode::from_raw(n));
    }
    if queue.dequeue() != Some(KeyCode::from_raw(2)) {
        return Err("oldest event not dropped on overflow");
    }
    let rest: [Option<KeyCode>; 4] = core::array::from_fn(|_| queue.dequeue());
    let expected = [3, 4, 5].map(|n| Some(KeyCode::from_raw(n)));
    if rest[..3] != expected || rest[3].is_some() {
        return Err("events out of order");
    }
    Ok(())
}

fn check_decoder() -> Result<(), &'static str> {
    let mut decoder = ScancodeDecoder::new();
    if decoder.process_scancode(0x1E) != Some(KeyCode::A) {
        return Err("make code 0x1E is not 'a'");
    }
    if decoder.process_scancode(0x9E).is_some() {
        return Err("release produced an event");
    }
    if decoder.process_scancode(0xE0).is_some()
        || decoder.process_scancode(0x48) != Some(KeyCode::ARROW_UP)
    {
        return Err("extended up arrow not decoded");
    }
    Ok(())
}
