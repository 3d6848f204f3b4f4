//! Fixed-capacity key event ring.
//!
//! The interrupt handler is the only writer and the main loop the only
//! reader; no locks are taken on either side. Both cursors are free-running
//! counters (slot = counter % N), so "empty" is `read == write` and the
//! number of pending events is their wrapping difference.
//!
//! On overflow the writer never blocks. It keeps overwriting the oldest
//! slot, and the reader notices it has been lapped and skips forward to the
//! oldest event still stored. After N+1 enqueues without a dequeue the
//! first dequeue yields event #2.
//!
//! A single enqueue runs to completion before the reader resumes (it runs
//! in an interrupt handler on the reader's own core).

use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::devices::input::KeyCode;

pub struct KeyQueue<const N: usize> {
    slots: [AtomicU8; N],
    write: AtomicUsize,
    read: AtomicUsize,
}

impl<const N: usize> KeyQueue<N> {
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "KeyQueue capacity must be a power of two");
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Producer side. Never fails; overwrites the oldest event when full.
    pub fn enqueue(&self, key: KeyCode) {
        let write = self.write.load(Ordering::Relaxed);
        self.slots[write % N].store(key.raw(), Ordering::Relaxed);
        self.write.store(write.wrapping_add(1), Ordering::Release);
    }

    /// Consumer side. `None` when nothing is pending.
    pub fn dequeue(&self) -> Option<KeyCode> {
        loop {
            let write = self.write.load(Ordering::Acquire);
            let mut read = self.read.load(Ordering::Relaxed);
            if read == write {
                return None;
            }
            if write.wrapping_sub(read) > N {
                read = write.wrapping_sub(N);
            }

            let raw = self.slots[read % N].load(Ordering::Relaxed);

            // Lapped while reading: the slot may now hold a newer event.
            if self.write.load(Ordering::Acquire).wrapping_sub(read) > N {
                continue;
            }
            self.read.store(read.wrapping_add(1), Ordering::Release);
            return Some(KeyCode::from_raw(raw));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.read.load(Ordering::Acquire) == self.write.load(Ordering::Acquire)
    }

    /// Events a dequeue loop would currently return.
    pub fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read).min(N)
    }
}

impl<const N: usize> Default for KeyQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> KeyCode {
        KeyCode::from_raw(n)
    }

    #[test]
    fn test_empty_queue() {
        let queue: KeyQueue<8> = KeyQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_fifo_order() {
        let queue: KeyQueue<8> = KeyQueue::new();
        for n in 1..=5 {
            queue.enqueue(key(n));
        }
        assert_eq!(queue.len(), 5);
        for n in 1..=5 {
            assert_eq!(queue.dequeue(), Some(key(n)));
        }
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let queue: KeyQueue<4> = KeyQueue::new();
        for n in 1..=5 {
            queue.enqueue(key(n));
        }
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.dequeue(), Some(key(2)));
        assert_eq!(queue.dequeue(), Some(key(3)));
        assert_eq!(queue.dequeue(), Some(key(4)));
        assert_eq!(queue.dequeue(), Some(key(5)));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_far_overflow_keeps_newest_window() {
        let queue: KeyQueue<4> = KeyQueue::new();
        for n in 1..=11 {
            queue.enqueue(key(n));
        }
        let drained: Vec<u8> = core::iter::from_fn(|| queue.dequeue()).map(KeyCode::raw).collect();
        assert_eq!(drained, vec![8, 9, 10, 11]);
    }

    #[test]
    fn test_interleaved_wraparound() {
        let queue: KeyQueue<4> = KeyQueue::new();
        for round in 0..10u8 {
            queue.enqueue(key(round));
            queue.enqueue(key(round + 100));
            assert_eq!(queue.dequeue(), Some(key(round)));
            assert_eq!(queue.dequeue(), Some(key(round + 100)));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_capacity() {
        let queue: KeyQueue<32> = KeyQueue::new();
        assert_eq!(queue.capacity(), 32);
    }
}
