//! First-fit explicit free-list heap.
//!
//! Layout of every block inside the arena:
//!
//! ```text
//! offset ─▶ ┌────────────┬────────────┬────────────┬────────────┬──────────────┐
//!           │ next (u32) │ size (u32) │ flags(u32) │ magic(u32) │ data[size]   │
//!           └────────────┴────────────┴────────────┴────────────┴──────────────┘
//! ```
//!
//! `next` is the offset of the following free block (`u32::MAX` ends the
//! list) and is only meaningful while the block is free. Headers are stored
//! little-endian in the arena bytes, so the heap never forms references into
//! memory it hands out.

use core::fmt;

use super::core::AllocError;

pub const HEADER_SIZE: usize = 16;
/// Smallest payload a split-off remainder may carry.
pub const MIN_DATA_SIZE: usize = 16;
pub const BLOCK_MAGIC: u32 = 0xCAFE_BABE;

const END_OF_LIST: u32 = u32::MAX;
const FLAG_FREE: u32 = 1;

const NEXT_FIELD: usize = 0;
const SIZE_FIELD: usize = 4;
const FLAGS_FIELD: usize = 8;
const MAGIC_FIELD: usize = 12;

fn read_word(arena: &[u8], at: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&arena[at..at + 4]);
    u32::from_le_bytes(bytes)
}

fn write_word(arena: &mut [u8], at: usize, value: u32) {
    arena[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BlockHeader {
    next_free: Option<usize>,
    size: usize,
    free: bool,
    magic: u32,
}

impl BlockHeader {
    fn new(size: usize, free: bool, next_free: Option<usize>) -> Self {
        Self {
            next_free,
            size,
            free,
            magic: BLOCK_MAGIC,
        }
    }

    fn read(arena: &[u8], at: usize) -> Self {
        let next = read_word(arena, at + NEXT_FIELD);
        Self {
            next_free: (next != END_OF_LIST).then_some(next as usize),
            size: read_word(arena, at + SIZE_FIELD) as usize,
            free: read_word(arena, at + FLAGS_FIELD) & FLAG_FREE != 0,
            magic: read_word(arena, at + MAGIC_FIELD),
        }
    }

    fn write(&self, arena: &mut [u8], at: usize) {
        let next = self.next_free.map_or(END_OF_LIST, |n| n as u32);
        write_word(arena, at + NEXT_FIELD, next);
        write_word(arena, at + SIZE_FIELD, self.size as u32);
        write_word(arena, at + FLAGS_FIELD, if self.free { FLAG_FREE } else { 0 });
        write_word(arena, at + MAGIC_FIELD, self.magic);
    }

    /// Invalidates a header that has been absorbed into its neighbour, so a
    /// stale pointer to it can no longer pass validation.
    fn scrub(arena: &mut [u8], at: usize) {
        write_word(arena, at + MAGIC_FIELD, 0);
    }
}

/// A free block as seen by introspection: header offset and payload size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    pub offset: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapStats {
    pub capacity: usize,
    pub free_bytes: usize,
    pub free_blocks: usize,
    pub largest_free: usize,
}

impl fmt::Display for HeapStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} KiB total, {} KiB free in {} block(s), largest {} bytes",
            self.capacity / 1024,
            self.free_bytes / 1024,
            self.free_blocks,
            self.largest_free
        )
    }
}

pub struct FreeListHeap<'a> {
    arena: Option<&'a mut [u8]>,
    head: Option<usize>,
}

impl<'a> FreeListHeap<'a> {
    pub const fn new() -> Self {
        Self {
            arena: None,
            head: None,
        }
    }

    /// Takes ownership of `arena` and turns it into one free block.
    pub fn init(&mut self, arena: &'a mut [u8]) -> Result<(), AllocError> {
        if self.arena.is_some() {
            return Err(AllocError::AlreadyInitialized);
        }
        if arena.len() < HEADER_SIZE + MIN_DATA_SIZE || arena.len() >= END_OF_LIST as usize {
            return Err(AllocError::InvalidSize);
        }
        BlockHeader::new(arena.len() - HEADER_SIZE, true, None).write(arena, 0);
        self.head = Some(0);
        self.arena = Some(arena);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.arena.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.arena.as_deref().map_or(0, <[u8]>::len)
    }

    /// Returns the arena offset of a payload of at least `size` bytes.
    pub fn allocate(&mut self, size: usize) -> Result<usize, AllocError> {
        if size == 0 {
            return Err(AllocError::InvalidSize);
        }
        let arena = self.arena.as_deref_mut().ok_or(AllocError::Uninitialized)?;

        let mut prev: Option<usize> = None;
        let mut cursor = self.head;
        while let Some(at) = cursor {
            let mut block = BlockHeader::read(arena, at);
            debug_assert!(block.free && block.magic == BLOCK_MAGIC);

            if block.size >= size {
                let remaining = block.size - size;
                let successor = if remaining < HEADER_SIZE + MIN_DATA_SIZE {
                    block.next_free
                } else {
                    let split_at = at + HEADER_SIZE + size;
                    BlockHeader::new(remaining - HEADER_SIZE, true, block.next_free)
                        .write(arena, split_at);
                    block.size = size;
                    Some(split_at)
                };

                block.free = false;
                block.next_free = None;
                block.write(arena, at);

                match prev {
                    Some(p) => {
                        let mut before = BlockHeader::read(arena, p);
                        before.next_free = successor;
                        before.write(arena, p);
                    }
                    None => self.head = successor,
                }
                return Ok(at + HEADER_SIZE);
            }

            prev = Some(at);
            cursor = block.next_free;
        }
        Err(AllocError::OutOfMemory)
    }

    /// Returns a block to the free list, merging it with free neighbours.
    /// On error the heap is left untouched.
    pub fn free(&mut self, ptr: usize) -> Result<(), AllocError> {
        let arena = self.arena.as_deref_mut().ok_or(AllocError::Uninitialized)?;
        let at = Self::validate(arena, ptr)?;
        let mut block = BlockHeader::read(arena, at);
        if block.free {
            return Err(AllocError::DoubleFree);
        }

        let mut prev: Option<usize> = None;
        let mut next = self.head;
        while let Some(n) = next {
            if n > at {
                break;
            }
            prev = Some(n);
            next = BlockHeader::read(arena, n).next_free;
        }

        block.free = true;
        block.next_free = next;
        if let Some(n) = next {
            if at + HEADER_SIZE + block.size == n {
                let absorbed = BlockHeader::read(arena, n);
                block.size += HEADER_SIZE + absorbed.size;
                block.next_free = absorbed.next_free;
                BlockHeader::scrub(arena, n);
            }
        }
        block.write(arena, at);

        match prev {
            Some(p) => {
                let mut before = BlockHeader::read(arena, p);
                if p + HEADER_SIZE + before.size == at {
                    before.size += HEADER_SIZE + block.size;
                    before.next_free = block.next_free;
                    BlockHeader::scrub(arena, at);
                } else {
                    before.next_free = Some(at);
                }
                before.write(arena, p);
            }
            None => self.head = Some(at),
        }
        Ok(())
    }

    /// Header offset for a payload pointer, if it names a live block.
    fn validate(arena: &[u8], ptr: usize) -> Result<usize, AllocError> {
        let at = ptr.checked_sub(HEADER_SIZE).ok_or(AllocError::InvalidAddress)?;
        if ptr > arena.len() {
            return Err(AllocError::InvalidAddress);
        }
        let block = BlockHeader::read(arena, at);
        if block.magic != BLOCK_MAGIC || ptr + block.size > arena.len() {
            return Err(AllocError::BadMagic);
        }
        Ok(at)
    }

    /// Payload size of an allocated block.
    pub fn block_size(&self, ptr: usize) -> Option<usize> {
        let arena = self.arena.as_deref()?;
        let at = Self::validate(arena, ptr).ok()?;
        let block = BlockHeader::read(arena, at);
        (!block.free).then_some(block.size)
    }

    pub fn data(&self, ptr: usize) -> Option<&[u8]> {
        let size = self.block_size(ptr)?;
        self.arena.as_deref().map(|arena| &arena[ptr..ptr + size])
    }

    pub fn data_mut(&mut self, ptr: usize) -> Option<&mut [u8]> {
        let size = self.block_size(ptr)?;
        self.arena.as_deref_mut().map(|arena| &mut arena[ptr..ptr + size])
    }

    /// Free blocks in list (and therefore address) order.
    pub fn free_blocks(&self) -> FreeBlocks<'_> {
        FreeBlocks {
            arena: self.arena.as_deref().unwrap_or(&[]),
            cursor: self.head,
        }
    }

    pub fn stats(&self) -> HeapStats {
        self.free_blocks().fold(
            HeapStats {
                capacity: self.capacity(),
                ..HeapStats::default()
            },
            |mut stats, block| {
                stats.free_bytes += block.size;
                stats.free_blocks += 1;
                stats.largest_free = stats.largest_free.max(block.size);
                stats
            },
        )
    }
}

impl Default for FreeListHeap<'_> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct FreeBlocks<'h> {
    arena: &'h [u8],
    cursor: Option<usize>,
}

impl Iterator for FreeBlocks<'_> {
    type Item = FreeBlock;

    fn next(&mut self) -> Option<FreeBlock> {
        let at = self.cursor?;
        let header = BlockHeader::read(self.arena, at);
        self.cursor = header.next_free;
        Some(FreeBlock {
            offset: at,
            size: header.size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARENA: usize = 4096;

    fn blocks(heap: &FreeListHeap<'_>) -> Vec<(usize, usize)> {
        heap.free_blocks().map(|b| (b.offset, b.size)).collect()
    }

    fn assert_list_invariants(heap: &FreeListHeap<'_>) {
        let list = blocks(heap);
        for pair in list.windows(2) {
            let (a_off, a_size) = pair[0];
            let (b_off, _) = pair[1];
            assert!(a_off < b_off, "free list out of order: {:?}", list);
            assert!(a_off + HEADER_SIZE + a_size < b_off, "adjacent free blocks: {:?}", list);
        }
    }

    #[test]
    fn test_init_single_block() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        assert_eq!(blocks(&heap), vec![(0, ARENA - HEADER_SIZE)]);
        assert_eq!(heap.capacity(), ARENA);
    }

    #[test]
    fn test_init_rejects_tiny_arena_and_reinit() {
        let mut tiny = [0u8; HEADER_SIZE];
        let mut heap = FreeListHeap::new();
        assert_eq!(heap.init(&mut tiny), Err(AllocError::InvalidSize));

        let mut arena = vec![0u8; ARENA];
        let mut other = vec![0u8; ARENA];
        heap.init(&mut arena).unwrap();
        assert_eq!(heap.init(&mut other), Err(AllocError::AlreadyInitialized));
    }

    #[test]
    fn test_uninitialized() {
        let mut heap = FreeListHeap::new();
        assert_eq!(heap.allocate(8), Err(AllocError::Uninitialized));
        assert_eq!(heap.free(16), Err(AllocError::Uninitialized));
        assert_eq!(heap.free_blocks().count(), 0);
    }

    #[test]
    fn test_first_fit_split() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(64).unwrap();
        assert_eq!(a, HEADER_SIZE);
        assert_eq!(heap.block_size(a), Some(64));
        assert_eq!(blocks(&heap), vec![(HEADER_SIZE + 64, ARENA - 2 * HEADER_SIZE - 64)]);
    }

    #[test]
    fn test_small_remainder_is_not_split() {
        let mut arena = vec![0u8; 128];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        // 112 byte block, asking 90 leaves 22 < HEADER_SIZE + MIN_DATA_SIZE
        let a = heap.allocate(90).unwrap();
        assert_eq!(heap.block_size(a), Some(112));
        assert_eq!(heap.free_blocks().count(), 0);
        assert_eq!(heap.allocate(1), Err(AllocError::OutOfMemory));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        assert_eq!(heap.allocate(0), Err(AllocError::InvalidSize));
    }

    #[test]
    fn test_free_round_trip_restores_heap() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        let initial = blocks(&heap);

        let a = heap.allocate(100).unwrap();
        let b = heap.allocate(200).unwrap();
        let c = heap.allocate(300).unwrap();
        heap.free(b).unwrap();
        assert_list_invariants(&heap);
        heap.free(a).unwrap();
        assert_list_invariants(&heap);
        heap.free(c).unwrap();
        assert_list_invariants(&heap);

        assert_eq!(blocks(&heap), initial);
    }

    #[test]
    fn test_coalesce_with_both_neighbours() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(64).unwrap();
        let b = heap.allocate(64).unwrap();
        let c = heap.allocate(64).unwrap();
        let _guard = heap.allocate(64).unwrap();

        heap.free(a).unwrap();
        heap.free(c).unwrap();
        assert_eq!(heap.free_blocks().count(), 3);
        heap.free(b).unwrap();

        let list = blocks(&heap);
        assert_eq!(list[0], (0, 3 * 64 + 2 * HEADER_SIZE));
        assert_eq!(list.len(), 2);
        assert_list_invariants(&heap);
    }

    #[test]
    fn test_first_fit_reuses_earliest_hole() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(128).unwrap();
        let _b = heap.allocate(32).unwrap();
        heap.free(a).unwrap();

        let again = heap.allocate(48).unwrap();
        assert_eq!(again, a);
    }

    #[test]
    fn test_double_free_is_rejected_without_change() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(64).unwrap();
        let _b = heap.allocate(64).unwrap();
        heap.free(a).unwrap();
        let before = blocks(&heap);
        assert_eq!(heap.free(a), Err(AllocError::DoubleFree));
        assert_eq!(blocks(&heap), before);
    }

    #[test]
    fn test_foreign_pointer_is_rejected_without_change() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        let a = heap.allocate(64).unwrap();
        let before = blocks(&heap);

        assert_eq!(heap.free(a + 4), Err(AllocError::BadMagic));
        assert_eq!(heap.free(8), Err(AllocError::InvalidAddress));
        assert_eq!(heap.free(ARENA + 64), Err(AllocError::InvalidAddress));
        assert_eq!(blocks(&heap), before);
    }

    #[test]
    fn test_absorbed_header_cannot_be_freed() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(64).unwrap();
        let b = heap.allocate(64).unwrap();
        let _c = heap.allocate(64).unwrap();
        heap.free(a).unwrap();
        heap.free(b).unwrap();
        assert_eq!(heap.free(b), Err(AllocError::BadMagic));
    }

    #[test]
    fn test_out_of_memory() {
        let mut arena = vec![0u8; 256];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        assert_eq!(heap.allocate(1024), Err(AllocError::OutOfMemory));
    }

    #[test]
    fn test_data_is_writable_and_bounded() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();

        let a = heap.allocate(32).unwrap();
        let b = heap.allocate(32).unwrap();
        heap.data_mut(a).unwrap().fill(0xAA);
        heap.data_mut(b).unwrap().fill(0x55);
        assert!(heap.data(a).unwrap().iter().all(|&x| x == 0xAA));
        assert!(heap.data(b).unwrap().iter().all(|&x| x == 0x55));

        heap.free(a).unwrap();
        assert!(heap.data(a).is_none());
    }

    #[test]
    fn test_stats() {
        let mut arena = vec![0u8; ARENA];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        let a = heap.allocate(64).unwrap();
        let _b = heap.allocate(64).unwrap();
        heap.free(a).unwrap();

        let stats = heap.stats();
        assert_eq!(stats.capacity, ARENA);
        assert_eq!(stats.free_blocks, 2);
        assert_eq!(stats.free_bytes, 64 + ARENA - 3 * HEADER_SIZE - 128);
        assert_eq!(stats.largest_free, ARENA - 3 * HEADER_SIZE - 128);
    }

    #[test]
    fn test_churn_keeps_invariants() {
        let mut arena = vec![0u8; 8192];
        let mut heap = FreeListHeap::new();
        heap.init(&mut arena).unwrap();
        let initial = blocks(&heap);

        let mut live = Vec::new();
        for i in 0..40usize {
            if let Ok(p) = heap.allocate(16 + (i * 37) % 200) {
                live.push(p);
            }
            if i % 3 == 0 && !live.is_empty() {
                let victim = live.remove((i * 7) % live.len());
                heap.free(victim).unwrap();
                assert_list_invariants(&heap);
            }
        }
        for p in live.drain(..).rev() {
            heap.free(p).unwrap();
            assert_list_invariants(&heap);
        }
        assert_eq!(blocks(&heap), initial);
    }
}
