//! Fixed-capacity block store and free-pool management
//!
//! The store is the only component that touches raw slot indices. Every slot
//! holds a fixed-size payload fragment plus a next-slot reference used by the
//! linked allocation strategy. Free slots live in a pool; a pluggable
//! [`SlotPicker`] decides the draw order, which is how the simulator models
//! fragmentation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{FsError, Result};

/// Policy for ordering the free pool before slots are drawn
///
/// The default [`ShufflePicker`] randomizes the pool before every allocation
/// so block layout is non-deterministic across writes. Tests inject
/// [`FirstFitPicker`] to get reproducible layouts.
pub trait SlotPicker {
    /// Reorder `free` in place; the store then drains from the front.
    fn arrange(&mut self, free: &mut Vec<u32>);
}

/// Shuffles the free pool before each allocation (fragmentation simulation)
pub struct ShufflePicker {
    rng: StdRng,
}

impl ShufflePicker {
    pub fn new() -> Self {
        ShufflePicker {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded variant for reproducible benchmark runs
    pub fn with_seed(seed: u64) -> Self {
        ShufflePicker {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for ShufflePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotPicker for ShufflePicker {
    fn arrange(&mut self, free: &mut Vec<u32>) {
        free.shuffle(&mut self.rng);
    }
}

/// Deterministic picker: always draws the lowest-numbered free slots first
pub struct FirstFitPicker;

impl SlotPicker for FirstFitPicker {
    fn arrange(&mut self, free: &mut Vec<u32>) {
        free.sort_unstable();
    }
}

/// One storage slot: a payload fragment and an optional chain pointer
#[derive(Debug, Clone, Default)]
struct Slot {
    data: Vec<u8>,
    next: Option<u32>,
}

/// Fixed-capacity array of slots plus the free-slot pool
pub struct BlockStore {
    block_size: usize,
    slots: Vec<Slot>,
    free: Vec<u32>,
    picker: Box<dyn SlotPicker>,
}

impl BlockStore {
    pub fn new(capacity: usize, block_size: usize, picker: Box<dyn SlotPicker>) -> Self {
        BlockStore {
            block_size,
            slots: (0..capacity).map(|_| Slot::default()).collect(),
            free: (0..capacity as u32).collect(),
            picker,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of slots needed to hold `len` payload bytes
    pub fn blocks_for(&self, len: usize) -> usize {
        (len + self.block_size - 1) / self.block_size
    }

    /// Draw `n` slots from the free pool
    ///
    /// The count is verified before anything is removed, so a shortfall
    /// reports `InsufficientSpace` without leaking a single slot.
    pub fn take(&mut self, n: usize) -> Result<Vec<u32>> {
        if n > self.free.len() {
            return Err(FsError::InsufficientSpace {
                needed: n,
                free: self.free.len(),
            });
        }
        self.picker.arrange(&mut self.free);
        Ok(self.free.drain(..n).collect())
    }

    /// Return one slot to the free pool, clearing payload and chain pointer
    pub fn release(&mut self, idx: u32) {
        debug_assert!(!self.free.contains(&idx), "slot {idx} released twice");
        let slot = &mut self.slots[idx as usize];
        slot.data.clear();
        slot.next = None;
        self.free.push(idx);
    }

    pub fn write_slot(&mut self, idx: u32, fragment: &[u8]) {
        debug_assert!(fragment.len() <= self.block_size);
        let slot = &mut self.slots[idx as usize];
        slot.data.clear();
        slot.data.extend_from_slice(fragment);
    }

    pub fn read_slot(&self, idx: u32) -> &[u8] {
        &self.slots[idx as usize].data
    }

    pub fn set_next(&mut self, idx: u32, next: Option<u32>) {
        self.slots[idx as usize].next = next;
    }

    pub fn next(&self, idx: u32) -> Option<u32> {
        self.slots[idx as usize].next
    }
}
