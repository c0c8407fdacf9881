//! Block allocation strategies
//!
//! Two interchangeable strategies turn a byte payload into a set of occupied
//! slots and a way to read them back in order:
//! - [`indexed::IndexedAllocation`]: an explicit ordered list of slot indices
//!   per file (inode-style direct pointers), O(1) block access.
//! - [`linked::LinkedAllocation`]: each slot points at the next slot of the
//!   same file (FAT-style chain), O(k) block access.
//!
//! Both expose identical external behavior; the access-cost asymmetry is the
//! point of the comparison and must not be shortcut.

pub mod indexed;
pub mod linked;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::BlockStore;

/// Which allocation strategy an engine instance uses (fixed at construction)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocPolicy {
    Indexed,
    Linked,
}

impl AllocPolicy {
    pub(crate) fn strategy(self) -> Box<dyn AllocationStrategy> {
        match self {
            AllocPolicy::Indexed => Box::new(indexed::IndexedAllocation),
            AllocPolicy::Linked => Box::new(linked::LinkedAllocation),
        }
    }
}

/// Layout-specific reference a file holds into the block store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllocHandle {
    /// Ordered list of owned slot indices
    Indexed(Vec<u32>),
    /// Index of the first slot in the chain, `None` for an empty file
    Linked(Option<u32>),
}

impl AllocHandle {
    pub fn is_empty(&self) -> bool {
        match self {
            AllocHandle::Indexed(blocks) => blocks.is_empty(),
            AllocHandle::Linked(head) => head.is_none(),
        }
    }
}

/// Allocation strategy interface
///
/// Owns the policy for acquiring and releasing slots from the [`BlockStore`].
/// `store` either allocates everything the payload needs or fails without
/// touching the free pool; partial allocations never escape.
pub trait AllocationStrategy {
    /// Write `payload` into freshly drawn slots, returning the new handle
    fn store(&self, store: &mut BlockStore, payload: &[u8]) -> Result<AllocHandle>;

    /// Read the payload back in order, truncated to the recorded `size`
    fn load(&self, store: &BlockStore, handle: &AllocHandle, size: usize) -> Vec<u8>;

    /// Return every slot in the handle to the free pool; yields the freed count
    fn release(&self, store: &mut BlockStore, handle: &AllocHandle) -> usize;

    /// Slot index of the file's `k`-th block
    fn access_block(&self, store: &BlockStore, handle: &AllocHandle, k: usize) -> Result<u32>;

    /// Materialized slot list, in file order (used for stat/usage reporting)
    fn slots(&self, store: &BlockStore, handle: &AllocHandle) -> Vec<u32>;

    /// The handle of a file that owns no slots
    fn empty_handle(&self) -> AllocHandle;
}
