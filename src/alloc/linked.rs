//! Linked allocation: FAT-style chain of slots
//!
//! Block `k` is reached by walking `k` next-hops from the chain head. That
//! O(k) walk versus the indexed strategy's O(1) lookup is the measurement
//! target of the whole simulation, so no shortcut indexing is allowed here.

use crate::alloc::{AllocHandle, AllocationStrategy};
use crate::error::{FsError, Result};
use crate::store::BlockStore;

pub struct LinkedAllocation;

impl AllocationStrategy for LinkedAllocation {
    fn store(&self, store: &mut BlockStore, payload: &[u8]) -> Result<AllocHandle> {
        let needed = store.blocks_for(payload.len());
        let blocks = store.take(needed)?;
        let block_size = store.block_size();
        for (i, &idx) in blocks.iter().enumerate() {
            let start = i * block_size;
            let end = payload.len().min(start + block_size);
            store.write_slot(idx, &payload[start..end]);
            store.set_next(idx, blocks.get(i + 1).copied());
        }
        Ok(AllocHandle::Linked(blocks.first().copied()))
    }

    fn load(&self, store: &BlockStore, handle: &AllocHandle, size: usize) -> Vec<u8> {
        let AllocHandle::Linked(head) = handle else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(size);
        let mut cursor = *head;
        while let Some(idx) = cursor {
            out.extend_from_slice(store.read_slot(idx));
            cursor = store.next(idx);
        }
        out.truncate(size);
        out
    }

    fn release(&self, store: &mut BlockStore, handle: &AllocHandle) -> usize {
        let AllocHandle::Linked(head) = handle else {
            return 0;
        };
        let mut freed = 0;
        let mut cursor = *head;
        while let Some(idx) = cursor {
            // capture the pointer before release clears it
            cursor = store.next(idx);
            store.release(idx);
            freed += 1;
        }
        freed
    }

    fn access_block(&self, store: &BlockStore, handle: &AllocHandle, k: usize) -> Result<u32> {
        let AllocHandle::Linked(head) = handle else {
            return Err(FsError::OutOfRange { index: k, blocks: 0 });
        };
        let mut cursor = *head;
        let mut hops = 0;
        while let Some(idx) = cursor {
            if hops == k {
                return Ok(idx);
            }
            cursor = store.next(idx);
            hops += 1;
        }
        Err(FsError::OutOfRange {
            index: k,
            blocks: hops,
        })
    }

    fn slots(&self, store: &BlockStore, handle: &AllocHandle) -> Vec<u32> {
        let AllocHandle::Linked(head) = handle else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = *head;
        while let Some(idx) = cursor {
            out.push(idx);
            cursor = store.next(idx);
        }
        out
    }

    fn empty_handle(&self) -> AllocHandle {
        AllocHandle::Linked(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FirstFitPicker;

    fn store() -> BlockStore {
        BlockStore::new(10, 8, Box::new(FirstFitPicker))
    }

    #[test]
    fn test_store_chains_blocks_in_order() {
        let mut s = store();
        let payload = b"linked allocation!";
        let handle = LinkedAllocation.store(&mut s, payload).unwrap();

        let chain = LinkedAllocation.slots(&s, &handle);
        assert_eq!(chain.len(), 3);
        assert_eq!(s.next(chain[0]), Some(chain[1]));
        assert_eq!(s.next(chain[1]), Some(chain[2]));
        assert_eq!(s.next(chain[2]), None);
        assert_eq!(
            LinkedAllocation.load(&s, &handle, payload.len()),
            payload.to_vec()
        );
    }

    #[test]
    fn test_release_walks_the_whole_chain() {
        let mut s = store();
        let handle = LinkedAllocation.store(&mut s, &[9u8; 40]).unwrap();
        assert_eq!(s.free_count(), 5);
        assert_eq!(LinkedAllocation.release(&mut s, &handle), 5);
        assert_eq!(s.free_count(), 10);
    }

    #[test]
    fn test_access_block_walks_k_hops() {
        let mut s = store();
        let handle = LinkedAllocation.store(&mut s, &[2u8; 32]).unwrap();
        let chain = LinkedAllocation.slots(&s, &handle);

        for k in 0..4 {
            assert_eq!(
                LinkedAllocation.access_block(&s, &handle, k).unwrap(),
                chain[k]
            );
        }
        assert_eq!(
            LinkedAllocation.access_block(&s, &handle, 7).unwrap_err(),
            FsError::OutOfRange { index: 7, blocks: 4 }
        );
    }

    #[test]
    fn test_insufficient_space_leaves_pool_intact() {
        let mut s = store();
        let err = LinkedAllocation.store(&mut s, &[0u8; 100]).unwrap_err();
        assert_eq!(
            err,
            FsError::InsufficientSpace {
                needed: 13,
                free: 10
            }
        );
        assert_eq!(s.free_count(), 10);
    }

    #[test]
    fn test_empty_file_has_no_head() {
        let mut s = store();
        let handle = LinkedAllocation.store(&mut s, b"").unwrap();
        assert_eq!(handle, AllocHandle::Linked(None));
        assert_eq!(LinkedAllocation.release(&mut s, &handle), 0);
    }

    #[test]
    fn test_partial_last_block_truncated_on_load() {
        let mut s = store();
        let payload = b"123456789"; // 9 bytes: one full block + 1 byte
        let handle = LinkedAllocation.store(&mut s, payload).unwrap();
        assert_eq!(LinkedAllocation.load(&s, &handle, 9), payload.to_vec());
    }
}
