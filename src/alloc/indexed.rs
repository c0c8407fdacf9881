//! Indexed allocation: explicit per-file list of slot indices

use crate::alloc::{AllocHandle, AllocationStrategy};
use crate::error::{FsError, Result};
use crate::store::BlockStore;

pub struct IndexedAllocation;

impl AllocationStrategy for IndexedAllocation {
    fn store(&self, store: &mut BlockStore, payload: &[u8]) -> Result<AllocHandle> {
        let needed = store.blocks_for(payload.len());
        let blocks = store.take(needed)?;
        let block_size = store.block_size();
        for (i, &idx) in blocks.iter().enumerate() {
            let start = i * block_size;
            let end = payload.len().min(start + block_size);
            store.write_slot(idx, &payload[start..end]);
        }
        Ok(AllocHandle::Indexed(blocks))
    }

    fn load(&self, store: &BlockStore, handle: &AllocHandle, size: usize) -> Vec<u8> {
        let AllocHandle::Indexed(blocks) = handle else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(size);
        for &idx in blocks {
            out.extend_from_slice(store.read_slot(idx));
        }
        out.truncate(size);
        out
    }

    fn release(&self, store: &mut BlockStore, handle: &AllocHandle) -> usize {
        let AllocHandle::Indexed(blocks) = handle else {
            return 0;
        };
        for &idx in blocks {
            store.release(idx);
        }
        blocks.len()
    }

    fn access_block(&self, _store: &BlockStore, handle: &AllocHandle, k: usize) -> Result<u32> {
        let AllocHandle::Indexed(blocks) = handle else {
            return Err(FsError::OutOfRange { index: k, blocks: 0 });
        };
        blocks.get(k).copied().ok_or(FsError::OutOfRange {
            index: k,
            blocks: blocks.len(),
        })
    }

    fn slots(&self, _store: &BlockStore, handle: &AllocHandle) -> Vec<u32> {
        match handle {
            AllocHandle::Indexed(blocks) => blocks.clone(),
            AllocHandle::Linked(_) => Vec::new(),
        }
    }

    fn empty_handle(&self) -> AllocHandle {
        AllocHandle::Indexed(Vec::new())
    }
}
