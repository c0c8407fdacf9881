//! Engine configuration, fixed at construction

use serde::{Deserialize, Serialize};

use crate::alloc::AllocPolicy;
use crate::error::{FsError, Result};

/// Geometry and policy of a simulated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    /// Bytes per block (`B`)
    pub block_size: usize,
    /// Total slot count (`C`)
    pub capacity: usize,
    pub policy: AllocPolicy,
}

impl FsConfig {
    pub fn new(block_size: usize, capacity: usize, policy: AllocPolicy) -> Self {
        FsConfig {
            block_size,
            capacity,
            policy,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(FsError::InvalidBlockSize(self.block_size));
        }
        if self.capacity == 0 {
            return Err(FsError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

impl Default for FsConfig {
    /// 8-byte blocks, 10000 slots
    fn default() -> Self {
        FsConfig {
            block_size: 8,
            capacity: 10_000,
            policy: AllocPolicy::Indexed,
        }
    }
}
