/*!
 * Boundary-Tag Heap
 * Single-region allocator state and read-only queries
 */

use super::free_list::FreeListIter;
use super::region::{BlockIter, Region};
use super::traits::{HeapInfo, RegionAllocator};
use super::types::{Block, Coalesce, HeapStats, Tag};
use crate::core::limits::BLOCK_OVERHEAD;
use crate::core::types::{Address, Generation, HeapResult, Size};
use crate::core::HeapConfig;
use tracing::info;

/// Boundary-tag heap over one fixed region
///
/// Not synchronized; wrap it in a [`SharedHeap`](super::SharedHeap) to share it.
#[derive(Debug)]
pub struct TagHeap {
    pub(super) region: Region,
    /// Bumped by every successful allocate or release
    pub(super) generation: Generation,
}

impl TagHeap {
    /// Reserve the region and lay it out as one free block
    pub fn new(config: HeapConfig) -> HeapResult<Self> {
        let region = Region::new(&config)?;
        info!(
            capacity = region.capacity(),
            usable = region.usable(),
            "Boundary-tag heap initialized"
        );
        Ok(Self {
            region,
            generation: 0,
        })
    }

    /// Create a heap with a custom capacity (useful for testing)
    pub fn with_capacity(capacity: Size) -> HeapResult<Self> {
        Self::new(HeapConfig::with_capacity(capacity))
    }

    pub fn capacity(&self) -> Size {
        self.region.capacity()
    }

    pub fn usable(&self) -> Size {
        self.region.usable()
    }

    /// Number of successful mutations so far
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Offset of the free-list header granule
    pub fn header_offset(&self) -> usize {
        self.region.header_offset()
    }

    /// Sum of recorded sizes over a forward free-list traversal
    pub fn free_bytes_total(&self) -> Size {
        self.region.free_list().map(|(_, size)| size).sum()
    }

    /// Free blocks in list order, as `(payload address, size)`
    pub fn free_list(&self) -> FreeListIter<'_> {
        self.region.free_list()
    }

    /// Free blocks in reverse list order
    pub fn free_list_rev(&self) -> FreeListIter<'_> {
        self.region.free_list_rev()
    }

    /// All blocks in address order
    pub fn blocks(&self) -> BlockIter<'_> {
        self.region.blocks()
    }

    pub fn block(&self, address: Address) -> Option<Block> {
        self.region.block(address)
    }

    /// Tag stored at a byte offset, for diagnostics
    pub fn tag(&self, offset: usize) -> Option<&Tag> {
        self.region.tag(offset)
    }

    /// Get the payload size of an allocated block
    pub fn block_size(&self, address: Address) -> Option<Size> {
        match self.block(address)? {
            Block::Allocated { size, .. } => Some(size),
            Block::Free { .. } => None,
        }
    }

    /// Check if an address is the payload start of an allocated block
    pub fn is_allocated(&self, address: Address) -> bool {
        self.block_size(address).is_some()
    }

    /// Payload bytes of an allocated block
    pub fn payload(&self, address: Address) -> Option<&[u8]> {
        let size = self.block_size(address)?;
        Some(self.region.bytes(address, size))
    }

    /// Mutable payload bytes of an allocated block
    pub fn payload_mut(&mut self, address: Address) -> Option<&mut [u8]> {
        let size = self.block_size(address)?;
        Some(self.region.bytes_mut(address, size))
    }

    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            capacity: self.capacity(),
            usable: self.usable(),
            free_bytes: 0,
            allocated_bytes: 0,
            free_blocks: 0,
            allocated_blocks: 0,
            largest_free: 0,
            tag_overhead: 0,
        };

        for block in self.blocks() {
            match block {
                Block::Free { size, .. } => {
                    stats.free_bytes += size;
                    stats.free_blocks += 1;
                    stats.largest_free = stats.largest_free.max(size);
                }
                Block::Allocated { size, .. } => {
                    stats.allocated_bytes += size;
                    stats.allocated_blocks += 1;
                }
            }
        }

        let blocks = stats.free_blocks + stats.allocated_blocks;
        stats.tag_overhead = blocks.saturating_sub(1) * BLOCK_OVERHEAD;
        stats
    }
}

impl RegionAllocator for TagHeap {
    fn allocate(&mut self, size: Size) -> Option<Address> {
        TagHeap::allocate(self, size)
    }

    fn release(&mut self, address: Address) -> HeapResult<Coalesce> {
        TagHeap::release(self, address)
    }

    fn free_bytes_total(&self) -> Size {
        TagHeap::free_bytes_total(self)
    }
}

impl HeapInfo for TagHeap {
    fn stats(&self) -> HeapStats {
        TagHeap::stats(self)
    }
}
