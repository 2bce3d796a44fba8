/*!
 * Memory Traits
 * Allocator abstractions over a fixed region
 */

use super::types::{Coalesce, HeapStats};
use crate::core::types::{Address, HeapResult, Size};

/// Allocator interface over a single region
pub trait RegionAllocator {
    /// Allocate `size` bytes, `None` for zero-size requests or when nothing fits
    fn allocate(&mut self, size: Size) -> Option<Address>;

    /// Return a block obtained from `allocate`
    fn release(&mut self, address: Address) -> HeapResult<Coalesce>;

    /// Sum of all free block sizes
    fn free_bytes_total(&self) -> Size;
}

/// Heap statistics provider
pub trait HeapInfo {
    /// Get overall heap statistics
    fn stats(&self) -> HeapStats;

    /// Get heap info as (usable, allocated, free)
    fn info(&self) -> (Size, Size, Size) {
        let stats = self.stats();
        (stats.usable, stats.allocated_bytes, stats.free_bytes)
    }
}
