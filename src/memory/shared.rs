/*!
 * Shared Heap
 * Coarse-grained locking around a whole region
 */

use super::heap::TagHeap;
use super::traits::{HeapInfo, RegionAllocator};
use super::types::{Coalesce, HeapStats};
use crate::core::types::{Address, HeapResult, Size};
use crate::core::HeapConfig;
use parking_lot::Mutex;
use std::sync::Arc;

/// Thread-safe handle to one heap
///
/// Every operation takes the single region lock. Coalescing touches list nodes
/// that are not adjacent to the released block, so finer locking is not sound.
#[derive(Debug, Clone)]
pub struct SharedHeap {
    inner: Arc<Mutex<TagHeap>>,
}

impl SharedHeap {
    pub fn new(config: HeapConfig) -> HeapResult<Self> {
        Ok(Self::from_heap(TagHeap::new(config)?))
    }

    pub fn from_heap(heap: TagHeap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(heap)),
        }
    }

    pub fn allocate(&self, size: Size) -> Option<Address> {
        self.inner.lock().allocate(size)
    }

    pub fn release(&self, address: Address) -> HeapResult<Coalesce> {
        self.inner.lock().release(address)
    }

    pub fn free_bytes_total(&self) -> Size {
        self.inner.lock().free_bytes_total()
    }

    pub fn stats(&self) -> HeapStats {
        self.inner.lock().stats()
    }

    /// Run `f` with exclusive access to the heap
    pub fn with_heap<R>(&self, f: impl FnOnce(&mut TagHeap) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}

impl RegionAllocator for SharedHeap {
    fn allocate(&mut self, size: Size) -> Option<Address> {
        SharedHeap::allocate(self, size)
    }

    fn release(&mut self, address: Address) -> HeapResult<Coalesce> {
        SharedHeap::release(self, address)
    }

    fn free_bytes_total(&self) -> Size {
        SharedHeap::free_bytes_total(self)
    }
}

impl HeapInfo for SharedHeap {
    fn stats(&self) -> HeapStats {
        SharedHeap::stats(self)
    }
}
