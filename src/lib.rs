/*!
 * Tagheap Library
 * Boundary-tag heap allocator over a single fixed region
 */

pub mod core;
pub mod diagnostics;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::{HeapConfig, HeapError, HeapResult, ReleaseRejection};
pub use diagnostics::{verify, FreeListDump};
pub use memory::{Block, Coalesce, HeapInfo, HeapStats, RegionAllocator, SharedHeap, TagHeap};
pub use monitoring::init_tracing;
