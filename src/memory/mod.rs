/*!
 * Memory Module
 *
 * Boundary-tag heap over a single fixed region.
 *
 * ## Features
 *
 * - **First-fit allocation**: the free list is searched from the header forwards
 * - **High-end splitting**: the free remainder keeps its node, no link rewrites
 * - **Four-way coalescing**: released blocks merge with free physical neighbors
 * - **Stale-tag markers**: tags buried by a merge are retired with the event number
 * - **Coarse locking**: [`SharedHeap`] serializes every call on one mutex
 */

mod allocator;
mod free_list;
mod heap;
mod region;
mod release;
mod shared;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use free_list::FreeListIter;
pub use heap::TagHeap;
pub use region::BlockIter;
pub use shared::SharedHeap;
pub use traits::*;
pub use types::*;
