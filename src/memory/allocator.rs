/*!
 * Allocator
 * First-fit search with split-or-consume policy
 */

use super::heap::TagHeap;
use super::types::{Edge, Status};
use crate::core::limits::{ALIGNMENT, BLOCK_OVERHEAD, MIN_FREE_PAYLOAD, TAG_SIZE};
use crate::core::types::{align_up, Address, HeapResult, Size};
use tracing::{debug, error};

impl TagHeap {
    /// Allocate `size` bytes, rounded up to the alignment granularity
    ///
    /// Returns `None` for a zero-byte request or when no free block fits;
    /// the heap is left untouched in both cases.
    pub fn allocate(&mut self, size: Size) -> Option<Address> {
        if size == 0 {
            debug!("Zero-byte allocation request");
            return None;
        }

        let Some(need) = align_up(size, ALIGNMENT) else {
            debug!(requested = size, "Allocation request overflows alignment");
            return None;
        };

        let Some((found, found_size)) = self.first_fit(need) else {
            debug!(
                requested = size,
                need,
                free = self.free_bytes_total(),
                "No free block fits request"
            );
            return None;
        };

        match self.carve(found, found_size, need) {
            Ok(address) => {
                debug!(
                    address = format_args!("0x{:x}", address),
                    requested = size,
                    size = need,
                    "Allocated block"
                );
                Some(address)
            }
            Err(e) => {
                error!(error = %e, "Allocation aborted");
                None
            }
        }
    }

    /// First node in list order whose size covers `need`
    fn first_fit(&self, need: Size) -> Option<(Address, Size)> {
        self.region.free_list().find(|&(_, size)| size >= need)
    }

    fn carve(&mut self, found: Address, found_size: Size, need: Size) -> HeapResult<Address> {
        let generation = self.generation + 1;
        let end_tag = found + found_size;

        let slack = found_size
            .checked_sub(need + BLOCK_OVERHEAD)
            .filter(|&slack| slack >= MIN_FREE_PAYLOAD);

        let address = match slack {
            Some(slack) => {
                // Carve from the high end so the free node keeps its address and links
                let free_end = found + slack;
                let alloc_start = free_end + TAG_SIZE;
                let address = alloc_start + TAG_SIZE;

                self.region.stamp(found - TAG_SIZE, Edge::Start, Status::Free, slack, generation);
                self.region.stamp(free_end, Edge::End, Status::Free, slack, generation);
                self.region.stamp(alloc_start, Edge::Start, Status::Allocated, need, generation);
                self.region.stamp(end_tag, Edge::End, Status::Allocated, need, generation);
                self.region.clear(address);

                debug!(
                    remainder = slack,
                    node = format_args!("0x{:x}", found),
                    "Split free block"
                );
                address
            }
            None => {
                self.region.unlink(found)?;
                self.region
                    .stamp(found - TAG_SIZE, Edge::Start, Status::Allocated, found_size, generation);
                self.region.stamp(end_tag, Edge::End, Status::Allocated, found_size, generation);
                found
            }
        };

        self.generation = generation;
        Ok(address)
    }
}
