/*!
 * Deallocator
 *
 * Validates a release request, then merges the block with whichever physical
 * neighbors are free. Neighbors are found through their own recorded sizes,
 * never through free-list position:
 *
 * ```text
 *   lower end tag   = start tag - 16        lower payload = lower end tag - lower size
 *   upper start tag = end tag + 16          upper payload = upper start tag + 16
 * ```
 */

use super::heap::TagHeap;
use super::types::{Coalesce, Edge, Status};
use crate::core::errors::{HeapError, ReleaseRejection};
use crate::core::limits::{BLOCK_OVERHEAD, GRANULE, TAG_SIZE};
use crate::core::types::{Address, Generation, HeapResult, Size};
use tracing::{debug, warn};

/// A block that passed release validation
#[derive(Debug, Clone, Copy)]
struct Releasable {
    address: Address,
    size: Size,
    start_tag: usize,
    end_tag: usize,
}

/// A free physical neighbor, located through its own tags
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    address: Address,
    size: Size,
    start_tag: usize,
    end_tag: usize,
}

impl TagHeap {
    /// Release a block previously returned by `allocate`
    ///
    /// On rejection nothing is mutated and `HeapError::InvalidRelease` names the reason.
    pub fn release(&mut self, address: Address) -> HeapResult<Coalesce> {
        let block = match self.validate_release(address) {
            Ok(block) => block,
            Err(reason) => {
                warn!(
                    address = format_args!("0x{:x}", address),
                    %reason,
                    "Rejected release"
                );
                return Err(HeapError::invalid_release(address, reason));
            }
        };

        let lower = self.lower_free_neighbor(&block)?;
        let upper = self.upper_free_neighbor(&block)?;
        let generation = self.generation + 1;

        let case = match (lower, upper) {
            (None, None) => self.release_isolated(&block, generation)?,
            (Some(lower), None) => self.merge_lower(&block, &lower, generation)?,
            (None, Some(upper)) => self.merge_upper(&block, &upper, generation)?,
            (Some(lower), Some(upper)) => self.merge_both(&block, &lower, &upper, generation)?,
        };

        self.generation = generation;
        debug!(
            address = format_args!("0x{:x}", address),
            size = block.size,
            case = %case,
            "Released block"
        );
        Ok(case)
    }

    fn validate_release(&self, address: Address) -> Result<Releasable, ReleaseRejection> {
        if address.checked_sub(TAG_SIZE) == Some(self.region.header_offset()) {
            return Err(ReleaseRejection::HeaderStorage);
        }
        if address < 2 * TAG_SIZE || address >= self.region.region_end_sentinel() {
            return Err(ReleaseRejection::OutOfRegion);
        }
        if address % GRANULE != 0 {
            return Err(ReleaseRejection::Misaligned);
        }

        let start_tag = address - TAG_SIZE;

        let start = self
            .region
            .tag(start_tag)
            .ok_or(ReleaseRejection::MissingStartTag)?;
        if start.status != Status::Allocated {
            return Err(ReleaseRejection::NotAllocated);
        }
        if start.size == 0 {
            return Err(ReleaseRejection::ZeroSize);
        }
        if !self.region.is_payload_start(address) {
            return Err(ReleaseRejection::NotPayloadStart);
        }

        let size = start.size;
        let end_tag = address
            .checked_add(size)
            .filter(|&end| end < self.region.region_end_sentinel())
            .ok_or(ReleaseRejection::OutOfRegion)?;
        match self.region.tag(end_tag) {
            Some(end) if end.status == Status::Allocated && end.size == size => {}
            _ => return Err(ReleaseRejection::EndTagMismatch),
        }

        Ok(Releasable {
            address,
            size,
            start_tag,
            end_tag,
        })
    }

    fn lower_free_neighbor(&self, block: &Releasable) -> HeapResult<Option<Neighbor>> {
        let end_tag = block.start_tag - TAG_SIZE;
        let tag = self.region.expect_tag(end_tag)?;
        if !tag.is_free() {
            return Ok(None);
        }

        let address = end_tag
            .checked_sub(tag.size)
            .ok_or_else(|| HeapError::corruption(end_tag, "lower neighbor size runs past region start"))?;
        Ok(Some(Neighbor {
            address,
            size: tag.size,
            start_tag: address - TAG_SIZE,
            end_tag,
        }))
    }

    fn upper_free_neighbor(&self, block: &Releasable) -> HeapResult<Option<Neighbor>> {
        let start_tag = block.end_tag + TAG_SIZE;
        let tag = self.region.expect_tag(start_tag)?;
        if !tag.is_free() {
            return Ok(None);
        }

        let address = start_tag + TAG_SIZE;
        Ok(Some(Neighbor {
            address,
            size: tag.size,
            start_tag,
            end_tag: address + tag.size,
        }))
    }

    fn release_isolated(&mut self, block: &Releasable, generation: Generation) -> HeapResult<Coalesce> {
        self.region.push_front(block.address)?;
        self.region
            .stamp(block.start_tag, Edge::Start, Status::Free, block.size, generation);
        self.region
            .stamp(block.end_tag, Edge::End, Status::Free, block.size, generation);
        Ok(Coalesce::Isolated)
    }

    /// Grow the lower neighbor in place; its node and links stay as they are
    fn merge_lower(
        &mut self,
        block: &Releasable,
        lower: &Neighbor,
        generation: Generation,
    ) -> HeapResult<Coalesce> {
        let size = lower.size + block.size + BLOCK_OVERHEAD;

        self.region.retire(lower.end_tag, Edge::End, generation)?;
        self.region.retire(block.start_tag, Edge::Start, generation)?;
        self.region
            .stamp(lower.start_tag, Edge::Start, Status::Free, size, generation);
        self.region
            .stamp(block.end_tag, Edge::End, Status::Free, size, generation);
        Ok(Coalesce::WithLower)
    }

    /// Absorb the upper neighbor; the merged block starts here, so its node moves down
    fn merge_upper(
        &mut self,
        block: &Releasable,
        upper: &Neighbor,
        generation: Generation,
    ) -> HeapResult<Coalesce> {
        let size = block.size + upper.size + BLOCK_OVERHEAD;

        self.region.relocate(upper.address, block.address)?;
        self.region.retire(block.end_tag, Edge::End, generation)?;
        self.region.retire(upper.start_tag, Edge::Start, generation)?;
        self.region
            .stamp(block.start_tag, Edge::Start, Status::Free, size, generation);
        self.region
            .stamp(upper.end_tag, Edge::End, Status::Free, size, generation);
        Ok(Coalesce::WithUpper)
    }

    /// Join lower, released and upper blocks; the upper node leaves the list
    fn merge_both(
        &mut self,
        block: &Releasable,
        lower: &Neighbor,
        upper: &Neighbor,
        generation: Generation,
    ) -> HeapResult<Coalesce> {
        let size = lower.size + block.size + upper.size + 2 * BLOCK_OVERHEAD;

        self.region.unlink(upper.address)?;
        for (offset, edge) in [
            (lower.end_tag, Edge::End),
            (block.start_tag, Edge::Start),
            (block.end_tag, Edge::End),
            (upper.start_tag, Edge::Start),
        ] {
            self.region.retire(offset, edge, generation)?;
        }
        self.region
            .stamp(lower.start_tag, Edge::Start, Status::Free, size, generation);
        self.region
            .stamp(upper.end_tag, Edge::End, Status::Free, size, generation);
        Ok(Coalesce::WithBoth)
    }
}
