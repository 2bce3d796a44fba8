/*!
 * Region Layout
 *
 * The region is a run of 16-byte granules. Metadata lives in a granule-indexed
 * slot table beside the caller-visible byte buffer, so a payload write can never
 * clobber a tag or a link field.
 *
 * ```text
 *   0x000  region-start sentinel   (reads as an end tag)
 *   0x010  start tag               size = capacity - 80
 *   0x020  payload                 first granule holds the free-list node
 *    ...
 *   C-0x30 end tag                 size = capacity - 80
 *   C-0x20 region-end sentinel     (reads as a start tag)
 *   C-0x10 free-list header
 * ```
 */

use super::types::{Block, Edge, Links, NodeRef, Signature, Status, Tag};
use crate::core::errors::HeapError;
use crate::core::limits::{GRANULE, REGION_OVERHEAD, TAG_SIZE};
use crate::core::types::{granule, Address, Generation, HeapResult, Size};
use crate::core::HeapConfig;

/// Metadata view of one granule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// Caller data, or interior of a free block
    Payload,
    Tag(Tag),
    /// Link fields in the first payload granule of a free block
    Node(Links),
    Header(Links),
}

/// Backing store and metadata for one heap
#[derive(Debug)]
pub(crate) struct Region {
    bytes: Box<[u8]>,
    slots: Vec<Slot>,
}

impl Region {
    /// Reserve the backing store and lay out a single free block
    pub fn new(config: &HeapConfig) -> HeapResult<Self> {
        config.validate()?;
        let capacity = config.capacity;
        let granules = capacity / GRANULE;

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| HeapError::RegionUnavailable { capacity })?;
        bytes.resize(capacity, 0u8);

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(granules)
            .map_err(|_| HeapError::RegionUnavailable { capacity })?;
        slots.resize(granules, Slot::Payload);

        let mut region = Self {
            bytes: bytes.into_boxed_slice(),
            slots,
        };
        region.lay_out();
        Ok(region)
    }

    fn lay_out(&mut self) {
        let size = self.usable();
        let first = self.first_payload();

        self.put_tag(0, Tag::sentinel(Edge::End));
        self.put_tag(first - TAG_SIZE, Tag::block(Edge::Start, Status::Free, size, 0));
        self.put_tag(first + size, Tag::block(Edge::End, Status::Free, size, 0));
        self.put_tag(self.region_end_sentinel(), Tag::sentinel(Edge::Start));

        let header = self.header_offset();
        self.slots[granule(first)] = Slot::Node(Links::lone());
        self.slots[granule(header)] = Slot::Header(Links {
            prev: NodeRef::Block(first),
            next: NodeRef::Block(first),
        });
    }

    pub fn capacity(&self) -> Size {
        self.bytes.len()
    }

    /// Payload bytes of the initial block
    pub fn usable(&self) -> Size {
        self.capacity() - REGION_OVERHEAD
    }

    /// Payload address of the lowest block
    pub fn first_payload(&self) -> Address {
        2 * TAG_SIZE
    }

    pub fn header_offset(&self) -> usize {
        self.capacity() - GRANULE
    }

    pub fn region_end_sentinel(&self) -> usize {
        self.header_offset() - TAG_SIZE
    }

    pub(crate) fn slot(&self, offset: usize) -> Option<&Slot> {
        self.slots.get(granule(offset))
    }

    /// Tag stored at `offset`, if that granule holds one
    pub fn tag(&self, offset: usize) -> Option<&Tag> {
        match self.slot(offset)? {
            Slot::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    pub(crate) fn expect_tag(&self, offset: usize) -> HeapResult<Tag> {
        self.tag(offset)
            .copied()
            .ok_or_else(|| HeapError::corruption(offset, "expected a tag"))
    }

    pub(crate) fn tag_mut(&mut self, offset: usize) -> HeapResult<&mut Tag> {
        match self.slots.get_mut(granule(offset)) {
            Some(Slot::Tag(tag)) => Ok(tag),
            _ => Err(HeapError::corruption(offset, "expected a tag")),
        }
    }

    pub(crate) fn put_tag(&mut self, offset: usize, tag: Tag) {
        self.slots[granule(offset)] = Slot::Tag(tag);
    }

    /// Rewrite a live block tag in place
    pub(crate) fn stamp(
        &mut self,
        offset: usize,
        edge: Edge,
        status: Status,
        size: Size,
        generation: Generation,
    ) {
        self.put_tag(offset, Tag::block(edge, status, size, generation));
    }

    /// Mark a tag left inside a merged block so a dangling address can't pass for a block
    pub(crate) fn retire(&mut self, offset: usize, edge: Edge, event: Generation) -> HeapResult<()> {
        let tag = self.tag_mut(offset)?;
        tag.status = Status::Free;
        tag.marker.signature = Signature::Retired { edge, event };
        tag.marker.generation = event;
        Ok(())
    }

    /// Drop whatever metadata the granule at `offset` holds
    pub(crate) fn clear(&mut self, offset: usize) {
        if let Some(slot) = self.slots.get_mut(granule(offset)) {
            *slot = Slot::Payload;
        }
    }

    pub(crate) fn links(&self, node: NodeRef) -> HeapResult<Links> {
        let offset = self.node_offset(node);
        match self.slot(offset) {
            Some(Slot::Node(links)) | Some(Slot::Header(links)) => Ok(*links),
            _ => Err(HeapError::corruption(offset, "expected free-list links")),
        }
    }

    pub(crate) fn set_links(&mut self, node: NodeRef, links: Links) {
        let slot = match node {
            NodeRef::Header => Slot::Header(links),
            NodeRef::Block(_) => Slot::Node(links),
        };
        let offset = self.node_offset(node);
        self.slots[granule(offset)] = slot;
    }

    fn node_offset(&self, node: NodeRef) -> usize {
        match node {
            NodeRef::Header => self.header_offset(),
            NodeRef::Block(address) => address,
        }
    }

    /// Whether the granule at `address` can begin a payload
    pub(crate) fn is_payload_start(&self, address: Address) -> bool {
        matches!(self.slot(address), Some(Slot::Payload) | Some(Slot::Node(_)))
    }

    /// Typed view of the live block whose payload starts at `address`
    pub fn block(&self, address: Address) -> Option<Block> {
        let start = self.tag(address.checked_sub(TAG_SIZE)?)?;
        if start.size == 0 || !self.is_payload_start(address) {
            return None;
        }
        let end = self.tag(address.checked_add(start.size)?)?;
        if end.size != start.size || end.status != start.status {
            return None;
        }

        match start.status {
            Status::Allocated => Some(Block::Allocated {
                address,
                size: start.size,
            }),
            Status::Free => self.links(NodeRef::Block(address)).ok().map(|links| Block::Free {
                address,
                size: start.size,
                links,
            }),
        }
    }

    /// Walk blocks in address order, driven by recorded sizes
    pub fn blocks(&self) -> BlockIter<'_> {
        BlockIter {
            region: self,
            next_start: TAG_SIZE,
        }
    }

    pub(crate) fn bytes(&self, address: Address, size: Size) -> &[u8] {
        &self.bytes[address..address + size]
    }

    pub(crate) fn bytes_mut(&mut self, address: Address, size: Size) -> &mut [u8] {
        &mut self.bytes[address..address + size]
    }
}

/// Address-ordered block iterator
///
/// Stops at the region-end sentinel, or early if a tag is missing or inconsistent.
pub struct BlockIter<'a> {
    region: &'a Region,
    next_start: usize,
}

impl Iterator for BlockIter<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.next_start >= self.region.region_end_sentinel() {
            return None;
        }
        let address = self.next_start + TAG_SIZE;
        let block = self.region.block(address)?;
        self.next_start = address + block.size() + TAG_SIZE;
        Some(block)
    }
}
