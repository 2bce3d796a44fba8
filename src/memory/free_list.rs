/*!
 * Circular Free List
 * Header-anchored, doubly linked list threaded through free payloads
 */

use super::region::Region;
use super::types::{Links, NodeRef};
use crate::core::limits::TAG_SIZE;
use crate::core::types::{Address, HeapResult, Size};

impl Region {
    /// Insert a free block right after the header
    pub(crate) fn push_front(&mut self, address: Address) -> HeapResult<()> {
        let mut header = self.links(NodeRef::Header)?;
        let old_first = header.next;
        let node = NodeRef::Block(address);

        self.set_links(
            node,
            Links {
                prev: NodeRef::Header,
                next: old_first,
            },
        );

        if old_first == NodeRef::Header {
            header.prev = node;
        } else {
            let mut first = self.links(old_first)?;
            first.prev = node;
            self.set_links(old_first, first);
        }
        header.next = node;
        self.set_links(NodeRef::Header, header);
        Ok(())
    }

    /// Splice a node out by joining its neighbors
    pub(crate) fn unlink(&mut self, address: Address) -> HeapResult<()> {
        let links = self.links(NodeRef::Block(address))?;
        self.rewire(links.prev, links.next)?;
        self.clear(address);
        Ok(())
    }

    /// Move a node to a new address, keeping its list position
    pub(crate) fn relocate(&mut self, from: Address, to: Address) -> HeapResult<()> {
        let links = self.links(NodeRef::Block(from))?;
        let moved = NodeRef::Block(to);

        self.clear(from);
        self.set_links(moved, links);
        self.rewire(links.prev, moved)?;
        self.rewire(moved, links.next)?;
        Ok(())
    }

    /// Point `prev` forward at `next` and `next` back at `prev`
    fn rewire(&mut self, prev: NodeRef, next: NodeRef) -> HeapResult<()> {
        let mut before = self.links(prev)?;
        before.next = next;
        self.set_links(prev, before);

        let mut after = self.links(next)?;
        after.prev = prev;
        self.set_links(next, after);
        Ok(())
    }

    /// Iterate free nodes from the header forwards
    pub fn free_list(&self) -> FreeListIter<'_> {
        FreeListIter {
            region: self,
            cursor: self.links(NodeRef::Header).map(|l| l.next).ok(),
            reverse: false,
        }
    }

    /// Iterate free nodes from the header backwards
    pub fn free_list_rev(&self) -> FreeListIter<'_> {
        FreeListIter {
            region: self,
            cursor: self.links(NodeRef::Header).map(|l| l.prev).ok(),
            reverse: true,
        }
    }

    /// Size recorded in the start tag of the free block at `address`
    pub(crate) fn node_size(&self, address: Address) -> HeapResult<Size> {
        Ok(self.expect_tag(address - TAG_SIZE)?.size)
    }
}

/// Free-list traversal yielding `(payload address, size)`
///
/// Ends when the traversal returns to the header. A broken link ends it early;
/// the layout verifier reports that case.
pub struct FreeListIter<'a> {
    region: &'a Region,
    cursor: Option<NodeRef>,
    reverse: bool,
}

impl Iterator for FreeListIter<'_> {
    type Item = (Address, Size);

    fn next(&mut self) -> Option<(Address, Size)> {
        let address = match self.cursor.take()? {
            NodeRef::Header => return None,
            NodeRef::Block(address) => address,
        };
        let links = self.region.links(NodeRef::Block(address)).ok()?;
        let size = self.region.node_size(address).ok()?;
        self.cursor = Some(if self.reverse { links.prev } else { links.next });
        Some((address, size))
    }
}
