/*!
 * Layout Verifier
 *
 * Checks the tag and free-list invariants of a quiescent heap:
 * - every block's start and end tags agree, and the walk lands on the region-end sentinel
 * - no two free blocks are physical neighbors
 * - the free list is circular both ways and its links agree with each other
 * - the listed nodes are exactly the physically free blocks
 * - free + allocated + tag bytes add up to the usable capacity
 */

use crate::core::limits::{BLOCK_OVERHEAD, GRANULE, TAG_SIZE};
use crate::core::types::{Address, Size};
use crate::memory::{Block, NodeRef, TagHeap};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::error;

/// One broken invariant
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Violation {
    #[error("no tag at offset 0x{offset:x}")]
    MissingTag { offset: usize },

    #[error("block at 0x{address:x}: start tag records 0x{start:x}, end tag 0x{end:x}")]
    SizeMismatch { address: Address, start: Size, end: Size },

    #[error("block at 0x{address:x}: start and end tags disagree on status")]
    StatusMismatch { address: Address },

    #[error("block walk stopped at 0x{offset:x} instead of the region-end sentinel")]
    WalkOverrun { offset: usize },

    #[error("free blocks at 0x{lower:x} and 0x{upper:x} are adjacent")]
    AdjacentFree { lower: Address, upper: Address },

    #[error("free list does not return to the header")]
    NotCircular,

    #[error("free-list links around 0x{address:x} are inconsistent")]
    BrokenLink { address: Address },

    #[error("listed node 0x{address:x} is not a free block")]
    ListedNotFree { address: Address },

    #[error("free block at 0x{address:x} is missing from the free list")]
    Unlisted { address: Address },

    #[error("accounted {accounted} bytes of {usable} usable")]
    Conservation { accounted: Size, usable: Size },
}

/// Verify a heap between calls
pub fn verify(heap: &TagHeap) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    let blocks = walk(heap, &mut violations);
    check_adjacency(&blocks, &mut violations);
    check_free_list(heap, &blocks, &mut violations);
    check_conservation(heap, &blocks, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        for violation in &violations {
            error!(%violation, "Heap layout violation");
        }
        Err(violations)
    }
}

/// Physical walk by recorded sizes; stops at the first unreadable block
fn walk(heap: &TagHeap, violations: &mut Vec<Violation>) -> Vec<Block> {
    let end_sentinel = heap.header_offset() - TAG_SIZE;
    let mut blocks = Vec::new();
    let mut offset = TAG_SIZE;

    while offset < end_sentinel {
        let Some(start) = heap.tag(offset) else {
            violations.push(Violation::MissingTag { offset });
            return blocks;
        };
        let address = offset + TAG_SIZE;
        let end_offset = address + start.size;

        let Some(end) = heap.tag(end_offset) else {
            violations.push(Violation::MissingTag { offset: end_offset });
            return blocks;
        };
        if start.size == 0 || end.size != start.size {
            violations.push(Violation::SizeMismatch {
                address,
                start: start.size,
                end: end.size,
            });
            return blocks;
        }
        if end.status != start.status {
            violations.push(Violation::StatusMismatch { address });
            return blocks;
        }

        blocks.push(match heap.block(address) {
            Some(block) => block,
            None if start.is_free() => {
                // Free by its tags but carrying no node
                violations.push(Violation::Unlisted { address });
                Block::Allocated {
                    address,
                    size: start.size,
                }
            }
            None => Block::Allocated {
                address,
                size: start.size,
            },
        });
        offset = end_offset + TAG_SIZE;
    }

    if offset != end_sentinel {
        violations.push(Violation::WalkOverrun { offset });
    }
    blocks
}

fn check_adjacency(blocks: &[Block], violations: &mut Vec<Violation>) {
    for pair in blocks.windows(2) {
        if pair[0].is_free() && pair[1].is_free() {
            violations.push(Violation::AdjacentFree {
                lower: pair[0].address(),
                upper: pair[1].address(),
            });
        }
    }
}

fn check_free_list(heap: &TagHeap, blocks: &[Block], violations: &mut Vec<Violation>) {
    // A list longer than the region has granules must be looping
    let limit = heap.capacity() / GRANULE;
    let forward: Vec<Address> = heap.free_list().take(limit + 1).map(|(a, _)| a).collect();
    if forward.len() > limit {
        violations.push(Violation::NotCircular);
        return;
    }

    let mut backward: Vec<Address> = heap.free_list_rev().take(limit + 1).map(|(a, _)| a).collect();
    backward.reverse();
    if backward != forward {
        violations.push(Violation::NotCircular);
    }

    let mut listed = BTreeSet::new();
    for (i, &address) in forward.iter().enumerate() {
        if !listed.insert(address) {
            violations.push(Violation::NotCircular);
            return;
        }

        let Some(Block::Free { links, .. }) = heap.block(address) else {
            violations.push(Violation::ListedNotFree { address });
            continue;
        };
        let prev = match i {
            0 => NodeRef::Header,
            _ => NodeRef::Block(forward[i - 1]),
        };
        let next = forward
            .get(i + 1)
            .map_or(NodeRef::Header, |&a| NodeRef::Block(a));
        if links.prev != prev || links.next != next {
            violations.push(Violation::BrokenLink { address });
        }
    }

    for block in blocks.iter().filter(|b| b.is_free()) {
        if !listed.contains(&block.address()) {
            violations.push(Violation::Unlisted {
                address: block.address(),
            });
        }
    }
}

fn check_conservation(heap: &TagHeap, blocks: &[Block], violations: &mut Vec<Violation>) {
    if blocks.is_empty() {
        return;
    }
    let payload: Size = blocks.iter().map(Block::size).sum();
    let accounted = payload + (blocks.len() - 1) * BLOCK_OVERHEAD;
    if accounted != heap.usable() {
        violations.push(Violation::Conservation {
            accounted,
            usable: heap.usable(),
        });
    }
}
