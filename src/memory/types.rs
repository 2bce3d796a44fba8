/*!
 * Memory Types
 * Tags, free-list links and block views for the boundary-tag heap
 */

use crate::core::types::{Address, Generation, Size};
use serde::{Deserialize, Serialize};

/// Allocation status recorded in a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Free,
    Allocated,
}

impl Status {
    pub fn is_free(self) -> bool {
        self == Status::Free
    }
}

/// Which side of a payload a tag sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// Below the payload (lower address)
    Start,
    /// Above the payload (higher address)
    End,
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Edge::Start => write!(f, "start"),
            Edge::End => write!(f, "end"),
        }
    }
}

/// Diagnostic signature carried by a tag
///
/// Advisory only: the allocator never branches on it. The low sentinel reads as
/// the end edge of the region and the high sentinel as its start edge, so a block's
/// neighbor lookup sees the same kind of tag whether it borders a block or a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signature {
    Block(Edge),
    Region(Edge),
    /// A tag left in the interior of a merged block
    Retired { edge: Edge, event: Generation },
}

impl Signature {
    /// Edge of a live signature, `None` once retired
    pub fn live_edge(&self) -> Option<Edge> {
        match *self {
            Signature::Block(edge) | Signature::Region(edge) => Some(edge),
            Signature::Retired { .. } => None,
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Signature::Block(Edge::Start) => write!(f, "top_memblk"),
            Signature::Block(Edge::End) => write!(f, "end_memblk"),
            Signature::Region(Edge::Start) => write!(f, "top_region"),
            Signature::Region(Edge::End) => write!(f, "end_region"),
            Signature::Retired { edge: Edge::Start, event } => write!(f, "old_top{:03}", event),
            Signature::Retired { edge: Edge::End, event } => write!(f, "old_end{:03}", event),
        }
    }
}

/// Diagnostic marker: signature plus the generation that last wrote the tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub signature: Signature,
    pub generation: Generation,
}

/// Boundary tag bracketing a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub status: Status,
    pub size: Size,
    pub marker: Marker,
}

impl Tag {
    pub(crate) fn block(edge: Edge, status: Status, size: Size, generation: Generation) -> Self {
        Self {
            status,
            size,
            marker: Marker {
                signature: Signature::Block(edge),
                generation,
            },
        }
    }

    pub(crate) fn sentinel(edge: Edge) -> Self {
        Self {
            status: Status::Allocated,
            size: 0,
            marker: Marker {
                signature: Signature::Region(edge),
                generation: 0,
            },
        }
    }

    pub fn is_free(&self) -> bool {
        self.status.is_free()
    }

    pub fn is_allocated(&self) -> bool {
        self.status == Status::Allocated
    }
}

/// Free-list node reference: the permanent header or a free block's payload address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    Header,
    Block(Address),
}

/// Predecessor and successor of a free-list node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    pub prev: NodeRef,
    pub next: NodeRef,
}

impl Links {
    /// Links of a node alone in the list
    pub(crate) fn lone() -> Self {
        Self {
            prev: NodeRef::Header,
            next: NodeRef::Header,
        }
    }
}

/// Physical view of a block
///
/// Link fields are only reachable through the `Free` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Block {
    Allocated { address: Address, size: Size },
    Free { address: Address, size: Size, links: Links },
}

impl Block {
    pub fn address(&self) -> Address {
        match *self {
            Block::Allocated { address, .. } | Block::Free { address, .. } => address,
        }
    }

    pub fn size(&self) -> Size {
        match *self {
            Block::Allocated { size, .. } | Block::Free { size, .. } => size,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Block::Free { .. })
    }
}

/// Which physical neighbors a released block was merged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Coalesce {
    /// Neither neighbor free: pushed as a new head node
    Isolated,
    /// Absorbed into the free block below; list untouched
    WithLower,
    /// Absorbed the free block above; its node moved down to this address
    WithUpper,
    /// Joined both neighbors; the upper node left the list
    WithBoth,
}

impl std::fmt::Display for Coalesce {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Coalesce::Isolated => write!(f, "isolated"),
            Coalesce::WithLower => write!(f, "with-lower"),
            Coalesce::WithUpper => write!(f, "with-upper"),
            Coalesce::WithBoth => write!(f, "with-both"),
        }
    }
}

/// Heap statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStats {
    pub capacity: Size,
    pub usable: Size,
    pub free_bytes: Size,
    pub allocated_bytes: Size,
    pub free_blocks: usize,
    pub allocated_blocks: usize,
    pub largest_free: Size,
    /// Tags added by splits, beyond the fixed region overhead
    pub tag_overhead: Size,
}

impl HeapStats {
    /// Whether free, allocated and tag bytes add up to the usable capacity
    pub fn is_conserved(&self) -> bool {
        self.free_bytes + self.allocated_bytes + self.tag_overhead == self.usable
    }

    pub fn usage_percentage(&self) -> f64 {
        if self.usable == 0 {
            return 0.0;
        }
        (self.allocated_bytes as f64 / self.usable as f64) * 100.0
    }
}
