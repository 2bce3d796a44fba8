/*!
 * Free-List Printer
 * Front-to-back dump of the free list, checking both tags of every node
 */

use super::signature::{check_signature, SignatureMismatch};
use crate::core::limits::TAG_SIZE;
use crate::memory::{Edge, TagHeap};
use std::fmt;

const LIST_HEADER: &str = "   ---------------free list---------------";
const LIST_FOOTER: &str = "   --------------end of list--------------";
const LIST_EMPTY: &str = "   ----------free list is empty-----------";

/// Display adapter over a heap's free list
///
/// Formatting never mutates the heap. Signature mismatches found along the way
/// are logged by the checker and do not interrupt the dump.
pub struct FreeListDump<'a> {
    heap: &'a TagHeap,
}

impl<'a> FreeListDump<'a> {
    pub fn new(heap: &'a TagHeap) -> Self {
        Self { heap }
    }

    /// Run the start/end signature checks for every listed node
    pub fn mismatches(&self) -> Vec<SignatureMismatch> {
        self.heap
            .free_list()
            .flat_map(|(address, size)| {
                [
                    check_signature(self.heap, address - TAG_SIZE, Edge::Start, "prt_free_block"),
                    check_signature(self.heap, address + size, Edge::End, "prt_free_block"),
                ]
            })
            .filter_map(Result::err)
            .collect()
    }
}

impl fmt::Display for FreeListDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut nodes = self.heap.free_list().peekable();
        if nodes.peek().is_none() {
            return writeln!(f, "{}", LIST_EMPTY);
        }

        writeln!(f, "{}", LIST_HEADER)?;
        for (address, size) in nodes {
            writeln!(f, "   free block at 0x{:x} of size 0x{:x}", address, size)?;
            let _ = check_signature(self.heap, address - TAG_SIZE, Edge::Start, "prt_free_block");
            let _ = check_signature(self.heap, address + size, Edge::End, "prt_free_block");
        }
        writeln!(f, "{}", LIST_FOOTER)
    }
}
