/*!
 * Free-List Dump Tests
 */

use pretty_assertions::assert_eq;
use tagheap::{FreeListDump, HeapConfig, TagHeap};

#[test]
fn test_dump_follows_coalescing() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    let ptrs: Vec<_> = (0..5).map(|_| heap.allocate(0x100).unwrap()).collect();
    heap.allocate(0xa0).unwrap();

    heap.release(ptrs[0]).unwrap();
    heap.release(ptrs[3]).unwrap();

    let expected = [
        "   ---------------free list---------------",
        "   free block at 0x200 of size 0x100",
        "   free block at 0x560 of size 0x100",
        "   --------------end of list--------------",
    ]
    .join("\n")
        + "\n";
    assert_eq!(FreeListDump::new(&heap).to_string(), expected);
    assert_eq!(FreeListDump::new(&heap).mismatches(), vec![]);
}

#[test]
fn test_dump_is_read_only() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    heap.allocate(0x80).unwrap();
    let generation = heap.generation();
    let stats = heap.stats();

    let _ = FreeListDump::new(&heap).to_string();
    let _ = FreeListDump::new(&heap).mismatches();
    assert_eq!(heap.generation(), generation);
    assert_eq!(heap.stats(), stats);
}
