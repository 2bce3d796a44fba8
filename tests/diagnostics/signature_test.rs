/*!
 * Signature Checker Tests
 * Dangling addresses are flagged by retired markers
 */

use tagheap::diagnostics::check_signature;
use tagheap::memory::{Edge, Signature};
use tagheap::{HeapConfig, TagHeap};

#[test]
fn test_live_blocks_pass() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    let address = heap.allocate(0x40).unwrap();
    let size = heap.block_size(address).unwrap();

    assert!(check_signature(&heap, address - 0x10, Edge::Start, "alloc").is_ok());
    assert!(check_signature(&heap, address + size, Edge::End, "alloc").is_ok());
}

#[test]
fn test_dangling_end_tag_carries_event() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    let upper = heap.allocate(0x40).unwrap();
    let lower = heap.allocate(0x40).unwrap();
    heap.release(lower).unwrap();

    let event = heap.generation() + 1;
    heap.release(upper).unwrap();

    // Both tags between the two blocks were retired by the same merge
    let err = check_signature(&heap, upper - 0x20, Edge::End, "dangling").unwrap_err();
    assert_eq!(err.found, Some(Signature::Retired { edge: Edge::End, event }));
    let err = check_signature(&heap, upper - 0x10, Edge::Start, "dangling").unwrap_err();
    assert_eq!(err.found, Some(Signature::Retired { edge: Edge::Start, event }));
}

#[test]
fn test_checker_never_changes_release_outcome() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    let address = heap.allocate(0x40).unwrap();

    assert!(check_signature(&heap, address, Edge::Start, "payload").is_err());
    assert!(heap.release(address).is_ok());
}
