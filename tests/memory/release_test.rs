/*!
 * Release Tests
 * Validation of release requests and the four coalescing cases
 */

use pretty_assertions::assert_eq;
use tagheap::{Coalesce, HeapConfig, HeapError, ReleaseRejection, TagHeap};

fn heap() -> TagHeap {
    TagHeap::new(HeapConfig::default()).unwrap()
}

fn list(heap: &TagHeap) -> Vec<(usize, usize)> {
    heap.free_list().collect()
}

fn rejection(result: Result<Coalesce, HeapError>) -> ReleaseRejection {
    match result {
        Err(HeapError::InvalidRelease { reason, .. }) => reason,
        other => panic!("expected invalid release, got {:?}", other),
    }
}

/// Three allocated blocks `[low, mid, high]` in address order, with the
/// remainder of the region still free below them
fn three_blocks(heap: &mut TagHeap) -> (usize, usize, usize) {
    let high = heap.allocate(0x40).unwrap();
    let mid = heap.allocate(0x40).unwrap();
    let low = heap.allocate(0x40).unwrap();
    let _floor = heap.allocate(0x10).unwrap();
    (low, mid, high)
}

#[test]
fn test_isolated_release_pushes_front() {
    let mut heap = heap();
    let (_, mid, _) = three_blocks(&mut heap);
    let before = list(&heap);

    assert_eq!(heap.release(mid), Ok(Coalesce::Isolated));
    let after = list(&heap);
    assert_eq!(after[0], (mid, 0x40));
    assert_eq!(&after[1..], &before[..]);
}

#[test]
fn test_merge_with_lower_keeps_list_length() {
    let mut heap = heap();
    let (low, mid, _) = three_blocks(&mut heap);
    heap.release(low).unwrap();
    let count = list(&heap).len();

    assert_eq!(heap.release(mid), Ok(Coalesce::WithLower));
    assert_eq!(list(&heap).len(), count);
    assert_eq!(list(&heap)[0], (low, 0x40 + 0x40 + 0x20));
}

#[test]
fn test_merge_with_upper_relocates_node() {
    let mut heap = heap();
    let (low, mid, _) = three_blocks(&mut heap);
    heap.release(mid).unwrap();

    assert_eq!(heap.release(low), Ok(Coalesce::WithUpper));
    assert_eq!(list(&heap)[0], (low, 0xa0));
    assert!(heap.free_list().all(|(address, _)| address != mid));
}

#[test]
fn test_merge_with_both_drops_upper_node() {
    let mut heap = heap();
    let (low, mid, high) = three_blocks(&mut heap);
    heap.release(low).unwrap();
    heap.release(high).unwrap();
    let count = list(&heap).len();

    assert_eq!(heap.release(mid), Ok(Coalesce::WithBoth));
    assert_eq!(list(&heap).len(), count - 1);
    assert!(list(&heap).contains(&(low, 3 * 0x40 + 2 * 0x20)));
}

#[test]
fn test_double_release_after_merge_is_invalid() {
    let mut heap = heap();
    let (low, mid, _) = three_blocks(&mut heap);
    heap.release(low).unwrap();
    heap.release(mid).unwrap();

    // mid now lies inside the merged free block
    let before = list(&heap);
    assert_eq!(rejection(heap.release(mid)), ReleaseRejection::NotAllocated);
    assert_eq!(rejection(heap.release(low)), ReleaseRejection::NotAllocated);
    assert_eq!(list(&heap), before);
}

#[test]
fn test_interior_address_is_invalid() {
    let mut heap = heap();
    let (_, mid, _) = three_blocks(&mut heap);

    let result = heap.release(mid + 0x20);
    assert!(result.as_ref().unwrap_err().is_invalid_release());
    assert!(heap.is_allocated(mid));
}

#[test]
fn test_rejection_leaves_generation_untouched() {
    let mut heap = heap();
    let address = heap.allocate(0x40).unwrap();
    let generation = heap.generation();

    assert!(heap.release(address + 0x10).is_err());
    assert_eq!(heap.generation(), generation);
    assert!(heap.release(address).is_ok());
    assert_eq!(heap.generation(), generation + 1);
}
