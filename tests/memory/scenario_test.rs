/*!
 * Scenario Tests
 * Full replays of the coalescing and fragmentation driver sequences
 */

use pretty_assertions::assert_eq;
use tagheap::diagnostics::verify;
use tagheap::{Coalesce, HeapConfig, ReleaseRejection, TagHeap};

fn list(heap: &TagHeap) -> Vec<(usize, usize)> {
    heap.free_list().collect()
}

#[test]
fn test_coalescing_scenario() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
    assert_eq!(list(&heap), vec![(0x20, 0x640)]);

    let whole = heap.allocate(0x640).unwrap();
    assert_eq!(list(&heap), vec![]);
    assert_eq!(heap.release(whole), Ok(Coalesce::Isolated));
    assert_eq!(list(&heap), vec![(0x20, 0x640)]);

    let ptr1 = heap.allocate(0x100).unwrap();
    let ptr2 = heap.allocate(0x100).unwrap();
    let ptr3 = heap.allocate(0x100).unwrap();
    let ptr4 = heap.allocate(0x100).unwrap();
    let ptr5 = heap.allocate(0x100).unwrap();
    let ptr6 = heap.allocate(0xa0).unwrap();
    assert_eq!(
        [ptr1, ptr2, ptr3, ptr4, ptr5, ptr6],
        [0x560, 0x440, 0x320, 0x200, 0xe0, 0x20]
    );
    assert_eq!(list(&heap), vec![]);
    assert_eq!(heap.allocate(0xa0), None);

    let steps = [
        (ptr1, Coalesce::Isolated, vec![(0x560, 0x100)]),
        (ptr4, Coalesce::Isolated, vec![(0x200, 0x100), (0x560, 0x100)]),
        (ptr3, Coalesce::WithLower, vec![(0x200, 0x220), (0x560, 0x100)]),
        (ptr5, Coalesce::WithUpper, vec![(0xe0, 0x340), (0x560, 0x100)]),
        (ptr2, Coalesce::WithBoth, vec![(0xe0, 0x580)]),
        (ptr6, Coalesce::WithUpper, vec![(0x20, 0x640)]),
    ];
    for (address, case, expected) in steps {
        assert_eq!(heap.release(address), Ok(case), "release 0x{:x}", address);
        assert_eq!(list(&heap), expected, "after release 0x{:x}", address);

        let mut reversed = expected.clone();
        reversed.reverse();
        assert_eq!(heap.free_list_rev().collect::<Vec<_>>(), reversed);
        assert_eq!(verify(&heap), Ok(()));
    }

    match heap.release(ptr2) {
        Err(tagheap::HeapError::InvalidRelease { reason, .. }) => {
            assert_eq!(reason, ReleaseRejection::NotAllocated)
        }
        other => panic!("expected invalid release, got {:?}", other),
    }
    assert_eq!(heap.free_bytes_total(), 0x640);
}

#[test]
fn test_fragmentation_scenario() {
    let mut heap = TagHeap::new(HeapConfig::default()).unwrap();

    let sizes = [0x60, 0x50, 0x50, 0x40, 0x40, 0x30, 0x30, 0x20, 0x20, 0x10, 0x10, 0x293];
    let ptrs: Vec<_> = sizes.iter().map(|&size| heap.allocate(size).unwrap()).collect();
    assert_eq!(
        ptrs,
        vec![0x600, 0x590, 0x520, 0x4c0, 0x460, 0x410, 0x3c0, 0x380, 0x340, 0x310, 0x2e0, 0x20]
    );
    assert_eq!(heap.block_size(0x20), Some(0x2a0));
    assert_eq!(list(&heap), vec![]);

    for index in [1, 3, 5, 7, 9] {
        assert_eq!(heap.release(ptrs[index]), Ok(Coalesce::Isolated));
    }
    assert_eq!(
        list(&heap),
        vec![(0x310, 0x10), (0x380, 0x20), (0x410, 0x30), (0x4c0, 0x40), (0x590, 0x50)]
    );

    let expected = [
        (0x380, vec![(0x310, 0x10), (0x410, 0x30), (0x4c0, 0x40), (0x590, 0x50)]),
        (0x410, vec![(0x310, 0x10), (0x4c0, 0x40), (0x590, 0x50)]),
        (0x4c0, vec![(0x310, 0x10), (0x590, 0x50)]),
        (0x5c0, vec![(0x310, 0x10), (0x590, 0x10)]),
    ];
    for (address, remaining) in expected {
        assert_eq!(heap.allocate(0x20), Some(address));
        assert_eq!(list(&heap), remaining);
        assert_eq!(verify(&heap), Ok(()));
    }

    assert_eq!(heap.allocate(0x20), None);
    assert_eq!(heap.free_bytes_total(), 0x20);
    assert!(heap.stats().is_conserved());
}
