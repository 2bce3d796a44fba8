/*!
 * Shared Heap Tests
 * Concurrent access through the coarse region lock
 */

use std::thread;
use tagheap::diagnostics::verify;
use tagheap::{HeapConfig, SharedHeap};

#[test]
fn test_threads_hold_disjoint_blocks() {
    let heap = SharedHeap::new(HeapConfig::with_capacity(32 * 1024)).unwrap();

    let handles: Vec<_> = (0..8u8)
        .map(|id| {
            let heap = heap.clone();
            thread::spawn(move || {
                let address = heap.allocate(64).unwrap();
                heap.with_heap(|h| h.payload_mut(address).unwrap().fill(id));
                thread::yield_now();
                let intact = heap.with_heap(|h| h.payload(address).unwrap().iter().all(|&b| b == id));
                heap.release(address).unwrap();
                intact
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert_eq!(heap.with_heap(|h| verify(h)), Ok(()));
    assert_eq!(heap.free_bytes_total(), 32 * 1024 - 80);
}
