/*!
 * Property Tests
 * Invariants over random allocate/release sequences
 */

use proptest::prelude::*;
use tagheap::diagnostics::verify;
use tagheap::{HeapConfig, TagHeap};

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    /// Release the outstanding allocation at this index, modulo the count
    Release(usize),
    /// Release an address that is not outstanding
    Bogus(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (1usize..0x200).prop_map(Op::Allocate),
        2 => any::<usize>().prop_map(Op::Release),
        1 => (0usize..0x700).prop_map(Op::Bogus),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_conservation_and_layout_hold(ops in prop::collection::vec(op(), 1..64)) {
        let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
        let mut live: Vec<(usize, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(size) => {
                    if let Some(address) = heap.allocate(size) {
                        let block = heap.block_size(address).unwrap();
                        prop_assert!(block >= size);
                        prop_assert_eq!(block % 16, 0);
                        live.push((address, block));
                    }
                }
                Op::Release(index) if !live.is_empty() => {
                    let (address, _) = live.swap_remove(index % live.len());
                    prop_assert!(heap.release(address).is_ok());
                }
                Op::Release(_) => {}
                Op::Bogus(address) => {
                    if !live.iter().any(|&(a, _)| a == address) {
                        let before: Vec<_> = heap.free_list().collect();
                        prop_assert!(heap.release(address).is_err());
                        prop_assert_eq!(heap.free_list().collect::<Vec<_>>(), before);
                    }
                }
            }

            prop_assert_eq!(verify(&heap), Ok(()));

            let stats = heap.stats();
            prop_assert!(stats.is_conserved());
            prop_assert_eq!(heap.free_bytes_total(), stats.free_bytes);
            prop_assert_eq!(stats.allocated_bytes, live.iter().map(|&(_, s)| s).sum::<usize>());
        }

        for (address, _) in live {
            prop_assert!(heap.release(address).is_ok());
        }
        prop_assert_eq!(heap.free_list().collect::<Vec<_>>(), vec![(0x20, 0x640)]);
    }

    #[test]
    fn prop_round_trip_restores_list(
        prefix in prop::collection::vec(1usize..0x100, 0..6),
        size in 1usize..0x400,
    ) {
        let mut heap = TagHeap::new(HeapConfig::default()).unwrap();
        for s in prefix {
            heap.allocate(s);
        }

        let before: Vec<_> = heap.free_list().collect();
        if let Some(address) = heap.allocate(size) {
            prop_assert!(heap.release(address).is_ok());
            prop_assert_eq!(heap.free_list().collect::<Vec<_>>(), before);
            prop_assert!(heap.release(address).is_err());
        }
    }
}
