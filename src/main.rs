/*!
 * Tagheap Demo
 *
 * Replays two allocation scenarios against a fresh region and prints the free
 * list after every step:
 * - six equal blocks released out of order, exercising every coalescing case
 * - a fragmented heap where repeated first-fit requests eat the smallest holes
 */

use miette::{IntoDiagnostic, Result};
use tracing::{error, info};

use tagheap::core::HeapConfig;
use tagheap::monitoring::ScenarioSpan;
use tagheap::{init_tracing, verify, FreeListDump, HeapError, TagHeap};

fn main() -> Result<()> {
    init_tracing();

    let config = HeapConfig::from_env();
    info!(capacity = config.capacity, "Tagheap demo starting");

    coalescing_scenario(config)?;
    fragmentation_scenario(config)?;

    info!("Tagheap demo finished");
    Ok(())
}

/// Create the region; failing to reserve it is the one fatal condition
fn fresh_heap(config: HeapConfig) -> Result<TagHeap> {
    TagHeap::new(config).map_err(|e| {
        if matches!(e, HeapError::RegionUnavailable { .. }) {
            error!(error = %e, "Backing region unavailable");
        }
        e.into()
    })
}

fn print_list(heap: &TagHeap) {
    print!("{}", FreeListDump::new(heap));
}

fn allocate(heap: &mut TagHeap, size: usize) -> Option<usize> {
    let address = heap.allocate(size);
    match address {
        Some(address) => println!("alloc 0x{:x} -> 0x{:x}", size, address),
        None => println!("alloc 0x{:x} -> none", size),
    }
    print_list(heap);
    address
}

fn release(heap: &mut TagHeap, address: Option<usize>) {
    let Some(address) = address else {
        println!("skip release of failed allocation");
        return;
    };
    match heap.release(address) {
        Ok(case) => println!("release 0x{:x} -> ok ({})", address, case),
        Err(e) => println!("release 0x{:x} -> invalid ({})", address, e),
    }
    print_list(heap);
}

fn check(heap: &TagHeap) -> Result<()> {
    if let Err(violations) = verify(heap) {
        for violation in &violations {
            println!("*** {}", violation);
        }
        miette::bail!("heap layout verification failed with {} violations", violations.len());
    }
    Ok(())
}

fn coalescing_scenario(config: HeapConfig) -> Result<()> {
    let mut span = ScenarioSpan::new("coalescing");
    let mut heap = fresh_heap(config)?;
    println!("== {} ==", span.name());
    print_list(&heap);

    let whole = span.step(|| allocate(&mut heap, 0x640));
    span.step(|| release(&mut heap, whole));

    let sizes = [0x100, 0x100, 0x100, 0x100, 0x100, 0xa0];
    let ptrs: Vec<_> = sizes
        .iter()
        .map(|&size| span.step(|| allocate(&mut heap, size)))
        .collect();
    span.step(|| allocate(&mut heap, 0xa0));

    // ptr1, ptr4, ptr3, ptr5, ptr2, ptr6
    for index in [0, 3, 2, 4, 1, 5] {
        span.step(|| release(&mut heap, ptrs[index]));
    }

    println!("release ptr2 again");
    span.step(|| release(&mut heap, ptrs[1]));

    println!("free bytes: 0x{:x}", heap.free_bytes_total());
    check(&heap)
}

fn fragmentation_scenario(config: HeapConfig) -> Result<()> {
    let mut span = ScenarioSpan::new("fragmentation");
    let mut heap = fresh_heap(config)?;
    println!("== {} ==", span.name());

    let sizes = [0x60, 0x50, 0x50, 0x40, 0x40, 0x30, 0x30, 0x20, 0x20, 0x10, 0x10, 0x293];
    let ptrs: Vec<_> = sizes
        .iter()
        .map(|&size| span.step(|| allocate(&mut heap, size)))
        .collect();

    for index in [1, 3, 5, 7, 9] {
        span.step(|| release(&mut heap, ptrs[index]));
    }

    for _ in 0..5 {
        span.step(|| allocate(&mut heap, 0x20));
    }

    check(&heap)?;
    let stats = serde_json::to_string_pretty(&heap.stats()).into_diagnostic()?;
    println!("{}", stats);
    Ok(())
}
