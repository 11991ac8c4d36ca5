//! Integration test: concurrent allocation into shared regions.
//!
//! Several threads allocate fixed-size blocks from one region and report
//! every served range over a channel. Afterwards all ranges must be pairwise
//! disjoint and the region's used byte count must match the number of
//! served requests exactly (no lost cursor updates).

use std::sync::Arc;
use std::thread;

use crossbeam_channel::unbounded;
use nuke_arena::{ConcurrentRegion, MonotonicRegion, Region, RegionConfig, SlabRegion};
use nuke_test_utils::{assert_disjoint, Span};

const THREADS: usize = 8;
const PER_THREAD: usize = 500;
const BLOCK: usize = 16;

/// Hammer `region` from `THREADS` threads and return every served span.
fn hammer<R: Region + Sync>(region: &R) -> Vec<Span> {
    let (tx, rx) = unbounded();
    thread::scope(|s| {
        for _ in 0..THREADS {
            let tx = tx.clone();
            s.spawn(move || {
                for _ in 0..PER_THREAD {
                    if let Some(p) = region.alloc(BLOCK, BLOCK) {
                        // SAFETY: BLOCK bytes were just handed to this thread.
                        unsafe { p.as_ptr().write_bytes(0xEE, BLOCK) };
                        tx.send(Span::new(p, BLOCK)).unwrap();
                    }
                }
            });
        }
    });
    drop(tx);
    rx.into_iter().collect()
}

#[test]
fn slab_region_serves_every_request_without_overlap() {
    let region = SlabRegion::new(16 * 1024, 8);
    let spans = hammer(&region);
    assert_eq!(spans.len(), THREADS * PER_THREAD);
    assert_disjoint(&spans);
    assert_eq!(region.stats().used_bytes, THREADS * PER_THREAD * BLOCK);
}

#[test]
fn concurrent_monotonic_region_serves_every_request_without_overlap() {
    let region = ConcurrentRegion::new(MonotonicRegion::new(16 * 1024, 8));
    let spans = hammer(&region);
    assert_eq!(spans.len(), THREADS * PER_THREAD);
    assert_disjoint(&spans);
    assert_eq!(region.stats().used_bytes, THREADS * PER_THREAD * BLOCK);
}

#[test]
fn concurrent_slab_region_serves_every_request_without_overlap() {
    let region = ConcurrentRegion::new(SlabRegion::new(16 * 1024, 8));
    let spans = hammer(&region);
    assert_eq!(spans.len(), THREADS * PER_THREAD);
    assert_disjoint(&spans);
}

#[test]
fn contended_exhaustion_serves_exactly_capacity() {
    // Room for half of the requests.
    let capacity = THREADS * PER_THREAD * BLOCK / 2;
    let region = SlabRegion::new(capacity / 4, 4);
    let spans = hammer(&region);
    assert_eq!(spans.len(), THREADS * PER_THREAD / 2);
    assert_disjoint(&spans);
    assert_eq!(region.stats().used_bytes, capacity);
    assert!(region.alloc(1, 1).is_none());
}

#[test]
fn shared_region_resets_between_rounds() {
    let region = RegionConfig::slab()
        .with_buffer_size(64 * 1024)
        .with_buffer_count(2)
        .build_shared()
        .unwrap();

    for round in 0..3u64 {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let region = Arc::clone(&region);
                thread::spawn(move || {
                    let served = (0..100).filter(|_| region.alloc(32, 8).is_some());
                    served.count()
                })
            })
            .collect();
        let served: usize = workers.into_iter().map(|w| w.join().unwrap()).sum();
        assert_eq!(served, 400);
        assert_eq!(region.generation(), round);

        // SAFETY: every worker has joined and dropped its addresses.
        unsafe { region.reset_shared(false) };
        assert_eq!(region.stats().used_bytes, 0);
    }
    assert_eq!(region.generation(), 3);
}
