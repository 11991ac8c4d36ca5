//! Property tests: alignment and disjointness of region allocations.

use nuke_arena::{MonotonicRegion, Region, SlabRegion};
use nuke_test_utils::{find_overlap, Span};
use proptest::prelude::*;

fn arb_request() -> impl Strategy<Value = (usize, usize)> {
    (0usize..96, prop::sample::select(vec![1usize, 2, 4, 8, 16]))
}

fn arb_requests() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec(arb_request(), 1..64)
}

/// Run `requests` against `region`, returning the spans that were served.
fn serve<R: Region>(region: &R, requests: &[(usize, usize)]) -> Vec<Span> {
    requests
        .iter()
        .filter_map(|&(size, align)| region.alloc(size, align).map(|p| Span::new(p, size)))
        .collect()
}

proptest! {
    #[test]
    fn monotonic_addresses_are_aligned(requests in arb_requests()) {
        let region = MonotonicRegion::new(512, 2);
        for &(size, align) in &requests {
            if let Some(p) = region.alloc(size, align) {
                prop_assert_eq!(p.as_ptr() as usize % align, 0);
            }
        }
    }

    #[test]
    fn slab_addresses_are_aligned(requests in arb_requests()) {
        let region = SlabRegion::new(512, 2);
        for &(size, align) in &requests {
            if let Some(p) = region.alloc(size, align) {
                prop_assert_eq!(p.as_ptr() as usize % align, 0);
            }
        }
    }

    #[test]
    fn allocations_never_overlap(requests in arb_requests()) {
        let region = MonotonicRegion::new(256, 3);
        let spans = serve(&region, &requests);
        prop_assert!(find_overlap(&spans).is_none());
    }

    #[test]
    fn used_bytes_cover_every_served_request(requests in arb_requests()) {
        let region = MonotonicRegion::new(256, 3);
        let spans = serve(&region, &requests);
        let requested: usize = spans.iter().map(|s| s.len).sum();
        let stats = region.stats();
        prop_assert!(stats.used_bytes >= requested);
        prop_assert!(stats.used_bytes <= stats.reserved_bytes);
    }

    #[test]
    fn refused_requests_leave_usage_unchanged(requests in arb_requests()) {
        let region = SlabRegion::new(128, 1);
        for &(size, align) in &requests {
            let before = region.stats().used_bytes;
            if region.alloc(size, align).is_none() {
                prop_assert_eq!(region.stats().used_bytes, before);
            }
        }
    }

    #[test]
    fn reset_replays_identically(requests in arb_requests()) {
        let mut region = MonotonicRegion::new(256, 2);
        let first = serve(&region, &requests);
        region.reset(false);
        let second = serve(&region, &requests);
        prop_assert_eq!(first, second);
    }
}
