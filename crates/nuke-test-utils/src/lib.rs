//! Test utilities and fixtures for nuke development.
//!
//! Provides [`Span`] bookkeeping for overlap and alignment checks, helpers
//! that drive a region until it is exhausted, and the sample payload types
//! in [`fixtures`].

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod fixtures;

use std::alloc::Layout;
use std::ptr::NonNull;

use nuke_arena::{Allocation, Region};

/// Half-open address range `[start, start + len)` of one allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            start: ptr.as_ptr() as usize,
            len,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn is_aligned(&self, align: usize) -> bool {
        self.start % align == 0
    }

    /// Whether the two ranges share at least one byte. Empty spans never
    /// overlap anything.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.len > 0 && other.len > 0 && self.start < other.end() && other.start < self.end()
    }
}

/// A pair of overlapping spans, if any exist.
pub fn find_overlap(spans: &[Span]) -> Option<(Span, Span)> {
    let mut sorted: Vec<Span> = spans.iter().copied().filter(|s| s.len > 0).collect();
    sorted.sort();
    sorted
        .windows(2)
        .find(|w| w[0].overlaps(&w[1]))
        .map(|w| (w[0], w[1]))
}

/// Panic with both ranges if any two spans overlap.
pub fn assert_disjoint(spans: &[Span]) {
    if let Some((a, b)) = find_overlap(spans) {
        panic!(
            "overlapping allocations: [{:#x}, {:#x}) and [{:#x}, {:#x})",
            a.start,
            a.end(),
            b.start,
            b.end()
        );
    }
}

/// Allocate `size`-byte, `align`-aligned blocks until the region refuses.
pub fn fill_until_exhausted<R: Region + ?Sized>(
    region: &R,
    size: usize,
    align: usize,
) -> Vec<Span> {
    let mut spans = Vec::new();
    while let Some(ptr) = region.alloc(size, align) {
        spans.push(Span::new(ptr, size));
        if size == 0 && spans.len() > 1 << 16 {
            break;
        }
    }
    spans
}

/// Like [`fill_until_exhausted`], but through checked handles.
pub fn fill_checked_until_exhausted<R: Region + ?Sized>(
    region: &R,
    layout: Layout,
) -> Vec<Allocation> {
    let mut handles = Vec::new();
    while let Ok(handle) = region.alloc_checked(layout) {
        handles.push(handle);
        if layout.size() == 0 && handles.len() > 1 << 16 {
            break;
        }
    }
    handles
}

/// Address range covered by a checked handle.
pub fn span_of(handle: &Allocation) -> Span {
    Span {
        start: handle.addr(),
        len: handle.len(),
    }
}

/// Copy out the bytes of a live handle.
///
/// # Panics
///
/// Panics if the handle is stale or was issued by another region.
pub fn read_allocation<R: Region + ?Sized>(region: &R, handle: &Allocation) -> Vec<u8> {
    match region.bytes(handle) {
        Ok(bytes) => bytes.to_vec(),
        Err(err) => panic!("cannot read {handle}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, len: usize) -> Span {
        Span { start, len }
    }

    #[test]
    fn adjacent_spans_do_not_overlap() {
        assert!(!span(0, 8).overlaps(&span(8, 8)));
        assert!(span(0, 9).overlaps(&span(8, 8)));
    }

    #[test]
    fn empty_spans_never_overlap() {
        assert!(!span(4, 0).overlaps(&span(0, 8)));
        assert!(find_overlap(&[span(4, 0), span(0, 8)]).is_none());
    }

    #[test]
    fn find_overlap_reports_the_pair() {
        let spans = [span(32, 8), span(0, 16), span(12, 8)];
        assert_eq!(find_overlap(&spans), Some((span(0, 16), span(12, 8))));
    }

    #[test]
    fn checked_fill_reads_back_zeroes() {
        let region = nuke_arena::SlabRegion::new(64, 1);
        let handles = fill_checked_until_exhausted(&region, Layout::new::<[u8; 16]>());
        assert_eq!(handles.len(), 4);
        let spans: Vec<Span> = handles.iter().map(span_of).collect();
        assert_disjoint(&spans);
        for handle in &handles {
            assert_eq!(read_allocation(&region, handle), vec![0; 16]);
        }
    }

    #[test]
    #[should_panic(expected = "cannot read")]
    fn reading_a_stale_handle_panics() {
        let mut region = nuke_arena::SlabRegion::new(64, 1);
        let handle = region.alloc_checked(Layout::new::<u32>()).unwrap();
        region.reset(false);
        read_allocation(&region, &handle);
    }

    #[test]
    #[should_panic(expected = "overlapping allocations")]
    fn assert_disjoint_panics_on_overlap() {
        assert_disjoint(&[span(0, 16), span(8, 16)]);
    }
}
