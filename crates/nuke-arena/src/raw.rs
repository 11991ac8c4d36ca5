//! Low-level primitives for buffer memory.
//!
//! [`Backing`] is the only owner of raw heap memory in the crate. Every
//! pointer a region hands out is derived from a `Backing` base pointer, so
//! provenance stays rooted in a single allocation per buffer.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A zero-initialised heap block owned by exactly one buffer.
pub(crate) struct Backing {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl Backing {
    /// Alignment requested from the global allocator for every backing block.
    pub(crate) const ALIGN: usize = 16;

    /// Allocate `len` zeroed bytes. Returns `None` for a zero length or when
    /// the global allocator refuses the request.
    pub(crate) fn zeroed(len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let layout = Layout::from_size_align(len, Self::ALIGN).ok()?;
        // SAFETY: `layout` has a non-zero size (checked above).
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        NonNull::new(raw).map(|ptr| Self { ptr, layout })
    }

    /// Base address of the block.
    pub(crate) fn base(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Size of the block in bytes.
    pub(crate) fn len(&self) -> usize {
        self.layout.size()
    }

    /// Pointer to `offset` bytes past the base.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the block.
    pub(crate) fn ptr_at(&self, offset: usize) -> NonNull<u8> {
        assert!(offset <= self.len(), "offset {offset} out of bounds");
        // SAFETY: `offset <= len`, so the result stays inside the allocation
        // or one past its end, and cannot wrap to null.
        unsafe { self.ptr.add(offset) }
    }

    /// Zero `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range is not inside the block.
    pub(crate) fn zero(&mut self, offset: usize, len: usize) {
        let end = offset.saturating_add(len);
        assert!(
            end <= self.len(),
            "zero range {offset}..{end} out of bounds"
        );
        // SAFETY: the range is in bounds and `&mut self` means no other
        // allocation is being carved from this block concurrently. Ranges
        // already handed out never overlap a fresh range.
        unsafe { self.ptr_at(offset).as_ptr().write_bytes(0, len) };
    }

    /// Whether `addr` lies inside `[base, base + len)`.
    pub(crate) fn contains(&self, addr: usize) -> bool {
        let start = self.ptr.as_ptr() as usize;
        addr >= start && addr < start + self.len()
    }
}

impl Drop for Backing {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from `alloc_zeroed` with exactly this layout and
        // is deallocated only here.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
    }
}

// SAFETY: `Backing` uniquely owns its allocation; moving it to another thread
// moves that ownership with it.
unsafe impl Send for Backing {}
