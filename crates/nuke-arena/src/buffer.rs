//! Contiguous bump-allocated buffers.
//!
//! A [`Buffer`] is one fixed-capacity block with a write cursor. Its backing
//! memory is reserved lazily on the first allocation and zero-filled; each
//! returned range is zeroed again before it is handed out, so reusing a
//! buffer after a non-releasing reset never leaks bytes from a previous
//! generation.

use std::alloc::Layout;
use std::ptr::NonNull;

use tracing::{trace, warn};

use crate::raw::Backing;
use crate::stats::RegionStats;

/// Number of bytes needed to move `addr` forward to a multiple of `align`.
///
/// `align` must be a power of two.
#[inline]
pub fn padding_for(addr: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    addr.wrapping_neg() & (align - 1)
}

/// A single contiguous memory block with bump allocation.
///
/// The write offset only moves forward between resets:
/// `0 <= used() <= capacity()` holds at all times.
pub struct Buffer {
    /// Backing storage. `None` until first use and after a releasing reset.
    backing: Option<Backing>,
    /// Capacity in bytes, fixed at construction.
    capacity: usize,
    /// Bump pointer: bytes consumed so far, padding included.
    offset: usize,
}

impl Buffer {
    /// Create an empty buffer. No memory is reserved until the first
    /// [`alloc`](Buffer::alloc).
    pub fn new(capacity: usize) -> Self {
        Self {
            backing: None,
            capacity,
            offset: 0,
        }
    }

    /// Bump-allocate `layout.size()` bytes aligned to `layout.align()`.
    ///
    /// Returns `None`, leaving the buffer untouched, if the padded request
    /// does not fit in the remaining capacity. The returned bytes are zeroed.
    pub fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.materialize() {
            return None;
        }
        let capacity = self.capacity;
        let backing = self.backing.as_mut()?;

        let cursor = backing.base().as_ptr() as usize + self.offset;
        let pad = padding_for(cursor, layout.align());
        let needed = layout.size().checked_add(pad)?;
        if needed > capacity - self.offset {
            trace!(
                requested = layout.size(),
                align = layout.align(),
                remaining = capacity - self.offset,
                "buffer full"
            );
            return None;
        }

        let start = self.offset + pad;
        self.offset += needed;
        backing.zero(start, layout.size());
        Some(backing.ptr_at(start))
    }

    /// Rewind the cursor, optionally giving the backing memory back.
    ///
    /// A buffer that has not been written to is left alone. With
    /// `release == false` the memory is kept for reuse and is not scrubbed;
    /// [`alloc`](Buffer::alloc) zeroes what it hands out.
    pub fn reset(&mut self, release: bool) {
        if self.offset == 0 {
            return;
        }
        self.offset = 0;
        if release {
            trace!(capacity = self.capacity, "releasing buffer memory");
            self.backing = None;
        }
    }

    /// Reserve the backing block if it is not there yet.
    fn materialize(&mut self) -> bool {
        if self.backing.is_none() {
            if self.capacity == 0 {
                return false;
            }
            match Backing::zeroed(self.capacity) {
                Some(backing) => {
                    trace!(capacity = self.capacity, "buffer materialized");
                    self.backing = Some(backing);
                }
                None => {
                    warn!(
                        capacity = self.capacity,
                        "could not reserve buffer memory; treating as full"
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Bytes consumed, alignment padding included.
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Total capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still available (before any alignment padding).
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Whether backing memory is currently reserved.
    pub fn is_materialized(&self) -> bool {
        self.backing.is_some()
    }

    /// Base address of the backing memory, if reserved.
    pub fn base_addr(&self) -> Option<usize> {
        self.backing.as_ref().map(|b| b.base().as_ptr() as usize)
    }

    /// Whether `ptr` points into this buffer's backing memory.
    pub fn contains(&self, ptr: *const u8) -> bool {
        self.backing
            .as_ref()
            .is_some_and(|b| b.contains(ptr as usize))
    }

    /// Add this buffer's usage to `stats`.
    pub(crate) fn record(&self, stats: &mut RegionStats) {
        stats.buffer_count += 1;
        stats.used_bytes += self.offset;
        stats.reserved_bytes += self.capacity;
        if self.is_materialized() {
            stats.materialized_buffers += 1;
            stats.resident_bytes += self.capacity;
        }
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity)
            .field("offset", &self.offset)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
