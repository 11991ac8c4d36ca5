//! The [`Region`] capability shared by every region kind.
//!
//! A region hands out raw, aligned, zeroed memory from a fixed set of
//! buffers and takes it all back in one [`reset`](Region::reset). It does not
//! remember individual allocations, only how far each buffer's cursor has
//! moved. Two access paths sit on top of that:
//!
//! - **Raw:** [`alloc`](Region::alloc) returns an address or `None` on
//!   exhaustion. Reading through the address is `unsafe` and valid only until
//!   the next reset.
//! - **Checked:** [`alloc_checked`](Region::alloc_checked) returns an
//!   [`Allocation`] that records the region id and generation;
//!   [`bytes`](Region::bytes) refuses to resolve it once the region has been
//!   reset or when it is presented to a different region.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ArenaError;
use crate::handle::Allocation;
use crate::stats::RegionStats;

/// Process-unique identity of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) u64);

impl RegionId {
    /// Allocate a fresh id.
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// A bounded memory region with bump allocation and whole-region reset.
///
/// Implemented by [`MonotonicRegion`](crate::MonotonicRegion),
/// [`SlabRegion`](crate::SlabRegion) and
/// [`ConcurrentRegion`](crate::ConcurrentRegion). The trait is object safe;
/// `Box<dyn Region>` and `Arc<dyn Region + Send + Sync>` are both usable.
pub trait Region {
    /// Allocate `layout.size()` zeroed bytes aligned to `layout.align()`.
    ///
    /// Buffers are probed in order and the first one with room serves the
    /// whole request. Returns `None` when every buffer is exhausted; callers
    /// are expected to fall back to the global allocator.
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Reset every buffer through a shared reference.
    ///
    /// With `release == true` the backing memory is returned to the global
    /// allocator; otherwise it is kept for reuse. The generation advances by
    /// one.
    ///
    /// # Safety
    ///
    /// Every address and borrow previously obtained from this region becomes
    /// invalid. The caller must ensure none of them is used afterwards,
    /// including borrows held by other threads and by the typed helpers.
    /// Prefer [`reset`](Region::reset), which proves this through `&mut self`.
    unsafe fn reset_shared(&self, release: bool);

    /// Number of resets this region has gone through.
    fn generation(&self) -> u64;

    /// Identity used to match [`Allocation`] handles to their region.
    fn id(&self) -> RegionId;

    /// Usage summary across all buffers.
    fn stats(&self) -> RegionStats;

    /// Whether `ptr` points into memory currently owned by this region.
    fn owns(&self, ptr: *const u8) -> bool;

    /// Allocate `size` bytes aligned to `align`.
    ///
    /// A request that does not form a valid [`Layout`] (alignment not a power
    /// of two, or size overflowing `isize` once rounded) gets `None`, exactly
    /// like exhaustion.
    fn alloc(&self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let layout = Layout::from_size_align(size, align).ok()?;
        self.alloc_layout(layout)
    }

    /// Reset every buffer, invalidating all previous allocations.
    ///
    /// Exclusive access guarantees that no borrow handed out by this region
    /// is still alive. Raw addresses from [`alloc`](Region::alloc) must not
    /// be dereferenced after this call.
    fn reset(&mut self, release: bool) {
        // SAFETY: `&mut self` rules out live borrows of region memory.
        unsafe { self.reset_shared(release) }
    }

    /// Allocate and return a checked handle.
    ///
    /// Fails with [`ArenaError::CapacityExceeded`] when no buffer has room.
    /// The error carries the per-buffer capacity, the largest request any
    /// single buffer could ever serve.
    fn alloc_checked(&self, layout: Layout) -> Result<Allocation, ArenaError> {
        let generation = self.generation();
        match self.alloc_layout(layout) {
            Some(ptr) => Ok(Allocation::new(self.id(), generation, ptr, layout.size())),
            None => {
                let stats = self.stats();
                Err(ArenaError::CapacityExceeded {
                    requested: layout.size(),
                    capacity: stats
                        .reserved_bytes
                        .checked_div(stats.buffer_count)
                        .unwrap_or(0),
                })
            }
        }
    }

    /// Check that `allocation` was issued by this region in its current
    /// generation.
    fn validate(&self, allocation: &Allocation) -> Result<(), ArenaError> {
        if allocation.region != self.id() {
            return Err(ArenaError::ForeignHandle {
                handle_region: allocation.region,
                region: self.id(),
            });
        }
        let current = self.generation();
        if allocation.generation != current {
            return Err(ArenaError::StaleHandle {
                handle_generation: allocation.generation,
                current,
            });
        }
        Ok(())
    }

    /// Resolve a checked handle to its bytes.
    fn bytes(&self, allocation: &Allocation) -> Result<&[u8], ArenaError> {
        self.validate(allocation)?;
        // SAFETY: the handle was issued by this region in the current
        // generation, so its range lies in live backing memory that was
        // zeroed on allocation. Backing memory is only released by a reset,
        // which needs `&mut self` or the caller's `reset_shared` contract.
        Ok(unsafe { std::slice::from_raw_parts(allocation.ptr.as_ptr(), allocation.len) })
    }

    /// Resolve a checked handle to its bytes for writing.
    fn bytes_mut(&mut self, allocation: &Allocation) -> Result<&mut [u8], ArenaError> {
        self.validate(allocation)?;
        // SAFETY: as for `bytes`; `&mut self` additionally guarantees no
        // other borrow of region memory is alive.
        Ok(unsafe { std::slice::from_raw_parts_mut(allocation.ptr.as_ptr(), allocation.len) })
    }
}

impl<R: Region + ?Sized> Region for Box<R> {
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).alloc_layout(layout)
    }

    unsafe fn reset_shared(&self, release: bool) {
        // SAFETY: forwarded; the caller upholds the contract.
        unsafe { (**self).reset_shared(release) }
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }

    fn id(&self) -> RegionId {
        (**self).id()
    }

    fn stats(&self) -> RegionStats {
        (**self).stats()
    }

    fn owns(&self, ptr: *const u8) -> bool {
        (**self).owns(ptr)
    }
}

impl<R: Region + ?Sized> Region for &mut R {
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).alloc_layout(layout)
    }

    unsafe fn reset_shared(&self, release: bool) {
        // SAFETY: forwarded; the caller upholds the contract.
        unsafe { (**self).reset_shared(release) }
    }

    fn generation(&self) -> u64 {
        (**self).generation()
    }

    fn id(&self) -> RegionId {
        (**self).id()
    }

    fn stats(&self) -> RegionStats {
        (**self).stats()
    }

    fn owns(&self, ptr: *const u8) -> bool {
        (**self).owns(ptr)
    }
}
