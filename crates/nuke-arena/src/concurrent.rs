//! Region-wide serialization for any region kind.
//!
//! [`ConcurrentRegion`] owns an inner region and a single mutex. Every
//! `alloc` and `reset` runs with the mutex held, so at most one call is in
//! flight inside the inner region. This is what makes a
//! [`MonotonicRegion`](crate::MonotonicRegion) shareable across threads.
//! Wrapping a [`SlabRegion`](crate::SlabRegion) works too, but gives up its
//! per-slab parallelism.

use std::alloc::Layout;
use std::ptr::NonNull;

use parking_lot::Mutex;

use crate::region::{Region, RegionId};
use crate::stats::RegionStats;

/// A region decorator that serializes all calls with one lock.
///
/// `ConcurrentRegion<R>` is `Sync` whenever `R: Send`.
pub struct ConcurrentRegion<R> {
    inner: Mutex<R>,
    id: RegionId,
}

impl<R: Region> ConcurrentRegion<R> {
    /// Wrap `inner`. The wrapper reports the inner region's id, so checked
    /// handles issued before wrapping stay valid.
    pub fn new(inner: R) -> Self {
        let id = inner.id();
        Self {
            inner: Mutex::new(inner),
            id,
        }
    }

    /// Unwrap, returning the inner region.
    pub fn into_inner(self) -> R {
        self.inner.into_inner()
    }

    /// Borrow the inner region without locking.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }
}

// `reset_shared` is an unsafe trait method.
#[allow(unsafe_code)]
impl<R: Region> Region for ConcurrentRegion<R> {
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.inner.lock().alloc_layout(layout)
    }

    unsafe fn reset_shared(&self, release: bool) {
        // The guard gives exclusive access to the inner region; the caller's
        // contract covers every address handed out through the wrapper.
        self.inner.lock().reset(release);
    }

    fn generation(&self) -> u64 {
        self.inner.lock().generation()
    }

    fn id(&self) -> RegionId {
        self.id
    }

    fn stats(&self) -> RegionStats {
        self.inner.lock().stats()
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.inner.lock().owns(ptr)
    }
}

impl<R: std::fmt::Debug> std::fmt::Debug for ConcurrentRegion<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tuple = f.debug_tuple("ConcurrentRegion");
        match self.inner.try_lock() {
            Some(inner) => tuple.field(&*inner),
            None => tuple.field(&"<locked>"),
        };
        tuple.finish()
    }
}
