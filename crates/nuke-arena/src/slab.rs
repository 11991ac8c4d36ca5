//! Region with one lock per buffer.
//!
//! [`SlabRegion`] has the same probing order as
//! [`MonotonicRegion`](crate::MonotonicRegion), but every buffer ("slab")
//! sits behind its own mutex. A lock is held only for the duration of that
//! slab's `alloc` or `reset`, so requests served by different slabs do not
//! contend. Requests racing for the same slab, usually slab 0, serialize.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::config::RegionConfig;
use crate::error::ArenaError;
use crate::region::{Region, RegionId};
use crate::stats::RegionStats;

/// Thread-safe region with per-slab locking.
pub struct SlabRegion {
    slabs: Vec<Mutex<Buffer>>,
    slab_size: usize,
    generation: AtomicU64,
    id: RegionId,
}

impl SlabRegion {
    /// Create a region of `slab_count` slabs of `slab_size` bytes each.
    pub fn new(slab_size: usize, slab_count: usize) -> Self {
        let slabs = (0..slab_count)
            .map(|_| Mutex::new(Buffer::new(slab_size)))
            .collect();
        let id = RegionId::next();
        debug!(%id, slab_size, slab_count, "slab region created");
        Self {
            slabs,
            slab_size,
            generation: AtomicU64::new(0),
            id,
        }
    }

    /// Create a region from a validated config. The config's kind and
    /// concurrency flag are ignored.
    pub fn from_config(config: &RegionConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::new(config.buffer_size, config.buffer_count))
    }

    /// Number of slabs.
    pub fn slab_count(&self) -> usize {
        self.slabs.len()
    }

    /// Capacity of each slab in bytes.
    pub fn slab_size(&self) -> usize {
        self.slab_size
    }

    /// Base address of slab `index`, if it currently holds memory.
    pub fn slab_base(&self, index: usize) -> Option<usize> {
        self.slabs.get(index)?.lock().base_addr()
    }
}

// `reset_shared` is an unsafe trait method.
#[allow(unsafe_code)]
impl Region for SlabRegion {
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        for slab in &self.slabs {
            if let Some(ptr) = slab.lock().alloc(layout) {
                return Some(ptr);
            }
        }
        trace!(id = %self.id, size = layout.size(), "slab region exhausted");
        None
    }

    unsafe fn reset_shared(&self, release: bool) {
        for slab in &self.slabs {
            slab.lock().reset(release);
        }
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(id = %self.id, generation, release, "slab region reset");
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn id(&self) -> RegionId {
        self.id
    }

    fn stats(&self) -> RegionStats {
        let mut stats = RegionStats {
            generation: self.generation(),
            ..RegionStats::default()
        };
        for slab in &self.slabs {
            slab.lock().record(&mut stats);
        }
        stats
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.slabs.iter().any(|s| s.lock().contains(ptr))
    }
}

impl std::fmt::Debug for SlabRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlabRegion")
            .field("id", &self.id)
            .field("slab_size", &self.slab_size)
            .field("slab_count", &self.slabs.len())
            .field("generation", &self.generation())
            .finish()
    }
}
