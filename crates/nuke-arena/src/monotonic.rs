//! Single-threaded region over an ordered list of buffers.
//!
//! [`MonotonicRegion`] has no locking at all. It is `Send` but not `Sync`:
//! moving it to another thread is fine, sharing it is not. Wrap it in a
//! [`ConcurrentRegion`](crate::ConcurrentRegion) to share it.

use std::alloc::Layout;
use std::cell::{Cell, RefCell};
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::config::RegionConfig;
use crate::error::ArenaError;
use crate::region::{Region, RegionId};
use crate::stats::RegionStats;

/// Bump allocation over a fixed number of equally sized buffers.
///
/// ```text
/// MonotonicRegion
/// ├── Buffer 0  ←── probed first (preferred)
/// ├── Buffer 1
/// └── Buffer N-1 ←── overflow only
/// ```
///
/// Requests never span buffers and the buffer list never grows. Once every
/// buffer is exhausted, [`Region::alloc`] returns `None` until the next reset.
pub struct MonotonicRegion {
    buffers: Vec<RefCell<Buffer>>,
    buffer_size: usize,
    generation: Cell<u64>,
    id: RegionId,
}

impl MonotonicRegion {
    /// Create a region of `buffer_count` buffers of `buffer_size` bytes each.
    ///
    /// No memory is reserved until the first allocation lands in a buffer.
    pub fn new(buffer_size: usize, buffer_count: usize) -> Self {
        let buffers = (0..buffer_count)
            .map(|_| RefCell::new(Buffer::new(buffer_size)))
            .collect();
        let id = RegionId::next();
        debug!(%id, buffer_size, buffer_count, "monotonic region created");
        Self {
            buffers,
            buffer_size,
            generation: Cell::new(0),
            id,
        }
    }

    /// Create a region from a validated config. The config's kind and
    /// concurrency flag are ignored.
    pub fn from_config(config: &RegionConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::new(config.buffer_size, config.buffer_count))
    }

    /// Number of buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Capacity of each buffer in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Base address of buffer `index`, if it currently holds memory.
    pub fn buffer_base(&self, index: usize) -> Option<usize> {
        self.buffers.get(index)?.borrow().base_addr()
    }
}

// `reset_shared` is an unsafe trait method.
#[allow(unsafe_code)]
impl Region for MonotonicRegion {
    fn alloc_layout(&self, layout: Layout) -> Option<NonNull<u8>> {
        for buffer in &self.buffers {
            if let Some(ptr) = buffer.borrow_mut().alloc(layout) {
                return Some(ptr);
            }
        }
        trace!(id = %self.id, size = layout.size(), "monotonic region exhausted");
        None
    }

    unsafe fn reset_shared(&self, release: bool) {
        for buffer in &self.buffers {
            buffer.borrow_mut().reset(release);
        }
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        debug!(id = %self.id, generation, release, "monotonic region reset");
    }

    fn generation(&self) -> u64 {
        self.generation.get()
    }

    fn id(&self) -> RegionId {
        self.id
    }

    fn stats(&self) -> RegionStats {
        let mut stats = RegionStats {
            generation: self.generation.get(),
            ..RegionStats::default()
        };
        for buffer in &self.buffers {
            buffer.borrow().record(&mut stats);
        }
        stats
    }

    fn owns(&self, ptr: *const u8) -> bool {
        self.buffers.iter().any(|b| b.borrow().contains(ptr))
    }
}

impl std::fmt::Debug for MonotonicRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicRegion")
            .field("id", &self.id)
            .field("buffer_size", &self.buffer_size)
            .field("buffer_count", &self.buffers.len())
            .field("generation", &self.generation.get())
            .finish()
    }
}
