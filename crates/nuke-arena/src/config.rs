//! Region configuration parameters.

use std::sync::Arc;

use crate::concurrent::ConcurrentRegion;
use crate::error::ArenaError;
use crate::monotonic::MonotonicRegion;
use crate::raw::Backing;
use crate::region::Region;
use crate::slab::SlabRegion;

/// Which region implementation to build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RegionKind {
    /// [`MonotonicRegion`]: no internal locking.
    #[default]
    Monotonic,
    /// [`SlabRegion`]: one lock per buffer.
    Slab,
}

/// Configuration for building a region.
///
/// Buffer count and size are fixed for the lifetime of the region; a region
/// never grows to absorb overflow. Validated by [`RegionConfig::validate`]
/// before any region is built from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionConfig {
    /// Region implementation.
    pub kind: RegionKind,

    /// Capacity of each buffer in bytes.
    ///
    /// Default: 32MB. Must be non-zero and at most
    /// [`RegionConfig::MAX_BUFFER_SIZE`].
    pub buffer_size: usize,

    /// Number of buffers.
    ///
    /// Default: 6, so the default region tops out at 192MB. Must be non-zero.
    pub buffer_count: usize,

    /// Wrap the region in a [`ConcurrentRegion`].
    ///
    /// [`RegionConfig::build_shared`] always wraps monotonic regions, since
    /// they cannot be shared otherwise.
    pub concurrent: bool,
}

impl RegionConfig {
    /// Default buffer size: 32MB.
    pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024 * 1024;

    /// Default buffer count.
    pub const DEFAULT_BUFFER_COUNT: usize = 6;

    /// Largest buffer the global allocator can be asked for.
    pub const MAX_BUFFER_SIZE: usize = isize::MAX as usize - (Backing::ALIGN - 1);

    /// A config for `kind` with default sizing.
    pub fn new(kind: RegionKind) -> Self {
        Self {
            kind,
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            buffer_count: Self::DEFAULT_BUFFER_COUNT,
            concurrent: false,
        }
    }

    /// Default-sized monotonic region config.
    pub fn monotonic() -> Self {
        Self::new(RegionKind::Monotonic)
    }

    /// Default-sized slab region config.
    pub fn slab() -> Self {
        Self::new(RegionKind::Slab)
    }

    /// Set the per-buffer capacity.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Set the number of buffers.
    pub fn with_buffer_count(mut self, buffer_count: usize) -> Self {
        self.buffer_count = buffer_count;
        self
    }

    /// Request a [`ConcurrentRegion`] wrapper.
    pub fn with_concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Upper bound on region memory in bytes, or `None` on overflow.
    pub fn total_bytes(&self) -> Option<usize> {
        self.buffer_size.checked_mul(self.buffer_count)
    }

    /// Check sizing against the documented limits.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.buffer_count == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "buffer_count must be >= 1".to_string(),
            });
        }
        if self.buffer_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "buffer_size must be >= 1".to_string(),
            });
        }
        if self.buffer_size > Self::MAX_BUFFER_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "buffer_size must be <= {} (got {})",
                    Self::MAX_BUFFER_SIZE,
                    self.buffer_size,
                ),
            });
        }
        if self.total_bytes().is_none() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "buffer_size * buffer_count overflows ({} * {})",
                    self.buffer_size, self.buffer_count,
                ),
            });
        }
        Ok(())
    }

    /// Build an owned region for use from one thread at a time.
    pub fn build(&self) -> Result<Box<dyn Region + Send>, ArenaError> {
        self.validate()?;
        let region: Box<dyn Region + Send> = match (self.kind, self.concurrent) {
            (RegionKind::Monotonic, false) => Box::new(MonotonicRegion::from_config(self)?),
            (RegionKind::Monotonic, true) => {
                Box::new(ConcurrentRegion::new(MonotonicRegion::from_config(self)?))
            }
            (RegionKind::Slab, false) => Box::new(SlabRegion::from_config(self)?),
            (RegionKind::Slab, true) => {
                Box::new(ConcurrentRegion::new(SlabRegion::from_config(self)?))
            }
        };
        Ok(region)
    }

    /// Build a region that can be shared across threads.
    pub fn build_shared(&self) -> Result<Arc<dyn Region + Send + Sync>, ArenaError> {
        self.validate()?;
        let region: Arc<dyn Region + Send + Sync> = match (self.kind, self.concurrent) {
            (RegionKind::Monotonic, _) => {
                Arc::new(ConcurrentRegion::new(MonotonicRegion::from_config(self)?))
            }
            (RegionKind::Slab, false) => Arc::new(SlabRegion::from_config(self)?),
            (RegionKind::Slab, true) => {
                Arc::new(ConcurrentRegion::new(SlabRegion::from_config(self)?))
            }
        };
        Ok(region)
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self::monotonic()
    }
}
