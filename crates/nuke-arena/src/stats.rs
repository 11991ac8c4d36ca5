//! Point-in-time usage summaries.

use std::fmt;

/// Usage of a region, summed over its buffers.
///
/// Produced by [`Region::stats`](crate::Region::stats). Values are a
/// snapshot; a concurrently used region may have moved on by the time the
/// caller reads them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionStats {
    /// Number of buffers in the region.
    pub buffer_count: usize,
    /// Buffers that currently hold backing memory.
    pub materialized_buffers: usize,
    /// Bytes consumed since the last reset, alignment padding included.
    pub used_bytes: usize,
    /// Upper bound on region memory: `buffer_count * buffer_size`.
    pub reserved_bytes: usize,
    /// Bytes of backing memory currently held from the global allocator.
    pub resident_bytes: usize,
    /// Region generation at the time of the snapshot.
    pub generation: u64,
}

impl RegionStats {
    /// Bytes still available across all buffers, ignoring padding.
    pub fn available_bytes(&self) -> usize {
        self.reserved_bytes - self.used_bytes
    }

    /// Fraction of reserved bytes consumed, in `[0.0, 1.0]`.
    pub fn utilization(&self) -> f64 {
        if self.reserved_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.reserved_bytes as f64
    }
}

impl fmt::Display for RegionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} bytes used, {}/{} buffers resident, gen={}",
            self.used_bytes,
            self.reserved_bytes,
            self.materialized_buffers,
            self.buffer_count,
            self.generation
        )
    }
}
