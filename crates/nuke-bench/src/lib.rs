//! Benchmark profiles for the nuke region allocator.
//!
//! Provides pre-built [`RegionConfig`] profiles shared by the benches:
//!
//! - [`request_profile`]: one request's worth of scratch space
//! - [`batch_profile`]: large buffers for slice-heavy workloads
//! - [`build_profile`]: builds any profile into a shared region

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use nuke::arena::{ArenaError, RegionConfig, RegionKind};
use nuke::SharedRegion;

/// Number of values one benchmark iteration allocates.
pub const VALUES_PER_ITER: usize = 1024;

/// Four 64 KiB buffers: enough for [`VALUES_PER_ITER`] small values.
pub fn request_profile(kind: RegionKind) -> RegionConfig {
    RegionConfig::new(kind)
        .with_buffer_size(64 * 1024)
        .with_buffer_count(4)
}

/// Two 8 MiB buffers for growing slices without spilling to the heap.
pub fn batch_profile(kind: RegionKind) -> RegionConfig {
    RegionConfig::new(kind)
        .with_buffer_size(8 * 1024 * 1024)
        .with_buffer_count(2)
}

/// Build `config` into a region shareable across threads.
pub fn build_profile(config: &RegionConfig) -> Result<SharedRegion, ArenaError> {
    config.build_shared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        for kind in [RegionKind::Monotonic, RegionKind::Slab] {
            request_profile(kind).validate().unwrap();
            batch_profile(kind).validate().unwrap();
        }
    }

    #[test]
    fn request_profile_fits_one_iteration() {
        let region = build_profile(&request_profile(RegionKind::Slab)).unwrap();
        for _ in 0..VALUES_PER_ITER {
            assert!(region.alloc(64, 8).is_some());
        }
    }
}
