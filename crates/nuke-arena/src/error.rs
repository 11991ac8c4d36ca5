//! Region error types.

use thiserror::Error;

use crate::region::RegionId;

/// Errors reported by the checked region API.
///
/// The raw [`Region::alloc`](crate::Region::alloc) path never returns an
/// error; exhaustion there is a plain `None` and the caller falls back to the
/// global allocator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
    /// No buffer has room for the request.
    #[error("region capacity exceeded: requested {requested} bytes, buffer capacity {capacity} bytes")]
    CapacityExceeded {
        /// Number of bytes requested.
        requested: usize,
        /// Capacity of one buffer, the upper bound for any single request.
        capacity: usize,
    },
    /// An [`Allocation`](crate::Allocation) from a generation that has been
    /// reset.
    #[error("stale allocation: generation {handle_generation}, current {current}")]
    StaleHandle {
        /// The generation recorded in the handle.
        handle_generation: u64,
        /// The region's current generation.
        current: u64,
    },
    /// An [`Allocation`](crate::Allocation) resolved against a region that
    /// did not issue it.
    #[error("allocation from {handle_region} resolved against {region}")]
    ForeignHandle {
        /// The region recorded in the handle.
        handle_region: RegionId,
        /// The region it was resolved against.
        region: RegionId,
    },
    /// A [`RegionConfig`](crate::RegionConfig) failed validation.
    #[error("invalid region config: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}
