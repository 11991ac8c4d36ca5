//! Bounded, bump-allocated memory regions with O(1) reset.
//!
//! A region carves raw, aligned, zeroed memory out of a fixed set of
//! pre-sized buffers and takes all of it back in one reset. It never frees
//! individual allocations and never grows: when every buffer is full,
//! [`Region::alloc`] returns `None` and the caller falls back to the global
//! allocator.
//!
//! # Architecture
//!
//! ```text
//! Region (trait: alloc / reset / generation / stats)
//! ├── MonotonicRegion   Vec<RefCell<Buffer>>   no locking, Send + !Sync
//! ├── SlabRegion        Vec<Mutex<Buffer>>     one lock per buffer
//! └── ConcurrentRegion<R>  Mutex<R>            one lock for everything
//!
//! Buffer: Option<Backing> + capacity + offset
//!         (lazy zeroed block, bump cursor, zero-on-alloc)
//! ```
//!
//! # Lifetimes
//!
//! Addresses from [`Region::alloc`] are valid until the next reset. The
//! region does not track them, so using one after a reset is undefined
//! behaviour and reading through it is `unsafe`. The checked path,
//! [`Region::alloc_checked`] plus [`Region::bytes`], tags every
//! [`Allocation`] with the region generation and rejects stale handles with
//! [`ArenaError::StaleHandle`].
//!
//! # Zero-fill policy
//!
//! Memory is zeroed when it is handed out, not when a region is reset. The
//! clearing cost therefore scales with bytes used per generation rather than
//! bytes reserved.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]

pub mod buffer;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod handle;
pub mod monotonic;
mod raw;
pub mod region;
pub mod slab;
pub mod stats;

// Public re-exports for the primary API surface.
pub use buffer::Buffer;
pub use concurrent::ConcurrentRegion;
pub use config::{RegionConfig, RegionKind};
pub use error::ArenaError;
pub use handle::Allocation;
pub use monotonic::MonotonicRegion;
pub use region::{Region, RegionId};
pub use slab::SlabRegion;
pub use stats::RegionStats;
