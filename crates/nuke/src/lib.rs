//! Nuke: region-based memory allocation for short-lived, request-scoped data.
//!
//! This is the facade crate. It re-exports the region core from
//! `nuke-arena` and adds typed helpers that place values and sequences in a
//! region, falling back to the global allocator whenever the region is
//! absent or full.
//!
//! # Quick start
//!
//! ```rust
//! use nuke::prelude::*;
//!
//! let mut region = MonotonicRegion::new(4096, 2);
//!
//! {
//!     let value = new_in(Some(&region), 42u64);
//!     assert!(ArenaBox::is_in_region(&value));
//!
//!     let mut ids: ArenaVec<'_, u32, _> = make_slice(Some(&region), 0, 4);
//!     ids.extend_from_slice(&[1, 2, 3]);
//!     let ids = slice_append(Some(&region), ids, &[4, 5]);
//!     assert_eq!(ids.as_slice(), &[1, 2, 3, 4, 5]);
//! }
//!
//! // Everything allocated above is reclaimed at once.
//! region.reset(false);
//! assert_eq!(region.stats().used_bytes, 0);
//! ```
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`arena`] | Region kinds, configuration, checked handles, statistics |
//! | [`boxed`] | [`ArenaBox`], [`new_in`], [`new_default_in`] |
//! | [`vec`] | [`ArenaVec`], [`make_slice`], [`slice_append`] |
//! | [`context`] | [`RegionContext`] for passing a shared region down a call chain |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::undocumented_unsafe_blocks)]

/// Region core (`nuke-arena`).
///
/// The region kinds and [`arena::RegionConfig`] are also available in the
/// [`prelude`].
pub use nuke_arena as arena;

pub mod boxed;
pub mod context;
pub mod vec;

pub use boxed::{new_default_in, new_in, ArenaBox};
pub use context::{RegionContext, SharedRegion};
pub use vec::{make_slice, slice_append, ArenaVec};

/// Common imports for region users.
///
/// ```rust
/// use nuke::prelude::*;
/// ```
pub mod prelude {
    pub use crate::arena::{
        Allocation, ArenaError, ConcurrentRegion, MonotonicRegion, Region, RegionConfig,
        RegionKind, RegionStats, SlabRegion,
    };
    pub use crate::boxed::{new_default_in, new_in, ArenaBox};
    pub use crate::context::{RegionContext, SharedRegion};
    pub use crate::vec::{make_slice, slice_append, ArenaVec};
}
