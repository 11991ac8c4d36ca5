//! Checked allocation handles.
//!
//! An [`Allocation`] records where a request was placed together with the
//! region id and generation it was issued under. Resolving it through
//! [`Region::bytes`](crate::Region::bytes) compares both in O(1), so a handle
//! kept across a reset fails with [`ArenaError::StaleHandle`] instead of
//! reading recycled memory.
//!
//! [`ArenaError::StaleHandle`]: crate::ArenaError::StaleHandle

#![allow(unsafe_code)]

use std::fmt;
use std::ptr::NonNull;

use crate::region::RegionId;

/// Location and generation of a checked allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct Allocation {
    /// Region that served the request.
    pub(crate) region: RegionId,
    /// Region generation when the request was served.
    pub(crate) generation: u64,
    /// Start of the allocated bytes.
    pub(crate) ptr: NonNull<u8>,
    /// Length of the allocation in bytes.
    pub(crate) len: usize,
}

// SAFETY: an `Allocation` is an inert token. The pointer is only dereferenced
// by the issuing region after the id and generation checks pass.
unsafe impl Send for Allocation {}
// SAFETY: see above.
unsafe impl Sync for Allocation {}

impl Allocation {
    pub(crate) fn new(region: RegionId, generation: u64, ptr: NonNull<u8>, len: usize) -> Self {
        Self {
            region,
            generation,
            ptr,
            len,
        }
    }

    /// The region that issued this handle.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// The generation this handle belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Length of the allocation in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this is a zero-length allocation.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start address, for diagnostics and range checks.
    pub fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Allocation({}, gen={}, addr={:#x}, len={})",
            self.region,
            self.generation,
            self.addr(),
            self.len
        )
    }
}
