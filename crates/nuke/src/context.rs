//! Carrying a region through a request scope.
//!
//! A [`RegionContext`] holds at most one shared region handle. Adding a
//! region produces a new context and leaves the original untouched, so
//! contexts can be passed down call chains and cloned freely.

use std::fmt;
use std::sync::Arc;

use nuke_arena::Region;

/// A region that can be shared across threads.
pub type SharedRegion = Arc<dyn Region + Send + Sync>;

/// An immutable carrier for an optional [`SharedRegion`].
#[derive(Clone, Default)]
pub struct RegionContext {
    region: Option<SharedRegion>,
}

impl RegionContext {
    /// A context with no region.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this context carrying `region`.
    ///
    /// Any region already carried is replaced in the copy only.
    #[must_use]
    pub fn with_region(&self, region: SharedRegion) -> Self {
        Self {
            region: Some(region),
        }
    }

    /// A copy of this context with no region.
    #[must_use]
    pub fn without_region(&self) -> Self {
        Self { region: None }
    }

    /// The carried region handle, if any.
    pub fn region(&self) -> Option<SharedRegion> {
        self.region.clone()
    }

    /// Borrow the carried region for use with the typed helpers.
    pub fn region_ref(&self) -> Option<&(dyn Region + Send + Sync)> {
        self.region.as_deref()
    }
}

impl fmt::Debug for RegionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(r) => write!(f, "RegionContext({})", r.id()),
            None => f.write_str("RegionContext(none)"),
        }
    }
}
