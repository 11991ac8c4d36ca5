//! Single values placed in a region, with heap fallback.
//!
//! [`new_in`] asks the region for `size_of::<T>()` bytes aligned to
//! `align_of::<T>()`. When the region is absent or exhausted the value goes
//! into an ordinary `Box<T>` instead, so callers never observe a failure.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use nuke_arena::Region;
use tracing::trace;

enum Slot<T> {
    /// Value lives in region memory; the region outlives the box.
    Region(NonNull<T>),
    /// Region was absent or full.
    Heap(Box<T>),
}

/// An owned `T` stored either in a region or on the heap.
///
/// The `'r` lifetime borrows the region, so the region cannot be reset
/// through safe code while the box is alive. Dropping the box runs `T`'s
/// destructor; region memory itself is reclaimed only by the next reset.
pub struct ArenaBox<'r, T> {
    slot: Slot<T>,
    _region: PhantomData<&'r mut T>,
}

// SAFETY: `ArenaBox` owns its `T` exclusively, exactly like `Box<T>`.
unsafe impl<T: Send> Send for ArenaBox<'_, T> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Sync> Sync for ArenaBox<'_, T> {}

/// Place `value` in `region`, falling back to the heap.
///
/// Never panics on exhaustion and never blocks beyond the region's own lock.
pub fn new_in<'r, T, R>(region: Option<&'r R>, value: T) -> ArenaBox<'r, T>
where
    R: Region + ?Sized,
{
    if let Some(region) = region {
        if let Some(ptr) = region.alloc_layout(Layout::new::<T>()) {
            let ptr = ptr.cast::<T>();
            // SAFETY: `ptr` is fresh, sized and aligned for `T`, and exclusive
            // to this box until the region is reset, which cannot happen
            // while `'r` is live without breaking `reset_shared`'s contract.
            unsafe { ptr.as_ptr().write(value) };
            return ArenaBox {
                slot: Slot::Region(ptr),
                _region: PhantomData,
            };
        }
        trace!(
            type_name = std::any::type_name::<T>(),
            "region full, boxing on heap"
        );
    }
    ArenaBox {
        slot: Slot::Heap(Box::new(value)),
        _region: PhantomData,
    }
}

/// Place `T::default()` in `region`, falling back to the heap.
pub fn new_default_in<'r, T, R>(region: Option<&'r R>) -> ArenaBox<'r, T>
where
    T: Default,
    R: Region + ?Sized,
{
    new_in(region, T::default())
}

impl<'r, T> ArenaBox<'r, T> {
    /// Whether the value lives in region memory.
    pub fn is_in_region(this: &Self) -> bool {
        matches!(this.slot, Slot::Region(_))
    }

    /// Address of the value.
    pub fn as_ptr(this: &Self) -> *const T {
        match &this.slot {
            Slot::Region(ptr) => ptr.as_ptr(),
            Slot::Heap(b) => &**b as *const T,
        }
    }

    /// Move the value out.
    pub fn into_inner(this: Self) -> T {
        let this = ManuallyDrop::new(this);
        match &this.slot {
            // SAFETY: the value is initialised and, with `this` wrapped in
            // `ManuallyDrop`, read exactly once.
            Slot::Region(ptr) => unsafe { ptr.as_ptr().read() },
            Slot::Heap(b) => {
                // SAFETY: the box is moved out exactly once and never dropped
                // through `this`.
                let b = unsafe { std::ptr::read(b) };
                *b
            }
        }
    }

    /// Give up ownership, returning a reference valid for `'r`.
    ///
    /// The destructor of `T` will not run.
    pub fn leak(this: Self) -> &'r mut T {
        let this = ManuallyDrop::new(this);
        match &this.slot {
            // SAFETY: region memory stays valid for `'r` and nothing else
            // references the value once the box is forgotten.
            Slot::Region(ptr) => unsafe { &mut *ptr.as_ptr() },
            Slot::Heap(b) => {
                // SAFETY: the box is moved out exactly once and then leaked.
                let b = unsafe { std::ptr::read(b) };
                Box::leak(b)
            }
        }
    }
}

impl<T> Deref for ArenaBox<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.slot {
            // SAFETY: initialised in `new_in` and owned by this box.
            Slot::Region(ptr) => unsafe { ptr.as_ref() },
            Slot::Heap(b) => b,
        }
    }
}

impl<T> DerefMut for ArenaBox<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.slot {
            // SAFETY: as for `deref`, and `&mut self` makes the access unique.
            Slot::Region(ptr) => unsafe { ptr.as_mut() },
            Slot::Heap(b) => b,
        }
    }
}

impl<T> Drop for ArenaBox<'_, T> {
    fn drop(&mut self) {
        if let Slot::Region(ptr) = self.slot {
            // SAFETY: the value is initialised and dropped exactly once.
            unsafe { ptr.as_ptr().drop_in_place() };
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ArenaBox<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: PartialEq> PartialEq for ArenaBox<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}
