//! Growable sequences backed by a region, with heap fallback.
//!
//! [`ArenaVec`] keeps its elements in region memory while the region has
//! room and in a plain `Vec<T>` otherwise. Growth follows a fixed policy:
//! an empty vector grows to exactly the number of appended elements; below
//! [`GROW_THRESHOLD`] the capacity doubles, above it it grows by a quarter.
//! Outgrown region storage is abandoned and only comes back on reset.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use nuke_arena::Region;
use tracing::trace;

/// Capacity below which growth doubles instead of adding 25%.
pub const GROW_THRESHOLD: usize = 256;

/// Smallest capacity `>= needed` reachable from `cap` under the growth
/// policy. A zero `cap` jumps straight to `needed`.
pub fn next_capacity(cap: usize, needed: usize) -> usize {
    if cap == 0 {
        return needed;
    }
    let mut cap = cap;
    while cap < needed {
        if cap < GROW_THRESHOLD {
            cap = cap.saturating_mul(2);
        } else {
            cap = cap.saturating_add(cap / 4);
        }
    }
    cap
}

enum Storage<T> {
    Region {
        ptr: NonNull<T>,
        len: usize,
        cap: usize,
    },
    Heap(Vec<T>),
}

/// A vector whose buffer comes from a region when it can.
pub struct ArenaVec<'r, T, R: Region + ?Sized = dyn Region> {
    region: Option<&'r R>,
    storage: Storage<T>,
    _owns: PhantomData<T>,
}

// SAFETY: the vector owns its elements exclusively; the region reference is
// only used to allocate, which `R: Sync` makes safe from any thread.
unsafe impl<T: Send, R: Region + Sync + ?Sized> Send for ArenaVec<'_, T, R> {}
// SAFETY: shared access only hands out `&[T]`.
unsafe impl<T: Sync, R: Region + Sync + ?Sized> Sync for ArenaVec<'_, T, R> {}

impl<'r, T, R: Region + ?Sized> ArenaVec<'r, T, R> {
    /// An empty vector. Nothing is allocated until the first append.
    pub fn new_in(region: Option<&'r R>) -> Self {
        Self {
            region,
            storage: Storage::Heap(Vec::new()),
            _owns: PhantomData,
        }
    }

    /// An empty vector with room for `cap` elements.
    pub fn with_capacity_in(region: Option<&'r R>, cap: usize) -> Self {
        let mut vec = Self::new_in(region);
        if cap > 0 {
            vec.relocate(cap);
        }
        vec
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Region { len, .. } => *len,
            Storage::Heap(v) => v.len(),
        }
    }

    /// Whether there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of elements that fit without growing.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Region { cap, .. } => *cap,
            Storage::Heap(v) => v.capacity(),
        }
    }

    /// Whether the elements currently live in region memory.
    pub fn is_in_region(&self) -> bool {
        matches!(self.storage, Storage::Region { .. })
    }

    /// The region this vector allocates from.
    pub fn region(&self) -> Option<&'r R> {
        self.region
    }

    /// View the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        match &self.storage {
            // SAFETY: `ptr` holds `len` initialised elements owned by `self`.
            Storage::Region { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts(ptr.as_ptr(), *len)
            },
            Storage::Heap(v) => v,
        }
    }

    /// View the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.storage {
            // SAFETY: as for `as_slice`; `&mut self` makes the access unique.
            Storage::Region { ptr, len, .. } => unsafe {
                std::slice::from_raw_parts_mut(ptr.as_ptr(), *len)
            },
            Storage::Heap(v) => v,
        }
    }

    /// Append one element, growing if needed.
    pub fn push(&mut self, value: T) {
        self.reserve(1);
        match &mut self.storage {
            Storage::Region { ptr, len, cap } => {
                debug_assert!(*len < *cap);
                // SAFETY: `reserve` left room for one more element.
                unsafe { ptr.as_ptr().add(*len).write(value) };
                *len += 1;
            }
            Storage::Heap(v) => v.push(value),
        }
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        match &mut self.storage {
            Storage::Region { ptr, len, .. } => {
                if *len == 0 {
                    return None;
                }
                *len -= 1;
                // SAFETY: the element at the old last index is initialised
                // and no longer counted by `len`.
                Some(unsafe { ptr.as_ptr().add(*len).read() })
            }
            Storage::Heap(v) => v.pop(),
        }
    }

    /// Drop all elements, keeping the storage.
    pub fn clear(&mut self) {
        match &mut self.storage {
            Storage::Region { ptr, len, .. } => {
                let elems = ptr::slice_from_raw_parts_mut(ptr.as_ptr(), *len);
                *len = 0;
                // SAFETY: the elements were initialised and are no longer
                // counted by `len`, so they are dropped exactly once.
                unsafe { ptr::drop_in_place(elems) };
            }
            Storage::Heap(v) => v.clear(),
        }
    }

    /// Make room for `additional` more elements under the growth policy.
    pub fn reserve(&mut self, additional: usize) {
        let needed = self.len().saturating_add(additional);
        let cap = self.capacity();
        if needed <= cap {
            return;
        }
        if self.region.is_none() || mem::size_of::<T>() == 0 {
            if let Storage::Heap(v) = &mut self.storage {
                v.reserve(additional);
                return;
            }
        }
        self.relocate(next_capacity(cap, needed));
    }

    /// Move the elements into fresh storage of `new_cap` elements.
    fn relocate(&mut self, new_cap: usize) {
        let len = self.len();
        debug_assert!(new_cap >= len);
        let (src, old_heap) = match &mut self.storage {
            Storage::Region { ptr, .. } => (ptr.as_ptr() as *const T, None),
            Storage::Heap(v) => (v.as_ptr(), Some(mem::take(v))),
        };

        let storage = match self.try_region(new_cap) {
            Some(dst) => {
                // SAFETY: `src` holds `len` initialised elements, `dst` has
                // room for `new_cap >= len`, and the two never overlap.
                unsafe { ptr::copy_nonoverlapping(src, dst.as_ptr(), len) };
                Storage::Region {
                    ptr: dst,
                    len,
                    cap: new_cap,
                }
            }
            None => {
                let mut v = Vec::with_capacity(new_cap);
                // SAFETY: as above, with `v` as the destination.
                unsafe {
                    ptr::copy_nonoverlapping(src, v.as_mut_ptr(), len);
                    v.set_len(len);
                }
                Storage::Heap(v)
            }
        };

        if let Some(mut old) = old_heap {
            // SAFETY: the elements were moved out bitwise above; only the
            // allocation is freed.
            unsafe { old.set_len(0) };
        }
        self.storage = storage;
    }

    fn try_region(&self, cap: usize) -> Option<NonNull<T>> {
        if mem::size_of::<T>() == 0 {
            return None;
        }
        let region = self.region?;
        let layout = Layout::array::<T>(cap).ok()?;
        match region.alloc_layout(layout) {
            Some(ptr) => Some(ptr.cast()),
            None => {
                trace!(cap, bytes = layout.size(), "region full, growing on heap");
                None
            }
        }
    }

    /// Copy the elements into a heap `Vec`, leaving region memory behind.
    pub fn into_vec(self) -> Vec<T> {
        let mut this = mem::ManuallyDrop::new(self);
        match &mut this.storage {
            Storage::Region { ptr, len, .. } => {
                let mut v = Vec::with_capacity(*len);
                // SAFETY: the elements are moved out bitwise exactly once;
                // `this` is never dropped.
                unsafe {
                    ptr::copy_nonoverlapping(ptr.as_ptr(), v.as_mut_ptr(), *len);
                    v.set_len(*len);
                }
                v
            }
            Storage::Heap(v) => mem::take(v),
        }
    }
}

impl<'r, T: Default, R: Region + ?Sized> ArenaVec<'r, T, R> {
    /// A vector of `len` default elements with room for `cap`.
    ///
    /// `cap` is raised to `len` if smaller.
    pub fn with_len_in(region: Option<&'r R>, len: usize, cap: usize) -> Self {
        let mut vec = Self::with_capacity_in(region, cap.max(len));
        for _ in 0..len {
            vec.push(T::default());
        }
        vec
    }
}

impl<'r, T: Clone, R: Region + ?Sized> ArenaVec<'r, T, R> {
    /// Append clones of `data`, growing at most once.
    pub fn extend_from_slice(&mut self, data: &[T]) {
        if data.is_empty() {
            return;
        }
        self.reserve(data.len());
        for item in data {
            self.push(item.clone());
        }
    }
}

/// A region-backed vector of `len` default elements with room for `cap`.
pub fn make_slice<'r, T, R>(region: Option<&'r R>, len: usize, cap: usize) -> ArenaVec<'r, T, R>
where
    T: Default,
    R: Region + ?Sized,
{
    ArenaVec::with_len_in(region, len, cap)
}

/// Append `data` to `vec`, growing through `region`.
///
/// The vector adopts `region` for this and later growth. With `None` the
/// append behaves like `Vec::extend_from_slice`, whatever storage the
/// elements are in now.
pub fn slice_append<'r, T, R>(
    region: Option<&'r R>,
    mut vec: ArenaVec<'r, T, R>,
    data: &[T],
) -> ArenaVec<'r, T, R>
where
    T: Clone,
    R: Region + ?Sized,
{
    vec.region = region;
    vec.extend_from_slice(data);
    vec
}

impl<T, R: Region + ?Sized> Drop for ArenaVec<'_, T, R> {
    fn drop(&mut self) {
        if let Storage::Region { ptr, len, .. } = self.storage {
            let elems = ptr::slice_from_raw_parts_mut(ptr.as_ptr(), len);
            // SAFETY: the `len` elements are initialised and dropped once.
            unsafe { ptr::drop_in_place(elems) };
        }
    }
}

impl<T, R: Region + ?Sized> Deref for ArenaVec<'_, T, R> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, R: Region + ?Sized> DerefMut for ArenaVec<'_, T, R> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, R: Region + ?Sized> fmt::Debug for ArenaVec<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, R: Region + ?Sized> PartialEq<[T]> for ArenaVec<'_, T, R> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T, R: Region + ?Sized> Extend<T> for ArenaVec<'_, T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for item in iter {
            self.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use nuke_arena::{MonotonicRegion, Region};

    use super::*;

    #[test]
    fn growth_policy_doubles_then_adds_a_quarter() {
        assert_eq!(next_capacity(0, 5), 5);
        assert_eq!(next_capacity(4, 5), 8);
        assert_eq!(next_capacity(4, 33), 64);
        assert_eq!(next_capacity(256, 257), 320);
        assert_eq!(next_capacity(200, 300), 400);
        assert_eq!(next_capacity(8, 8), 8);
    }

    #[test]
    fn growth_saturates_instead_of_overflowing() {
        assert_eq!(next_capacity(usize::MAX / 2 + 1, usize::MAX), usize::MAX);
    }

    #[test]
    fn make_slice_fills_defaults_in_region() {
        let region = MonotonicRegion::new(1024, 1);
        let v: ArenaVec<'_, u32, _> = make_slice(Some(&region), 3, 8);
        assert_eq!(v.as_slice(), &[0, 0, 0]);
        assert_eq!(v.capacity(), 8);
        assert!(v.is_in_region());
        assert!(region.owns(v.as_ptr().cast()));
    }

    #[test]
    fn capacity_is_raised_to_len() {
        let region = MonotonicRegion::new(1024, 1);
        let v: ArenaVec<'_, u8, _> = make_slice(Some(&region), 10, 2);
        assert_eq!(v.len(), 10);
        assert_eq!(v.capacity(), 10);
    }

    #[test]
    fn append_grows_in_region_and_keeps_elements() {
        let region = MonotonicRegion::new(4096, 1);
        let mut v = ArenaVec::with_capacity_in(Some(&region), 2);
        v.extend_from_slice(&[1u64, 2]);
        let before = v.as_ptr();
        v = slice_append(Some(&region), v, &[3, 4, 5]);
        assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(v.capacity(), 8);
        assert!(v.is_in_region());
        assert_ne!(v.as_ptr(), before);
        // 2 + 8 elements of 8 bytes, the old storage is abandoned.
        assert_eq!(region.stats().used_bytes, 80);
    }

    #[test]
    fn empty_vector_grows_to_exact_fit() {
        let region = MonotonicRegion::new(4096, 1);
        let v = slice_append(Some(&region), ArenaVec::new_in(None), &[7u16, 8, 9]);
        assert_eq!(v.capacity(), 3);
        assert!(v.is_in_region());
    }

    #[test]
    fn exhaustion_moves_elements_to_heap() {
        let region = MonotonicRegion::new(16, 1);
        let mut v = ArenaVec::with_capacity_in(Some(&region), 4);
        v.extend_from_slice(&[1u32, 2, 3, 4]);
        assert!(v.is_in_region());
        v.push(5);
        assert!(!v.is_in_region());
        assert_eq!(v.as_slice(), &[1, 2, 3, 4, 5]);
        assert!(v.capacity() >= 5);
    }

    #[test]
    fn append_without_region_leaves_region_alone() {
        let region = MonotonicRegion::new(256, 1);
        let v: ArenaVec<'_, u8, _> = make_slice(Some(&region), 2, 2);
        let used = region.stats().used_bytes;
        let v = slice_append(None, v, &[1, 2, 3]);
        assert_eq!(v.as_slice(), &[0, 0, 1, 2, 3]);
        assert!(!v.is_in_region());
        assert_eq!(region.stats().used_bytes, used);
    }

    #[test]
    fn append_adopts_the_given_region() {
        let region = MonotonicRegion::new(256, 1);
        let v: ArenaVec<'_, u8, MonotonicRegion> = ArenaVec::new_in(None);
        assert!(v.region().is_none());
        let v = slice_append(Some(&region), v, &[1, 2]);
        assert!(v.region().is_some_and(|r| r.id() == region.id()));
        let v = slice_append(None, v, &[3]);
        assert!(v.region().is_none());
    }

    #[test]
    fn no_region_behaves_like_vec() {
        let mut v: ArenaVec<'_, i32> = ArenaVec::new_in(None);
        v.extend([1, 2, 3]);
        assert_eq!(v.pop(), Some(3));
        assert!(!v.is_in_region());
        assert_eq!(v.into_vec(), vec![1, 2]);
    }

    #[test]
    fn zero_sized_elements_use_the_heap() {
        let region = MonotonicRegion::new(64, 1);
        let mut v = ArenaVec::new_in(Some(&region));
        for _ in 0..100 {
            v.push(());
        }
        assert_eq!(v.len(), 100);
        assert_eq!(region.stats().used_bytes, 0);
    }

    #[test]
    fn pop_and_clear_in_region() {
        let region = MonotonicRegion::new(256, 1);
        let mut v = ArenaVec::with_capacity_in(Some(&region), 4);
        v.extend_from_slice(&[String::from("a"), String::from("b")]);
        assert_eq!(v.pop().as_deref(), Some("b"));
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), 4);
    }

    #[test]
    fn elements_dropped_once_across_relocation() {
        struct Counted(Arc<AtomicUsize>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let region = MonotonicRegion::new(64, 1);
        {
            let mut v = ArenaVec::new_in(Some(&region));
            for _ in 0..20 {
                v.push(Counted(Arc::clone(&drops)));
            }
            assert!(!v.is_in_region());
            assert_eq!(drops.load(Ordering::SeqCst), 0);
        }
        assert_eq!(drops.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn into_vec_copies_out_of_region() {
        let region = MonotonicRegion::new(256, 1);
        let v: ArenaVec<'_, u8, _> = make_slice(Some(&region), 4, 4);
        let heap = v.into_vec();
        assert_eq!(heap, vec![0; 4]);
    }

    #[test]
    fn trait_object_default_parameter() {
        let region: Box<dyn Region> = Box::new(MonotonicRegion::new(256, 1));
        let mut v: ArenaVec<'_, u8> = ArenaVec::new_in(Some(&*region));
        v.push(1);
        assert!(v.is_in_region());
    }
}
