//! Slot lifecycle strategies
//!
//! A lifecycle brings raw slots of a mapping into a live state and takes them
//! back out. The strategy is picked per element type through
//! [`Element::Lifecycle`](crate::Element::Lifecycle), so the choice between the
//! trivial and the non-trivial path is made at compile time.
//!
//! All functions take raw slot pointers. The container is responsible for
//! never constructing a live slot twice and never destroying a slot that is
//! not live.

use bytemuck::Pod;
use core::ptr;

/// Strategy for constructing and destroying element slots in place
pub trait Lifecycle<T> {
    /// Bring one slot to a default state
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes, properly aligned and not live.
    unsafe fn construct(slot: *mut T);

    /// Bring one slot to a copy of `from`
    ///
    /// # Safety
    ///
    /// Same as [`Lifecycle::construct`].
    unsafe fn construct_from(slot: *mut T, from: &T);

    /// Move an owned value into one slot
    ///
    /// # Safety
    ///
    /// Same as [`Lifecycle::construct`].
    unsafe fn construct_with(slot: *mut T, value: T) {
        ptr::write(slot, value);
    }

    /// Default-construct `count` consecutive slots starting at `first`
    ///
    /// # Safety
    ///
    /// Every slot in `[first, first + count)` must satisfy the requirements of
    /// [`Lifecycle::construct`].
    unsafe fn construct_many(first: *mut T, count: usize) {
        for i in 0..count {
            Self::construct(first.add(i));
        }
    }

    /// Copy-construct `count` consecutive slots from `from`
    ///
    /// # Safety
    ///
    /// Same as [`Lifecycle::construct_many`].
    unsafe fn construct_many_from(first: *mut T, count: usize, from: &T) {
        for i in 0..count {
            Self::construct_from(first.add(i), from);
        }
    }

    /// Tear down one live slot
    ///
    /// # Safety
    ///
    /// `slot` must be live; it is not live afterwards.
    unsafe fn destroy(slot: *mut T);

    /// Tear down `count` live slots in forward order
    ///
    /// # Safety
    ///
    /// Every slot in `[first, first + count)` must be live.
    unsafe fn destroy_many(first: *mut T, count: usize) {
        for i in 0..count {
            Self::destroy(first.add(i));
        }
    }
}

/// Lifecycle for plain-data types: bytes and values are the same thing
///
/// Default construction and destruction are no-ops, so a freshly exposed slot
/// holds whatever bytes the file already has there (zeroes for a region the
/// file was just extended over).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trivial {}

impl<T: Pod> Lifecycle<T> for Trivial {
    #[inline]
    unsafe fn construct(_slot: *mut T) {}

    #[inline]
    unsafe fn construct_from(slot: *mut T, from: &T) {
        ptr::write(slot, *from);
    }

    unsafe fn construct_many(_first: *mut T, _count: usize) {}

    unsafe fn construct_many_from(first: *mut T, count: usize, from: &T) {
        core::slice::from_raw_parts_mut(first, count).fill(*from);
    }

    #[inline]
    unsafe fn destroy(_slot: *mut T) {}

    unsafe fn destroy_many(_first: *mut T, _count: usize) {}
}

/// Lifecycle for types with a meaningful constructor or destructor
///
/// Default construction writes `T::default()`, copies go through `Clone`, and
/// destruction runs the type's `Drop` in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonTrivial {}

impl<T: Default + Clone> Lifecycle<T> for NonTrivial {
    #[inline]
    unsafe fn construct(slot: *mut T) {
        ptr::write(slot, T::default());
    }

    #[inline]
    unsafe fn construct_from(slot: *mut T, from: &T) {
        ptr::write(slot, from.clone());
    }

    #[inline]
    unsafe fn destroy(slot: *mut T) {
        ptr::drop_in_place(slot);
    }
}
