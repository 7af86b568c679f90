//! Capacity changes and the mutation surface of [`FileVec`]
//!
//! Elements inside the live range are relocated with `ptr::copy`, which is a
//! move: shifting never constructs or destroys. Only slots entering or leaving
//! `[0, used)` go through the lifecycle, and `used` is always lowered before
//! a slot is torn down or filled so that a panicking `Clone` or `Default`
//! leaks instead of dropping twice.

use super::{FileVec, Slots};
use crate::error::{Error, Result};
use filevec_core::{check_index, check_position, check_range, Element, Lifecycle};
use std::ops::{Bound, RangeBounds};
use std::ptr;

impl<T: Element> FileVec<T> {
    // Capacity

    /// Remap to exactly `max(n, len())` slots
    ///
    /// Unlike `Vec::reserve` this can also shrink the mapping, but it never
    /// drops live elements.
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        let target = n.max(self.used);
        if target != self.capacity() {
            self.remap(target)?;
        }
        Ok(())
    }

    /// Release all capacity beyond the live elements
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.reserve(self.used)
    }

    /// Resize to `n` elements, filling new slots with the lifecycle default
    ///
    /// Surviving elements are left untouched. For [`Trivial`] elements a new
    /// slot holds whatever bytes the file has there.
    ///
    /// [`Trivial`]: filevec_core::Trivial
    pub fn resize(&mut self, n: usize) -> Result<()> {
        if n <= self.used {
            self.truncate(n);
            return Ok(());
        }
        self.ensure_capacity(n)?;
        let used = self.used;
        let base = self.data_mut();
        // SAFETY: [used, n) is inside the mapping and not live
        unsafe { <Slots<T> as Lifecycle<T>>::construct_many(base.add(used), n - used) }
        self.used = n;
        Ok(())
    }

    /// Resize to `n` elements, filling new slots with clones of `fill`
    pub fn resize_with_value(&mut self, n: usize, fill: &T) -> Result<()> {
        if n <= self.used {
            self.truncate(n);
            return Ok(());
        }
        self.ensure_capacity(n)?;
        let used = self.used;
        let base = self.data_mut();
        // SAFETY: [used, n) is inside the mapping and not live
        unsafe {
            <Slots<T> as Lifecycle<T>>::construct_many_from(base.add(used), n - used, fill);
        }
        self.used = n;
        Ok(())
    }

    // Removal

    /// Destroy every element at index `n` and above; capacity is unchanged
    pub fn truncate(&mut self, n: usize) {
        if n >= self.used {
            return;
        }
        let removed = self.used - n;
        self.used = n;
        let base = self.data_mut();
        // SAFETY: [n, n + removed) were live and are no longer counted
        unsafe { <Slots<T> as Lifecycle<T>>::destroy_many(base.add(n), removed) };
    }

    /// Destroy all elements in order; capacity is unchanged
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroy the last element
    pub fn pop_back(&mut self) -> Result<()> {
        if self.used == 0 {
            return Err(Error::Empty);
        }
        self.truncate(self.used - 1);
        Ok(())
    }

    /// Move the last element out
    pub fn pop(&mut self) -> Option<T> {
        if self.used == 0 {
            return None;
        }
        self.used -= 1;
        let last = self.used;
        // SAFETY: the slot was live and has just left the live range, so
        // ownership moves to the caller
        Some(unsafe { ptr::read(self.data_mut().add(last)) })
    }

    /// Remove the element at `pos`, shifting the tail down by one
    pub fn erase<I: TryInto<i128>>(&mut self, pos: I) -> Result<()> {
        let pos = check_index(pos, self.used)?;
        self.erase_range(pos..pos + 1)
    }

    /// Remove the elements in `range`, shifting the tail down to close the gap
    ///
    /// An empty range is a no-op.
    pub fn erase_range<R: RangeBounds<usize>>(&mut self, range: R) -> Result<()> {
        let first = match range.start_bound() {
            Bound::Included(&start) => start,
            Bound::Excluded(&start) => start.checked_add(1).ok_or(Error::CapacityOverflow)?,
            Bound::Unbounded => 0,
        };
        let last = match range.end_bound() {
            Bound::Included(&end) => end.checked_add(1).ok_or(Error::CapacityOverflow)?,
            Bound::Excluded(&end) => end,
            Bound::Unbounded => self.used,
        };
        check_range(first, last, self.used)?;
        if first == last {
            return Ok(());
        }

        let tail = self.used - last;
        self.used = first;
        let base = self.data_mut();
        // SAFETY: [first, last) were live; the tail [last, last + tail) is
        // moved down into the vacated slots and counted live again after
        unsafe {
            <Slots<T> as Lifecycle<T>>::destroy_many(base.add(first), last - first);
            ptr::copy(base.add(last), base.add(first), tail);
        }
        self.used = first + tail;
        Ok(())
    }

    // Assignment

    /// Replace the contents with the items of `iter`
    pub fn assign_iter<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        let iter = iter.into_iter();
        self.ensure_capacity(iter.size_hint().0)?;

        let mut written = 0;
        for value in iter {
            if written < self.used {
                self.as_mut_slice()[written] = value;
            } else {
                self.push(value)?;
            }
            written += 1;
        }
        self.truncate(written);
        Ok(())
    }

    /// Replace the contents with clones of `values`
    pub fn assign_slice(&mut self, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.ensure_capacity(values.len())?;
        let overlap = values.len().min(self.used);
        self.as_mut_slice()[..overlap].clone_from_slice(&values[..overlap]);
        if values.len() <= self.used {
            self.truncate(values.len());
            return Ok(());
        }
        let base = self.data_mut();
        for value in &values[overlap..] {
            let slot = self.used;
            // SAFETY: capacity covers values.len() and `slot` is not live
            unsafe { <Slots<T> as Lifecycle<T>>::construct_from(base.add(slot), value) };
            self.used += 1;
        }
        Ok(())
    }

    /// Replace the contents with `n` clones of `value`
    pub fn assign_n(&mut self, n: usize, value: &T) -> Result<()>
    where
        T: Clone,
    {
        self.ensure_capacity(n)?;
        let overlap = n.min(self.used);
        self.as_mut_slice()[..overlap].fill(value.clone());
        if n <= self.used {
            self.truncate(n);
            return Ok(());
        }
        self.resize_with_value(n, value)
    }

    /// Replace the contents with `n` default elements
    pub fn assign_default(&mut self, n: usize) -> Result<()>
    where
        T: Default + Clone,
    {
        self.assign_n(n, &T::default())
    }

    /// Replace the contents with a copy of another container's
    pub fn copy_from(&mut self, other: &FileVec<T>) -> Result<()>
    where
        T: Clone,
    {
        self.assign_slice(other.as_slice())
    }

    // Append

    /// Append a clone of `value`
    pub fn push_back(&mut self, value: &T) -> Result<()> {
        self.grow_for(1)?;
        let slot = self.used;
        let base = self.data_mut();
        // SAFETY: grow_for made `slot` a mapped, non-live slot
        unsafe { <Slots<T> as Lifecycle<T>>::construct_from(base.add(slot), value) };
        self.used += 1;
        Ok(())
    }

    /// Append an owned value
    pub fn push(&mut self, value: T) -> Result<()> {
        self.emplace_back(|| value).map(|_| ())
    }

    /// Append the value produced by `make`, written straight into its slot
    ///
    /// `make` only runs once capacity for the new element is secured.
    pub fn emplace_back<F: FnOnce() -> T>(&mut self, make: F) -> Result<&mut T> {
        self.grow_for(1)?;
        let slot = self.used;
        let base = self.data_mut();
        // SAFETY: grow_for made `slot` a mapped, non-live slot
        unsafe {
            <Slots<T> as Lifecycle<T>>::construct_with(base.add(slot), make());
            self.used += 1;
            Ok(&mut *base.add(slot))
        }
    }

    // Positional insert

    /// Insert `value` before index `pos`; `pos == len()` appends
    pub fn insert(&mut self, pos: usize, value: T) -> Result<()> {
        let pos = check_position(pos, self.used)?;
        self.grow_for(1)?;
        let tail = self.used - pos;
        let base = self.data_mut();
        // SAFETY: the tail moves up one slot into mapped capacity, leaving a
        // non-live gap at `pos`
        unsafe {
            ptr::copy(base.add(pos), base.add(pos + 1), tail);
            <Slots<T> as Lifecycle<T>>::construct_with(base.add(pos), value);
        }
        self.used += 1;
        Ok(())
    }

    /// Insert `count` clones of `value` before index `pos`
    pub fn insert_n(&mut self, pos: usize, count: usize, value: &T) -> Result<()> {
        let pos = check_position(pos, self.used)?;
        if count == 0 {
            return Ok(());
        }
        self.grow_for(count)?;
        let tail = self.used - pos;
        self.used = pos;
        let base = self.data_mut();
        // SAFETY: the tail moves up by `count` into mapped capacity; while the
        // gap is filled only the head is counted live
        unsafe {
            ptr::copy(base.add(pos), base.add(pos + count), tail);
            <Slots<T> as Lifecycle<T>>::construct_many_from(base.add(pos), count, value);
        }
        self.used = pos + count + tail;
        Ok(())
    }

    /// Insert clones of `values` before index `pos`, preserving their order
    pub fn insert_slice(&mut self, pos: usize, values: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let pos = check_position(pos, self.used)?;
        let count = values.len();
        if count == 0 {
            return Ok(());
        }
        self.grow_for(count)?;
        let tail = self.used - pos;
        self.used = pos;
        let base = self.data_mut();
        // SAFETY: as in insert_n
        unsafe {
            ptr::copy(base.add(pos), base.add(pos + count), tail);
            for (i, value) in values.iter().enumerate() {
                <Slots<T> as Lifecycle<T>>::construct_from(base.add(pos + i), value);
            }
        }
        self.used = pos + count + tail;
        Ok(())
    }

    /// Insert the items of `iter` before index `pos`, preserving their order
    ///
    /// The items are gathered first so the tail is shifted exactly once.
    pub fn insert_iter<I: IntoIterator<Item = T>>(&mut self, pos: usize, iter: I) -> Result<()> {
        let pos = check_position(pos, self.used)?;
        let values: Vec<T> = iter.into_iter().collect();
        let count = values.len();
        if count == 0 {
            return Ok(());
        }
        self.grow_for(count)?;
        let tail = self.used - pos;
        let base = self.data_mut();
        // SAFETY: as in insert; moving values out of a Vec cannot panic
        unsafe {
            ptr::copy(base.add(pos), base.add(pos + count), tail);
            for (i, value) in values.into_iter().enumerate() {
                <Slots<T> as Lifecycle<T>>::construct_with(base.add(pos + i), value);
            }
        }
        self.used += count;
        Ok(())
    }
}
