//! Random-access cursors over a live slot range
//!
//! One cursor type covers all four traversal kinds. The [`Direction`] parameter
//! decides whether an increment walks towards higher or lower slots, and the
//! [`Access`] parameter decides whether the cursor hands out shared or
//! exclusive references.
//!
//! A cursor borrows the range it was created from for `'a`. Anything that would
//! remap the underlying storage needs exclusive access to the owner, so a
//! cursor can never observe a stale mapping.
//!
//! Dereferencing is checked against the live range captured at creation:
//! [`Cursor::get`] returns `None` and indexing panics outside of it.

use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};
use core::ptr::NonNull;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Forward {}
    impl Sealed for super::Reverse {}
    impl Sealed for super::Shared {}
    impl Sealed for super::Exclusive {}
}

/// Traversal order of a cursor
pub trait Direction: sealed::Sealed {
    /// Slot delta of one increment
    const STEP: isize;

    /// Position of the first element of a range of `len` slots
    fn first(len: usize) -> isize;

    /// Position one step past the last element
    fn past_end(len: usize) -> isize;
}

/// Walks slots upward from the base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Forward {}

/// Walks slots downward from the last live slot to one before the base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reverse {}

impl Direction for Forward {
    const STEP: isize = 1;

    fn first(_len: usize) -> isize {
        0
    }

    fn past_end(len: usize) -> isize {
        len as isize
    }
}

impl Direction for Reverse {
    const STEP: isize = -1;

    fn first(len: usize) -> isize {
        len as isize - 1
    }

    fn past_end(_len: usize) -> isize {
        -1
    }
}

/// Kind of reference a cursor yields
pub trait Access: sealed::Sealed {}

/// Read-only cursor; `Copy`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shared {}

/// Read-write cursor; at most one exists per borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusive {}

impl Access for Shared {}
impl Access for Exclusive {}

/// Positional, non-owning reference into a slot range
pub struct Cursor<'a, T, D: Direction = Forward, A: Access = Shared> {
    base: NonNull<T>,
    len: usize,
    pos: isize,
    _marker: PhantomData<(&'a mut T, fn() -> (D, A))>,
}

/// Read-only forward cursor
pub type ConstCursor<'a, T> = Cursor<'a, T, Forward, Shared>;
/// Read-only reverse cursor
pub type ConstReverseCursor<'a, T> = Cursor<'a, T, Reverse, Shared>;
/// Mutable forward cursor
pub type CursorMut<'a, T> = Cursor<'a, T, Forward, Exclusive>;
/// Mutable reverse cursor
pub type ReverseCursorMut<'a, T> = Cursor<'a, T, Reverse, Exclusive>;

impl<'a, T, D: Direction> Cursor<'a, T, D, Shared> {
    /// Cursor at the first element of `slice` in traversal order
    pub fn first(slice: &'a [T]) -> Self {
        Self::new(NonNull::from(slice).cast(), slice.len(), D::first(slice.len()))
    }

    /// Cursor one step past the last element of `slice` in traversal order
    pub fn past_end(slice: &'a [T]) -> Self {
        Self::new(NonNull::from(slice).cast(), slice.len(), D::past_end(slice.len()))
    }

    /// Reference to the current element, if it is inside the live range
    pub fn get(&self) -> Option<&'a T> {
        // SAFETY: slot() only returns pointers into the borrowed live range
        self.slot(0).map(|slot| unsafe { &*slot.as_ptr() })
    }

    /// Advance and return the cursor as it was before
    pub fn post_inc(&mut self) -> Self {
        let previous = *self;
        self.inc();
        previous
    }

    /// Step back and return the cursor as it was before
    pub fn post_dec(&mut self) -> Self {
        let previous = *self;
        self.dec();
        previous
    }

    /// Iterate the elements of `[self, last)` in traversal order
    ///
    /// # Panics
    ///
    /// Panics if the range reaches outside the live range.
    pub fn until(self, last: Self) -> Span<'a, T, D> {
        let remaining = last.offset_from(&self).max(0) as usize;
        if remaining > 0 {
            assert!(
                self.slot(0).is_some() && self.slot(remaining as isize - 1).is_some(),
                "cursor range outside the live range"
            );
        }
        Span {
            first: self,
            remaining,
        }
    }
}

impl<'a, T, D: Direction> Cursor<'a, T, D, Exclusive> {
    /// Exclusive cursor at the first element of `slice` in traversal order
    pub fn first_mut(slice: &'a mut [T]) -> Self {
        let len = slice.len();
        Self::new(NonNull::from(slice).cast(), len, D::first(len))
    }

    /// Reference to the current element, if it is inside the live range
    pub fn get(&self) -> Option<&T> {
        // SAFETY: slot() only returns pointers into the borrowed live range
        self.slot(0).map(|slot| unsafe { &*slot.as_ptr() })
    }

    /// Mutable reference to the current element, if it is inside the live range
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: the cursor holds the only borrow of the range
        self.slot(0).map(|slot| unsafe { &mut *slot.as_ptr() })
    }

    /// Shared cursor at the same position, borrowing this one
    pub fn as_shared(&self) -> Cursor<'_, T, D, Shared> {
        Cursor::new(self.base, self.len, self.pos)
    }
}

impl<'a, T, D: Direction, A: Access> Cursor<'a, T, D, A> {
    fn new(base: NonNull<T>, len: usize, pos: isize) -> Self {
        Self {
            base,
            len,
            pos,
            _marker: PhantomData,
        }
    }

    /// Pointer to the slot `offset` steps away, if that slot is live
    fn slot(&self, offset: isize) -> Option<NonNull<T>> {
        let pos = self.pos.checked_add(offset.checked_mul(D::STEP)?)?;
        if pos < 0 || pos as usize >= self.len {
            return None;
        }
        // SAFETY: pos is within [0, len) of the range this cursor borrows
        Some(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(pos as usize)) })
    }

    /// Slot index the cursor refers to, counted from the base
    ///
    /// Reverse cursors report the underlying slot, so `rend()` is `-1`.
    pub fn position(&self) -> isize {
        self.pos
    }

    /// Address of the referenced slot; may point outside the live range
    pub fn as_ptr(&self) -> *const T {
        self.base.as_ptr().wrapping_offset(self.pos)
    }

    /// True once the cursor has walked off the end in its traversal order
    pub fn at_end(&self) -> bool {
        (self.pos - D::past_end(self.len)) * D::STEP >= 0
    }

    /// True when the cursor refers to a live slot
    pub fn is_dereferenceable(&self) -> bool {
        self.slot(0).is_some()
    }

    /// Reference to the current element without checking the live range
    ///
    /// # Safety
    ///
    /// The cursor must be dereferenceable.
    pub unsafe fn get_unchecked(&self) -> &T {
        &*self.base.as_ptr().offset(self.pos)
    }

    /// Advance one step in traversal order
    pub fn inc(&mut self) -> &mut Self {
        self.pos += D::STEP;
        self
    }

    /// Step back one step in traversal order
    pub fn dec(&mut self) -> &mut Self {
        self.pos -= D::STEP;
        self
    }

    /// Number of increments needed to get from `origin` to `self`
    pub fn offset_from(&self, origin: &Self) -> isize {
        (self.pos - origin.pos) * D::STEP
    }
}

impl<'a, T, D: Direction> Clone for Cursor<'a, T, D, Shared> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, D: Direction> Copy for Cursor<'a, T, D, Shared> {}

impl<'a, T, D: Direction, A: Access> Add<isize> for Cursor<'a, T, D, A> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<'a, T, D: Direction, A: Access> Sub<isize> for Cursor<'a, T, D, A> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<'a, T, D: Direction, A: Access> AddAssign<isize> for Cursor<'a, T, D, A> {
    fn add_assign(&mut self, n: isize) {
        self.pos += n * D::STEP;
    }
}

impl<'a, T, D: Direction, A: Access> SubAssign<isize> for Cursor<'a, T, D, A> {
    fn sub_assign(&mut self, n: isize) {
        self.pos -= n * D::STEP;
    }
}

impl<'a, T, D: Direction> Sub for Cursor<'a, T, D, Shared> {
    type Output = isize;

    fn sub(self, origin: Self) -> isize {
        self.offset_from(&origin)
    }
}

impl<'a, T, D: Direction, A: Access> Index<isize> for Cursor<'a, T, D, A> {
    type Output = T;

    fn index(&self, offset: isize) -> &T {
        match self.slot(offset) {
            // SAFETY: slot() only returns pointers into the borrowed live range
            Some(slot) => unsafe { &*slot.as_ptr() },
            None => panic!(
                "cursor offset {offset} from position {} outside live range of {}",
                self.pos, self.len
            ),
        }
    }
}

impl<'a, T, D: Direction> IndexMut<isize> for Cursor<'a, T, D, Exclusive> {
    fn index_mut(&mut self, offset: isize) -> &mut T {
        match self.slot(offset) {
            // SAFETY: the cursor holds the only borrow of the range
            Some(slot) => unsafe { &mut *slot.as_ptr() },
            None => panic!(
                "cursor offset {offset} from position {} outside live range of {}",
                self.pos, self.len
            ),
        }
    }
}

impl<'a, T, D: Direction, A: Access> PartialEq for Cursor<'a, T, D, A> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr()
    }
}

impl<'a, T, D: Direction, A: Access> Eq for Cursor<'a, T, D, A> {}

impl<'a, T, D: Direction, A: Access> PartialOrd for Cursor<'a, T, D, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T, D: Direction, A: Access> Ord for Cursor<'a, T, D, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Positions one before the base wrap around as addresses
        let ordering = if self.base == other.base {
            self.pos.cmp(&other.pos)
        } else {
            (self.as_ptr() as usize).cmp(&(other.as_ptr() as usize))
        };
        if D::STEP < 0 {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

impl<'a, T, D: Direction, A: Access> fmt::Debug for Cursor<'a, T, D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.pos)
            .field("len", &self.len)
            .field("step", &D::STEP)
            .finish()
    }
}

/// Iterator over the elements between two shared cursors
pub struct Span<'a, T, D: Direction = Forward> {
    first: Cursor<'a, T, D, Shared>,
    remaining: usize,
}

impl<'a, T, D: Direction> Clone for Span<'a, T, D> {
    fn clone(&self) -> Self {
        Self {
            first: self.first,
            remaining: self.remaining,
        }
    }
}

impl<'a, T, D: Direction> Iterator for Span<'a, T, D> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.first.get()?;
        self.first.inc();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, D: Direction> DoubleEndedIterator for Span<'a, T, D> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        (self.first + self.remaining as isize).get()
    }
}

impl<'a, T, D: Direction> ExactSizeIterator for Span<'a, T, D> {}

impl<'a, T, D: Direction> FusedIterator for Span<'a, T, D> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_algebra() {
        let data = [10, 11, 12, 13, 14];
        let begin = ConstCursor::first(&data);
        let end = ConstCursor::past_end(&data);

        assert_eq!(end - begin, 5);
        assert_eq!(begin[0], 10);
        assert_eq!(begin[3], 13);
        assert_eq!((begin + 2).get(), Some(&12));
        assert_eq!((end - 1).get(), Some(&14));
        assert!(end.get().is_none());
        assert!(begin < end);
        assert!(end.at_end());

        let mut c = begin;
        let before = c.post_inc();
        assert_eq!(before, begin);
        assert_eq!(c.position(), 1);
        c += 3;
        assert_eq!(c[0], 14);
        c -= 4;
        assert_eq!(c, begin);
    }

    #[test]
    fn test_reverse_algebra() {
        let data = [1, 2, 3, 4];
        let rbegin = ConstReverseCursor::first(&data);
        let rend = ConstReverseCursor::past_end(&data);

        assert_eq!(rbegin.position(), 3);
        assert_eq!(rend.position(), -1);
        assert_eq!(rend - rbegin, 4);
        assert!(rbegin < rend);
        assert_eq!(rbegin[0], 4);
        assert_eq!(rbegin[1], 3);
        assert_eq!((rbegin + 3).get(), Some(&1));

        let collected: [i32; 4] = {
            let mut out = [0; 4];
            let mut c = rbegin;
            let mut i = 0;
            while c != rend {
                out[i] = *c.get().unwrap();
                c.inc();
                i += 1;
            }
            out
        };
        assert_eq!(collected, [4, 3, 2, 1]);
    }

    #[test]
    fn test_empty_range() {
        let data: [u8; 0] = [];
        assert_eq!(ConstCursor::first(&data), ConstCursor::past_end(&data));
        assert_eq!(
            ConstReverseCursor::first(&data),
            ConstReverseCursor::past_end(&data)
        );
        assert!(ConstReverseCursor::first(&data).at_end());
    }

    #[test]
    fn test_exclusive_cursor_writes() {
        let mut data = [0u32; 4];
        let mut c = CursorMut::first_mut(&mut data);
        let mut i = 0;
        while !c.at_end() {
            *c.get_mut().unwrap() = i;
            i += 1;
            c.inc();
        }
        assert_eq!(data, [0, 1, 2, 3]);

        let mut r = ReverseCursorMut::first_mut(&mut data);
        r[1] = 20;
        r += 3;
        r[0] = 99;
        assert_eq!(r.as_shared().get(), Some(&99));
        assert_eq!(data, [99, 1, 20, 3]);
    }

    #[test]
    fn test_span_iteration() {
        let data = [9, 8, 7, 6, 5];
        let begin = ConstCursor::first(&data);
        let end = ConstCursor::past_end(&data);

        let mut span = (begin + 1).until(end - 1);
        assert_eq!(span.len(), 3);
        assert_eq!(span.next(), Some(&8));
        assert_eq!(span.next_back(), Some(&6));
        assert_eq!(span.next(), Some(&7));
        assert_eq!(span.next(), None);

        let reversed: [i32; 5] = {
            let mut out = [0; 5];
            for (slot, value) in out
                .iter_mut()
                .zip(ConstReverseCursor::first(&data).until(ConstReverseCursor::past_end(&data)))
            {
                *slot = *value;
            }
            out
        };
        assert_eq!(reversed, [5, 6, 7, 8, 9]);
    }

    #[test]
    #[should_panic(expected = "outside live range")]
    fn test_index_outside_range_panics() {
        let data = [1, 2];
        let end = ConstCursor::past_end(&data);
        let value = end[0];
        assert_eq!(value, 0);
    }
}
