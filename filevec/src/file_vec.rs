//! Persistent, growable array stored in a memory-mapped file
//!
//! [`FileVec`] behaves like a `Vec` whose buffer is a shared mapping of a
//! regular file. The file is headerless: it holds `len()` raw element
//! encodings back to back, so its length alone encodes the logical size. While
//! open the file may be longer (reserved capacity); on close it is truncated to
//! exactly `len() * size_of::<T>()` bytes and reopening resumes where it left
//! off.
//!
//! # Invalidation
//!
//! Growth and shrink remap the file and move the base address. Every method
//! that can remap takes `&mut self`, so slices, references and cursors into the
//! container cannot outlive a remap.
//!
//! # Element lifetime
//!
//! Slots enter and leave the live range through the element's
//! [`Lifecycle`](filevec_core::Lifecycle). Elements that are still live when
//! the container is closed stay in the file and are not destroyed.

use crate::config::FileVecConfig;
use crate::error::{Error, Result};
use crate::mmap_backend::BackingStore;
use filevec_core::{
    check_index, grown_capacity, ConstCursor, ConstReverseCursor, CursorMut, Element,
    ReverseCursorMut,
};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::warn;

mod modifiers;

/// Lifecycle strategy selected by the element type
type Slots<T> = <T as Element>::Lifecycle;

/// A growable array whose storage is a memory-mapped file
pub struct FileVec<T: Element> {
    store: BackingStore<T>,
    used: usize,
    config: FileVecConfig,
    _owns: PhantomData<T>,
}

impl<T: Element> FileVec<T> {
    /// Open the file at `path`, creating it if absent
    ///
    /// An existing file of `L` bytes yields `L / size_of::<T>()` live elements.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, FileVecConfig::default())
    }

    /// Open with explicit configuration
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: FileVecConfig) -> Result<Self> {
        let store = BackingStore::open(path.as_ref(), &config)?;
        let used = store.reserved();
        Ok(Self {
            store,
            used,
            config,
            _owns: PhantomData,
        })
    }

    /// Open and replace the contents with `len` default elements
    pub fn with_len<P: AsRef<Path>>(path: P, len: usize) -> Result<Self>
    where
        T: Default + Clone,
    {
        let mut vec = Self::open(path)?;
        vec.assign_default(len)?;
        Ok(vec)
    }

    /// Open and replace the contents with `len` copies of `value`
    pub fn from_elem<P: AsRef<Path>>(path: P, len: usize, value: &T) -> Result<Self>
    where
        T: Clone,
    {
        let mut vec = Self::open(path)?;
        vec.assign_n(len, value)?;
        Ok(vec)
    }

    /// Open and replace the contents with a copy of `values`
    pub fn from_slice<P: AsRef<Path>>(path: P, values: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        let mut vec = Self::open(path)?;
        vec.assign_slice(values)?;
        Ok(vec)
    }

    /// Open and replace the contents with a copy of another container's
    pub fn from_file_vec<P: AsRef<Path>>(path: P, other: &FileVec<T>) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice(path, other.as_slice())
    }

    // Capacity

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.used
    }

    /// Number of live elements
    pub fn size(&self) -> usize {
        self.used
    }

    /// Number of slots currently mapped
    pub fn capacity(&self) -> usize {
        self.store.reserved()
    }

    /// True when there are no live elements
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// True when there are no live elements
    pub fn empty(&self) -> bool {
        self.used == 0
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// False after [`FileVec::close`]
    pub fn is_open(&self) -> bool {
        self.store.is_open()
    }

    /// Configuration the container was opened with
    pub fn config(&self) -> &FileVecConfig {
        &self.config
    }

    // Element access

    /// The live elements as a slice
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, used) are live slots inside the current mapping
        unsafe { std::slice::from_raw_parts(self.store.base().as_ptr(), self.used) }
    }

    /// The live elements as a mutable slice
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let used = self.used;
        // SAFETY: [0, used) are live slots inside the current mapping
        unsafe { std::slice::from_raw_parts_mut(self.store.base_mut().as_ptr(), used) }
    }

    /// Raw pointer to the first slot; invalidated by any remap
    pub fn data(&self) -> *const T {
        self.store.base().as_ptr()
    }

    /// Raw mutable pointer to the first slot; invalidated by any remap
    pub fn data_mut(&mut self) -> *mut T {
        self.store.base_mut().as_ptr()
    }

    /// Bounds-checked access
    ///
    /// Takes any integer so that negative indices are reported as
    /// [`Error::Index`] too.
    pub fn at<I: TryInto<i128>>(&self, index: I) -> Result<&T> {
        let index = check_index(index, self.used)?;
        Ok(&self.as_slice()[index])
    }

    /// Bounds-checked mutable access
    pub fn at_mut<I: TryInto<i128>>(&mut self, index: I) -> Result<&mut T> {
        let index = check_index(index, self.used)?;
        Ok(&mut self.as_mut_slice()[index])
    }

    /// First element
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    pub fn front(&self) -> &T {
        &self.as_slice()[0]
    }

    /// Mutable first element; panics if empty
    pub fn front_mut(&mut self) -> &mut T {
        &mut self.as_mut_slice()[0]
    }

    /// Last element
    ///
    /// # Panics
    ///
    /// Panics if the container is empty.
    pub fn back(&self) -> &T {
        let last = self.used.wrapping_sub(1);
        &self.as_slice()[last]
    }

    /// Mutable last element; panics if empty
    pub fn back_mut(&mut self) -> &mut T {
        let last = self.used.wrapping_sub(1);
        &mut self.as_mut_slice()[last]
    }

    // Cursors

    /// Read-only cursor at the first element
    pub fn begin(&self) -> ConstCursor<'_, T> {
        ConstCursor::first(self.as_slice())
    }

    /// Read-only cursor one past the last element
    pub fn end(&self) -> ConstCursor<'_, T> {
        ConstCursor::past_end(self.as_slice())
    }

    /// Read-only reverse cursor at the last element
    pub fn rbegin(&self) -> ConstReverseCursor<'_, T> {
        ConstReverseCursor::first(self.as_slice())
    }

    /// Read-only reverse cursor one before the first element
    pub fn rend(&self) -> ConstReverseCursor<'_, T> {
        ConstReverseCursor::past_end(self.as_slice())
    }

    /// Mutable cursor at the first element; walk it until [`at_end`]
    ///
    /// [`at_end`]: filevec_core::Cursor::at_end
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::first_mut(self.as_mut_slice())
    }

    /// Mutable reverse cursor at the last element
    pub fn rbegin_mut(&mut self) -> ReverseCursorMut<'_, T> {
        ReverseCursorMut::first_mut(self.as_mut_slice())
    }

    // Storage

    /// Exchange the entire identities of two containers
    ///
    /// File, mapping, size, capacity and path move; no element is touched.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Flush outstanding writes in the mapping to the file
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Release the mapping and truncate the file to the live elements
    ///
    /// Live elements are persisted, not destroyed. Closing twice is a no-op;
    /// afterwards the container is empty and any operation that needs storage
    /// reports [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        let used = std::mem::take(&mut self.used);
        self.store.close(used)
    }

    /// Remap to exactly `slots` slots; `slots` must be at least `used`
    fn remap(&mut self, slots: usize) -> Result<()> {
        debug_assert!(slots >= self.used);
        let result = self.store.remap(slots);
        if !self.store.is_open() {
            // A failed remap that could not be rolled back closes the store
            self.used = 0;
        }
        result
    }

    /// Make room for `additional` more elements, doubling when full
    fn grow_for(&mut self, additional: usize) -> Result<()> {
        let required = self
            .used
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow)?;
        if required <= self.capacity() {
            return Ok(());
        }
        let target = grown_capacity(self.used, additional, self.config.min_capacity)?;
        self.remap(target)
    }

    /// Make sure at least `slots` slots are mapped without rounding up
    fn ensure_capacity(&mut self, slots: usize) -> Result<()> {
        if slots > self.capacity() {
            self.remap(slots)?;
        }
        Ok(())
    }
}

impl<T: Element> Drop for FileVec<T> {
    fn drop(&mut self) {
        if self.store.is_open() {
            if let Err(err) = self.close() {
                warn!(
                    path = %self.store.path().display(),
                    error = %err,
                    "failed to close file vector"
                );
            }
        }
    }
}

impl<T: Element> Deref for FileVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Element> DerefMut for FileVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T: Element> IntoIterator for &'a FileVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T: Element> IntoIterator for &'a mut FileVec<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T: Element + PartialEq> PartialEq for FileVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + Eq> Eq for FileVec<T> {}

impl<T: Element + PartialEq> PartialEq<[T]> for FileVec<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Element + PartialEq> PartialEq<&[T]> for FileVec<T> {
    fn eq(&self, other: &&[T]) -> bool {
        self.as_slice() == *other
    }
}

impl<T: Element + PartialEq> PartialEq<Vec<T>> for FileVec<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + PartialEq, const N: usize> PartialEq<[T; N]> for FileVec<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Element + fmt::Debug> fmt::Debug for FileVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileVec")
            .field("path", &self.store.path())
            .field("capacity", &self.capacity())
            .field("elements", &self.as_slice())
            .finish()
    }
}
