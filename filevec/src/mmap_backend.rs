//! Memory-mapped file backend for file-backed vectors
//!
//! The backing store owns the file handle and the current read/write shared
//! mapping over it, and is the only component that talks to the operating
//! system. Capacity changes are remaps: the file length is changed, a new
//! mapping is established, and the old mapping is released. Every remap moves
//! the base address.

use crate::config::FileVecConfig;
use crate::error::{Error, Result};
use filevec_core::{byte_len_of, slot_count};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::{debug, warn};

/// File handle plus active mapping, sized in slots of `T`
///
/// A region of zero bytes is held as "no mapping"; the base pointer is then
/// dangling and only valid for zero-length slices.
#[derive(Debug)]
pub struct BackingStore<T> {
    path: PathBuf,
    file: Option<File>,
    map: Option<MmapMut>,
    reserved: usize,
    sync_on_close: bool,
    _slots: PhantomData<fn() -> T>,
}

impl<T> BackingStore<T> {
    /// Open or create the file at `path` and map its whole-slot contents
    ///
    /// The file is created with owner read/write permissions if absent. On any
    /// failure the handle is released before the fault is returned.
    pub fn open(path: &Path, config: &FileVecConfig) -> Result<Self> {
        if config.create_parent_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| Error::storage("create parent directories of", path, e))?;
            }
        }

        let mut options = OpenOptions::new();
        options.read(true).write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options
            .open(path)
            .map_err(|e| Error::storage("open", path, e))?;

        let byte_len = file
            .metadata()
            .map_err(|e| Error::storage("read the length of", path, e))?
            .len();

        let (reserved, trailing) = slot_count::<T>(byte_len)?;
        if trailing > 0 {
            warn!(
                path = %path.display(),
                trailing,
                "ignoring trailing bytes that do not fill a whole slot"
            );
        }

        let map = Self::map(&file, path, reserved)?;

        debug!(path = %path.display(), slots = reserved, "opened backing store");

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            map,
            reserved,
            sync_on_close: config.sync_on_close,
            _slots: PhantomData,
        })
    }

    fn map(file: &File, path: &Path, slots: usize) -> Result<Option<MmapMut>> {
        let len = byte_len_of::<T>(slots)?;
        if len == 0 {
            return Ok(None);
        }

        // SAFETY: The mapping is shared with the file, which this store keeps
        // open and sized to at least `len` bytes for the mapping's lifetime.
        // Concurrent modification by other processes is outside the contract.
        let map = unsafe { MmapOptions::new().len(len).map_mut(file) }
            .map_err(|e| Error::storage("map", path, e))?;

        debug_assert_eq!(map.as_ptr() as usize % std::mem::align_of::<T>(), 0);
        Ok(Some(map))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Slots currently covered by the mapping
    pub fn reserved(&self) -> usize {
        self.reserved
    }

    /// False after close or after a failed remap left the store unusable
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Base of the mapping for reads
    pub fn base(&self) -> NonNull<T> {
        self.map
            .as_ref()
            .and_then(|map| NonNull::new(map.as_ptr() as *mut T))
            .unwrap_or(NonNull::dangling())
    }

    /// Base of the mapping for writes
    pub fn base_mut(&mut self) -> NonNull<T> {
        self.map
            .as_mut()
            .and_then(|map| NonNull::new(map.as_mut_ptr().cast::<T>()))
            .unwrap_or(NonNull::dangling())
    }

    /// Change the capacity to exactly `new_reserved` slots
    ///
    /// Resizes the file, maps the new length, then releases the old mapping.
    /// If mapping fails the previous file length is restored; if that fails as
    /// well the store is left closed and reports [`Error::Closed`] from then on.
    pub fn remap(&mut self, new_reserved: usize) -> Result<()> {
        if new_reserved == self.reserved {
            return Ok(());
        }
        let Some(file) = self.file.as_ref() else {
            return Err(Error::Closed);
        };

        let old_bytes = byte_len_of::<T>(self.reserved)?;
        let new_bytes = byte_len_of::<T>(new_reserved)?;

        file.set_len(new_bytes as u64)
            .map_err(|e| Error::storage("resize", &self.path, e))?;

        match Self::map(file, &self.path, new_reserved) {
            Ok(map) => {
                // Dropping the previous mapping unmaps it
                self.map = map;
                debug!(
                    path = %self.path.display(),
                    from = self.reserved,
                    to = new_reserved,
                    "remapped backing store"
                );
                self.reserved = new_reserved;
                Ok(())
            }
            Err(err) => {
                if let Err(restore) = file.set_len(old_bytes as u64) {
                    warn!(
                        path = %self.path.display(),
                        error = %restore,
                        "could not restore file length after failed remap, closing store"
                    );
                    self.map = None;
                    self.file = None;
                    self.reserved = 0;
                }
                Err(err)
            }
        }
    }

    /// Flush outstanding writes in the mapping to the file
    pub fn flush(&self) -> Result<()> {
        if self.file.is_none() {
            return Err(Error::Closed);
        }
        if let Some(map) = &self.map {
            map.flush()
                .map_err(|e| Error::storage("flush", &self.path, e))?;
        }
        Ok(())
    }

    /// Release the mapping, truncate the file to `used` slots, close the handle
    ///
    /// Closing a closed store is a no-op. The store is closed afterwards even
    /// when a step fails, and the truncate is attempted even when the flush
    /// fails; the first fault is reported.
    pub fn close(&mut self, used: usize) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let map = self.map.take();
        self.reserved = 0;

        let flushed = match &map {
            Some(map) if self.sync_on_close => map
                .flush()
                .map_err(|e| Error::storage("flush", &self.path, e)),
            _ => Ok(()),
        };
        drop(map);

        let truncated = byte_len_of::<T>(used)
            .map_err(Error::from)
            .and_then(|bytes| {
                file.set_len(bytes as u64)
                    .map_err(|e| Error::storage("truncate", &self.path, e))
            });

        if let Err(err) = &flushed {
            warn!(path = %self.path.display(), error = %err, "flush before close failed");
        }
        flushed.and(truncated)?;

        debug!(path = %self.path.display(), slots = used, "closed backing store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.fv");

        let store = BackingStore::<u32>::open(&path, &FileVecConfig::default()).unwrap();
        assert!(store.is_open());
        assert_eq!(store.reserved(), 0);
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_open_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("existing.fv");
        fs::write(&path, [1u8, 0, 0, 0, 2, 0, 0, 0, 9, 9]).unwrap();

        let store = BackingStore::<u32>::open(&path, &FileVecConfig::default()).unwrap();
        assert_eq!(store.reserved(), 2);
    }

    #[test]
    fn test_remap_resizes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("remap.fv");
        let mut store = BackingStore::<u64>::open(&path, &FileVecConfig::default()).unwrap();

        store.remap(16).unwrap();
        assert_eq!(store.reserved(), 16);
        assert_eq!(fs::metadata(&path).unwrap().len(), 128);

        // SAFETY: slot 3 is inside the 16-slot mapping
        unsafe { store.base_mut().as_ptr().add(3).write(42) };

        store.remap(4).unwrap();
        assert_eq!(store.reserved(), 4);
        assert_eq!(fs::metadata(&path).unwrap().len(), 32);
        // SAFETY: slot 3 is inside the 4-slot mapping
        assert_eq!(unsafe { store.base().as_ptr().add(3).read() }, 42);

        store.remap(0).unwrap();
        assert_eq!(store.reserved(), 0);
        assert_eq!(store.base(), NonNull::dangling());
    }

    #[test]
    fn test_close_truncates_and_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("close.fv");
        let mut store = BackingStore::<u16>::open(&path, &FileVecConfig::default()).unwrap();
        store.remap(100).unwrap();

        store.close(3).unwrap();
        assert!(!store.is_open());
        assert_eq!(fs::metadata(&path).unwrap().len(), 6);

        store.close(50).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 6);
        assert!(matches!(store.remap(8), Err(Error::Closed)));
        assert!(matches!(store.flush(), Err(Error::Closed)));
    }

    #[test]
    fn test_sync_on_close_flushes_and_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("synced.fv");
        let config = FileVecConfig::default().with_sync_on_close(true);
        let mut store = BackingStore::<u32>::open(&path, &config).unwrap();
        store.remap(64).unwrap();

        // SAFETY: slots 0 and 1 are inside the 64-slot mapping
        unsafe {
            store.base_mut().as_ptr().write(7);
            store.base_mut().as_ptr().add(1).write(9);
        }
        store.flush().unwrap();

        store.close(2).unwrap();
        assert!(!store.is_open());
        assert_eq!(fs::metadata(&path).unwrap().len(), 8);
        assert_eq!(fs::read(&path).unwrap(), [7, 0, 0, 0, 9, 0, 0, 0]);
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("data.fv");

        let err = BackingStore::<u8>::open(&path, &FileVecConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Storage { op: "open", .. }));

        let config = FileVecConfig::default().with_create_parent_dirs(true);
        let store = BackingStore::<u8>::open(&path, &config).unwrap();
        assert!(store.is_open());
    }

    #[test]
    fn test_zero_sized_slots_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zst.fv");

        let err = BackingStore::<()>::open(&path, &FileVecConfig::default()).unwrap_err();
        assert!(matches!(err, Error::ZeroSizedElement));
    }
}
