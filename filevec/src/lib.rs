//! filevec - persistent, growable arrays backed by memory-mapped files
//!
//! A [`FileVec`] behaves like a `Vec` whose buffer is a shared mapping of a
//! regular file, so its contents survive process restarts and large datasets
//! do not need to fit in the heap.
//!
//! ## Architecture
//!
//! filevec keeps I/O-free definitions apart from the storage engine:
//!
//! - **filevec-core**: element lifecycle traits, cursors, bounds and growth arithmetic (no I/O)
//! - **filevec**: the memory-mapped backing store and the container built on it
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use filevec::FileVec;
//!
//! fn example() -> filevec::Result<()> {
//!     let mut values = FileVec::<u64>::open("values.fv")?;
//!     values.push(42)?;
//!     values.insert(0, 7)?;
//!     assert_eq!(values, [7, 42]);
//!
//!     // Truncates the file to the live elements; reopening picks them up
//!     values.close()?;
//!     let values = FileVec::<u64>::open("values.fv")?;
//!     assert_eq!(values.len(), 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Element types
//!
//! Any type implementing [`Element`] can be stored. Plain-data types register
//! with [`trivial_element!`] and skip construction and destruction entirely;
//! other types pick the [`NonTrivial`] lifecycle and are default-constructed,
//! cloned and dropped in place.

pub use filevec_core::{
    // Element lifecycle
    trivial_element, Element, Lifecycle, NonTrivial, Trivial,
    // Cursors
    ConstCursor, ConstReverseCursor, Cursor, CursorMut, Exclusive, Forward, Reverse,
    ReverseCursorMut, Shared, Span,
    // Pure errors
    BoundsError,
};

pub mod config;
pub mod error;
pub mod file_vec;
pub mod mmap_backend;

pub use config::FileVecConfig;
pub use error::{Error, Result};
pub use file_vec::FileVec;
pub use mmap_backend::BackingStore;
