#![no_std]

//! filevec core - element, lifecycle and cursor definitions
//!
//! This crate holds the pieces of a file-backed array that need no I/O: the
//! element trait and its compile-time lifecycle strategies, the generic
//! random-access cursor, and the bounds and growth arithmetic the container
//! runs before touching its mapping.

pub mod cursor;
pub mod error;
pub mod traits;
pub mod validation;

pub use cursor::{
    Access, ConstCursor, ConstReverseCursor, Cursor, CursorMut, Direction, Exclusive, Forward,
    Reverse, ReverseCursorMut, Shared, Span,
};
pub use error::*;
pub use traits::*;
pub use validation::{
    byte_len_of, check_index, check_position, check_range, grown_capacity, slot_count,
};
