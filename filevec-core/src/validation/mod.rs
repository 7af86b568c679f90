//! Bounds validation for file-backed arrays
//!
//! Pure arithmetic on slot counts and byte lengths. No I/O.

pub mod bounds;
pub mod growth;

pub use bounds::{byte_len_of, check_index, check_position, check_range, slot_count};
pub use growth::grown_capacity;
