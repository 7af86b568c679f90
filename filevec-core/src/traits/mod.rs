//! Element and lifecycle abstractions
//!
//! Pure interfaces plus the two lifecycle strategies. No I/O.

pub mod element;
pub mod lifecycle;

pub use element::Element;
pub use lifecycle::{Lifecycle, NonTrivial, Trivial};
