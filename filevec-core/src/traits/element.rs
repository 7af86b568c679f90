//! Element type constraints for file-backed arrays
//!
//! An element is stored as its raw in-memory representation inside a file
//! mapping, so it must survive being written out by one process and mapped
//! back in by another.

use super::lifecycle::Lifecycle;

/// Trait for types that can live in a file-backed array
///
/// The associated [`Lifecycle`] picks how slots are constructed and destroyed:
/// [`Trivial`](super::Trivial) for plain data, [`NonTrivial`](super::NonTrivial)
/// for types with a meaningful `Default`, `Clone` or `Drop`.
///
/// # Safety
///
/// The bytes of a live value must still denote a live value after the file is
/// closed and mapped again, possibly by another process. Types holding
/// pointers, references, handles or heap allocations must not implement this
/// trait. `Trivial` elements get this for free from `bytemuck::Pod`.
pub unsafe trait Element: Sized {
    /// Slot construction and destruction strategy for this type
    type Lifecycle: Lifecycle<Self>;

    /// Size of one slot in bytes
    fn slot_size() -> usize {
        core::mem::size_of::<Self>()
    }
}

/// Implement [`Element`] with the [`Trivial`](crate::Trivial) lifecycle
///
/// The types must implement `bytemuck::Pod`.
///
/// ```
/// use filevec_core::trivial_element;
///
/// #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
/// #[repr(C)]
/// struct Point {
///     x: f32,
///     y: f32,
/// }
///
/// trivial_element!(Point);
/// ```
#[macro_export]
macro_rules! trivial_element {
    ($($type:ty),+ $(,)?) => {
        $(
            // SAFETY: Pod types have no invalid bit patterns and own no resources
            unsafe impl $crate::Element for $type {
                type Lifecycle = $crate::Trivial;
            }
        )+
    };
}

trivial_element!(u8, u16, u32, u64, u128, usize);
trivial_element!(i8, i16, i32, i64, i128, isize);
trivial_element!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
    #[repr(C)]
    struct Pair {
        a: u32,
        b: u32,
    }

    trivial_element!(Pair);

    #[test]
    fn test_slot_sizes() {
        assert_eq!(<u8 as Element>::slot_size(), 1);
        assert_eq!(<i32 as Element>::slot_size(), 4);
        assert_eq!(<f64 as Element>::slot_size(), 8);
        assert_eq!(<Pair as Element>::slot_size(), 8);
    }
}
