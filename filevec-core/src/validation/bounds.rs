//! Slot bounds and byte-length arithmetic for file-backed arrays
//!
//! Pure functions with no I/O. The container uses these to turn file lengths
//! into slot counts and back, and to validate positions before touching the
//! mapping.

use crate::BoundsError;

/// Number of whole `T` slots in `byte_len` bytes, plus the trailing byte count
///
/// A file whose length is not a multiple of the element size keeps the whole
/// slots; the remainder is reported so the caller can decide what to do with it.
pub fn slot_count<T>(byte_len: u64) -> Result<(usize, u64), BoundsError> {
    let element_size = core::mem::size_of::<T>() as u64;
    if element_size == 0 {
        return Err(BoundsError::ZeroSizedElement);
    }

    let count = byte_len / element_size;
    let trailing = byte_len % element_size;

    let count = usize::try_from(count).map_err(|_| BoundsError::CapacityOverflow)?;

    // The mapping must be addressable as one allocation
    byte_len_of::<T>(count)?;

    Ok((count, trailing))
}

/// Byte length of `slots` elements of `T`, with overflow protection
pub fn byte_len_of<T>(slots: usize) -> Result<usize, BoundsError> {
    let bytes = slots
        .checked_mul(core::mem::size_of::<T>())
        .ok_or(BoundsError::CapacityOverflow)?;

    if bytes > isize::MAX as usize {
        return Err(BoundsError::CapacityOverflow);
    }

    Ok(bytes)
}

/// Validate a checked element index against the live length
///
/// Accepts any signed or unsigned integer so negative indices are reported
/// rather than being unrepresentable.
pub fn check_index<I>(index: I, len: usize) -> Result<usize, BoundsError>
where
    I: TryInto<i128>,
{
    let index = index.try_into().unwrap_or(i128::MAX);
    if index < 0 || index >= len as i128 {
        return Err(BoundsError::IndexOutOfRange { index, len });
    }
    Ok(index as usize)
}

/// Validate an insertion point; `len` itself is a valid (append) position
pub const fn check_position(position: usize, len: usize) -> Result<usize, BoundsError> {
    if position > len {
        return Err(BoundsError::PositionOutOfRange { position, len });
    }
    Ok(position)
}

/// Validate a half-open `[first, last)` range of live slots
pub const fn check_range(first: usize, last: usize, len: usize) -> Result<(), BoundsError> {
    if last > len {
        return Err(BoundsError::PositionOutOfRange { position: last, len });
    }
    if first > last {
        return Err(BoundsError::PositionOutOfRange { position: first, len: last });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_count() {
        assert_eq!(slot_count::<u32>(16), Ok((4, 0)));
        assert_eq!(slot_count::<u64>(23), Ok((2, 7)));
        assert_eq!(slot_count::<u32>(0), Ok((0, 0)));
        assert_eq!(slot_count::<()>(8), Err(BoundsError::ZeroSizedElement));
    }

    #[test]
    fn test_byte_len_overflow() {
        assert_eq!(byte_len_of::<u32>(4), Ok(16));
        assert_eq!(
            byte_len_of::<u64>(usize::MAX / 4),
            Err(BoundsError::CapacityOverflow)
        );
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(0usize, 3), Ok(0));
        assert_eq!(check_index(2i32, 3), Ok(2));
        assert_eq!(
            check_index(3usize, 3),
            Err(BoundsError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            check_index(-1i64, 3),
            Err(BoundsError::IndexOutOfRange { index: -1, len: 3 })
        );
        assert!(check_index(u128::MAX, 3).is_err());
    }

    #[test]
    fn test_positions_and_ranges() {
        assert_eq!(check_position(3, 3), Ok(3));
        assert!(check_position(4, 3).is_err());

        assert_eq!(check_range(1, 3, 3), Ok(()));
        assert_eq!(check_range(2, 2, 2), Ok(()));
        assert!(check_range(0, 4, 3).is_err());
        assert!(check_range(2, 1, 3).is_err());
    }
}
