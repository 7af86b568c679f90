//! Capacity growth policy

use crate::BoundsError;

/// Capacity to remap to when `required` more slots are needed on top of `used`
///
/// Doubles the live length. Doubling zero never grows, so the result is never
/// below `minimum` (itself clamped to at least one slot), and it always covers
/// `used + required`.
pub fn grown_capacity(used: usize, required: usize, minimum: usize) -> Result<usize, BoundsError> {
    let needed = used
        .checked_add(required)
        .ok_or(BoundsError::CapacityOverflow)?;
    let doubled = used.saturating_add(used);

    Ok(doubled.max(needed).max(minimum.max(1)))
}
