//! Error types for slot bounds and layout checks

/// Errors produced by the pure bounds and layout validation helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsError {
    /// Checked element access outside `[0, len)`
    IndexOutOfRange { index: i128, len: usize },
    /// Insert/erase position outside `[0, len]`
    PositionOutOfRange { position: usize, len: usize },
    /// Remove-last on an empty container
    Empty,
    /// Slot count or byte length does not fit the address space
    CapacityOverflow,
    /// Zero-sized element types cannot be encoded by file length
    ZeroSizedElement,
}

impl core::fmt::Display for BoundsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BoundsError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} out of range for length {len}")
            }
            BoundsError::PositionOutOfRange { position, len } => {
                write!(f, "Position {position} out of range for length {len}")
            }
            BoundsError::Empty => write!(f, "Container is empty"),
            BoundsError::CapacityOverflow => write!(f, "Capacity overflow"),
            BoundsError::ZeroSizedElement => write!(f, "Zero-sized element type"),
        }
    }
}

/// Result type for bounds and layout checks
pub type Result<T> = core::result::Result<T, BoundsError>;
