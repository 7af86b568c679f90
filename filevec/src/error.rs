//! Error types for file-backed vector operations

use filevec_core::BoundsError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for file-backed vector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while operating a file-backed vector
#[derive(Debug, Error)]
pub enum Error {
    /// The operating system refused a file or mapping operation
    #[error("storage fault: failed to {op} {}: {source}", path.display())]
    Storage {
        /// The operation that failed
        op: &'static str,
        /// The backing file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The backing store is closed, or was left unusable by a failed remap
    #[error("storage fault: backing store is closed")]
    Closed,

    /// Checked access or a position outside the live range
    #[error("index {index} out of range for length {len}")]
    Index {
        /// The requested index
        index: i128,
        /// The live length at the time of the request
        len: usize,
    },

    /// Remove-last on an empty container
    #[error("container is empty")]
    Empty,

    /// A slot count does not fit the address space
    #[error("capacity overflow")]
    CapacityOverflow,

    /// Zero-sized element types cannot be stored
    #[error("zero-sized element types cannot be stored in a file")]
    ZeroSizedElement,
}

impl Error {
    pub(crate) fn storage(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Storage {
            op,
            path: path.into(),
            source,
        }
    }

    /// True for faults raised by the file system or mapping layer
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, Error::Storage { .. } | Error::Closed)
    }
}

impl From<BoundsError> for Error {
    fn from(err: BoundsError) -> Self {
        match err {
            BoundsError::IndexOutOfRange { index, len } => Error::Index { index, len },
            BoundsError::PositionOutOfRange { position, len } => Error::Index {
                index: position as i128,
                len,
            },
            BoundsError::Empty => Error::Empty,
            BoundsError::CapacityOverflow => Error::CapacityOverflow,
            BoundsError::ZeroSizedElement => Error::ZeroSizedElement,
        }
    }
}
