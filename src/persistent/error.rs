//! Error types for persistent vector operations.
//!
//! Soft cases (reading past the end, deleting a missing position, popping an
//! empty vector) are not errors: they yield `None` or the unchanged vector.
//! Only requests that cannot be given a meaning are reported here.

/// Represents an error raised by a fallible [`PersistentVector`] operation.
///
/// A failing operation never publishes a partially built vector: the receiver
/// stays exactly as it was.
///
/// [`PersistentVector`]: super::PersistentVector
///
/// # Examples
///
/// ```rust
/// use bitmapped_vector::persistent::{PersistentVector, VectorError};
///
/// let vector: PersistentVector<i32> = (1..=3).collect();
/// let error = vector.set(10, 0).unwrap_err();
/// assert_eq!(error, VectorError::OutOfRange { index: 10, length: 3 });
/// assert_eq!(format!("{error}"), "index 10 outside of vector bounds (length 3)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    /// The position lies outside the range the operation can address.
    OutOfRange {
        /// The position as given by the caller (before normalization).
        index: isize,
        /// The length of the vector the operation was applied to.
        length: usize,
    },
    /// A count argument was negative.
    InvalidArgument {
        /// The name of the operation that rejected the argument.
        operation: &'static str,
        /// The rejected count.
        count: isize,
    },
}

impl VectorError {
    pub(crate) const fn out_of_range(index: isize, length: usize) -> Self {
        Self::OutOfRange { index, length }
    }

    pub(crate) const fn negative_count(operation: &'static str, count: isize) -> Self {
        Self::InvalidArgument { operation, count }
    }
}

impl std::fmt::Display for VectorError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange { index, length } => write!(
                formatter,
                "index {index} outside of vector bounds (length {length})"
            ),
            Self::InvalidArgument { operation, count } => {
                write!(formatter, "{operation}: attempt to use negative count {count}")
            }
        }
    }
}

impl std::error::Error for VectorError {}
